//! WebGL surface: GPU identity and parameter overrides.
//!
//! The unmasked renderer string is the single highest-entropy surface a
//! detector can read, and it must stay correlated with everything else: the
//! vendor family has to agree with `navigator.platform`, and the parameter
//! limits (texture size, viewport dims) have to be plausible for the GPU
//! tier the renderer claims.
//!
//! The catalog fixes the GPU identity; the seed only selects among driver
//! presentation variants of that same GPU, so cross-surface correlation can
//! never be broken by seeding.

use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;

/// Driver build suffixes occasionally visible in ANGLE D3D11 renderer
/// strings, weighted toward the plain form.
const D3D11_DRIVER_VARIANTS: &[(Option<&str>, f64)] = &[
    (None, 0.55),
    (Some("27.21.14.6079"), 0.15),
    (Some("30.0.14.7168"), 0.12),
    (Some("31.0.15.3699"), 0.10),
    (Some("31.0.24.14582"), 0.08),
];

/// WebGL identity and parameter set for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebGlFingerprint {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language_version: String,
    pub max_texture_size: u32,
    pub max_viewport_dims: (u32, u32),
    pub max_vertex_attribs: u32,
    pub max_varying_vectors: u32,
    pub max_vertex_uniform_vectors: u32,
    pub max_fragment_uniform_vectors: u32,
    pub extensions: Vec<String>,
}

impl WebGlFingerprint {
    /// Generate WebGL parameters, or `None` when the profile has no GPU
    /// identity (the surface is then omitted, not invented).
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Option<Self> {
        let spec = profile.webgl.as_ref()?;

        let renderer = select_renderer_variant(digest, &spec.renderer);
        let (max_texture_size, max_viewport_dims) = gpu_tier_limits(&spec.renderer);
        let (version, shading_language_version) = gl_version_strings(&profile.browser);

        Some(Self {
            vendor: spec.vendor.clone(),
            renderer,
            version,
            shading_language_version,
            max_texture_size,
            max_viewport_dims,
            max_vertex_attribs: 16,
            max_varying_vectors: 30,
            max_vertex_uniform_vectors: 4096,
            max_fragment_uniform_vectors: 1024,
            extensions: spec.extensions.clone(),
        })
    }

    /// Render the override fragment patching `getParameter`,
    /// `getExtension` and `getSupportedExtensions`.
    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("webgl")
            .apply(WEBGL_PATCH, self)
            .build()
    }
}

/// Pick a driver presentation variant of the catalog renderer string.
///
/// Only ANGLE D3D11 strings carry a driver build; other renderers are
/// returned unchanged.
fn select_renderer_variant(digest: &SeedDigest, base: &str) -> String {
    if !base.ends_with(", D3D11)") {
        return base.to_string();
    }
    match digest.pick_weighted("webgl.renderer", D3D11_DRIVER_VARIANTS) {
        Some(build) => {
            let trimmed = base.strip_suffix(", D3D11)").unwrap_or(base);
            format!("{trimmed}, D3D11-{build})")
        }
        None => base.to_string(),
    }
}

/// Parameter limits plausible for the GPU tier named in the renderer.
fn gpu_tier_limits(renderer: &str) -> (u32, (u32, u32)) {
    let r = renderer.to_ascii_lowercase();
    if r.contains("swiftshader") {
        (8192, (8192, 8192))
    } else if r.contains("rtx") || r.contains("radeon rx") {
        (16384, (32767, 32767))
    } else {
        // Integrated, mobile and Apple GPUs.
        (16384, (16384, 16384))
    }
}

fn gl_version_strings(browser: &str) -> (String, String) {
    match browser {
        "firefox" | "safari" => (
            "WebGL 1.0".to_string(),
            "WebGL GLSL ES 1.0".to_string(),
        ),
        // Chrome, Edge and other Chromium derivatives.
        _ => (
            "WebGL 1.0 (OpenGL ES 2.0 Chromium)".to_string(),
            "WebGL GLSL ES 1.0 (OpenGL ES GLSL ES 1.0 Chromium)".to_string(),
        ),
    }
}

/// Patches the WebGL parameter and extension queries on both context
/// prototypes. GLenum values are the standard constants:
/// 37445/37446 unmasked vendor/renderer, 7938 VERSION, 35724 SHADING,
/// 3379 MAX_TEXTURE_SIZE, 3386 MAX_VIEWPORT_DIMS, 34921/36348/36347/36349
/// vertex/varying/uniform limits.
const WEBGL_PATCH: &str = r#"function(cfg) {
    var overrides = {};
    overrides[37445] = cfg.vendor;
    overrides[37446] = cfg.renderer;
    overrides[7938] = cfg.version;
    overrides[35724] = cfg.shadingLanguageVersion;
    overrides[3379] = cfg.maxTextureSize;
    overrides[34921] = cfg.maxVertexAttribs;
    overrides[36348] = cfg.maxVaryingVectors;
    overrides[36347] = cfg.maxVertexUniformVectors;
    overrides[36349] = cfg.maxFragmentUniformVectors;

    var patch = function(target) {
        if (typeof target === 'undefined' || !target.prototype) { return; }

        var originalGetParameter = target.prototype.getParameter;
        target.prototype.getParameter = function(parameter) {
            if (parameter === 3386) {
                return new Int32Array(cfg.maxViewportDims);
            }
            if (Object.prototype.hasOwnProperty.call(overrides, parameter)) {
                return overrides[parameter];
            }
            return originalGetParameter.call(this, parameter);
        };

        var originalGetExtension = target.prototype.getExtension;
        target.prototype.getExtension = function(name) {
            if (name === 'WEBGL_debug_renderer_info') {
                return {
                    UNMASKED_VENDOR_WEBGL: 37445,
                    UNMASKED_RENDERER_WEBGL: 37446
                };
            }
            return originalGetExtension.call(this, name);
        };

        target.prototype.getSupportedExtensions = function() {
            return cfg.extensions.slice();
        };
    };

    patch(typeof WebGLRenderingContext !== 'undefined' ? WebGLRenderingContext : undefined);
    patch(typeof WebGL2RenderingContext !== 'undefined' ? WebGL2RenderingContext : undefined);
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_generation_is_deterministic() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let digest = SeedDigest::derive("webgl-seed");
        assert_eq!(
            WebGlFingerprint::generate(&digest, profile),
            WebGlFingerprint::generate(&digest, profile)
        );
    }

    #[test]
    fn test_renderer_variant_keeps_gpu_identity() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        for i in 0..100 {
            let digest = SeedDigest::derive(&format!("variant-{i}"));
            let fp = WebGlFingerprint::generate(&digest, profile).unwrap();
            assert!(fp.renderer.contains("RTX 3080"), "lost GPU: {}", fp.renderer);
            assert!(fp.renderer.starts_with("ANGLE (NVIDIA"));
        }
    }

    #[test]
    fn test_omitted_when_profile_has_no_webgl() {
        let profile = Catalog::builtin().get("linux-firefox-hardened").unwrap();
        let digest = SeedDigest::derive("omit");
        assert!(WebGlFingerprint::generate(&digest, profile).is_none());
    }

    #[test]
    fn test_high_end_gpu_gets_wide_viewport() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let fp = WebGlFingerprint::generate(&SeedDigest::derive("tier"), profile).unwrap();
        assert_eq!(fp.max_viewport_dims, (32767, 32767));
        assert_eq!(fp.max_texture_size, 16384);
    }

    #[test]
    fn test_script_contains_debug_renderer_info() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let fp = WebGlFingerprint::generate(&SeedDigest::derive("script"), profile).unwrap();
        let js = fp.script_fragment().render().to_string();
        assert!(js.contains("WEBGL_debug_renderer_info"));
        assert!(js.contains("getParameter"));
        assert!(js.contains("RTX 3080"));
    }

    #[test]
    fn test_apple_renderer_has_no_driver_suffix() {
        let profile = Catalog::builtin().get("macbook-air-m1-safari").unwrap();
        let fp = WebGlFingerprint::generate(&SeedDigest::derive("apple"), profile).unwrap();
        assert_eq!(fp.renderer, "Apple GPU");
    }
}
