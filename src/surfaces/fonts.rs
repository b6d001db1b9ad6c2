//! Font inventory surface.
//!
//! Font detection probes measure text in candidate faces and compare
//! against fallback metrics; the set of installed fonts is a strong,
//! stable identifier. The generator fixes a platform-correct base set and
//! adds a seeded subset of optional faces, so two sessions on the same
//! profile differ slightly in inventory the way two real machines would.

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceProfile, PlatformFamily};
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;

/// Faces present on effectively every device, browser-shipped included.
const UNIVERSAL_FONTS: &[&str] = &[
    "Arial",
    "Arial Black",
    "Courier New",
    "Georgia",
    "Times New Roman",
    "Trebuchet MS",
    "Verdana",
];

/// Platform base inventory plus weighted optional faces: the weight is the
/// probability a machine of that class has the font installed.
fn platform_fonts(family: PlatformFamily) -> (&'static [&'static str], &'static [(&'static str, f64)]) {
    match family {
        PlatformFamily::Windows => (
            &["Calibri", "Cambria", "Consolas", "Segoe UI", "Tahoma", "Microsoft Sans Serif", "Impact", "Comic Sans MS"],
            &[
                ("Segoe UI Emoji", 0.95),
                ("Candara", 0.8),
                ("Franklin Gothic Medium", 0.7),
                ("Gabriola", 0.6),
                ("Bahnschrift", 0.5),
                ("Cascadia Code", 0.25),
                ("Fira Code", 0.1),
            ],
        ),
        PlatformFamily::MacOs => (
            &["Helvetica", "Helvetica Neue", "Lucida Grande", "Monaco", "Menlo", "Geneva", "Avenir"],
            &[
                ("SF Pro", 0.9),
                ("Avenir Next", 0.85),
                ("Gill Sans", 0.7),
                ("Optima", 0.6),
                ("Futura", 0.55),
                ("SF Mono", 0.3),
            ],
        ),
        PlatformFamily::Linux => (
            &["DejaVu Sans", "DejaVu Serif", "Liberation Sans", "Liberation Serif", "Noto Sans"],
            &[
                ("Ubuntu", 0.6),
                ("Cantarell", 0.4),
                ("Droid Sans", 0.3),
                ("Fira Sans", 0.25),
                ("JetBrains Mono", 0.15),
            ],
        ),
        PlatformFamily::Android => (
            &["Roboto", "Noto Sans", "Droid Sans Mono"],
            &[
                ("Noto Serif", 0.8),
                ("Noto Color Emoji", 0.95),
                ("Roboto Condensed", 0.6),
            ],
        ),
        PlatformFamily::Ios => (
            &["Helvetica", "Helvetica Neue", "San Francisco", "Avenir", "Menlo"],
            &[
                ("Avenir Next", 0.9),
                ("Optima", 0.7),
                ("Gill Sans", 0.6),
            ],
        ),
    }
}

/// Font inventory for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFingerprint {
    /// Sorted list of faces the session reports as installed.
    pub available: Vec<String>,
}

impl FontFingerprint {
    /// Generate the inventory: universal + platform base + seeded optional
    /// subset, sorted for stable output.
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Self {
        let (base, optional) = platform_fonts(profile.platform_family());

        let mut available: Vec<String> = UNIVERSAL_FONTS
            .iter()
            .chain(base.iter())
            .map(|s| s.to_string())
            .collect();

        for (name, weight) in optional {
            if digest.uniform(&format!("fonts.optional.{name}")) < *weight {
                available.push(name.to_string());
            }
        }

        available.sort_unstable();
        available.dedup();
        Self { available }
    }

    /// Render the override fragment answering font availability queries
    /// from the synthesized inventory.
    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("fonts")
            .apply(FONTS_PATCH, self)
            .build()
    }
}

/// Patches `document.fonts.check` to answer from the inventory. Generic
/// families always resolve; a named face resolves only when listed.
const FONTS_PATCH: &str = r#"function(cfg) {
    if (!document.fonts || !document.fonts.check) { return; }

    var installed = {};
    for (var i = 0; i < cfg.available.length; i++) {
        installed[cfg.available[i].toLowerCase()] = true;
    }
    var generics = { 'serif': true, 'sans-serif': true, 'monospace': true,
                     'cursive': true, 'fantasy': true, 'system-ui': true };

    var familyOf = function(fontSpec) {
        var parts = fontSpec.split(' ');
        var family = parts.slice(1).join(' ') || parts[0];
        return family.replace(/^["']|["']$/g, '').toLowerCase();
    };

    var originalCheck = document.fonts.check.bind(document.fonts);
    document.fonts.check = function(fontSpec, text) {
        var family = familyOf(fontSpec);
        if (generics[family]) { return true; }
        if (Object.prototype.hasOwnProperty.call(installed, family)) { return true; }
        // Unknown face: defer to the noise-perturbed measurement path.
        return originalCheck(fontSpec, text);
    };
}"#;
