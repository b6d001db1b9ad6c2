//! Canvas surface: deterministic pixel noise and text-metric perturbation.
//!
//! Canvas fingerprinting hashes the exact pixel output of a drawing
//! benchmark; two machines with the same GPU/driver/font stack produce the
//! same hash. The defense is not to block the read but to perturb it by a
//! small, *stable* amount: the same canvas read twice in one session must
//! return identical bytes (detectors re-read and compare), while two
//! sessions with different seeds diverge.
//!
//! The noise stream is seeded from the digest lane plus the canvas
//! dimensions, so noise is a pure function of (seed, canvas identity).

use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;
use crate::surfaces::{NoiseLevel, NoiseParams};

/// Canvas noise parameters for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasFingerprint {
    pub noise_level: NoiseLevel,
    pub noise: NoiseParams,
    /// Seed for the in-page PRNG stream.
    pub lane: u32,
    /// Relative offset applied to `measureText` widths.
    pub text_metric_offset: f64,
}

impl CanvasFingerprint {
    /// Generate canvas parameters from the session digest.
    ///
    /// The profile currently contributes nothing beyond existing (every
    /// device has a canvas), but it stays in the signature so all nine
    /// surfaces share one contract.
    pub fn generate(digest: &SeedDigest, _profile: &DeviceProfile) -> Self {
        let noise_level = NoiseLevel::select(digest, "canvas.level");
        Self {
            noise_level,
            noise: noise_level.channel_params(),
            lane: digest.lane("canvas.lane"),
            text_metric_offset: digest.signal("canvas.text-metric", 0.0004),
        }
    }

    /// Render the override fragment patching the canvas read APIs.
    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("canvas")
            .require_prng()
            .apply(CANVAS_PATCH, self)
            .build()
    }
}

/// Patches `toDataURL`, `toBlob`, `getImageData` and `measureText`.
///
/// Noise derivation: one PRNG stream per canvas geometry, advanced two
/// steps per pixel (gate, magnitude) so the stream stays aligned whether or
/// not a pixel was perturbed. Transparent pixels are skipped but still
/// consume their draws.
///
/// The source canvas is never written to. Serialize reads route through a
/// noised offscreen copy and `getImageData` noises the snapshot it already
/// returns, so every read replays the identical noise instead of stacking
/// a fresh round on top of the previous one.
const CANVAS_PATCH: &str = r#"function(cfg) {
    var originalGetImageData = CanvasRenderingContext2D.prototype.getImageData;
    var originalToDataURL = HTMLCanvasElement.prototype.toDataURL;
    var originalToBlob = HTMLCanvasElement.prototype.toBlob;
    var originalMeasureText = CanvasRenderingContext2D.prototype.measureText;

    var streamFor = function(width, height) {
        var identity = (Math.imul(width, 2654435761) + height) >>> 0;
        return window.__fpRand((cfg.lane ^ identity) >>> 0);
    };

    var addNoise = function(imageData) {
        var data = imageData.data;
        var rand = streamFor(imageData.width, imageData.height);
        for (var i = 0; i < data.length; i += 4) {
            var gate = rand();
            var magnitude = (rand() - 0.5) * cfg.noise.intensity;
            if (data[i + 3] === 0) { continue; }
            if (gate >= cfg.noise.frequency) { continue; }
            data[i] = Math.max(0, Math.min(255, data[i] + magnitude));
            data[i + 1] = Math.max(0, Math.min(255, data[i + 1] + magnitude));
            data[i + 2] = Math.max(0, Math.min(255, data[i + 2] + magnitude));
        }
        return imageData;
    };

    var noisedCopy = function(canvas) {
        try {
            var ctx = canvas.getContext('2d');
            if (!ctx || canvas.width === 0 || canvas.height === 0) { return null; }
            var imageData = originalGetImageData.call(ctx, 0, 0, canvas.width, canvas.height);
            var copy = document.createElement('canvas');
            copy.width = canvas.width;
            copy.height = canvas.height;
            copy.getContext('2d').putImageData(addNoise(imageData), 0, 0);
            return copy;
        } catch (e) {
            // Tainted canvas or missing 2d context: serialize the original.
            return null;
        }
    };

    HTMLCanvasElement.prototype.toDataURL = function(type, quality) {
        var copy = noisedCopy(this);
        return originalToDataURL.call(copy || this, type, quality);
    };

    HTMLCanvasElement.prototype.toBlob = function(callback, type, quality) {
        var copy = noisedCopy(this);
        return originalToBlob.call(copy || this, callback, type, quality);
    };

    CanvasRenderingContext2D.prototype.getImageData = function(sx, sy, sw, sh) {
        // getImageData already returns a snapshot; noising it never
        // touches the backing canvas.
        return addNoise(originalGetImageData.call(this, sx, sy, sw, sh));
    };

    CanvasRenderingContext2D.prototype.measureText = function(text) {
        var metrics = originalMeasureText.call(this, text);
        var width = metrics.width * (1 + cfg.textMetricOffset);
        try {
            Object.defineProperty(metrics, 'width', {
                get: function() { return width; },
                configurable: true
            });
        } catch (e) {}
        return metrics;
    };

    if (typeof OffscreenCanvas !== 'undefined' && OffscreenCanvas.prototype.convertToBlob) {
        var originalConvertToBlob = OffscreenCanvas.prototype.convertToBlob;
        OffscreenCanvas.prototype.convertToBlob = function(options) {
            try {
                var ctx = this.getContext('2d');
                if (ctx && this.width > 0 && this.height > 0) {
                    var copy = new OffscreenCanvas(this.width, this.height);
                    var imageData = ctx.getImageData(0, 0, this.width, this.height);
                    copy.getContext('2d').putImageData(addNoise(imageData), 0, 0);
                    return originalConvertToBlob.call(copy, options);
                }
            } catch (e) {}
            return originalConvertToBlob.call(this, options);
        };
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn profile() -> &'static DeviceProfile {
        Catalog::builtin().get("windows-chrome-high-end").unwrap()
    }

    #[test]
    fn test_generation_is_deterministic() {
        let digest = SeedDigest::derive("canvas-seed");
        let a = CanvasFingerprint::generate(&digest, profile());
        let b = CanvasFingerprint::generate(&digest, profile());
        assert_eq!(a, b);
        assert_eq!(
            a.script_fragment().render(),
            b.script_fragment().render()
        );
    }

    #[test]
    fn test_distinct_seeds_diverge() {
        let a = CanvasFingerprint::generate(&SeedDigest::derive("seed-1"), profile());
        let b = CanvasFingerprint::generate(&SeedDigest::derive("seed-2"), profile());
        assert_ne!(a.lane, b.lane);
    }

    #[test]
    fn test_text_metric_offset_is_bounded() {
        for i in 0..200 {
            let digest = SeedDigest::derive(&format!("bound-{i}"));
            let fp = CanvasFingerprint::generate(&digest, profile());
            assert!(fp.text_metric_offset.abs() <= 0.0002);
        }
    }

    #[test]
    fn test_serialize_reads_never_write_back_to_the_source() {
        let digest = SeedDigest::derive("stable-reread");
        let js = CanvasFingerprint::generate(&digest, profile())
            .script_fragment()
            .render()
            .to_string();
        // toDataURL/toBlob serialize a noised offscreen copy; only that
        // copy is ever written to, so re-reads replay identical noise.
        assert!(js.contains("var copy = noisedCopy(this);"));
        assert!(js.contains("originalToDataURL.call(copy || this"));
        assert!(js.contains("originalToBlob.call(copy || this"));
        assert!(js.contains("document.createElement('canvas')"));
        // The only putImageData targets are the offscreen copies.
        for line in js.lines().filter(|l| l.contains("putImageData")) {
            assert!(
                line.contains("copy.getContext('2d').putImageData"),
                "write-back to a live canvas: {line}"
            );
        }
    }

    #[test]
    fn test_script_patches_read_apis() {
        let digest = SeedDigest::derive("canvas-script");
        let js = CanvasFingerprint::generate(&digest, profile())
            .script_fragment()
            .render()
            .to_string();
        assert!(js.contains("toDataURL"));
        assert!(js.contains("toBlob"));
        assert!(js.contains("getImageData"));
        assert!(js.contains("measureText"));
        assert!(js.contains("__fpRand"));
    }
}
