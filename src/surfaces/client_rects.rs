//! Client-rect surface: sub-pixel layout offsets.
//!
//! `getBoundingClientRect` returns doubles with enough precision that the
//! exact fractional values of a probe element fingerprint the font
//! rasterizer and zoom pipeline. The patch perturbs rect fields by a
//! bounded sub-pixel amount derived from the element's identity, so the
//! same element queried twice returns the same perturbed rect while two
//! seeds diverge.

use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;
use crate::surfaces::{NoiseLevel, NoiseParams};

/// Client-rect perturbation parameters for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRectsFingerprint {
    pub noise_level: NoiseLevel,
    pub noise: NoiseParams,
    pub lane: u32,
}

impl ClientRectsFingerprint {
    pub fn generate(digest: &SeedDigest, _profile: &DeviceProfile) -> Self {
        let noise_level = NoiseLevel::select(digest, "client-rects.level");
        Self {
            noise_level,
            noise: noise_level.subpixel_params(),
            lane: digest.lane("client-rects.lane"),
        }
    }

    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("client-rects")
            .require_prng()
            .apply(CLIENT_RECTS_PATCH, self)
            .build()
    }
}

/// Patches `getBoundingClientRect` and `getClientRects`. Element identity
/// is the tag name, id, class list and the unperturbed geometry, hashed
/// into the PRNG seed; identical queries replay identical offsets.
const CLIENT_RECTS_PATCH: &str = r#"function(cfg) {
    var elementSeed = function(element, rect) {
        var identity = element.tagName + '#' + (element.id || '') + '.' +
            (element.className || '') + ':' + rect.width.toFixed(2) + 'x' + rect.height.toFixed(2);
        return (cfg.lane ^ window.__fpHash(identity)) >>> 0;
    };

    var perturbRect = function(rect, rand) {
        var offset = function(value) {
            var gate = rand();
            var magnitude = (rand() - 0.5) * cfg.noise.intensity;
            return gate < cfg.noise.frequency ? value + magnitude : value;
        };
        var x = offset(rect.x);
        var y = offset(rect.y);
        var width = offset(rect.width);
        var height = offset(rect.height);
        return new DOMRect(x, y, width, height);
    };

    var originalGetBoundingClientRect = Element.prototype.getBoundingClientRect;
    Element.prototype.getBoundingClientRect = function() {
        var rect = originalGetBoundingClientRect.call(this);
        var rand = window.__fpRand(elementSeed(this, rect));
        return perturbRect(rect, rand);
    };

    var originalGetClientRects = Element.prototype.getClientRects;
    Element.prototype.getClientRects = function() {
        var rects = originalGetClientRects.call(this);
        if (rects.length === 0) { return rects; }
        var rand = window.__fpRand(elementSeed(this, rects[0]));
        var perturbed = [];
        for (var i = 0; i < rects.length; i++) {
            perturbed.push(perturbRect(rects[i], rand));
        }
        perturbed.item = function(index) { return perturbed[index] || null; };
        return perturbed;
    };
}"#;
