//! Hardware and timing surface.
//!
//! Core and memory counts come straight from the catalog (they must agree
//! with the GPU class the WebGL surface claims, and the catalog entry is
//! the single source of that correlation). The seed contributes the
//! network effective type and the timer perturbation lane.
//!
//! `navigator.deviceMemory` is a Chromium-only API; Safari and Firefox
//! profiles omit it rather than exposing an impossible property.

use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment, Target};
use crate::seed::SeedDigest;

/// Network effective types weighted by real-world distribution.
const EFFECTIVE_TYPES: &[(&str, f64)] = &[("4g", 0.88), ("3g", 0.09), ("2g", 0.03)];

/// Hardware counts and timing parameters for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareFingerprint {
    pub hardware_concurrency: u32,
    /// Omitted for browsers that do not expose `navigator.deviceMemory`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_memory: Option<u32>,
    pub max_touch_points: u32,
    pub network_effective_type: String,
    /// `performance.now()` resolution in milliseconds.
    pub timing_quantum_ms: f64,
    /// Seed for the timer jitter stream.
    pub timing_lane: u32,
}

impl HardwareFingerprint {
    /// Generate hardware parameters from catalog counts plus seeded
    /// network/timing characteristics.
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Self {
        let device_memory = match profile.browser.as_str() {
            "safari" | "firefox" => None,
            _ => Some(profile.hardware.memory_gb),
        };
        // Chromium coarsens timers to 100us; Gecko and WebKit to 1ms.
        let timing_quantum_ms = match profile.browser.as_str() {
            "chrome" | "edge" => 0.1,
            _ => 1.0,
        };
        Self {
            hardware_concurrency: profile.hardware.cores,
            device_memory,
            max_touch_points: profile.hardware.max_touch_points,
            network_effective_type: digest
                .pick_weighted("hardware.effective-type", EFFECTIVE_TYPES)
                .to_string(),
            timing_quantum_ms,
            timing_lane: digest.lane("hardware.timing"),
        }
    }

    /// Render the override fragment for navigator counts, connection info
    /// and timer coarsening.
    pub fn script_fragment(&self) -> ScriptFragment {
        let mut builder = FragmentBuilder::new("hardware")
            .require_prng()
            .define_getter(Target::Navigator, "hardwareConcurrency", &self.hardware_concurrency)
            .define_getter(Target::Navigator, "maxTouchPoints", &self.max_touch_points);
        if let Some(memory) = self.device_memory {
            builder = builder.define_getter(Target::Navigator, "deviceMemory", &memory);
        }
        builder.apply(TIMING_PATCH, self).build()
    }
}

/// Overrides `navigator.connection.effectiveType` and coarsens
/// `performance.now()` to the browser's quantum plus a bounded,
/// deterministic jitter. The patched clock stays monotonic because jitter
/// is a function of the quantized tick.
const TIMING_PATCH: &str = r#"function(cfg) {
    if (navigator.connection) {
        try {
            Object.defineProperty(navigator.connection, 'effectiveType', {
                get: function() { return cfg.networkEffectiveType; },
                configurable: true
            });
        } catch (e) {}
    }

    var quantum = cfg.timingQuantumMs;
    var originalNow = Performance.prototype.now;
    Performance.prototype.now = function() {
        var raw = originalNow.call(this);
        var tick = Math.floor(raw / quantum);
        var rand = window.__fpRand((cfg.timingLane ^ tick) >>> 0);
        return tick * quantum + rand() * quantum * 0.5;
    };
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_counts_come_from_catalog() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let fp = HardwareFingerprint::generate(&SeedDigest::derive("hw"), profile);
        assert_eq!(fp.hardware_concurrency, 8);
        assert_eq!(fp.device_memory, Some(16));
        assert_eq!(fp.max_touch_points, 0);
    }

    #[test]
    fn test_safari_omits_device_memory() {
        let profile = Catalog::builtin().get("macbook-air-m1-safari").unwrap();
        let fp = HardwareFingerprint::generate(&SeedDigest::derive("safari"), profile);
        assert_eq!(fp.device_memory, None);
        assert_eq!(fp.timing_quantum_ms, 1.0);
    }

    #[test]
    fn test_chrome_uses_fine_timer_quantum() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let fp = HardwareFingerprint::generate(&SeedDigest::derive("timer"), profile);
        assert_eq!(fp.timing_quantum_ms, 0.1);
    }

    #[test]
    fn test_effective_type_is_mostly_4g() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let mut fourg = 0usize;
        for i in 0..500 {
            let fp = HardwareFingerprint::generate(&SeedDigest::derive(&format!("net-{i}")), profile);
            if fp.network_effective_type == "4g" {
                fourg += 1;
            }
        }
        assert!(fourg > 400, "4g selected only {fourg}/500 times");
    }

    #[test]
    fn test_script_omits_memory_when_absent() {
        let profile = Catalog::builtin().get("macbook-air-m1-safari").unwrap();
        let fp = HardwareFingerprint::generate(&SeedDigest::derive("omit"), profile);
        let js = fp.script_fragment().render().to_string();
        assert!(!js.contains("deviceMemory"));
        assert!(js.contains("hardwareConcurrency"));
    }
}
