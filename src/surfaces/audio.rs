//! Audio surface: latency characteristics and analyser noise.
//!
//! AudioContext fingerprinting renders a short oscillator offline and
//! hashes the float samples; the result is a function of the audio stack
//! (hardware, driver, resampler). The profile supplies the baseline
//! latencies, the seed perturbs them within the spread seen across real
//! devices of that class, and a tiny deterministic offset is mixed into
//! analyser reads so the rendered hash is session-specific but stable.

use serde::{Deserialize, Serialize};

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;

/// Relative spread applied to catalog latency baselines.
const LATENCY_SPREAD: f64 = 0.15;

/// Amplitude of the analyser sample offset. Well below hearing and below
/// the quantization floor of an 8-bit analyser read.
const SAMPLE_OFFSET_AMPLITUDE: f64 = 1.0e-5;

/// Audio stack parameters for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFingerprint {
    pub sample_rate: u32,
    pub base_latency: f64,
    pub output_latency: f64,
    /// Seed for the in-page sample-offset stream.
    pub lane: u32,
    pub sample_offset: f64,
}

impl AudioFingerprint {
    /// Generate audio parameters, or `None` when the profile carries no
    /// audio baseline.
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Option<Self> {
        let spec = profile.audio.as_ref()?;
        let base_jitter = 1.0 + digest.signal("audio.base-latency", LATENCY_SPREAD);
        let output_jitter = 1.0 + digest.signal("audio.output-latency", LATENCY_SPREAD);
        Some(Self {
            sample_rate: spec.sample_rate,
            base_latency: spec.base_latency * base_jitter,
            output_latency: spec.output_latency * output_jitter,
            lane: digest.lane("audio.lane"),
            sample_offset: digest.signal("audio.sample-offset", SAMPLE_OFFSET_AMPLITUDE),
        })
    }

    /// Render the override fragment patching the Web Audio read APIs.
    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("audio")
            .require_prng()
            .apply(AUDIO_PATCH, self)
            .build()
    }
}

/// Patches AudioContext latency getters and mixes the deterministic offset
/// into `getChannelData` and `getFloatFrequencyData` reads.
const AUDIO_PATCH: &str = r#"function(cfg) {
    if (typeof AudioContext === 'undefined') { return; }

    var defineOn = function(proto, property, value) {
        try {
            Object.defineProperty(proto, property, {
                get: function() { return value; },
                configurable: true
            });
        } catch (e) {}
    };

    defineOn(AudioContext.prototype, 'baseLatency', cfg.baseLatency);
    defineOn(AudioContext.prototype, 'outputLatency', cfg.outputLatency);
    defineOn(BaseAudioContext.prototype, 'sampleRate', cfg.sampleRate);

    var withOffset = function(samples) {
        // Offsets go into a fresh array; the buffer's backing store is
        // never touched, so every read replays the identical offsets.
        var rand = window.__fpRand(cfg.lane);
        var copy = new Float32Array(samples.length);
        for (var i = 0; i < samples.length; i++) {
            copy[i] = samples[i] + cfg.sampleOffset * (rand() - 0.5);
        }
        return copy;
    };

    if (typeof AudioBuffer !== 'undefined') {
        var originalGetChannelData = AudioBuffer.prototype.getChannelData;
        AudioBuffer.prototype.getChannelData = function(channel) {
            return withOffset(originalGetChannelData.call(this, channel));
        };
    }

    if (typeof AnalyserNode !== 'undefined') {
        var originalGetFloatFrequencyData = AnalyserNode.prototype.getFloatFrequencyData;
        AnalyserNode.prototype.getFloatFrequencyData = function(array) {
            // The analyser refills the caller's array on every call, so
            // offsetting it in place cannot accumulate across reads.
            originalGetFloatFrequencyData.call(this, array);
            var rand = window.__fpRand(cfg.lane);
            for (var i = 0; i < array.length; i++) {
                array[i] = array[i] + cfg.sampleOffset * (rand() - 0.5);
            }
        };
    }
}"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_generation_is_deterministic() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let digest = SeedDigest::derive("audio-seed");
        assert_eq!(
            AudioFingerprint::generate(&digest, profile),
            AudioFingerprint::generate(&digest, profile)
        );
    }

    #[test]
    fn test_latency_stays_near_baseline() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let baseline = profile.audio.as_ref().unwrap();
        for i in 0..200 {
            let digest = SeedDigest::derive(&format!("latency-{i}"));
            let fp = AudioFingerprint::generate(&digest, profile).unwrap();
            let rel = (fp.base_latency - baseline.base_latency).abs() / baseline.base_latency;
            assert!(rel <= LATENCY_SPREAD / 2.0 + 1e-9);
            assert_eq!(fp.sample_rate, baseline.sample_rate);
        }
    }

    #[test]
    fn test_omitted_when_profile_has_no_audio() {
        let profile = Catalog::builtin().get("linux-firefox-hardened").unwrap();
        assert!(AudioFingerprint::generate(&SeedDigest::derive("x"), profile).is_none());
    }

    #[test]
    fn test_channel_data_is_offset_into_a_copy() {
        let profile = Catalog::builtin().get("windows-chrome-high-end").unwrap();
        let fp = AudioFingerprint::generate(&SeedDigest::derive("reread"), profile).unwrap();
        let js = fp.script_fragment().render().to_string();
        // getChannelData returns the buffer's backing store; the offsets
        // must land in a fresh array or they stack on every read.
        assert!(js.contains("var copy = new Float32Array(samples.length);"));
        assert!(js.contains("return withOffset(originalGetChannelData.call(this, channel));"));
        assert!(!js.contains("samples[i] = samples[i]"));
    }

    #[test]
    fn test_script_patches_audio_reads() {
        let profile = Catalog::builtin().get("macbook-air-m1-safari").unwrap();
        let fp = AudioFingerprint::generate(&SeedDigest::derive("script"), profile).unwrap();
        let js = fp.script_fragment().render().to_string();
        assert!(js.contains("baseLatency"));
        assert!(js.contains("getChannelData"));
        assert!(js.contains("getFloatFrequencyData"));
    }
}
