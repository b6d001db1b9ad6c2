//! Fingerprint assembly.
//!
//! One catalog lookup, one digest derivation, then all nine surface
//! generators run from that single digest. The combined injection script is
//! concatenated in a fixed order so identity getters (navigator, hardware,
//! timezone) are installed before the behavior patches that read them.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::script::SEEDED_PRNG_HELPER;
use crate::seed::SeedDigest;
use crate::surfaces::audio::AudioFingerprint;
use crate::surfaces::canvas::CanvasFingerprint;
use crate::surfaces::client_rects::ClientRectsFingerprint;
use crate::surfaces::fonts::FontFingerprint;
use crate::surfaces::hardware::HardwareFingerprint;
use crate::surfaces::navigator::NavigatorFingerprint;
use crate::surfaces::timezone::TimezoneFingerprint;
use crate::surfaces::webgl::WebGlFingerprint;
use crate::surfaces::webrtc::MediaDevicesFingerprint;

/// Union of all surface components for one session.
///
/// `webgl` and `audio` are `None` when the catalog entry omits those
/// blocks; serialization skips them entirely.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateFingerprint {
    pub profile_id: String,
    pub seed_digest: SeedDigest,
    pub navigator: NavigatorFingerprint,
    pub hardware: HardwareFingerprint,
    pub timezone: TimezoneFingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webgl: Option<WebGlFingerprint>,
    pub canvas: CanvasFingerprint,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioFingerprint>,
    pub media_devices: MediaDevicesFingerprint,
    pub fonts: FontFingerprint,
    pub client_rects: ClientRectsFingerprint,
}

/// An assembled fingerprint plus the injection script that realizes it.
///
/// The script is a pure function of the aggregate and is kept out of the
/// serialized record; callers persist the aggregate and re-render when
/// needed.
#[derive(Debug, Clone)]
pub struct FingerprintBundle {
    pub fingerprint: AggregateFingerprint,
    pub script: String,
}

/// Assemble the full fingerprint for `profile_id` under `seed`.
///
/// The digest is derived exactly once; every generator draws its labeled
/// sub-streams from it, so rerunning with the same inputs reproduces the
/// bundle byte for byte, script included.
pub fn assemble(
    catalog: &Catalog,
    profile_id: &str,
    seed: &str,
) -> Result<FingerprintBundle, EngineError> {
    let profile = catalog.get(profile_id)?;
    let digest = SeedDigest::derive(seed);

    let fingerprint = AggregateFingerprint {
        profile_id: profile.id.clone(),
        seed_digest: digest,
        navigator: NavigatorFingerprint::generate(&digest, profile),
        hardware: HardwareFingerprint::generate(&digest, profile),
        timezone: TimezoneFingerprint::generate(&digest, profile),
        webgl: WebGlFingerprint::generate(&digest, profile),
        canvas: CanvasFingerprint::generate(&digest, profile),
        audio: AudioFingerprint::generate(&digest, profile),
        media_devices: MediaDevicesFingerprint::generate(&digest, profile),
        fonts: FontFingerprint::generate(&digest, profile),
        client_rects: ClientRectsFingerprint::generate(&digest, profile),
    };
    let script = render_script(&fingerprint);

    debug!(
        profile_id = %fingerprint.profile_id,
        script_bytes = script.len(),
        "assembled fingerprint bundle"
    );
    Ok(FingerprintBundle { fingerprint, script })
}

/// Concatenate the surface fragments in injection order. The PRNG helper
/// goes first, then identity getters, then behavior patches.
fn render_script(fingerprint: &AggregateFingerprint) -> String {
    let mut parts: Vec<String> = vec![SEEDED_PRNG_HELPER.to_string()];
    parts.push(fingerprint.navigator.script_fragment().render().to_string());
    parts.push(fingerprint.hardware.script_fragment().render().to_string());
    parts.push(fingerprint.timezone.script_fragment().render().to_string());
    if let Some(webgl) = &fingerprint.webgl {
        parts.push(webgl.script_fragment().render().to_string());
    }
    parts.push(fingerprint.canvas.script_fragment().render().to_string());
    if let Some(audio) = &fingerprint.audio {
        parts.push(audio.script_fragment().render().to_string());
    }
    parts.push(fingerprint.media_devices.script_fragment().render().to_string());
    parts.push(fingerprint.fonts.script_fragment().render().to_string());
    parts.push(fingerprint.client_rects.script_fragment().render().to_string());
    parts.join("\n")
}

/// Read-only probe script. Evaluating it in a page yields a JSON-shaped
/// object matching [`crate::validate::ObservedFingerprint`]; it never
/// patches or mutates page state.
pub fn observation_script() -> &'static str {
    OBSERVATION_SCRIPT
}

const OBSERVATION_SCRIPT: &str = r#"(function() {
    var observed = {};
    try {
        observed.userAgent = navigator.userAgent;
        observed.platform = navigator.platform;
        observed.vendor = navigator.vendor;
        observed.languages = Array.prototype.slice.call(navigator.languages || []);
        observed.webdriver = navigator.webdriver === undefined ? false : !!navigator.webdriver;
    } catch (e) {}
    try {
        observed.screen = {
            width: screen.width,
            height: screen.height,
            availWidth: screen.availWidth,
            availHeight: screen.availHeight,
            colorDepth: screen.colorDepth,
            devicePixelRatio: window.devicePixelRatio
        };
    } catch (e) {}
    try {
        observed.hardware = {
            hardwareConcurrency: navigator.hardwareConcurrency,
            deviceMemory: navigator.deviceMemory,
            maxTouchPoints: navigator.maxTouchPoints
        };
    } catch (e) {}
    try {
        observed.timezone = {
            timezone: Intl.DateTimeFormat().resolvedOptions().timeZone,
            utcOffsetMinutes: -new Date().getTimezoneOffset(),
            locale: Intl.DateTimeFormat().resolvedOptions().locale
        };
    } catch (e) {}
    try {
        var canvas = document.createElement('canvas');
        var gl = canvas.getContext('webgl') || canvas.getContext('experimental-webgl');
        if (gl) {
            var ext = gl.getExtension('WEBGL_debug_renderer_info');
            observed.webgl = {
                vendor: ext ? gl.getParameter(ext.UNMASKED_VENDOR_WEBGL) : gl.getParameter(gl.VENDOR),
                renderer: ext ? gl.getParameter(ext.UNMASKED_RENDERER_WEBGL) : gl.getParameter(gl.RENDERER)
            };
        }
    } catch (e) {}
    try {
        if (typeof AudioContext !== 'undefined' || typeof webkitAudioContext !== 'undefined') {
            var Ctor = typeof AudioContext !== 'undefined' ? AudioContext : webkitAudioContext;
            var ctx = new Ctor();
            observed.audio = { sampleRate: ctx.sampleRate };
            ctx.close();
        }
    } catch (e) {}
    return observed;
})();"#;
