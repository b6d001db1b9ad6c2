//! WebRTC / media-devices surface.
//!
//! Two leaks matter here: `enumerateDevices` exposes the real device
//! inventory (counts and ids survive incognito), and ICE candidate
//! gathering exposes local network addresses. The generator synthesizes a
//! plausible device inventory for the profile's class with seed-stable
//! device ids, and the emitted script masks host candidates.

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceCategory, DeviceProfile};
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;

/// Media device inventory for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaDevicesFingerprint {
    pub audio_input_count: u32,
    pub audio_output_count: u32,
    pub video_input_count: u32,
    /// Stable salt the page-side patch derives device ids from.
    pub device_id_salt: String,
    pub mask_local_ips: bool,
}

impl MediaDevicesFingerprint {
    /// Generate a device inventory plausible for the profile's category.
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Self {
        let (audio_in, audio_out, video_in) = match profile.category {
            // Desktops often have a headset plus speakers, camera optional.
            DeviceCategory::Desktop => (
                digest.ranged("webrtc.audio-in", 1, 2),
                digest.ranged("webrtc.audio-out", 1, 3),
                digest.ranged("webrtc.video-in", 0, 1),
            ),
            // Laptops and tablets ship a built-in mic, speakers and camera.
            DeviceCategory::Laptop | DeviceCategory::Tablet => (
                1,
                digest.ranged("webrtc.audio-out", 1, 2),
                1,
            ),
            // Phones expose front and back cameras.
            DeviceCategory::Mobile => (1, 1, 2),
        };

        Self {
            audio_input_count: audio_in,
            audio_output_count: audio_out,
            video_input_count: video_in,
            device_id_salt: hex::encode(&digest.as_bytes()[..8]),
            mask_local_ips: true,
        }
    }

    /// Render the override fragment for `enumerateDevices` and ICE
    /// candidate masking.
    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("webrtc")
            .require_prng()
            .apply(WEBRTC_PATCH, self)
            .build()
    }
}

/// Replaces the enumerated device list with the synthesized inventory and
/// drops host (local-address) ICE candidates. Device ids are derived from
/// the salt via the shared hash helper so they are stable per session.
const WEBRTC_PATCH: &str = r#"function(cfg) {
    var deviceId = function(kind, index) {
        var rand = window.__fpRand(window.__fpHash(cfg.deviceIdSalt + ':' + kind + ':' + index));
        var id = '';
        for (var i = 0; i < 8; i++) {
            id += (rand() * 4294967296 >>> 0).toString(16).padStart(8, '0');
        }
        return id.slice(0, 64);
    };

    var synthesize = function() {
        var devices = [];
        var push = function(kind, label, count) {
            for (var i = 0; i < count; i++) {
                devices.push({
                    deviceId: deviceId(kind, i),
                    kind: kind,
                    label: '',
                    groupId: deviceId('group-' + kind, i),
                    toJSON: function() { return this; }
                });
            }
        };
        push('audioinput', '', cfg.audioInputCount);
        push('audiooutput', '', cfg.audioOutputCount);
        push('videoinput', '', cfg.videoInputCount);
        return devices;
    };

    if (navigator.mediaDevices && navigator.mediaDevices.enumerateDevices) {
        navigator.mediaDevices.enumerateDevices = function() {
            return Promise.resolve(synthesize());
        };
    }

    if (cfg.maskLocalIps && typeof RTCPeerConnection !== 'undefined') {
        var isLocalCandidate = function(candidate) {
            if (!candidate || !candidate.candidate) { return false; }
            return candidate.candidate.indexOf(' host ') !== -1 ||
                   /(^|\s)(10\.|192\.168\.|172\.(1[6-9]|2\d|3[01])\.)/.test(candidate.candidate) ||
                   candidate.candidate.indexOf('.local') !== -1;
        };

        var OriginalRTCPeerConnection = RTCPeerConnection;
        window.RTCPeerConnection = function(configuration, constraints) {
            var pc = new OriginalRTCPeerConnection(configuration, constraints);
            var originalAddEventListener = pc.addEventListener.bind(pc);
            pc.addEventListener = function(type, listener, options) {
                if (type !== 'icecandidate') {
                    return originalAddEventListener(type, listener, options);
                }
                return originalAddEventListener(type, function(event) {
                    if (event.candidate && isLocalCandidate(event.candidate)) { return; }
                    listener(event);
                }, options);
            };
            Object.defineProperty(pc, 'onicecandidate', {
                set: function(handler) {
                    originalAddEventListener('icecandidate', function(event) {
                        if (event.candidate && isLocalCandidate(event.candidate)) { return; }
                        if (handler) { handler(event); }
                    });
                },
                configurable: true
            });
            return pc;
        };
        window.RTCPeerConnection.prototype = OriginalRTCPeerConnection.prototype;
    }
}"#;
