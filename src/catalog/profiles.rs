//! Built-in device profile table.
//!
//! Hand-curated entries covering the common desktop/laptop/mobile/tablet
//! classes across Windows, macOS, Linux, Android and iOS. Values are taken
//! from real devices; every entry keeps its WebGL vendor, platform string
//! and user agent on the same OS family so cross-surface correlation checks
//! hold by construction.

use super::{
    AudioSpec, DeviceCategory, DeviceProfile, GeoSpec, HardwareSpec, ScreenSpec, WebGlSpec,
};

/// Baseline WebGL extensions advertised by desktop Chrome.
fn chrome_desktop_extensions() -> Vec<String> {
    [
        "ANGLE_instanced_arrays",
        "EXT_blend_minmax",
        "EXT_color_buffer_half_float",
        "EXT_float_blend",
        "EXT_texture_filter_anisotropic",
        "OES_element_index_uint",
        "OES_standard_derivatives",
        "OES_texture_float",
        "OES_texture_float_linear",
        "OES_texture_half_float",
        "OES_vertex_array_object",
        "WEBGL_compressed_texture_s3tc",
        "WEBGL_debug_renderer_info",
        "WEBGL_depth_texture",
        "WEBGL_lose_context",
        "WEBGL_multi_draw",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Baseline WebGL extensions advertised by Safari on Apple GPUs.
fn safari_extensions() -> Vec<String> {
    [
        "ANGLE_instanced_arrays",
        "EXT_blend_minmax",
        "EXT_texture_filter_anisotropic",
        "OES_element_index_uint",
        "OES_standard_derivatives",
        "OES_texture_float",
        "OES_texture_half_float",
        "OES_vertex_array_object",
        "WEBGL_compressed_texture_astc",
        "WEBGL_debug_renderer_info",
        "WEBGL_depth_texture",
        "WEBGL_lose_context",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Baseline WebGL extensions advertised by mobile Chrome on Mali/Adreno.
fn android_extensions() -> Vec<String> {
    [
        "ANGLE_instanced_arrays",
        "EXT_blend_minmax",
        "EXT_texture_filter_anisotropic",
        "OES_element_index_uint",
        "OES_standard_derivatives",
        "OES_texture_float",
        "OES_texture_half_float",
        "OES_vertex_array_object",
        "WEBGL_compressed_texture_astc",
        "WEBGL_compressed_texture_etc",
        "WEBGL_debug_renderer_info",
        "WEBGL_lose_context",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// The full built-in profile list.
pub(super) fn builtin_profiles() -> Vec<DeviceProfile> {
    vec![
        DeviceProfile {
            id: "windows-chrome-high-end".to_string(),
            category: DeviceCategory::Desktop,
            platform: "Win32".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 1920,
                height: 1080,
                avail_width: 1920,
                avail_height: 1040,
                color_depth: 24,
                device_pixel_ratio: 1.0,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 16,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (NVIDIA)".to_string(),
                renderer: "ANGLE (NVIDIA, NVIDIA GeForce RTX 3080 Direct3D11 vs_5_0 ps_5_0, D3D11)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.005,
                output_latency: 0.025,
            }),
            geo: GeoSpec {
                timezone: "America/New_York".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "gaming-desktop".to_string(),
        },
        DeviceProfile {
            id: "windows-chrome-office".to_string(),
            category: DeviceCategory::Laptop,
            platform: "Win32".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 1366,
                height: 768,
                avail_width: 1366,
                avail_height: 728,
                color_depth: 24,
                device_pixel_ratio: 1.0,
            },
            hardware: HardwareSpec {
                cores: 4,
                memory_gb: 8,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (Intel)".to_string(),
                renderer: "ANGLE (Intel, Intel(R) UHD Graphics 620 Direct3D11 vs_5_0 ps_5_0, D3D11)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.01,
                output_latency: 0.04,
            }),
            geo: GeoSpec {
                timezone: "America/Chicago".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "office-laptop".to_string(),
        },
        DeviceProfile {
            id: "windows-firefox-creator".to_string(),
            category: DeviceCategory::Desktop,
            platform: "Win32".to_string(),
            browser: "firefox".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0".to_string(),
            screen: ScreenSpec {
                width: 2560,
                height: 1440,
                avail_width: 2560,
                avail_height: 1400,
                color_depth: 24,
                device_pixel_ratio: 1.0,
            },
            hardware: HardwareSpec {
                cores: 12,
                memory_gb: 32,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (AMD)".to_string(),
                renderer: "ANGLE (AMD, AMD Radeon RX 6700 XT Direct3D11 vs_5_0 ps_5_0, D3D11)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.008,
                output_latency: 0.03,
            }),
            geo: GeoSpec {
                timezone: "Europe/Berlin".to_string(),
                locale: "de-DE".to_string(),
                languages: vec!["de-DE".to_string(), "de".to_string(), "en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "creator-desktop".to_string(),
        },
        DeviceProfile {
            id: "windows-edge-surface".to_string(),
            category: DeviceCategory::Tablet,
            platform: "Win32".to_string(),
            browser: "edge".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36 Edg/122.0.0.0".to_string(),
            screen: ScreenSpec {
                width: 2880,
                height: 1920,
                avail_width: 2880,
                avail_height: 1860,
                color_depth: 24,
                device_pixel_ratio: 2.0,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 16,
                max_touch_points: 10,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (Intel)".to_string(),
                renderer: "ANGLE (Intel, Intel(R) Iris(R) Xe Graphics Direct3D11 vs_5_0 ps_5_0, D3D11)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.01,
                output_latency: 0.035,
            }),
            geo: GeoSpec {
                timezone: "America/Los_Angeles".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "convertible-tablet".to_string(),
        },
        DeviceProfile {
            id: "macbook-pro-m2-chrome".to_string(),
            category: DeviceCategory::Laptop,
            platform: "MacIntel".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 1512,
                height: 982,
                avail_width: 1512,
                avail_height: 944,
                color_depth: 30,
                device_pixel_ratio: 2.0,
            },
            hardware: HardwareSpec {
                cores: 10,
                memory_gb: 16,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (Apple)".to_string(),
                renderer: "ANGLE (Apple, ANGLE Metal Renderer: Apple M2 Pro, Unspecified Version)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 44_100,
                base_latency: 0.005,
                output_latency: 0.012,
            }),
            geo: GeoSpec {
                timezone: "America/Los_Angeles".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "developer-laptop".to_string(),
        },
        DeviceProfile {
            id: "macbook-air-m1-safari".to_string(),
            category: DeviceCategory::Laptop,
            platform: "MacIntel".to_string(),
            browser: "safari".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Safari/605.1.15".to_string(),
            screen: ScreenSpec {
                width: 1440,
                height: 900,
                avail_width: 1440,
                avail_height: 875,
                color_depth: 30,
                device_pixel_ratio: 2.0,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 8,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Apple Inc.".to_string(),
                renderer: "Apple GPU".to_string(),
                extensions: safari_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 44_100,
                base_latency: 0.006,
                output_latency: 0.015,
            }),
            geo: GeoSpec {
                timezone: "Europe/London".to_string(),
                locale: "en-GB".to_string(),
                languages: vec!["en-GB".to_string(), "en".to_string()],
            },
            behavioral_profile: "home-laptop".to_string(),
        },
        DeviceProfile {
            id: "linux-chrome-workstation".to_string(),
            category: DeviceCategory::Desktop,
            platform: "Linux x86_64".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 1920,
                height: 1080,
                avail_width: 1920,
                avail_height: 1053,
                color_depth: 24,
                device_pixel_ratio: 1.0,
            },
            hardware: HardwareSpec {
                cores: 16,
                memory_gb: 64,
                max_touch_points: 0,
            },
            webgl: Some(WebGlSpec {
                vendor: "Google Inc. (NVIDIA Corporation)".to_string(),
                renderer: "ANGLE (NVIDIA Corporation, NVIDIA GeForce RTX 4070/PCIe/SSE2, OpenGL 4.5.0)".to_string(),
                extensions: chrome_desktop_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.01,
                output_latency: 0.02,
            }),
            geo: GeoSpec {
                timezone: "Europe/Amsterdam".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string(), "nl".to_string()],
            },
            behavioral_profile: "engineering-workstation".to_string(),
        },
        DeviceProfile {
            id: "linux-firefox-hardened".to_string(),
            category: DeviceCategory::Desktop,
            platform: "Linux x86_64".to_string(),
            browser: "firefox".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64; rv:123.0) Gecko/20100101 Firefox/123.0".to_string(),
            screen: ScreenSpec {
                width: 1920,
                height: 1080,
                avail_width: 1920,
                avail_height: 1080,
                color_depth: 24,
                device_pixel_ratio: 1.0,
            },
            hardware: HardwareSpec {
                cores: 4,
                memory_gb: 8,
                max_touch_points: 0,
            },
            // Hardened builds blank out WebGL and audio; those surfaces are
            // omitted from the generated fingerprint rather than invented.
            webgl: None,
            audio: None,
            geo: GeoSpec {
                timezone: "Europe/Paris".to_string(),
                locale: "fr-FR".to_string(),
                languages: vec!["fr-FR".to_string(), "fr".to_string(), "en".to_string()],
            },
            behavioral_profile: "privacy-desktop".to_string(),
        },
        DeviceProfile {
            id: "pixel-8-chrome".to_string(),
            category: DeviceCategory::Mobile,
            platform: "Linux armv8l".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (Linux; Android 14; Pixel 8) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Mobile Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 412,
                height: 915,
                avail_width: 412,
                avail_height: 915,
                color_depth: 24,
                device_pixel_ratio: 2.625,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 8,
                max_touch_points: 5,
            },
            webgl: Some(WebGlSpec {
                vendor: "ARM".to_string(),
                renderer: "ANGLE (ARM, Mali-G715, OpenGL ES 3.2)".to_string(),
                extensions: android_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.02,
                output_latency: 0.05,
            }),
            geo: GeoSpec {
                timezone: "America/New_York".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "mobile-handheld".to_string(),
        },
        DeviceProfile {
            id: "galaxy-s23-chrome".to_string(),
            category: DeviceCategory::Mobile,
            platform: "Linux armv8l".to_string(),
            browser: "chrome".to_string(),
            user_agent: "Mozilla/5.0 (Linux; Android 14; SM-S911B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Mobile Safari/537.36".to_string(),
            screen: ScreenSpec {
                width: 360,
                height: 780,
                avail_width: 360,
                avail_height: 780,
                color_depth: 24,
                device_pixel_ratio: 3.0,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 8,
                max_touch_points: 5,
            },
            webgl: Some(WebGlSpec {
                vendor: "Qualcomm".to_string(),
                renderer: "ANGLE (Qualcomm, Adreno (TM) 740, OpenGL ES 3.2)".to_string(),
                extensions: android_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 48_000,
                base_latency: 0.02,
                output_latency: 0.06,
            }),
            geo: GeoSpec {
                timezone: "Asia/Seoul".to_string(),
                locale: "ko-KR".to_string(),
                languages: vec!["ko-KR".to_string(), "ko".to_string(), "en-US".to_string()],
            },
            behavioral_profile: "mobile-handheld".to_string(),
        },
        DeviceProfile {
            id: "iphone-15-safari".to_string(),
            category: DeviceCategory::Mobile,
            platform: "iPhone".to_string(),
            browser: "safari".to_string(),
            user_agent: "Mozilla/5.0 (iPhone; CPU iPhone OS 17_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Mobile/15E148 Safari/604.1".to_string(),
            screen: ScreenSpec {
                width: 393,
                height: 852,
                avail_width: 393,
                avail_height: 852,
                color_depth: 24,
                device_pixel_ratio: 3.0,
            },
            hardware: HardwareSpec {
                cores: 6,
                memory_gb: 6,
                max_touch_points: 5,
            },
            webgl: Some(WebGlSpec {
                vendor: "Apple Inc.".to_string(),
                renderer: "Apple GPU".to_string(),
                extensions: safari_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 44_100,
                base_latency: 0.01,
                output_latency: 0.02,
            }),
            geo: GeoSpec {
                timezone: "America/Chicago".to_string(),
                locale: "en-US".to_string(),
                languages: vec!["en-US".to_string(), "en".to_string()],
            },
            behavioral_profile: "mobile-handheld".to_string(),
        },
        DeviceProfile {
            id: "ipad-air-safari".to_string(),
            category: DeviceCategory::Tablet,
            platform: "iPad".to_string(),
            browser: "safari".to_string(),
            user_agent: "Mozilla/5.0 (iPad; CPU OS 17_3 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.3 Mobile/15E148 Safari/604.1".to_string(),
            screen: ScreenSpec {
                width: 820,
                height: 1180,
                avail_width: 820,
                avail_height: 1180,
                color_depth: 24,
                device_pixel_ratio: 2.0,
            },
            hardware: HardwareSpec {
                cores: 8,
                memory_gb: 8,
                max_touch_points: 5,
            },
            webgl: Some(WebGlSpec {
                vendor: "Apple Inc.".to_string(),
                renderer: "Apple GPU".to_string(),
                extensions: safari_extensions(),
            }),
            audio: Some(AudioSpec {
                sample_rate: 44_100,
                base_latency: 0.01,
                output_latency: 0.02,
            }),
            geo: GeoSpec {
                timezone: "Australia/Sydney".to_string(),
                locale: "en-AU".to_string(),
                languages: vec!["en-AU".to_string(), "en".to_string()],
            },
            behavioral_profile: "tablet-couch".to_string(),
        },
    ]
}
