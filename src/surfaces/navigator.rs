//! Navigator and screen surface.
//!
//! Owns every `navigator.*` identity property plus the screen geometry
//! block, and carries the single most important override in the whole
//! engine: `navigator.webdriver` must read `false` on every access path a
//! detector can take (own property, prototype, property descriptor).
//! Automation remnants (CDP marker globals, Selenium hooks) are removed in
//! the same fragment.

use serde::{Deserialize, Serialize};

use crate::catalog::{DeviceProfile, ScreenSpec};
use crate::script::{FragmentBuilder, ScriptFragment, Target};
use crate::seed::SeedDigest;

/// One entry of the synthesized plugin inventory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginEntry {
    pub name: String,
    pub description: String,
    pub filename: String,
}

impl PluginEntry {
    fn pdf(name: &str, filename: &str) -> Self {
        Self {
            name: name.to_string(),
            description: "Portable Document Format".to_string(),
            filename: filename.to_string(),
        }
    }
}

/// Navigator identity and screen geometry for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigatorFingerprint {
    pub user_agent: String,
    pub app_version: String,
    pub platform: String,
    pub vendor: String,
    pub languages: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub do_not_track: Option<String>,
    pub pdf_viewer_enabled: bool,
    pub plugins: Vec<PluginEntry>,
    pub screen: ScreenSpec,
    /// Always `false`. Kept in the record so the validator can compare it
    /// against the observed value directly.
    pub webdriver: bool,
}

impl NavigatorFingerprint {
    /// Generate the navigator identity from the profile, with the DNT
    /// preference seeded (roughly a quarter of real users enable it).
    pub fn generate(digest: &SeedDigest, profile: &DeviceProfile) -> Self {
        let do_not_track = if digest.uniform("navigator.dnt") < 0.25 {
            Some("1".to_string())
        } else {
            None
        };
        Self {
            user_agent: profile.user_agent.clone(),
            app_version: app_version_of(&profile.user_agent),
            platform: profile.platform.clone(),
            vendor: browser_vendor(&profile.browser),
            languages: profile.geo.languages.clone(),
            do_not_track,
            pdf_viewer_enabled: profile.browser != "firefox",
            plugins: plugin_inventory(&profile.browser),
            screen: profile.screen.clone(),
            webdriver: false,
        }
    }

    /// Render the override fragment: webdriver suppression first, then
    /// identity getters, screen geometry, plugins and automation cleanup.
    pub fn script_fragment(&self) -> ScriptFragment {
        let mut builder = FragmentBuilder::new("navigator")
            .apply(WEBDRIVER_PATCH, &serde_json::json!({}))
            .define_getter(Target::Navigator, "userAgent", &self.user_agent)
            .define_getter(Target::Navigator, "appVersion", &self.app_version)
            .define_getter(Target::Navigator, "platform", &self.platform)
            .define_getter(Target::Navigator, "vendor", &self.vendor)
            .define_getter(Target::Navigator, "languages", &self.languages);
        // A profile without languages gets no `language` override; the
        // browser default stands.
        if let Some(primary) = self.languages.first() {
            builder = builder.define_getter(Target::Navigator, "language", primary);
        }
        builder
            .define_getter(Target::Navigator, "doNotTrack", &self.do_not_track)
            .define_getter(Target::Navigator, "pdfViewerEnabled", &self.pdf_viewer_enabled)
            .define_getter(Target::Screen, "width", &self.screen.width)
            .define_getter(Target::Screen, "height", &self.screen.height)
            .define_getter(Target::Screen, "availWidth", &self.screen.avail_width)
            .define_getter(Target::Screen, "availHeight", &self.screen.avail_height)
            .define_getter(Target::Screen, "colorDepth", &self.screen.color_depth)
            .define_getter(Target::Screen, "pixelDepth", &self.screen.color_depth)
            .define_getter(Target::Window, "devicePixelRatio", &self.screen.device_pixel_ratio)
            .apply(PLUGINS_PATCH, &self.plugins)
            .apply(AUTOMATION_CLEANUP, &serde_json::json!({}))
            .build()
    }
}

fn app_version_of(user_agent: &str) -> String {
    user_agent
        .strip_prefix("Mozilla/")
        .unwrap_or(user_agent)
        .to_string()
}

fn browser_vendor(browser: &str) -> String {
    match browser {
        "safari" => "Apple Computer, Inc.".to_string(),
        "firefox" => String::new(),
        _ => "Google Inc.".to_string(),
    }
}

/// Plugin inventory by browser family. Modern Chromium exposes exactly
/// five PDF pseudo-plugins; Firefox exposes none; Safari one.
fn plugin_inventory(browser: &str) -> Vec<PluginEntry> {
    match browser {
        "firefox" => Vec::new(),
        "safari" => vec![PluginEntry::pdf("WebKit built-in PDF", "WebKitPDFPlugin")],
        _ => vec![
            PluginEntry::pdf("PDF Viewer", "internal-pdf-viewer"),
            PluginEntry::pdf("Chrome PDF Viewer", "internal-pdf-viewer"),
            PluginEntry::pdf("Chromium PDF Viewer", "internal-pdf-viewer"),
            PluginEntry::pdf("Microsoft Edge PDF Viewer", "internal-pdf-viewer"),
            PluginEntry::pdf("WebKit built-in PDF", "internal-pdf-viewer"),
        ],
    }
}

/// Forces `navigator.webdriver` to read `false` on every access path:
/// instance property, prototype getter and spoofed property descriptor.
const WEBDRIVER_PATCH: &str = r#"function(cfg) {
    var defineFalse = function(target) {
        try {
            Object.defineProperty(target, 'webdriver', {
                get: function() { return false; },
                configurable: true,
                enumerable: true
            });
        } catch (e) {}
    };

    try { delete navigator.webdriver; } catch (e) {}
    defineFalse(navigator);
    if (typeof Navigator !== 'undefined') {
        defineFalse(Navigator.prototype);
    }

    var originalGetOwnPropertyDescriptor = Object.getOwnPropertyDescriptor;
    Object.getOwnPropertyDescriptor = function(obj, prop) {
        if (prop === 'webdriver' &&
            (obj === navigator || (typeof Navigator !== 'undefined' && obj === Navigator.prototype))) {
            return {
                value: false,
                writable: false,
                enumerable: true,
                configurable: true
            };
        }
        return originalGetOwnPropertyDescriptor.call(this, obj, prop);
    };
}"#;

/// Builds a `PluginArray`-shaped object from the inventory and installs it
/// on `navigator.plugins`.
const PLUGINS_PATCH: &str = r#"function(pluginData) {
    if (typeof Plugin === 'undefined' || typeof PluginArray === 'undefined') { return; }

    var plugins = [];
    pluginData.forEach(function(p) {
        var plugin = Object.create(Plugin.prototype);
        Object.defineProperties(plugin, {
            'name': { value: p.name, enumerable: true },
            'description': { value: p.description, enumerable: true },
            'filename': { value: p.filename, enumerable: true },
            'length': { value: 0, enumerable: true }
        });
        plugins.push(plugin);
    });

    var pluginArray = Object.create(PluginArray.prototype);
    plugins.forEach(function(plugin, i) {
        Object.defineProperty(pluginArray, i, { value: plugin, enumerable: true });
        Object.defineProperty(pluginArray, plugin.name, { value: plugin, enumerable: false });
    });
    Object.defineProperty(pluginArray, 'length', { value: plugins.length, enumerable: true });
    pluginArray.item = function(index) { return plugins[index] || null; };
    pluginArray.namedItem = function(name) {
        return plugins.filter(function(p) { return p.name === name; })[0] || null;
    };
    pluginArray.refresh = function() {};

    Object.defineProperty(navigator, 'plugins', {
        get: function() { return pluginArray; },
        configurable: true
    });
}"#;

/// Deletes the marker globals left behind by CDP-driven browsers and the
/// older Selenium/PhantomJS injection points.
const AUTOMATION_CLEANUP: &str = r#"function(cfg) {
    var markers = [
        'cdc_adoQpoasnfa76pfcZLmcfl_Array',
        'cdc_adoQpoasnfa76pfcZLmcfl_Promise',
        'cdc_adoQpoasnfa76pfcZLmcfl_Symbol',
        '_selenium', 'callSelenium', '_Selenium_IDE_Recorder',
        '__webdriver_script_fn', '__driver_evaluate', '__webdriver_evaluate',
        '__selenium_evaluate', '__fxdriver_evaluate', '__driver_unwrapped',
        '__webdriver_unwrapped', '__selenium_unwrapped', '__fxdriver_unwrapped',
        'callPhantom', '_phantom', '__nightmare',
        'domAutomation', 'domAutomationController'
    ];
    for (var i = 0; i < markers.length; i++) {
        try { delete window[markers[i]]; } catch (e) {}
    }
}"#;
