//! Device profile catalog.
//!
//! A [`DeviceProfile`] is a hand-curated, immutable bundle of baseline
//! device characteristics: user agent, screen geometry, GPU identity, audio
//! latency baseline, locale, hardware counts. The catalog is a pure lookup
//! table; it performs no derivation of its own. Generators consume profiles
//! together with a seed digest to produce the actual fingerprint values.
//!
//! Profiles load once at startup, either from the built-in table or from a
//! TOML/JSON source, and are never mutated afterwards. A malformed source is
//! a [`CatalogError`] at load time, never a generation error.
//!
//! # Example
//!
//! ```rust
//! use fp_forge::catalog::{Catalog, DeviceCategory};
//!
//! let catalog = Catalog::builtin();
//!
//! let profile = catalog.get("windows-chrome-high-end").unwrap();
//! assert_eq!(profile.screen.width, 1920);
//!
//! let laptops = catalog.by_category(DeviceCategory::Laptop);
//! assert!(!laptops.is_empty());
//! ```

mod profiles;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, EngineError};

/// Coarse device class a profile belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceCategory {
    Desktop,
    Laptop,
    Mobile,
    Tablet,
}

impl std::fmt::Display for DeviceCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeviceCategory::Desktop => write!(f, "desktop"),
            DeviceCategory::Laptop => write!(f, "laptop"),
            DeviceCategory::Mobile => write!(f, "mobile"),
            DeviceCategory::Tablet => write!(f, "tablet"),
        }
    }
}

/// Operating system family, derived from the platform string.
///
/// Used for the cross-surface correlation checks: a profile's WebGL vendor
/// must be plausible for its OS family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformFamily {
    Windows,
    MacOs,
    Linux,
    Android,
    Ios,
}

/// Screen geometry baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenSpec {
    pub width: u32,
    pub height: u32,
    pub avail_width: u32,
    pub avail_height: u32,
    pub color_depth: u8,
    pub device_pixel_ratio: f64,
}

/// Hardware counts exposed through `navigator`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardwareSpec {
    pub cores: u32,
    pub memory_gb: u32,
    pub max_touch_points: u32,
}

/// GPU identity baseline for the WebGL surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebGlSpec {
    pub vendor: String,
    pub renderer: String,
    #[serde(default)]
    pub extensions: Vec<String>,
}

/// Audio stack baseline for the audio surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioSpec {
    pub sample_rate: u32,
    pub base_latency: f64,
    pub output_latency: f64,
}

/// Timezone, locale and language baseline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoSpec {
    pub timezone: String,
    pub locale: String,
    pub languages: Vec<String>,
}

/// One immutable catalog entry.
///
/// `webgl` and `audio` are optional: a profile without them (a hardened
/// Firefox build, for instance) simply omits those surfaces from the
/// generated fingerprint instead of fabricating values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceProfile {
    pub id: String,
    pub category: DeviceCategory,
    /// Value of `navigator.platform` (e.g. "Win32", "MacIntel").
    pub platform: String,
    /// Browser family: "chrome", "firefox", "safari", "edge".
    pub browser: String,
    pub user_agent: String,
    pub screen: ScreenSpec,
    pub hardware: HardwareSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webgl: Option<WebGlSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<AudioSpec>,
    pub geo: GeoSpec,
    /// Label consumed by behavioral subsystems outside this crate.
    pub behavioral_profile: String,
}

impl DeviceProfile {
    /// OS family this profile claims, parsed from platform and user agent.
    pub fn platform_family(&self) -> PlatformFamily {
        let platform = self.platform.as_str();
        if platform.starts_with("Win") {
            PlatformFamily::Windows
        } else if platform == "MacIntel" {
            PlatformFamily::MacOs
        } else if platform.starts_with("iPhone") || platform.starts_with("iPad") {
            PlatformFamily::Ios
        } else if self.user_agent.contains("Android") {
            PlatformFamily::Android
        } else {
            PlatformFamily::Linux
        }
    }

    /// Whether this profile describes a touch-first device.
    pub fn is_touch_device(&self) -> bool {
        self.hardware.max_touch_points > 0
    }
}

/// GPU vendor families plausible for an OS family.
///
/// Real detectors correlate `navigator.platform` with the unmasked WebGL
/// vendor; an "Apple"/"Win32" pairing is an instant flag.
fn webgl_vendor_allowed(vendor: &str, family: PlatformFamily) -> bool {
    let v = vendor.to_ascii_lowercase();
    // Software renderers are plausible everywhere.
    if v.contains("google") {
        return true;
    }
    match family {
        PlatformFamily::Windows | PlatformFamily::Linux => {
            v.contains("nvidia") || v.contains("amd") || v.contains("intel")
        }
        PlatformFamily::MacOs | PlatformFamily::Ios => v.contains("apple"),
        PlatformFamily::Android => {
            v.contains("qualcomm") || v.contains("arm") || v.contains("imagination")
        }
    }
}

/// Immutable, indexed collection of device profiles.
#[derive(Debug, Clone)]
pub struct Catalog {
    profiles: Vec<DeviceProfile>,
    index: HashMap<String, usize>,
}

/// On-disk catalog shape: `{ "profiles": [ ... ] }` (or the TOML
/// equivalent, `[[profiles]]` tables).
#[derive(Debug, Deserialize)]
struct CatalogFile {
    profiles: Vec<DeviceProfile>,
}

impl Catalog {
    /// Build a catalog from a list of profiles, validating every entry.
    pub fn new(profiles: Vec<DeviceProfile>) -> Result<Self, CatalogError> {
        let mut index = HashMap::with_capacity(profiles.len());
        for (i, profile) in profiles.iter().enumerate() {
            validate_profile(profile)?;
            if index.insert(profile.id.clone(), i).is_some() {
                return Err(CatalogError::InvalidEntry {
                    id: profile.id.clone(),
                    reason: "duplicate profile id".to_string(),
                });
            }
        }
        tracing::debug!(profiles = profiles.len(), "catalog loaded");
        Ok(Self { profiles, index })
    }

    /// The built-in, hand-curated catalog.
    pub fn builtin() -> &'static Catalog {
        static BUILTIN: Lazy<Catalog> = Lazy::new(|| {
            // The built-in table is validated by tests; a failure here is a
            // programming error, not a runtime condition.
            Catalog::new(profiles::builtin_profiles())
                .unwrap_or_else(|e| panic!("built-in catalog is invalid: {e}"))
        });
        &BUILTIN
    }

    /// Load a catalog from a TOML or JSON file, decided by extension.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            Some("json") => Self::from_json_str(&content),
            ext => Err(CatalogError::UnsupportedFormat(
                ext.unwrap_or("<none>").to_string(),
            )),
        }
    }

    /// Parse a catalog from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(content)?;
        Self::new(file.profiles)
    }

    /// Parse a catalog from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(content)?;
        Self::new(file.profiles)
    }

    /// Look up a profile by id.
    ///
    /// An unknown id is a hard [`EngineError::ProfileNotFound`]; the
    /// catalog never substitutes a default.
    pub fn get(&self, id: &str) -> Result<&DeviceProfile, EngineError> {
        self.index
            .get(id)
            .map(|&i| &self.profiles[i])
            .ok_or_else(|| EngineError::ProfileNotFound(id.to_string()))
    }

    /// All profiles in a device category.
    pub fn by_category(&self, category: DeviceCategory) -> Vec<&DeviceProfile> {
        self.profiles
            .iter()
            .filter(|p| p.category == category)
            .collect()
    }

    /// All profiles whose `navigator.platform` matches exactly.
    pub fn by_platform(&self, platform: &str) -> Vec<&DeviceProfile> {
        self.profiles
            .iter()
            .filter(|p| p.platform == platform)
            .collect()
    }

    /// Iterator over every profile.
    pub fn iter(&self) -> impl Iterator<Item = &DeviceProfile> {
        self.profiles.iter()
    }

    /// All profile ids.
    pub fn ids(&self) -> Vec<&str> {
        self.profiles.iter().map(|p| p.id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

fn validate_profile(profile: &DeviceProfile) -> Result<(), CatalogError> {
    let invalid = |reason: &str| CatalogError::InvalidEntry {
        id: profile.id.clone(),
        reason: reason.to_string(),
    };

    if profile.id.is_empty() {
        return Err(CatalogError::InvalidEntry {
            id: "<empty>".to_string(),
            reason: "profile id must not be empty".to_string(),
        });
    }
    if profile.user_agent.is_empty() {
        return Err(invalid("user agent must not be empty"));
    }
    if profile.screen.width == 0 || profile.screen.height == 0 {
        return Err(invalid("screen dimensions must be non-zero"));
    }
    if profile.screen.avail_width > profile.screen.width
        || profile.screen.avail_height > profile.screen.height
    {
        return Err(invalid("available screen area exceeds screen size"));
    }
    if profile.hardware.cores == 0 {
        return Err(invalid("hardware core count must be non-zero"));
    }
    if profile.geo.languages.is_empty() {
        return Err(invalid("language list must not be empty"));
    }
    if let Some(webgl) = &profile.webgl {
        if !webgl_vendor_allowed(&webgl.vendor, profile.platform_family()) {
            return Err(invalid(&format!(
                "WebGL vendor '{}' is implausible for platform '{}'",
                webgl.vendor, profile.platform
            )));
        }
    }
    if let Some(audio) = &profile.audio {
        if audio.sample_rate == 0 {
            return Err(invalid("audio sample rate must be non-zero"));
        }
    }
    Ok(())
}
