//! Timezone and locale surface.
//!
//! The detector cross-check here is between `Intl.DateTimeFormat`
//! (which reports the IANA zone name) and `Date.getTimezoneOffset` (which
//! reports minutes west of UTC). Both must describe the same zone, so the
//! generator resolves the offset from the zone name rather than seeding
//! the two independently.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::catalog::DeviceProfile;
use crate::script::{FragmentBuilder, ScriptFragment};
use crate::seed::SeedDigest;

/// Standard (non-DST) offsets, minutes east of UTC, for the zones the
/// built-in catalog uses.
const ZONE_OFFSETS: &[(&str, i32)] = &[
    ("America/New_York", -300),
    ("America/Chicago", -360),
    ("America/Denver", -420),
    ("America/Los_Angeles", -480),
    ("America/Sao_Paulo", -180),
    ("Europe/London", 0),
    ("Europe/Paris", 60),
    ("Europe/Berlin", 60),
    ("Europe/Amsterdam", 60),
    ("Europe/Madrid", 60),
    ("Europe/Warsaw", 60),
    ("Europe/Moscow", 180),
    ("Asia/Dubai", 240),
    ("Asia/Kolkata", 330),
    ("Asia/Shanghai", 480),
    ("Asia/Singapore", 480),
    ("Asia/Tokyo", 540),
    ("Asia/Seoul", 540),
    ("Australia/Sydney", 600),
];

/// Timezone and locale identity for one session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimezoneFingerprint {
    /// IANA zone name, e.g. "Europe/Berlin".
    pub timezone: String,
    /// Minutes east of UTC. The page-side `getTimezoneOffset` value is the
    /// negation of this (JS counts minutes west).
    pub utc_offset_minutes: i32,
    pub locale: String,
}

impl TimezoneFingerprint {
    /// Resolve timezone identity from the profile's geo block. The seed
    /// plays no role: the zone is part of the device identity and must
    /// match the geo surfaces exactly.
    pub fn generate(_digest: &SeedDigest, profile: &DeviceProfile) -> Self {
        let timezone = profile.geo.timezone.clone();
        let utc_offset_minutes = match zone_offset(&timezone) {
            Some(offset) => offset,
            None => {
                warn!(zone = %timezone, "unknown timezone, reporting UTC offset");
                0
            }
        };
        Self {
            timezone,
            utc_offset_minutes,
            locale: profile.geo.locale.clone(),
        }
    }

    pub fn script_fragment(&self) -> ScriptFragment {
        FragmentBuilder::new("timezone")
            .apply(TIMEZONE_PATCH, self)
            .build()
    }
}

fn zone_offset(zone: &str) -> Option<i32> {
    ZONE_OFFSETS
        .iter()
        .find(|(name, _)| *name == zone)
        .map(|(_, offset)| *offset)
}

/// Aligns the two timezone APIs: `getTimezoneOffset` returns the negated
/// east-of-UTC offset, and `Intl.DateTimeFormat().resolvedOptions()`
/// reports the configured zone and locale.
const TIMEZONE_PATCH: &str = r#"function(cfg) {
    var jsOffset = -cfg.utcOffsetMinutes;

    var originalGetTimezoneOffset = Date.prototype.getTimezoneOffset;
    Date.prototype.getTimezoneOffset = function() {
        return jsOffset;
    };

    if (typeof Intl !== 'undefined' && Intl.DateTimeFormat) {
        var OriginalDateTimeFormat = Intl.DateTimeFormat;
        var patched = function(locales, options) {
            options = Object.assign({}, options || {});
            if (!options.timeZone) { options.timeZone = cfg.timezone; }
            return new OriginalDateTimeFormat(locales || cfg.locale, options);
        };
        patched.prototype = OriginalDateTimeFormat.prototype;
        patched.supportedLocalesOf = OriginalDateTimeFormat.supportedLocalesOf;
        Intl.DateTimeFormat = patched;

        var originalResolvedOptions = OriginalDateTimeFormat.prototype.resolvedOptions;
        OriginalDateTimeFormat.prototype.resolvedOptions = function() {
            var resolved = originalResolvedOptions.call(this);
            resolved.timeZone = cfg.timezone;
            resolved.locale = cfg.locale;
            return resolved;
        };
    }
}"#;
