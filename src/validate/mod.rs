//! Cross-surface consistency validation.
//!
//! Compares what a page actually reports against the fingerprint a session
//! was assigned. Scoring is subtractive: a report starts at 100 and each
//! divergence subtracts a fixed penalty for its severity class. Absent
//! observed fields are not applicable and never penalized; validation never
//! fails on mismatched data, it reports it.

mod cache;

pub use cache::{Clock, ManualClock, SystemClock, ValidationCache};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::assemble::AggregateFingerprint;

/// Score at or above which a session is considered consistent.
pub const CONSISTENCY_THRESHOLD: u32 = 80;

/// Issue severity classes with fixed score penalties.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn penalty(self) -> u32 {
        match self {
            Severity::Low => 5,
            Severity::Medium => 15,
            Severity::High => 20,
            Severity::Critical => 50,
        }
    }
}

/// One detected divergence between expected and observed values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub kind: String,
    pub severity: Severity,
    pub expected: String,
    pub actual: String,
}

/// Validation outcome for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub profile_id: String,
    pub timestamp: DateTime<Utc>,
    pub consistent: bool,
    pub score: u32,
    pub issues: Vec<Issue>,
    pub recommendations: Vec<String>,
}

/// What a page actually reported, collected by the observation probe.
///
/// Every field is optional: a surface the page could not (or did not)
/// measure is simply absent, which is distinct from a mismatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedFingerprint {
    pub user_agent: Option<String>,
    pub platform: Option<String>,
    pub vendor: Option<String>,
    pub languages: Option<Vec<String>>,
    pub webdriver: Option<bool>,
    pub screen: Option<ObservedScreen>,
    pub hardware: Option<ObservedHardware>,
    pub timezone: Option<ObservedTimezone>,
    pub webgl: Option<ObservedWebGl>,
    pub audio: Option<ObservedAudio>,
    pub fonts: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedScreen {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub avail_width: Option<u32>,
    pub avail_height: Option<u32>,
    pub color_depth: Option<u32>,
    pub device_pixel_ratio: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedHardware {
    pub hardware_concurrency: Option<u32>,
    pub device_memory: Option<u32>,
    pub max_touch_points: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedTimezone {
    pub timezone: Option<String>,
    pub utc_offset_minutes: Option<i32>,
    pub locale: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedWebGl {
    pub vendor: Option<String>,
    pub renderer: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ObservedAudio {
    pub sample_rate: Option<u32>,
}

/// Score `observed` against `expected`, stamping the report with the
/// current wall-clock time.
pub fn score(expected: &AggregateFingerprint, observed: &ObservedFingerprint) -> ValidationReport {
    score_at(expected, observed, Utc::now())
}

/// Score `observed` against `expected` at an explicit timestamp. The cache
/// and the engine use this with their injected clock.
pub fn score_at(
    expected: &AggregateFingerprint,
    observed: &ObservedFingerprint,
    timestamp: DateTime<Utc>,
) -> ValidationReport {
    let mut issues = Vec::new();

    check_navigator(expected, observed, &mut issues);
    if let Some(screen) = &observed.screen {
        check_screen(expected, screen, &mut issues);
    }
    if let Some(hardware) = &observed.hardware {
        check_hardware(expected, hardware, &mut issues);
    }
    if let Some(timezone) = &observed.timezone {
        check_timezone(expected, timezone, &mut issues);
    }
    if let (Some(expected_webgl), Some(observed_webgl)) = (&expected.webgl, &observed.webgl) {
        check_webgl(expected_webgl, observed_webgl, &mut issues);
    }
    if let (Some(expected_audio), Some(observed_audio)) = (&expected.audio, &observed.audio) {
        check_audio(expected_audio, observed_audio, &mut issues);
    }
    if let Some(fonts) = &observed.fonts {
        check_fonts(expected, fonts, &mut issues);
    }

    let penalty: u32 = issues.iter().map(|i| i.severity.penalty()).sum();
    let score = 100u32.saturating_sub(penalty);
    let consistent = score >= CONSISTENCY_THRESHOLD;
    let recommendations = recommend(score, &issues);

    debug!(
        profile_id = %expected.profile_id,
        score,
        issues = issues.len(),
        consistent,
        "scored observed fingerprint"
    );

    ValidationReport {
        profile_id: expected.profile_id.clone(),
        timestamp,
        consistent,
        score,
        issues,
        recommendations,
    }
}

fn recommend(score: u32, issues: &[Issue]) -> Vec<String> {
    let mut recommendations = Vec::new();
    if issues.iter().any(|i| i.severity == Severity::Critical) {
        recommendations
            .push("Review stealth configuration: automation traces were detected".to_string());
    }
    if score < 90 {
        recommendations.push("Assign a replacement fingerprint for this session".to_string());
    }
    recommendations
}

fn push_issue(
    issues: &mut Vec<Issue>,
    kind: &str,
    severity: Severity,
    expected: impl std::fmt::Display,
    actual: impl std::fmt::Display,
) {
    issues.push(Issue {
        kind: kind.to_string(),
        severity,
        expected: expected.to_string(),
        actual: actual.to_string(),
    });
}

fn check_navigator(
    expected: &AggregateFingerprint,
    observed: &ObservedFingerprint,
    issues: &mut Vec<Issue>,
) {
    let nav = &expected.navigator;

    // The one unconditional rule: a visible webdriver flag outranks
    // everything else the page could report.
    if observed.webdriver == Some(true) {
        push_issue(issues, "webdriver_detected", Severity::Critical, false, true);
    }
    if let Some(user_agent) = &observed.user_agent {
        if *user_agent != nav.user_agent {
            push_issue(
                issues,
                "user_agent_mismatch",
                Severity::Critical,
                &nav.user_agent,
                user_agent,
            );
        }
    }
    if let Some(platform) = &observed.platform {
        if *platform != nav.platform {
            push_issue(issues, "platform_mismatch", Severity::High, &nav.platform, platform);
        }
    }
    if let Some(vendor) = &observed.vendor {
        if *vendor != nav.vendor {
            push_issue(issues, "vendor_mismatch", Severity::Medium, &nav.vendor, vendor);
        }
    }
    if let Some(languages) = &observed.languages {
        if *languages != nav.languages {
            push_issue(
                issues,
                "languages_mismatch",
                Severity::Medium,
                nav.languages.join(","),
                languages.join(","),
            );
        }
    }
}

fn check_screen(expected: &AggregateFingerprint, observed: &ObservedScreen, issues: &mut Vec<Issue>) {
    let screen = &expected.navigator.screen;

    let mut exact = |kind: &str, severity: Severity, expected_value: u32, actual: Option<u32>| {
        if let Some(actual) = actual {
            if actual != expected_value {
                push_issue(issues, kind, severity, expected_value, actual);
            }
        }
    };
    exact("screen_width_mismatch", Severity::High, screen.width, observed.width);
    exact("screen_height_mismatch", Severity::High, screen.height, observed.height);
    exact("avail_width_mismatch", Severity::Medium, screen.avail_width, observed.avail_width);
    exact("avail_height_mismatch", Severity::Medium, screen.avail_height, observed.avail_height);
    exact(
        "color_depth_mismatch",
        Severity::Low,
        u32::from(screen.color_depth),
        observed.color_depth,
    );

    if let Some(ratio) = observed.device_pixel_ratio {
        if (ratio - screen.device_pixel_ratio).abs() > 0.001 {
            push_issue(
                issues,
                "device_pixel_ratio_mismatch",
                Severity::Medium,
                screen.device_pixel_ratio,
                ratio,
            );
        }
    }
}

fn check_hardware(
    expected: &AggregateFingerprint,
    observed: &ObservedHardware,
    issues: &mut Vec<Issue>,
) {
    let hardware = &expected.hardware;

    if let Some(cores) = observed.hardware_concurrency {
        if cores != hardware.hardware_concurrency {
            push_issue(
                issues,
                "hardware_concurrency_mismatch",
                Severity::High,
                hardware.hardware_concurrency,
                cores,
            );
        }
    }
    // Compared only when both sides expose it; Safari and Firefox omit it.
    if let (Some(expected_memory), Some(memory)) = (hardware.device_memory, observed.device_memory) {
        if memory != expected_memory {
            push_issue(issues, "device_memory_mismatch", Severity::High, expected_memory, memory);
        }
    }
    if let Some(touch) = observed.max_touch_points {
        if touch != hardware.max_touch_points {
            push_issue(
                issues,
                "max_touch_points_mismatch",
                Severity::Medium,
                hardware.max_touch_points,
                touch,
            );
        }
    }
}

fn check_timezone(
    expected: &AggregateFingerprint,
    observed: &ObservedTimezone,
    issues: &mut Vec<Issue>,
) {
    let timezone = &expected.timezone;

    if let Some(zone) = &observed.timezone {
        if *zone != timezone.timezone {
            push_issue(issues, "timezone_mismatch", Severity::High, &timezone.timezone, zone);
        }
    }
    if let Some(offset) = observed.utc_offset_minutes {
        if offset != timezone.utc_offset_minutes {
            push_issue(
                issues,
                "utc_offset_mismatch",
                Severity::High,
                timezone.utc_offset_minutes,
                offset,
            );
        }
    }
    if let Some(locale) = &observed.locale {
        if *locale != timezone.locale {
            push_issue(issues, "locale_mismatch", Severity::Medium, &timezone.locale, locale);
        }
    }
}

fn check_webgl(
    expected: &crate::surfaces::webgl::WebGlFingerprint,
    observed: &ObservedWebGl,
    issues: &mut Vec<Issue>,
) {
    if let Some(vendor) = &observed.vendor {
        if *vendor != expected.vendor {
            push_issue(issues, "webgl_vendor_mismatch", Severity::High, &expected.vendor, vendor);
        }
    }
    if let Some(renderer) = &observed.renderer {
        if *renderer != expected.renderer {
            push_issue(
                issues,
                "webgl_renderer_mismatch",
                Severity::High,
                &expected.renderer,
                renderer,
            );
        }
    }
}

fn check_audio(
    expected: &crate::surfaces::audio::AudioFingerprint,
    observed: &ObservedAudio,
    issues: &mut Vec<Issue>,
) {
    if let Some(sample_rate) = observed.sample_rate {
        if sample_rate != expected.sample_rate {
            push_issue(
                issues,
                "audio_sample_rate_mismatch",
                Severity::Medium,
                expected.sample_rate,
                sample_rate,
            );
        }
    }
}

fn check_fonts(expected: &AggregateFingerprint, observed: &[String], issues: &mut Vec<Issue>) {
    let missing: Vec<&str> = expected
        .fonts
        .available
        .iter()
        .filter(|font| !observed.contains(font))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        push_issue(
            issues,
            "fonts_missing",
            Severity::Low,
            expected.fonts.available.join(","),
            format!("missing: {}", missing.join(",")),
        );
    }
}

/// Build an observation matching `expected` exactly, for tests and for
/// callers that want a baseline to mutate.
pub fn matching_observation(expected: &AggregateFingerprint) -> ObservedFingerprint {
    ObservedFingerprint {
        user_agent: Some(expected.navigator.user_agent.clone()),
        platform: Some(expected.navigator.platform.clone()),
        vendor: Some(expected.navigator.vendor.clone()),
        languages: Some(expected.navigator.languages.clone()),
        webdriver: Some(false),
        screen: Some(ObservedScreen {
            width: Some(expected.navigator.screen.width),
            height: Some(expected.navigator.screen.height),
            avail_width: Some(expected.navigator.screen.avail_width),
            avail_height: Some(expected.navigator.screen.avail_height),
            color_depth: Some(u32::from(expected.navigator.screen.color_depth)),
            device_pixel_ratio: Some(expected.navigator.screen.device_pixel_ratio),
        }),
        hardware: Some(ObservedHardware {
            hardware_concurrency: Some(expected.hardware.hardware_concurrency),
            device_memory: expected.hardware.device_memory,
            max_touch_points: Some(expected.hardware.max_touch_points),
        }),
        timezone: Some(ObservedTimezone {
            timezone: Some(expected.timezone.timezone.clone()),
            utc_offset_minutes: Some(expected.timezone.utc_offset_minutes),
            locale: Some(expected.timezone.locale.clone()),
        }),
        webgl: expected.webgl.as_ref().map(|webgl| ObservedWebGl {
            vendor: Some(webgl.vendor.clone()),
            renderer: Some(webgl.renderer.clone()),
        }),
        audio: expected.audio.as_ref().map(|audio| ObservedAudio {
            sample_rate: Some(audio.sample_rate),
        }),
        fonts: Some(expected.fonts.available.clone()),
    }
}
