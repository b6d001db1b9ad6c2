//! Integration tests for consistency validation
//!
//! Tests for the three binding scenarios (full match, webdriver detected,
//! boundary screen mismatch), score monotonicity, report caching with a
//! manual clock, and engine session lifecycle.

use std::sync::Arc;

use chrono::{Duration, Utc};
use fp_forge::prelude::*;
use fp_forge::validate::{matching_observation, Clock, ManualClock};

/// Opt-in log output: `RUST_LOG=fp_forge=debug cargo test`.
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn expected_fingerprint() -> AggregateFingerprint {
    assemble(Catalog::builtin(), "windows-chrome-high-end", "abc")
        .unwrap()
        .fingerprint
}

#[test]
fn test_scenario_full_match() {
    init_tracing();
    let engine = FingerprintEngine::new();
    let bundle = engine
        .assign("session-a", "windows-chrome-high-end", Some("abc"))
        .unwrap();

    let report = engine
        .validate_session("session-a", &matching_observation(&bundle.fingerprint))
        .unwrap();
    assert_eq!(report.score, 100);
    assert!(report.consistent);
    assert!(report.issues.is_empty());
    assert!(report.recommendations.is_empty());
    assert_eq!(report.profile_id, "windows-chrome-high-end");
}

#[test]
fn test_scenario_webdriver_detected() {
    let expected = expected_fingerprint();
    let mut observed = matching_observation(&expected);
    observed.webdriver = Some(true);

    let report = fp_forge::validate::score(&expected, &observed);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, "webdriver_detected");
    assert_eq!(report.issues[0].severity, Severity::Critical);
    assert!(report.score <= 50);
    assert!(!report.consistent);
    assert_eq!(report.recommendations.len(), 2);
}

#[test]
fn test_scenario_screen_width_boundary() {
    let expected = expected_fingerprint();
    let mut observed = matching_observation(&expected);
    observed.screen.as_mut().unwrap().width = Some(1366);

    let report = fp_forge::validate::score(&expected, &observed);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, "screen_width_mismatch");
    assert_eq!(report.issues[0].severity, Severity::High);
    assert_eq!(report.issues[0].expected, "1920");
    assert_eq!(report.issues[0].actual, "1366");
    assert_eq!(report.score, 80);
    assert!(report.consistent, "score 80 sits on the consistent side");
}

#[test]
fn test_score_is_monotone_in_divergences() {
    let expected = expected_fingerprint();
    let mut observed = matching_observation(&expected);

    let baseline = fp_forge::validate::score(&expected, &observed).score;

    observed.screen.as_mut().unwrap().width = Some(1366);
    let one = fp_forge::validate::score(&expected, &observed).score;

    observed.screen.as_mut().unwrap().height = Some(768);
    let two = fp_forge::validate::score(&expected, &observed).score;

    observed.webdriver = Some(true);
    let three = fp_forge::validate::score(&expected, &observed).score;

    assert!(baseline > one, "{baseline} !> {one}");
    assert!(one > two, "{one} !> {two}");
    assert!(two > three, "{two} !> {three}");
}

#[test]
fn test_partial_observations_never_error() {
    let expected = expected_fingerprint();

    // Nothing observed at all.
    let empty = fp_forge::validate::score(&expected, &ObservedFingerprint::default());
    assert_eq!(empty.score, 100);

    // Only one surface observed, and it diverges.
    let observed = ObservedFingerprint {
        platform: Some("Linux x86_64".to_string()),
        ..Default::default()
    };
    let report = fp_forge::validate::score(&expected, &observed);
    assert_eq!(report.issues.len(), 1);
    assert_eq!(report.issues[0].kind, "platform_mismatch");
}

#[test]
fn test_repeated_validation_returns_cached_report() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine =
        FingerprintEngine::with_clock(Catalog::builtin().clone(), clock.clone());
    let bundle = engine
        .assign("session-a", "windows-chrome-high-end", Some("abc"))
        .unwrap();
    let observed = matching_observation(&bundle.fingerprint);

    let first = engine.validate_session("session-a", &observed).unwrap();
    clock.advance(Duration::hours(6));
    let second = engine.validate_session("session-a", &observed).unwrap();

    assert_eq!(first, second, "cache hit must return the prior report unchanged");
    assert_eq!(first.timestamp, second.timestamp);
}

#[test]
fn test_cache_expires_after_ttl() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine =
        FingerprintEngine::with_clock(Catalog::builtin().clone(), clock.clone());
    let bundle = engine
        .assign("session-a", "windows-chrome-high-end", Some("abc"))
        .unwrap();
    let observed = matching_observation(&bundle.fingerprint);

    let first = engine.validate_session("session-a", &observed).unwrap();
    clock.advance(Duration::hours(25));
    let second = engine.validate_session("session-a", &observed).unwrap();

    assert_eq!(first.score, second.score);
    assert!(second.timestamp > first.timestamp, "expired entry must be rescored");
}

#[test]
fn test_changed_observation_bypasses_cache() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine =
        FingerprintEngine::with_clock(Catalog::builtin().clone(), clock.clone());
    let bundle = engine
        .assign("session-a", "windows-chrome-high-end", Some("abc"))
        .unwrap();

    let clean = matching_observation(&bundle.fingerprint);
    let mut flagged = clean.clone();
    flagged.webdriver = Some(true);

    let clean_report = engine.validate_session("session-a", &clean).unwrap();
    let flagged_report = engine.validate_session("session-a", &flagged).unwrap();
    assert_eq!(clean_report.score, 100);
    assert!(flagged_report.score <= 50);
}

#[test]
fn test_sessions_sharing_a_profile_validate_against_their_own_seed() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine =
        FingerprintEngine::with_clock(Catalog::builtin().clone(), clock.clone());
    let bundle_a = engine
        .assign("session-a", "windows-chrome-high-end", Some("seed-a"))
        .unwrap();
    let bundle_b = engine
        .assign("session-b", "windows-chrome-high-end", Some("seed-b"))
        .unwrap();
    assert_ne!(bundle_a.fingerprint.seed_digest, bundle_b.fingerprint.seed_digest);

    // Session A's observation, validated against both sessions.
    let observed = matching_observation(&bundle_a.fingerprint);
    let report_a = engine.validate_session("session-a", &observed).unwrap();
    let report_b = engine.validate_session("session-b", &observed).unwrap();

    assert_eq!(report_a.score, 100);
    assert_eq!(
        report_b,
        fp_forge::validate::score_at(&bundle_b.fingerprint, &observed, clock.now()),
        "session B must be scored against its own expected fingerprint"
    );
}

#[test]
fn test_sweep_removes_stale_sessions() {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let engine =
        FingerprintEngine::with_clock(Catalog::builtin().clone(), clock.clone());

    engine
        .assign("old-session", "windows-chrome-high-end", Some("abc"))
        .unwrap();
    clock.advance(Duration::hours(3));
    engine
        .assign("fresh-session", "macbook-pro-m2-chrome", Some("def"))
        .unwrap();

    engine.sweep(Duration::hours(2));
    assert_eq!(engine.active_sessions(), 1);
    assert!(engine.session_fingerprint("old-session").is_none());
    assert!(engine.session_fingerprint("fresh-session").is_some());

    let err = engine
        .validate_session("old-session", &ObservedFingerprint::default())
        .unwrap_err();
    assert!(matches!(err, EngineError::SessionNotFound(_)));
}

#[test]
fn test_observed_fingerprint_parses_probe_shaped_json() {
    let json = r#"{
        "userAgent": "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36",
        "webdriver": false,
        "screen": { "width": 1920, "height": 1080, "availWidth": 1920,
                    "availHeight": 1040, "colorDepth": 24, "devicePixelRatio": 1.0 },
        "timezone": { "timezone": "America/New_York", "utcOffsetMinutes": -300, "locale": "en-US" }
    }"#;
    let observed: ObservedFingerprint = serde_json::from_str(json).unwrap();
    assert_eq!(observed.webdriver, Some(false));
    assert_eq!(observed.screen.as_ref().unwrap().width, Some(1920));
    assert!(observed.hardware.is_none());

    let expected = expected_fingerprint();
    let report = fp_forge::validate::score(&expected, &observed);
    assert_eq!(report.score, 100);
}
