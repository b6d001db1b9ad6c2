//! Integration tests for deterministic fingerprint synthesis
//!
//! Tests for byte-identical reassembly, seed sensitivity across many seed
//! pairs, cross-surface correlation, and omission of absent surfaces.

use fp_forge::prelude::*;
use fp_forge::catalog::PlatformFamily;

#[test]
fn test_reassembly_is_byte_identical_for_every_builtin_profile() {
    let catalog = Catalog::builtin();
    for profile in catalog.iter() {
        let first = assemble(catalog, &profile.id, "integration-seed").unwrap();
        let second = assemble(catalog, &profile.id, "integration-seed").unwrap();
        assert_eq!(first.fingerprint, second.fingerprint, "profile {}", profile.id);
        assert_eq!(first.script, second.script, "script drift for {}", profile.id);

        let first_json = serde_json::to_string(&first.fingerprint).unwrap();
        let second_json = serde_json::to_string(&second.fingerprint).unwrap();
        assert_eq!(first_json, second_json);
    }
}

#[test]
fn test_seed_sensitivity_over_a_thousand_pairs() {
    let catalog = Catalog::builtin();
    let total = 1000usize;
    let mut diverged = 0usize;
    let mut lanes_diverged = 0usize;
    let mut renderers_diverged = 0usize;

    for i in 0..total {
        let a = assemble(catalog, "windows-chrome-high-end", &format!("pair-{i}-a"))
            .unwrap()
            .fingerprint;
        let b = assemble(catalog, "windows-chrome-high-end", &format!("pair-{i}-b"))
            .unwrap()
            .fingerprint;
        if a != b {
            diverged += 1;
        }
        if a.canvas.lane != b.canvas.lane {
            lanes_diverged += 1;
        }
        if a.webgl.as_ref().map(|w| &w.renderer) != b.webgl.as_ref().map(|w| &w.renderer) {
            renderers_diverged += 1;
        }
    }
    // Whole-aggregate inequality alone would pass even if only one field
    // moved with the seed, so the high-entropy fields are checked on
    // their own.
    assert!(
        diverged * 100 > total * 99,
        "only {diverged}/{total} seed pairs diverged"
    );
    // The canvas lane carries 32 bits of seed-derived entropy; a pairwise
    // collision is a ~2^-32 event.
    assert!(
        lanes_diverged * 100 > total * 99,
        "only {lanes_diverged}/{total} canvas lanes diverged"
    );
    // Renderer strings come from a small weighted driver-build pool, so
    // collisions are common but must stay well under half.
    assert!(
        renderers_diverged * 2 > total,
        "only {renderers_diverged}/{total} webgl renderers diverged"
    );
}

#[test]
fn test_different_seeds_change_lanes_not_identity() {
    let catalog = Catalog::builtin();
    let a = assemble(catalog, "windows-chrome-high-end", "one").unwrap().fingerprint;
    let b = assemble(catalog, "windows-chrome-high-end", "two").unwrap().fingerprint;

    // Identity comes from the catalog entry and must not move with the seed.
    assert_eq!(a.navigator.user_agent, b.navigator.user_agent);
    assert_eq!(a.navigator.platform, b.navigator.platform);
    assert_eq!(a.navigator.screen, b.navigator.screen);
    assert_eq!(a.timezone, b.timezone);
    assert_eq!(a.hardware.hardware_concurrency, b.hardware.hardware_concurrency);

    // Noise lanes come from the seed and must move with it.
    assert_ne!(a.canvas.lane, b.canvas.lane);
    assert_ne!(a.seed_digest, b.seed_digest);
}

#[test]
fn test_webgl_vendor_family_matches_platform_family() {
    let catalog = Catalog::builtin();
    for profile in catalog.iter() {
        let bundle = assemble(catalog, &profile.id, "correlate").unwrap();
        let Some(webgl) = &bundle.fingerprint.webgl else {
            continue;
        };
        let vendor = webgl.vendor.to_ascii_lowercase();
        match profile.platform_family() {
            PlatformFamily::Windows | PlatformFamily::Linux => assert!(
                ["nvidia", "amd", "intel", "google"].iter().any(|v| vendor.contains(v)),
                "vendor {vendor} implausible for {}",
                profile.id
            ),
            PlatformFamily::MacOs | PlatformFamily::Ios => {
                assert!(vendor.contains("apple"), "vendor {vendor} on {}", profile.id)
            }
            PlatformFamily::Android => assert!(
                ["qualcomm", "arm", "google"].iter().any(|v| vendor.contains(v)),
                "vendor {vendor} on {}",
                profile.id
            ),
        }
    }
}

#[test]
fn test_timezone_offset_and_locale_track_the_profile() {
    let catalog = Catalog::builtin();
    for profile in catalog.iter() {
        let fingerprint = assemble(catalog, &profile.id, "geo").unwrap().fingerprint;
        assert_eq!(fingerprint.timezone.timezone, profile.geo.timezone);
        assert_eq!(fingerprint.timezone.locale, profile.geo.locale);
        assert_eq!(fingerprint.navigator.languages, profile.geo.languages);
    }
}

#[test]
fn test_absent_catalog_surfaces_are_omitted_everywhere() {
    let catalog = Catalog::builtin();
    let bundle = assemble(catalog, "linux-firefox-hardened", "omit").unwrap();

    assert!(bundle.fingerprint.webgl.is_none());
    assert!(bundle.fingerprint.audio.is_none());

    let json = serde_json::to_value(&bundle.fingerprint).unwrap();
    assert!(json.get("webgl").is_none(), "webgl serialized despite omission");
    assert!(json.get("audio").is_none(), "audio serialized despite omission");

    // The script must not patch surfaces that were never generated.
    assert!(!bundle.script.contains("UNMASKED_VENDOR_WEBGL"));
    assert!(!bundle.script.contains("AudioContext"));
    // Surfaces that do exist still render.
    assert!(bundle.script.contains("toDataURL"));
    assert!(bundle.script.contains("webdriver"));
}

#[test]
fn test_salted_derivation_rotates_daily() {
    use chrono::NaiveDate;
    use fp_forge::seed::daily_bucket;

    let monday = daily_bucket(NaiveDate::from_ymd_opt(2026, 8, 24).unwrap());
    let tuesday = daily_bucket(NaiveDate::from_ymd_opt(2026, 8, 25).unwrap());
    assert_ne!(monday, tuesday);

    let catalog = Catalog::builtin();
    let digest_mon = SeedDigest::derive_salted("sticky-session", &monday);
    let digest_tue = SeedDigest::derive_salted("sticky-session", &tuesday);
    assert_ne!(digest_mon, digest_tue);

    // Same day, same fingerprint.
    let a = assemble(catalog, "windows-chrome-high-end", &format!("sticky:{monday}")).unwrap();
    let b = assemble(catalog, "windows-chrome-high-end", &format!("sticky:{monday}")).unwrap();
    assert_eq!(a.fingerprint, b.fingerprint);
}

#[test]
fn test_script_embeds_no_unescaped_profile_text() {
    let catalog = Catalog::builtin();
    for profile in catalog.iter() {
        let bundle = assemble(catalog, &profile.id, "inject").unwrap();
        // Every fragment is an IIFE with a fail-closed catch.
        assert!(bundle.script.contains("(function() {"));
        assert!(bundle.script.contains("console.debug"));
        // User agents reach the page only as JSON string literals.
        let quoted = serde_json::to_string(&profile.user_agent).unwrap();
        assert!(
            bundle.script.contains(&quoted),
            "user agent not JSON-embedded for {}",
            profile.id
        );
    }
}
