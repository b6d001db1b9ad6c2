//! # fp-forge
//!
//! Deterministic browser fingerprint synthesis and cross-surface
//! consistency validation.
//!
//! fp-forge assembles complete, internally consistent browser fingerprints
//! from a curated device catalog and an opaque seed, emits the JavaScript
//! that realizes them in a page, and scores what a page actually reports
//! against what a session was assigned.
//!
//! ## Features
//!
//! - **Deterministic synthesis**: the same seed and profile reproduce the
//!   fingerprint byte for byte, injection script included
//! - **Nine coordinated surfaces**: navigator, hardware, timezone, WebGL,
//!   canvas, audio, media devices, fonts and client rects drawn from one
//!   digest so they never contradict each other
//! - **Curated device catalog**: hand-checked profiles spanning desktop,
//!   laptop, tablet and mobile across five OS families, loadable from
//!   TOML/JSON files
//! - **Consistency validation**: subtractive scoring with severity-classed
//!   issues, recommendations and a TTL report cache
//! - **Session lifecycle**: registry, sweep and cache invalidation behind
//!   one composition root
//!
//! ## Quick Start
//!
//! ```rust
//! use fp_forge::prelude::*;
//!
//! let engine = FingerprintEngine::new();
//! let bundle = engine.assign("session-1", "windows-chrome-high-end", Some("abc"))?;
//!
//! // Inject `bundle.script` into the page, then probe it with
//! // `engine.observation_script()` and validate what came back.
//! let observed = fp_forge::validate::matching_observation(&bundle.fingerprint);
//! let report = engine.validate_session("session-1", &observed)?;
//! assert!(report.consistent);
//! # Ok::<(), fp_forge::EngineError>(())
//! ```
//!
//! ## Module Overview
//!
//! - [`seed`]: SHA-256 seed digests and labeled sub-streams
//! - [`catalog`]: device profiles and catalog loading
//! - [`script`]: structured JavaScript fragment emission
//! - [`surfaces`]: the nine per-surface generators
//! - [`assemble`]: fingerprint assembly and the observation probe
//! - [`validate`]: consistency scoring and the report cache
//! - [`session`]: session registry
//! - [`engine`]: composition root

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Full version string with name
pub const FULL_VERSION: &str = concat!(env!("CARGO_PKG_NAME"), " v", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Module Exports
// ============================================================================

/// Seed digest derivation and labeled deterministic sub-streams.
pub mod seed;

/// Device profile catalog: records, validation and file loading.
pub mod catalog;

/// Structured JavaScript override emission.
pub mod script;

/// Per-surface fingerprint generators.
pub mod surfaces;

/// Fingerprint assembly and the read-only observation probe.
pub mod assemble;

/// Consistency validation, scoring and the report cache.
pub mod validate;

/// Session registry.
pub mod session;

/// Engine composition root.
pub mod engine;

/// Error types.
pub mod error;

// ============================================================================
// Re-exports for Convenience
// ============================================================================

pub use assemble::{assemble, observation_script, AggregateFingerprint, FingerprintBundle};
pub use catalog::{Catalog, DeviceCategory, DeviceProfile, PlatformFamily};
pub use engine::FingerprintEngine;
pub use error::{CatalogError, EngineError};
pub use seed::SeedDigest;
pub use session::SessionRegistry;
pub use validate::{
    Clock, Issue, ManualClock, ObservedFingerprint, Severity, SystemClock, ValidationCache,
    ValidationReport,
};

// ============================================================================
// Prelude Module
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use fp_forge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::assemble::{assemble, AggregateFingerprint, FingerprintBundle};
    pub use crate::catalog::{Catalog, DeviceCategory, DeviceProfile};
    pub use crate::engine::FingerprintEngine;
    pub use crate::error::{CatalogError, EngineError};
    pub use crate::seed::SeedDigest;
    pub use crate::validate::{ObservedFingerprint, Severity, ValidationReport};
    pub use crate::{FULL_VERSION, NAME, VERSION};
}
