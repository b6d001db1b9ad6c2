//! Engine composition root.
//!
//! Owns the catalog, the session registry, the validation cache and the
//! clock. Nothing here is a process-wide singleton; tests construct as
//! many engines as they like with their own catalogs and clocks.

use std::sync::Arc;

use chrono::Duration;
use rand::distributions::Alphanumeric;
use rand::Rng;
use tracing::info;

use crate::assemble::{assemble, observation_script, FingerprintBundle};
use crate::catalog::Catalog;
use crate::error::EngineError;
use crate::session::SessionRegistry;
use crate::validate::{
    Clock, ObservedFingerprint, SystemClock, ValidationCache, ValidationReport,
};

const RANDOM_SEED_LEN: usize = 32;

/// Fingerprint engine: assignment, validation and lifecycle in one place.
pub struct FingerprintEngine {
    catalog: Catalog,
    registry: SessionRegistry,
    cache: ValidationCache,
}

impl FingerprintEngine {
    /// Engine over the built-in catalog with the system clock.
    pub fn new() -> Self {
        Self::with_catalog(Catalog::builtin().clone())
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self::with_clock(catalog, Arc::new(SystemClock))
    }

    pub fn with_clock(catalog: Catalog, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            registry: SessionRegistry::new(clock.clone()),
            cache: ValidationCache::new(clock),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Assemble a fingerprint for `profile_id` and register it under
    /// `session_id`. Without an explicit seed a random one is drawn once;
    /// everything downstream of the seed stays deterministic.
    pub fn assign(
        &self,
        session_id: &str,
        profile_id: &str,
        seed: Option<&str>,
    ) -> Result<FingerprintBundle, EngineError> {
        let seed = match seed {
            Some(seed) => seed.to_string(),
            None => random_seed(),
        };
        let bundle = assemble(&self.catalog, profile_id, &seed)?;
        self.registry.register(session_id, bundle.clone());
        info!(session_id, profile_id, "assigned fingerprint to session");
        Ok(bundle)
    }

    /// Validate an observation against the fingerprint a session holds.
    pub fn validate_session(
        &self,
        session_id: &str,
        observed: &ObservedFingerprint,
    ) -> Result<ValidationReport, EngineError> {
        let expected = self
            .registry
            .lookup(session_id)
            .ok_or_else(|| EngineError::SessionNotFound(session_id.to_string()))?;
        Ok(self.cache.fetch_or_score(&expected, observed))
    }

    /// Validate an observation against a freshly assembled fingerprint,
    /// without touching the session registry.
    pub fn validate(
        &self,
        profile_id: &str,
        seed: &str,
        observed: &ObservedFingerprint,
    ) -> Result<ValidationReport, EngineError> {
        let bundle = assemble(&self.catalog, profile_id, seed)?;
        Ok(self.cache.fetch_or_score(&bundle.fingerprint, observed))
    }

    /// The fingerprint currently assigned to a session, if any.
    pub fn session_fingerprint(
        &self,
        session_id: &str,
    ) -> Option<crate::assemble::AggregateFingerprint> {
        self.registry.lookup(session_id)
    }

    /// End a session and drop its cached validations.
    pub fn end_session(&self, session_id: &str) -> bool {
        match self.registry.end(session_id) {
            Some(profile_id) => {
                self.cache.invalidate_profile(&profile_id);
                true
            }
            None => false,
        }
    }

    /// Remove sessions older than `max_age` together with their cached
    /// validations, then drop expired cache entries.
    pub fn sweep(&self, max_age: Duration) {
        for profile_id in self.registry.sweep(max_age) {
            self.cache.invalidate_profile(&profile_id);
        }
        self.cache.sweep();
    }

    /// Read-only page probe producing an [`ObservedFingerprint`]-shaped
    /// JSON object.
    pub fn observation_script(&self) -> &'static str {
        observation_script()
    }

    pub fn active_sessions(&self) -> usize {
        self.registry.len()
    }
}

impl Default for FingerprintEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn random_seed() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(RANDOM_SEED_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::matching_observation;

    #[test]
    fn test_assign_registers_session() {
        let engine = FingerprintEngine::new();
        let bundle = engine
            .assign("session-1", "windows-chrome-high-end", Some("abc"))
            .unwrap();
        assert_eq!(engine.active_sessions(), 1);
        assert_eq!(engine.session_fingerprint("session-1").unwrap(), bundle.fingerprint);
    }

    #[test]
    fn test_assign_without_seed_draws_random() {
        let engine = FingerprintEngine::new();
        let a = engine.assign("s1", "windows-chrome-high-end", None).unwrap();
        let b = engine.assign("s2", "windows-chrome-high-end", None).unwrap();
        assert_ne!(a.fingerprint.seed_digest, b.fingerprint.seed_digest);
    }

    #[test]
    fn test_validate_session_roundtrip() {
        let engine = FingerprintEngine::new();
        let bundle = engine
            .assign("session-1", "windows-chrome-high-end", Some("abc"))
            .unwrap();
        let report = engine
            .validate_session("session-1", &matching_observation(&bundle.fingerprint))
            .unwrap();
        assert_eq!(report.score, 100);
        assert!(report.consistent);
    }

    #[test]
    fn test_validate_unknown_session_errors() {
        let engine = FingerprintEngine::new();
        let err = engine
            .validate_session("ghost", &ObservedFingerprint::default())
            .unwrap_err();
        assert!(matches!(err, EngineError::SessionNotFound(id) if id == "ghost"));
    }

    #[test]
    fn test_end_session() {
        let engine = FingerprintEngine::new();
        engine
            .assign("session-1", "windows-chrome-high-end", Some("abc"))
            .unwrap();
        assert!(engine.end_session("session-1"));
        assert!(!engine.end_session("session-1"));
        assert_eq!(engine.active_sessions(), 0);
    }

    #[test]
    fn test_stateless_validate_matches_assigned() {
        let engine = FingerprintEngine::new();
        let bundle = engine
            .assign("session-1", "windows-chrome-high-end", Some("abc"))
            .unwrap();
        let report = engine
            .validate(
                "windows-chrome-high-end",
                "abc",
                &matching_observation(&bundle.fingerprint),
            )
            .unwrap();
        assert_eq!(report.score, 100);
    }
}
