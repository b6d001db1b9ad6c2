//! Validation result cache.
//!
//! Reports are cached by `(profile_id, seed digest, observed snapshot hash)`
//! so repeated validation of identical observations returns the prior
//! report unchanged, timestamp included. The seed digest is part of the key
//! because two sessions can share a profile while holding different
//! expected fingerprints. Time is injected through [`Clock`] so TTL
//! behavior is testable without sleeping.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use sha2::{Digest, Sha256};
use tracing::{debug, trace};

use crate::assemble::AggregateFingerprint;
use crate::validate::{score_at, ObservedFingerprint, ValidationReport};

/// Time source abstraction.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time, the production clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Settable clock for tests.
pub struct ManualClock {
    now: RwLock<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: RwLock::new(start),
        }
    }

    pub fn advance(&self, by: Duration) {
        *self.now.write() += by;
    }

    pub fn set(&self, to: DateTime<Utc>) {
        *self.now.write() = to;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.read()
    }
}

const DEFAULT_TTL_HOURS: i64 = 24;

struct CacheEntry {
    report: ValidationReport,
    cached_at: DateTime<Utc>,
}

type CacheKey = (String, String, String);

/// TTL cache of validation reports.
pub struct ValidationCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ValidationCache {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self::with_ttl(clock, Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            clock,
        }
    }

    /// Return the cached report for this exact observation if it is still
    /// fresh, otherwise score and cache a new one.
    pub fn fetch_or_score(
        &self,
        expected: &AggregateFingerprint,
        observed: &ObservedFingerprint,
    ) -> ValidationReport {
        let key = (
            expected.profile_id.clone(),
            expected.seed_digest.to_hex(),
            snapshot_hash(observed),
        );
        let now = self.clock.now();

        if let Some(entry) = self.entries.read().get(&key) {
            if now - entry.cached_at < self.ttl {
                trace!(profile_id = %key.0, seed_digest = %key.1, "validation cache hit");
                return entry.report.clone();
            }
        }

        let report = score_at(expected, observed, now);
        self.entries.write().insert(
            key,
            CacheEntry {
                report: report.clone(),
                cached_at: now,
            },
        );
        report
    }

    /// Drop every cached report for one profile. Called when a session
    /// ends so a reassigned profile starts from a clean slate.
    pub fn invalidate_profile(&self, profile_id: &str) {
        self.entries.write().retain(|(id, _, _), _| id != profile_id);
    }

    /// Remove expired entries. Keys are collected under the read lock
    /// first, then removed, so concurrent readers never observe a
    /// half-swept map.
    pub fn sweep(&self) {
        let now = self.clock.now();
        let expired: Vec<CacheKey> = self
            .entries
            .read()
            .iter()
            .filter(|(_, entry)| now - entry.cached_at >= self.ttl)
            .map(|(key, _)| key.clone())
            .collect();
        if expired.is_empty() {
            return;
        }
        let mut entries = self.entries.write();
        for key in &expired {
            entries.remove(key);
        }
        debug!(removed = expired.len(), "swept expired validation reports");
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

/// Content hash of the observed snapshot, independent of field order in
/// the source JSON.
fn snapshot_hash(observed: &ObservedFingerprint) -> String {
    let bytes = serde_json::to_vec(observed)
        .unwrap_or_else(|_| format!("{observed:?}").into_bytes());
    hex::encode(Sha256::digest(&bytes))
}
