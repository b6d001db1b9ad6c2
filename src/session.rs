//! Session registry.
//!
//! Maps session ids to their assigned fingerprint bundles. Entries are
//! inserted and removed whole under a single lock, never partially
//! mutated, so a reader either sees a complete bundle or nothing.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::assemble::{AggregateFingerprint, FingerprintBundle};
use crate::validate::Clock;

struct SessionEntry {
    bundle: FingerprintBundle,
    registered_at: DateTime<Utc>,
}

/// Concurrent map of active sessions to their fingerprint bundles.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    clock: Arc<dyn Clock>,
}

impl SessionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Register (or replace) the bundle for a session.
    pub fn register(&self, session_id: &str, bundle: FingerprintBundle) {
        let registered_at = self.clock.now();
        let replaced = self
            .sessions
            .write()
            .insert(
                session_id.to_string(),
                SessionEntry {
                    bundle,
                    registered_at,
                },
            )
            .is_some();
        if replaced {
            warn!(session_id, "replaced fingerprint for already registered session");
        } else {
            debug!(session_id, "registered session fingerprint");
        }
    }

    /// The fingerprint assigned to a session, if any.
    pub fn lookup(&self, session_id: &str) -> Option<AggregateFingerprint> {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| entry.bundle.fingerprint.clone())
    }

    /// The injection script assigned to a session, if any.
    pub fn script(&self, session_id: &str) -> Option<String> {
        self.sessions
            .read()
            .get(session_id)
            .map(|entry| entry.bundle.script.clone())
    }

    /// End a session, returning the profile id it held.
    pub fn end(&self, session_id: &str) -> Option<String> {
        let removed = self.sessions.write().remove(session_id);
        if removed.is_some() {
            debug!(session_id, "ended session");
        }
        removed.map(|entry| entry.bundle.fingerprint.profile_id)
    }

    /// Remove sessions older than `max_age`. Stale ids are collected under
    /// the read lock first, then removed. Returns the profile ids of the
    /// removed sessions so their cached validations can be dropped too.
    pub fn sweep(&self, max_age: Duration) -> Vec<String> {
        let now = self.clock.now();
        let stale: Vec<String> = self
            .sessions
            .read()
            .iter()
            .filter(|(_, entry)| now - entry.registered_at >= max_age)
            .map(|(id, _)| id.clone())
            .collect();
        if stale.is_empty() {
            return Vec::new();
        }

        let mut sessions = self.sessions.write();
        let mut profile_ids = Vec::with_capacity(stale.len());
        for id in &stale {
            if let Some(entry) = sessions.remove(id) {
                profile_ids.push(entry.bundle.fingerprint.profile_id);
            }
        }
        debug!(removed = profile_ids.len(), "swept stale sessions");
        profile_ids
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}
