//! Seed derivation and deterministic sampling.
//!
//! Every generated fingerprint value traces back to a single [`SeedDigest`]:
//! a SHA-256 digest of an opaque caller-supplied seed (profile id, session
//! id, or explicit seed string). The digest is the sole entropy source for
//! all nine surface generators, which is what guarantees that canvas noise,
//! WebGL identity, audio latency and friends stay mutually correlated for a
//! given session.
//!
//! Sub-streams are derived by hashing the digest together with a short label
//! (`"canvas.noise"`, `"webgl.renderer"`, ...), so two generators can never
//! accidentally consume the same bytes while still being pure functions of
//! the one digest.
//!
//! # Example
//!
//! ```rust
//! use fp_forge::seed::SeedDigest;
//!
//! let digest = SeedDigest::derive("user-session-42");
//!
//! // Same seed, same value - always.
//! assert_eq!(digest.uniform("canvas.noise"), digest.uniform("canvas.noise"));
//!
//! // Different labels draw from independent sub-streams.
//! assert_ne!(digest.uniform("canvas.noise"), digest.uniform("audio.latency"));
//! ```

use chrono::NaiveDate;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

/// Length of a seed digest in bytes.
pub const DIGEST_LEN: usize = 32;

/// Separator between seed and salt inside the hash input, so that
/// `("ab", "c")` and `("a", "bc")` never collide.
const SALT_SEPARATOR: u8 = 0x1f;

/// Fixed-length entropy source derived from an opaque seed.
///
/// Derivation is pure and total: any string yields a digest, the same
/// string always yields the same digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SeedDigest([u8; DIGEST_LEN]);

impl SeedDigest {
    /// Derive a digest from a seed string.
    pub fn derive(seed: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Derive a digest from a seed string plus a contextual salt.
    ///
    /// The salt is typically a coarse time bucket (see [`daily_bucket`]):
    /// the same seed yields the same digest within one bucket and a fresh
    /// digest once the bucket rolls over, which rotates fingerprints
    /// without breaking within-bucket consistency.
    pub fn derive_salted(seed: &str, salt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(seed.as_bytes());
        hasher.update([SALT_SEPARATOR]);
        hasher.update(salt.as_bytes());
        Self(hasher.finalize().into())
    }

    /// Construct from raw digest bytes.
    pub fn from_bytes(bytes: [u8; DIGEST_LEN]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; DIGEST_LEN] {
        &self.0
    }

    /// Hex rendering of the digest.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Parse a digest from its hex rendering.
    pub fn from_hex(s: &str) -> Option<Self> {
        let bytes = hex::decode(s).ok()?;
        let bytes: [u8; DIGEST_LEN] = bytes.try_into().ok()?;
        Some(Self(bytes))
    }

    /// Derive the labeled sub-stream digest.
    fn sub(&self, label: &str) -> [u8; DIGEST_LEN] {
        let mut hasher = Sha256::new();
        hasher.update(self.0);
        hasher.update([SALT_SEPARATOR]);
        hasher.update(label.as_bytes());
        hasher.finalize().into()
    }

    /// First eight bytes of the labeled sub-stream as a `u64`.
    fn sub_u64(&self, label: &str) -> u64 {
        let sub = self.sub(label);
        u64::from_be_bytes([
            sub[0], sub[1], sub[2], sub[3], sub[4], sub[5], sub[6], sub[7],
        ])
    }

    /// Uniform value in `[0, 1)` for the labeled sub-stream.
    pub fn uniform(&self, label: &str) -> f64 {
        // 53 bits of mantissa, the standard u64 -> f64 uniform mapping.
        (self.sub_u64(label) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Deterministic integer in `[lo, hi]` (inclusive) for the label.
    pub fn ranged(&self, label: &str, lo: u32, hi: u32) -> u32 {
        if lo >= hi {
            return lo;
        }
        let span = (hi - lo) as u64 + 1;
        lo + (self.sub_u64(label) % span) as u32
    }

    /// A 32-bit lane seed for in-page PRNGs (mulberry32).
    pub fn lane(&self, label: &str) -> u32 {
        (self.sub_u64(label) >> 32) as u32
    }

    /// Bounded signed noise value in `[-amplitude/2, amplitude/2)`.
    pub fn signal(&self, label: &str, amplitude: f64) -> f64 {
        (self.uniform(label) - 0.5) * amplitude
    }

    /// Deterministically pick one element of a non-empty slice.
    pub fn pick<'a, T>(&self, label: &str, items: &'a [T]) -> &'a T {
        let index = (self.sub_u64(label) % items.len() as u64) as usize;
        &items[index]
    }

    /// Cumulative-weight selection from a non-empty candidate list.
    ///
    /// The seed-derived uniform value in `[0, 1)` is scaled to the total
    /// weight and walked through the cumulative sums, so the same seed
    /// always lands in the same weight bucket.
    pub fn pick_weighted<'a, T>(&self, label: &str, items: &'a [(T, f64)]) -> &'a T {
        let total: f64 = items.iter().map(|(_, w)| w.max(0.0)).sum();
        if total <= 0.0 {
            return &items[0].0;
        }
        let mut point = self.uniform(label) * total;
        for (item, weight) in items {
            point -= weight.max(0.0);
            if point < 0.0 {
                return item;
            }
        }
        // Floating point slack lands on the last bucket.
        &items[items.len() - 1].0
    }
}

impl std::fmt::Display for SeedDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for SeedDigest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SeedDigest {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        SeedDigest::from_hex(&s)
            .ok_or_else(|| D::Error::custom(format!("invalid seed digest hex: {s}")))
    }
}

/// Format a UTC date as a daily rotation salt for [`SeedDigest::derive_salted`].
pub fn daily_bucket(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
