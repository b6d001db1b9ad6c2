//! Per-surface fingerprint generators.
//!
//! Nine independent modules, one per observable fingerprint surface. Each
//! exposes the same contract: `generate(&SeedDigest, &DeviceProfile)`
//! produces an immutable component fingerprint, and the component renders a
//! self-contained override [`ScriptFragment`](crate::script::ScriptFragment)
//! for the page context.
//!
//! All generators are pure functions of the `(digest, profile)` pair:
//! re-invoking with identical inputs yields byte-identical output including
//! the embedded script text. That property is what "consistent across a
//! session" means. A profile field absent from the catalog is omitted from
//! the component (`Option::None`), never fabricated.

pub mod audio;
pub mod canvas;
pub mod client_rects;
pub mod fonts;
pub mod hardware;
pub mod navigator;
pub mod timezone;
pub mod webgl;
pub mod webrtc;

use serde::{Deserialize, Serialize};

use crate::seed::SeedDigest;

/// Named noise amplitude for perceptual surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoiseLevel {
    Low,
    Medium,
    High,
}

/// Concrete noise shape: applied with probability `frequency`, magnitude
/// bounded by `±intensity / 2`, clamped to the channel's valid range.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NoiseParams {
    pub intensity: f64,
    pub frequency: f64,
}

impl NoiseLevel {
    /// Weighted candidates for seeded selection; most sessions run low
    /// noise, matching how little perturbation real devices tolerate.
    pub const WEIGHTED: &'static [(NoiseLevel, f64)] = &[
        (NoiseLevel::Low, 0.5),
        (NoiseLevel::Medium, 0.35),
        (NoiseLevel::High, 0.15),
    ];

    /// Deterministically select a level for the labeled sub-stream.
    pub fn select(digest: &SeedDigest, label: &str) -> NoiseLevel {
        *digest.pick_weighted(label, Self::WEIGHTED)
    }

    /// Noise shape for 0-255 color channels (canvas pixels).
    pub fn channel_params(self) -> NoiseParams {
        match self {
            NoiseLevel::Low => NoiseParams {
                intensity: 2.0,
                frequency: 0.10,
            },
            NoiseLevel::Medium => NoiseParams {
                intensity: 4.0,
                frequency: 0.30,
            },
            NoiseLevel::High => NoiseParams {
                intensity: 8.0,
                frequency: 0.50,
            },
        }
    }

    /// Noise shape for sub-pixel layout offsets (client rects, text metrics).
    pub fn subpixel_params(self) -> NoiseParams {
        match self {
            NoiseLevel::Low => NoiseParams {
                intensity: 0.0002,
                frequency: 0.25,
            },
            NoiseLevel::Medium => NoiseParams {
                intensity: 0.0006,
                frequency: 0.50,
            },
            NoiseLevel::High => NoiseParams {
                intensity: 0.0015,
                frequency: 0.75,
            },
        }
    }
}
