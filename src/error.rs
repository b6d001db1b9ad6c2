//! Error types for fingerprint generation and catalog loading.
//!
//! The taxonomy is deliberately small: the only conditions that abort
//! generation are an unknown profile id or a corrupt catalog source.
//! Everything else degrades to an omitted field or a lower consistency
//! score rather than an error.

use thiserror::Error;

/// Errors that can occur while loading a device profile catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Failed to read a catalog file.
    #[error("Failed to read catalog file: {0}")]
    IoError(#[from] std::io::Error),

    /// Failed to parse TOML catalog data.
    #[error("Failed to parse TOML catalog: {0}")]
    TomlParseError(#[from] toml::de::Error),

    /// Failed to parse JSON catalog data.
    #[error("Failed to parse JSON catalog: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A catalog entry is structurally present but invalid.
    #[error("Invalid catalog entry '{id}': {reason}")]
    InvalidEntry { id: String, reason: String },

    /// Unsupported catalog file format.
    #[error("Unsupported catalog file format: {0}")]
    UnsupportedFormat(String),
}

/// Errors surfaced by the fingerprint engine itself.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The requested profile id does not exist in the catalog.
    ///
    /// Callers decide fallback policy; the engine never silently
    /// substitutes a default profile.
    #[error("Unknown device profile: {0}")]
    ProfileNotFound(String),

    /// The catalog source could not be loaded. Fatal at startup.
    #[error("Catalog load failed: {0}")]
    CatalogLoad(#[from] CatalogError),

    /// No fingerprint has been registered for the given session id.
    #[error("Unknown session: {0}")]
    SessionNotFound(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_not_found_display() {
        let err = EngineError::ProfileNotFound("no-such-profile".to_string());
        assert!(err.to_string().contains("no-such-profile"));
    }

    #[test]
    fn test_catalog_error_converts() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: EngineError = CatalogError::from(json_err).into();
        assert!(matches!(err, EngineError::CatalogLoad(_)));
    }
}
