//! Unified error handling.
//!
//! The engine favors graceful degradation: missing or malformed upstream data
//! produces an empty or partial result, never an error, because one bad record
//! must not abort a whole day's reconstruction. The variants below cover the
//! few failures that cannot degrade.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors the engine can surface to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    /// A timestamp could not be parsed even after implicit-UTC normalization.
    /// Without it no event ordering can be established, so this is a hard
    /// input-validation failure rather than something to degrade around.
    #[error("unparseable timestamp '{raw}': {source}")]
    InvalidTimestamp {
        raw: String,
        #[source]
        source: chrono::format::ParseError,
    },

    /// A reverse-geocoding request failed. Lookups are best-effort with no
    /// retry guarantee; callers may treat this as "no address available".
    #[error("reverse geocoding failed: {reason}")]
    Geocode { reason: String },
}
