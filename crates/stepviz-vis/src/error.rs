//! Error types for the visualization service.

use thiserror::Error;

/// Result type for visualization service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur outside the replay core.
///
/// Playback itself never fails: rejected requests, skipped input and missing
/// visual handles are outcomes, not errors.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Unparsable configuration value
    #[error("Invalid value for {key}: {value:?}")]
    Config { key: &'static str, value: String },
}
