//! Error types for the booking_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for booking_core operations
///
/// Every variant here is fatal for an import run. Row-level problems are
/// reported through [`crate::RowOutcome`] instead.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Transport-level HTTP error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input feed is unusable
    #[error("Input error: {0}")]
    Input(String),

    /// The service refused our credentials
    #[error("Authentication failed - {0}")]
    Auth(String),

    /// Paginated fetch ended with a different number of items than the
    /// server reported
    #[error("failed to obtain correct item counts on {entity} (expected {expected}, got {actual})")]
    CountMismatch {
        entity: String,
        expected: usize,
        actual: usize,
    },

    /// Unexpected response shape from the service
    #[error("API error: {0}")]
    Api(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
