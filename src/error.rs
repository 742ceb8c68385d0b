//! Error types for the arena-rl crate

use thiserror::Error;

/// Main error type for the arena-rl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error(
        "arena is {actual_width} x {actual_height}, but the agent was configured for {expected_width} x {expected_height}"
    )]
    ArenaMismatch {
        expected_width: f64,
        expected_height: f64,
        actual_width: f64,
        actual_height: f64,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("malformed record at line {line}: {reason}")]
    MalformedRecord { line: u64, reason: String },

    #[error("expected {expected} {what}, got {got}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("key {key} lies outside the configured key space")]
    KeyOutOfRange { key: String },

    #[error("unsupported {format} format version {found} (expected {expected})")]
    UnsupportedVersion {
        format: &'static str,
        found: u32,
        expected: u32,
    },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("failed to {operation}: {message}")]
    SerializationContext { operation: String, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}
