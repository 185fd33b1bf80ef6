use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    #[error("record {partition}/{sort} does not decode as {expected}: {reason}")]
    Decode {
        partition: String,
        sort: String,
        expected: &'static str,
        reason: String,
    },

    #[error("serialization error: {0}")]
    Serialization(String),
}
