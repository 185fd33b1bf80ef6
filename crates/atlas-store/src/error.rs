use atlas_types::TypeError;

/// Errors from table operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backend reported a non-success outcome for a read or write.
    #[error("storage {operation} failed for {key}: {reason}")]
    Failure {
        operation: &'static str,
        key: String,
        reason: String,
    },

    /// A stored record does not decode as the expected model.
    #[error("record type error: {0}")]
    Type(#[from] TypeError),

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The persisted table cannot be decoded.
    #[error("corrupt table file {path}: {reason}")]
    CorruptTable { path: String, reason: String },
}

impl StoreError {
    pub(crate) fn failure(
        operation: &'static str,
        partition: &str,
        sort: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::Failure {
            operation,
            key: format!("{partition}/{sort}"),
            reason: reason.into(),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
