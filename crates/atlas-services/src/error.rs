/// Errors from external collaborators.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("{service} error: {status} - {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// The response did not have the expected shape.
    #[error("unexpected {service} response: {reason}")]
    UnexpectedResponse {
        service: &'static str,
        reason: String,
    },

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    /// The service could not be reached or the call was abandoned.
    #[error("service unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    pub(crate) fn unexpected(service: &'static str, reason: impl Into<String>) -> Self {
        Self::UnexpectedResponse {
            service,
            reason: reason.into(),
        }
    }
}

/// Result alias for collaborator calls.
pub type ServiceResult<T> = Result<T, ServiceError>;
