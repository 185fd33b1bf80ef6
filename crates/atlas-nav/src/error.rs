use atlas_media::MediaError;
use atlas_services::ServiceError;
use atlas_store::StoreError;
use atlas_types::TypeError;

/// Errors that end a workflow.
///
/// Rejected input is not an error; it is reported through
/// [`Selection::Rejected`](crate::Selection::Rejected) and re-prompted.
#[derive(Debug, thiserror::Error)]
pub enum NavError {
    /// The stored hierarchy violates an invariant, such as a place with more
    /// than one album.
    #[error("invalid state for place {place_id} in destination {destination_id}: {reason}")]
    InvalidState {
        reason: String,
        destination_id: String,
        place_id: String,
    },

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("record type error: {0}")]
    Type(#[from] TypeError),

    #[error("media error: {0}")]
    Media(#[from] MediaError),

    /// A collaborator service failed or is unreachable.
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] ServiceError),

    /// The operator's terminal cannot be read or written.
    #[error("prompt failed: {0}")]
    Prompt(String),
}

impl NavError {
    pub fn invalid_state(
        reason: impl Into<String>,
        destination_id: impl Into<String>,
        place_id: impl Into<String>,
    ) -> Self {
        Self::InvalidState {
            reason: reason.into(),
            destination_id: destination_id.into(),
            place_id: place_id.into(),
        }
    }

    /// Whether the session can continue after this error.
    ///
    /// Everything except a broken terminal is confined to the workflow that
    /// raised it.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Prompt(_))
    }
}

/// Result alias for navigation operations.
pub type NavResult<T> = Result<T, NavError>;
