use atlas_store::StoreError;

/// Errors from the media pipeline.
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    /// The source bytes are not a decodable image.
    #[error("cannot decode image: {0}")]
    Decode(String),

    /// The processed image could not be encoded.
    #[error("cannot encode image: {0}")]
    Encode(String),

    /// The object store rejected an upload.
    #[error("upload to {path} failed: {reason}")]
    Upload { path: String, reason: String },

    /// Reading existing hashes from the table failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for media operations.
pub type MediaResult<T> = Result<T, MediaError>;
