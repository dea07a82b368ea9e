//! Error types shared by all media-host adapters.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    /// The local file could not be read before upload.
    #[error("media file not readable: {0}")]
    Io(#[from] std::io::Error),
    /// The host rejected or failed the upload.
    #[error("upload failed: {0}")]
    UploadFailed(String),
    /// The host answered, but not with anything we can use.
    #[error("malformed host response: {0}")]
    InvalidResponse(String),
}
