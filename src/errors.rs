//! Error types shared by the stores, the encoder and the gallery controller.

use std::io;
use thiserror::Error;

/// Failures reported by the blob store and the key-value store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("blob `{0}` not found")]
    BlobNotFound(String),
    #[error("invalid blob name `{0}`")]
    InvalidBlobName(String),
    #[error("payload is not valid base64: {0}")]
    InvalidPayload(#[from] base64::DecodeError),
    #[error("{0}")]
    Unavailable(String),
    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures while turning a capture reference into a storable payload.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("capture reference carries no readable source")]
    SourceUnavailable,
    #[error("reading `{path}` failed: {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("fetching `{web_path}` failed: {source}")]
    FetchFailed {
        web_path: String,
        #[source]
        source: io::Error,
    },
}

/// Failures raised by the capture service.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("capture cancelled by the user")]
    Cancelled,
    #[error("capture failed: {0}")]
    Failed(String),
}

/// Errors surfaced to the presentation layer by the gallery controller.
///
/// `MetadataWriteFailed` after a blob write and `BlobDeleteFailed` after a
/// committed delete both leave an orphaned entry in the blob store. Neither is
/// rolled back or retried.
#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("gallery is not initialized")]
    NotReady,
    #[error("capture cancelled")]
    CaptureCancelled,
    #[error("capture failed: {0}")]
    CaptureFailed(String),
    #[error("encoding failed: {0}")]
    EncodeFailed(#[from] EncodeError),
    #[error("writing blob `{name}` failed: {source}")]
    BlobWriteFailed {
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("writing metadata failed: {source}")]
    MetadataWriteFailed {
        /// Locator whose blob is left without a metadata entry, if any.
        orphaned: Option<String>,
        #[source]
        source: StoreError,
    },
    #[error("deleting blob `{name}` failed: {source}")]
    BlobDeleteFailed {
        name: String,
        #[source]
        source: StoreError,
    },
    #[error("loading metadata failed: {0}")]
    MetadataLoadFailed(#[source] StoreError),
    #[error("stored metadata is corrupt: {0}")]
    MetadataCorrupt(#[from] serde_json::Error),
    #[error("locator `{0}` is already in the gallery")]
    DuplicateLocator(String),
}

impl From<CaptureError> for GalleryError {
    fn from(err: CaptureError) -> Self {
        match err {
            CaptureError::Cancelled => GalleryError::CaptureCancelled,
            CaptureError::Failed(msg) => GalleryError::CaptureFailed(msg),
        }
    }
}

pub type GalleryResult<T> = Result<T, GalleryError>;
