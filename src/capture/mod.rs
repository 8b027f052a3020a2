//! Capture-side collaborators: the camera and the readers behind capture
//! references.

pub mod file_camera;
pub mod media_source;

use crate::errors::CaptureError;
use crate::models::capture::{CaptureReference, CaptureRequest};
use async_trait::async_trait;
use bytes::Bytes;
use std::io;

pub use file_camera::FileCamera;
pub use media_source::LocalMediaSource;

/// The capture service.
#[async_trait]
pub trait Camera: Send + Sync {
    async fn get_photo(&self, request: &CaptureRequest) -> Result<CaptureReference, CaptureError>;
}

/// Reads the bytes behind a capture reference.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Read a directly addressable native file path.
    async fn read_native(&self, path: &str) -> io::Result<Bytes>;

    /// Fetch a web-accessible path.
    async fn fetch_web(&self, web_path: &str) -> io::Result<Bytes>;
}
