//! Camera for the command-line host: "captures" an existing image file or URL.

use super::Camera;
use crate::errors::CaptureError;
use crate::models::capture::{CaptureReference, CaptureRequest};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::debug;

pub struct FileCamera {
    input: Option<String>,
    native: bool,
}

impl FileCamera {
    /// `native` mirrors the host: native cameras report a readable file path,
    /// browser cameras only a web path.
    pub fn new(input: Option<String>, native: bool) -> Self {
        Self { input, native }
    }
}

#[async_trait]
impl Camera for FileCamera {
    async fn get_photo(&self, request: &CaptureRequest) -> Result<CaptureReference, CaptureError> {
        let input = match self.input.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s,
            _ => return Err(CaptureError::Cancelled),
        };
        debug!(source = ?request.source, quality = request.quality, "capturing {}", input);

        if input.starts_with("http://") || input.starts_with("https://") {
            return Ok(CaptureReference {
                path: None,
                web_path: Some(input.to_string()),
                format: format_of(input),
            });
        }

        let abs = fs::canonicalize(input)
            .await
            .map_err(|e| CaptureError::Failed(format!("{}: {}", input, e)))?;
        let is_file = fs::metadata(&abs).await.map(|m| m.is_file()).unwrap_or(false);
        if !is_file {
            return Err(CaptureError::Failed(format!("{} is not a file", input)));
        }
        let abs = abs.display().to_string();
        let web_path = format!("file://{}", abs);

        Ok(CaptureReference {
            path: self.native.then(|| abs.clone()),
            web_path: Some(web_path),
            format: format_of(&abs),
        })
    }
}

fn format_of(input: &str) -> String {
    let ext = Path::new(input)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("png") => "png".into(),
        Some("gif") => "gif".into(),
        Some("webp") => "webp".into(),
        _ => "jpeg".into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn empty_input_is_cancellation() {
        let camera = FileCamera::new(Some("  ".into()), true);
        let err = camera.get_photo(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, CaptureError::Cancelled));
    }

    #[tokio::test]
    async fn missing_file_is_failure() {
        let camera = FileCamera::new(Some("/nope/missing.jpeg".into()), true);
        let err = camera.get_photo(&CaptureRequest::default()).await.unwrap_err();
        assert!(matches!(err, CaptureError::Failed(_)));
    }

    #[tokio::test]
    async fn web_host_reports_only_web_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.PNG");
        std::fs::write(&path, b"png").unwrap();

        let native = FileCamera::new(Some(path.display().to_string()), true)
            .get_photo(&CaptureRequest::default())
            .await
            .unwrap();
        assert!(native.path.is_some());
        assert_eq!(native.format, "png");

        let web = FileCamera::new(Some(path.display().to_string()), false)
            .get_photo(&CaptureRequest::default())
            .await
            .unwrap();
        assert_eq!(web.path, None);
        assert!(web.web_path.unwrap().starts_with("file://"));
    }

    #[tokio::test]
    async fn urls_pass_through_as_web_paths() {
        let reference = FileCamera::new(Some("https://example.com/cat.jpg".into()), true)
            .get_photo(&CaptureRequest::default())
            .await
            .unwrap();
        assert_eq!(reference.path, None);
        assert_eq!(reference.web_path.as_deref(), Some("https://example.com/cat.jpg"));
        assert_eq!(reference.format, "jpeg");
    }
}
