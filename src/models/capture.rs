//! Requests to and results from the capture service.

use serde::{Deserialize, Serialize};

/// How the capture service should hand back the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultType {
    /// A transient URI or path to the captured image.
    Uri,
}

/// Where the image comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum CaptureSource {
    Camera,
    Photos,
    Prompt,
}

/// A request sent to the capture service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub result_type: ResultType,
    pub source: CaptureSource,
    /// JPEG quality, 0-100.
    pub quality: u8,
}

impl CaptureRequest {
    pub fn new(source: CaptureSource) -> Self {
        Self {
            result_type: ResultType::Uri,
            source,
            quality: 100,
        }
    }
}

impl Default for CaptureRequest {
    fn default() -> Self {
        Self::new(CaptureSource::Camera)
    }
}

/// What the capture service returns.
///
/// Native hosts fill `path` with a directly readable file path. `web_path` is a
/// fetchable reference (an `http(s)://`, `file://` or `blob:` URI) that the UI can
/// also display while it is still resident.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptureReference {
    pub path: Option<String>,
    pub web_path: Option<String>,
    /// Image format reported by the capture service, e.g. `jpeg`.
    pub format: String,
}

impl CaptureReference {
    pub fn web(web_path: impl Into<String>) -> Self {
        Self {
            path: None,
            web_path: Some(web_path.into()),
            format: "jpeg".into(),
        }
    }

    pub fn native(path: impl Into<String>, web_path: impl Into<String>) -> Self {
        Self {
            path: Some(path.into()),
            web_path: Some(web_path.into()),
            format: "jpeg".into(),
        }
    }
}
