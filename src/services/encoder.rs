//! Host strategies and the capture encoder.
//!
//! A host either addresses local files by URI (native) or needs image data
//! inlined (web). The choice is made once, when the `Host` is built, and
//! decides how payloads are obtained, which locator a written blob gets, how
//! display references are resolved, and whether rehydration inlines content.

use crate::capture::MediaSource;
use crate::errors::EncodeError;
use crate::models::capture::CaptureReference;
use crate::models::payload::EncodedPayload;
use crate::stores::WrittenBlob;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Path segment under which the native webview serves local files.
pub const APP_FILE_PREFIX: &str = "/_app_file_";

#[async_trait]
pub trait HostStrategy: Send + Sync {
    /// Turn a capture reference into a storable payload.
    async fn obtain_payload(
        &self,
        source: &dyn MediaSource,
        capture: &CaptureReference,
    ) -> Result<EncodedPayload, EncodeError>;

    /// Locator recorded for a blob written under `name`.
    fn locator_for(&self, name: &str, written: &WrittenBlob) -> String;

    /// Reference the UI can render for a freshly captured photo.
    fn resolve_display_reference(&self, locator: &str, capture: &CaptureReference)
    -> Option<String>;

    /// Whether records need their payload inlined after rehydration.
    fn needs_inline_content(&self) -> bool;
}

/// Native host with direct file-URI support.
#[derive(Debug, Clone)]
pub struct NativeHostStrategy {
    display_origin: String,
}

impl NativeHostStrategy {
    pub fn new(display_origin: impl Into<String>) -> Self {
        Self {
            display_origin: display_origin.into(),
        }
    }

    /// Rewrite a `file://` URI (or absolute path) into a URL the webview can load.
    pub fn convert_file_src(&self, locator: &str) -> String {
        let path = match locator.strip_prefix("file://") {
            Some(path) => path,
            None if locator.starts_with('/') => locator,
            None => return locator.to_string(),
        };
        format!(
            "{}{}{}",
            self.display_origin.trim_end_matches('/'),
            APP_FILE_PREFIX,
            path
        )
    }
}

#[async_trait]
impl HostStrategy for NativeHostStrategy {
    async fn obtain_payload(
        &self,
        source: &dyn MediaSource,
        capture: &CaptureReference,
    ) -> Result<EncodedPayload, EncodeError> {
        if let Some(path) = capture.path.as_deref() {
            let bytes = source
                .read_native(path)
                .await
                .map_err(|source| EncodeError::ReadFailed {
                    path: path.to_string(),
                    source,
                })?;
            return Ok(EncodedPayload::from_bytes(&bytes));
        }
        // No native path: some native capture sources only hand back a web path.
        fetch_encoded(source, capture).await
    }

    fn locator_for(&self, _name: &str, written: &WrittenBlob) -> String {
        written.uri.clone()
    }

    fn resolve_display_reference(
        &self,
        locator: &str,
        _capture: &CaptureReference,
    ) -> Option<String> {
        Some(self.convert_file_src(locator))
    }

    fn needs_inline_content(&self) -> bool {
        false
    }
}

/// Browser host: no native reads, content is inlined on rehydration.
#[derive(Debug, Clone, Default)]
pub struct WebHostStrategy;

#[async_trait]
impl HostStrategy for WebHostStrategy {
    async fn obtain_payload(
        &self,
        source: &dyn MediaSource,
        capture: &CaptureReference,
    ) -> Result<EncodedPayload, EncodeError> {
        fetch_encoded(source, capture).await
    }

    fn locator_for(&self, name: &str, _written: &WrittenBlob) -> String {
        name.to_string()
    }

    // The capture-time web path is already resident, reuse it.
    fn resolve_display_reference(
        &self,
        _locator: &str,
        capture: &CaptureReference,
    ) -> Option<String> {
        capture.web_path.clone()
    }

    fn needs_inline_content(&self) -> bool {
        true
    }
}

async fn fetch_encoded(
    source: &dyn MediaSource,
    capture: &CaptureReference,
) -> Result<EncodedPayload, EncodeError> {
    let web_path = capture
        .web_path
        .as_deref()
        .ok_or(EncodeError::SourceUnavailable)?;
    let bytes = source
        .fetch_web(web_path)
        .await
        .map_err(|source| EncodeError::FetchFailed {
            web_path: web_path.to_string(),
            source,
        })?;
    Ok(EncodedPayload::from_bytes(&bytes))
}

/// The host strategy in effect for this process.
#[derive(Debug, Clone)]
pub enum Host {
    Native(NativeHostStrategy),
    Web(WebHostStrategy),
}

impl Host {
    /// Pick the strategy from the host capability predicate.
    pub fn select(is_native: bool, display_origin: &str) -> Self {
        if is_native {
            Host::Native(NativeHostStrategy::new(display_origin))
        } else {
            Host::Web(WebHostStrategy)
        }
    }

    pub fn is_native(&self) -> bool {
        matches!(self, Host::Native(_))
    }

    pub fn strategy(&self) -> &dyn HostStrategy {
        match self {
            Host::Native(s) => s,
            Host::Web(s) => s,
        }
    }
}

/// Converts capture references into storable payloads.
#[derive(Clone)]
pub struct Encoder {
    host: Host,
    source: Arc<dyn MediaSource>,
}

impl Encoder {
    pub fn new(host: Host, source: Arc<dyn MediaSource>) -> Self {
        Self { host, source }
    }

    pub async fn encode(&self, capture: &CaptureReference) -> Result<EncodedPayload, EncodeError> {
        if capture.path.is_none() && capture.web_path.is_none() {
            return Err(EncodeError::SourceUnavailable);
        }
        let payload = self
            .host
            .strategy()
            .obtain_payload(self.source.as_ref(), capture)
            .await?;
        debug!(native = self.host.is_native(), "encoded capture into {:?}", payload);
        Ok(payload)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use bytes::Bytes;
    use std::io;
    use std::sync::Mutex;

    /// Media source that records which primitive was used.
    #[derive(Default)]
    pub(crate) struct ScriptedSource {
        pub native_reads: Mutex<Vec<String>>,
        pub fetches: Mutex<Vec<String>>,
        pub fail: bool,
    }

    #[async_trait]
    impl MediaSource for ScriptedSource {
        async fn read_native(&self, path: &str) -> io::Result<Bytes> {
            self.native_reads.lock().unwrap().push(path.to_string());
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::NotFound, "gone"));
            }
            Ok(Bytes::from_static(b"native"))
        }

        async fn fetch_web(&self, web_path: &str) -> io::Result<Bytes> {
            self.fetches.lock().unwrap().push(web_path.to_string());
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::ConnectionRefused, "offline"));
            }
            Ok(Bytes::from_static(b"web"))
        }
    }

    fn encoder(native: bool, source: Arc<ScriptedSource>) -> Encoder {
        Encoder::new(Host::select(native, "http://localhost"), source)
    }

    #[tokio::test]
    async fn native_path_never_fetches() {
        let source = Arc::new(ScriptedSource::default());
        let capture = CaptureReference::native("/tmp/cap.jpeg", "http://localhost/cap");

        let payload = encoder(true, source.clone()).encode(&capture).await.unwrap();

        assert_eq!(payload, EncodedPayload::from_bytes(b"native"));
        assert_eq!(*source.native_reads.lock().unwrap(), vec!["/tmp/cap.jpeg"]);
        assert!(source.fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn web_path_only_never_reads_natively() {
        for native in [true, false] {
            let source = Arc::new(ScriptedSource::default());
            let payload = encoder(native, source.clone())
                .encode(&CaptureReference::web("blob:abc"))
                .await
                .unwrap();

            assert_eq!(payload, EncodedPayload::from_bytes(b"web"));
            assert!(source.native_reads.lock().unwrap().is_empty());
            assert_eq!(*source.fetches.lock().unwrap(), vec!["blob:abc"]);
        }
    }

    #[tokio::test]
    async fn missing_sources_are_unavailable() {
        let source = Arc::new(ScriptedSource::default());
        let err = encoder(true, source.clone())
            .encode(&CaptureReference::default())
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::SourceUnavailable));

        // A browser host cannot use a native-only reference.
        let native_only = CaptureReference {
            path: Some("/tmp/x.jpeg".into()),
            ..Default::default()
        };
        let err = encoder(false, source.clone())
            .encode(&native_only)
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::SourceUnavailable));
        assert!(source.native_reads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn read_and_fetch_failures_surface() {
        let source = Arc::new(ScriptedSource {
            fail: true,
            ..Default::default()
        });
        let err = encoder(true, source.clone())
            .encode(&CaptureReference::native("/tmp/a.jpeg", "x"))
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::ReadFailed { .. }));

        let err = encoder(false, source)
            .encode(&CaptureReference::web("blob:zzz"))
            .await
            .unwrap_err();
        assert!(matches!(err, EncodeError::FetchFailed { .. }));
    }

    #[test]
    fn native_display_reference_rewrites_file_uri() {
        let native = NativeHostStrategy::new("http://localhost/");
        assert_eq!(
            native.convert_file_src("file:///data/files/1.jpeg"),
            "http://localhost/_app_file_/data/files/1.jpeg"
        );
        assert_eq!(native.convert_file_src("1.jpeg"), "1.jpeg");
    }

    #[test]
    fn locators_follow_host() {
        let written = WrittenBlob {
            uri: "file:///data/files/9.jpeg".into(),
        };
        let native = Host::select(true, "http://localhost");
        let web = Host::select(false, "http://localhost");
        assert_eq!(
            native.strategy().locator_for("9.jpeg", &written),
            "file:///data/files/9.jpeg"
        );
        assert_eq!(web.strategy().locator_for("9.jpeg", &written), "9.jpeg");
        assert!(web.strategy().needs_inline_content());
        assert!(!native.strategy().needs_inline_content());
    }
}
