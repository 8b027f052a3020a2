//! Local media source: native reads from disk, web fetches over HTTP(S) or
//! from `file://` URIs.

use super::MediaSource;
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::{Stream, StreamExt, pin_mut};
use std::io::{self, ErrorKind};
use tokio::fs::{self, File};
use tokio_util::io::ReaderStream;
use tracing::debug;

#[derive(Clone, Default)]
pub struct LocalMediaSource {
    client: reqwest::Client,
}

impl LocalMediaSource {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl MediaSource for LocalMediaSource {
    async fn read_native(&self, path: &str) -> io::Result<Bytes> {
        let bytes = fs::read(path).await?;
        debug!("read {} byte(s) from native path {}", bytes.len(), path);
        Ok(Bytes::from(bytes))
    }

    async fn fetch_web(&self, web_path: &str) -> io::Result<Bytes> {
        if web_path.starts_with("http://") || web_path.starts_with("https://") {
            let response = self
                .client
                .get(web_path)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(io::Error::other)?;
            let stream = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(io::Error::other));
            drain(stream).await
        } else if let Some(path) = web_path.strip_prefix("file://") {
            let file = File::open(path).await?;
            drain(ReaderStream::new(file)).await
        } else {
            Err(io::Error::new(
                ErrorKind::Unsupported,
                format!("cannot fetch `{}` from this host", web_path),
            ))
        }
    }
}

/// Collect a byte stream into one buffer.
async fn drain<S>(stream: S) -> io::Result<Bytes>
where
    S: Stream<Item = io::Result<Bytes>>,
{
    let mut buf = BytesMut::new();
    pin_mut!(stream);
    while let Some(chunk) = stream.next().await {
        buf.extend_from_slice(&chunk?);
    }
    debug!("fetched {} byte(s)", buf.len());
    Ok(buf.freeze())
}
