//! Text-encoded binary payloads.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use std::fmt;

/// A binary payload carried as base64 text.
///
/// This is the single storable form produced by the encoder regardless of
/// host, and the form the blob store accepts and returns.
#[derive(Clone, PartialEq, Eq)]
pub struct EncodedPayload(String);

impl EncodedPayload {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self(STANDARD.encode(bytes))
    }

    /// Wrap text that is already base64. Validity is checked on `decode`.
    pub fn from_base64(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        STANDARD.decode(self.0.as_bytes())
    }

    /// Render as a `data:` URI that can be embedded inline by a browser host.
    pub fn to_data_uri(&self, format: &str) -> String {
        format!("data:image/{};base64,{}", format, self.0)
    }
}

// Payloads can be megabytes of base64; keep logs readable.
impl fmt::Debug for EncodedPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EncodedPayload({} chars)", self.0.len())
    }
}
