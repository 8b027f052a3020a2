//! File-backed blob store rooted at the application's private data directory.
//!
//! Payloads arrive as base64 text and are decoded before they touch disk, so
//! the files on disk are plain images. Reads re-encode. Writes go through a
//! temp file that is fsynced and then renamed over the target.

use super::{BlobStore, WrittenBlob};
use crate::errors::{StoreError, StoreResult};
use crate::models::payload::EncodedPayload;
use async_trait::async_trait;
use std::{
    io::{self, ErrorKind},
    path::PathBuf,
};
use tokio::{
    fs::{self, File},
    io::AsyncWriteExt,
};
use tracing::debug;
use uuid::Uuid;

const MAX_BLOB_NAME_LEN: usize = 255;

#[derive(Clone, Debug)]
pub struct FsBlobStore {
    /// Absolute directory holding one file per blob.
    base_path: PathBuf,
}

impl FsBlobStore {
    /// Open the store, creating `base_path` if needed.
    pub async fn open(base_path: impl Into<PathBuf>) -> StoreResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await?;
        let base_path = fs::canonicalize(&base_path).await?;
        debug!("blob store rooted at {}", base_path.display());
        Ok(Self { base_path })
    }

    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Blob names are flat filenames; anything that could escape the data
    /// directory is rejected.
    fn ensure_name_safe(&self, name: &str) -> StoreResult<()> {
        let bad = name.is_empty()
            || name.len() > MAX_BLOB_NAME_LEN
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
            || name.bytes().any(|b| b.is_ascii_control());
        if bad {
            return Err(StoreError::InvalidBlobName(name.to_string()));
        }
        Ok(())
    }

    fn blob_path(&self, name: &str) -> PathBuf {
        self.base_path.join(name)
    }

    fn uri_for(&self, name: &str) -> String {
        format!("file://{}", self.blob_path(name).display())
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn write(&self, name: &str, payload: &EncodedPayload) -> StoreResult<WrittenBlob> {
        self.ensure_name_safe(name)?;
        let bytes = payload.decode()?;

        let file_path = self.blob_path(name);
        let tmp_path = self.base_path.join(format!(".tmp-{}", Uuid::new_v4()));
        let mut file = File::create(&tmp_path).await?;

        if let Err(err) = file.write_all(&bytes).await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.flush().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        if let Err(err) = file.sync_all().await {
            let _ = fs::remove_file(&tmp_path).await;
            return Err(StoreError::Io(err));
        }
        drop(file);

        if let Err(err) = fs::rename(&tmp_path, &file_path).await {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(&file_path).await?;
                fs::rename(&tmp_path, &file_path).await?;
            } else {
                let _ = fs::remove_file(&tmp_path).await;
                return Err(StoreError::Io(err));
            }
        }

        debug!("wrote {} byte(s) to {}", bytes.len(), file_path.display());
        Ok(WrittenBlob {
            uri: self.uri_for(name),
        })
    }

    async fn read(&self, name: &str) -> StoreResult<EncodedPayload> {
        self.ensure_name_safe(name)?;
        let file_path = self.blob_path(name);
        let bytes = fs::read(&file_path).await.map_err(|err| {
            if err.kind() == io::ErrorKind::NotFound {
                StoreError::BlobNotFound(name.to_string())
            } else {
                StoreError::Io(err)
            }
        })?;
        debug!("read {} byte(s) from {}", bytes.len(), file_path.display());
        Ok(EncodedPayload::from_bytes(&bytes))
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        self.ensure_name_safe(name)?;
        let file_path = self.blob_path(name);
        match fs::remove_file(&file_path).await {
            Ok(_) => debug!("removed blob {}", file_path.display()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("blob {} already missing", file_path.display());
            }
            Err(err) => return Err(StoreError::Io(err)),
        }
        Ok(())
    }
}
