//! Bridges photo-level operations to the blob store and the key-value store.

use crate::errors::{GalleryError, GalleryResult, StoreResult};
use crate::models::payload::EncodedPayload;
use crate::models::photo::{PhotoCollection, blob_name_of};
use crate::services::encoder::Host;
use crate::stores::{BlobStore, KeyValueStore};
use std::sync::Arc;
use tracing::debug;

/// Key under which the metadata list lives.
pub const PHOTO_STORAGE_KEY: &str = "photos";

#[derive(Clone)]
pub struct PersistenceAdapter {
    blobs: Arc<dyn BlobStore>,
    kv: Arc<dyn KeyValueStore>,
    host: Host,
}

impl PersistenceAdapter {
    pub fn new(blobs: Arc<dyn BlobStore>, kv: Arc<dyn KeyValueStore>, host: Host) -> Self {
        Self { blobs, kv, host }
    }

    /// Write `payload` under `name` and return the locator the host understands.
    pub async fn write_payload(&self, name: &str, payload: &EncodedPayload) -> StoreResult<String> {
        let written = self.blobs.write(name, payload).await?;
        let locator = self.host.strategy().locator_for(name, &written);
        debug!(name, locator = %locator, "payload written");
        Ok(locator)
    }

    /// Delete the blob behind `locator`. Already-absent blobs are not an error.
    pub async fn delete_payload(&self, locator: &str) -> StoreResult<()> {
        self.blobs.delete(blob_name_of(locator)).await
    }

    pub async fn read_payload(&self, locator: &str) -> StoreResult<EncodedPayload> {
        self.blobs.read(blob_name_of(locator)).await
    }

    /// Serialize without inline content and store under the fixed key.
    pub async fn save_metadata(&self, photos: &PhotoCollection) -> GalleryResult<()> {
        let json = serde_json::to_string(&photos.stripped())?;
        self.kv
            .set(PHOTO_STORAGE_KEY, &json)
            .await
            .map_err(|source| GalleryError::MetadataWriteFailed {
                orphaned: None,
                source,
            })?;
        debug!(count = photos.len(), "metadata saved");
        Ok(())
    }

    /// Load the metadata list; an absent key is an empty gallery.
    pub async fn load_metadata(&self) -> GalleryResult<PhotoCollection> {
        let raw = self
            .kv
            .get(PHOTO_STORAGE_KEY)
            .await
            .map_err(GalleryError::MetadataLoadFailed)?;
        let photos = match raw {
            Some(json) => serde_json::from_str::<PhotoCollection>(&json)?,
            None => PhotoCollection::new(),
        };
        debug!(count = photos.len(), "metadata loaded");
        Ok(photos)
    }
}
