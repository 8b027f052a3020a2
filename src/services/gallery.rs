//! Gallery controller: owns the published photo collection and orchestrates
//! capture, deletion and startup rehydration.
//!
//! A photo moves through `Requested -> Encoded -> PersistedToBlob ->
//! VisibleInGallery`. Any failure before the last step discards the photo
//! without touching the published collection. The collection and the metadata
//! store change together under the commit lock: metadata is written first and
//! the new collection is published only once that write succeeded.

use crate::capture::{Camera, MediaSource};
use crate::errors::{GalleryError, GalleryResult};
use crate::models::capture::CaptureRequest;
use crate::models::photo::{PhotoCollection, PhotoRecord};
use crate::services::encoder::{Encoder, Host};
use crate::services::persistence::PersistenceAdapter;
use crate::stores::{BlobStore, KeyValueStore};
use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::{Mutex, watch};
use tracing::{debug, info, warn};

/// Extension of every blob name the gallery creates.
pub const PHOTO_EXTENSION: &str = "jpeg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Loading,
    Ready,
}

pub struct GalleryController {
    camera: Arc<dyn Camera>,
    encoder: Encoder,
    persistence: PersistenceAdapter,
    host: Host,
    capture_request: CaptureRequest,
    photos: watch::Sender<PhotoCollection>,
    state: watch::Sender<InitState>,
    commit: Mutex<()>,
    /// Last millisecond stamp handed out as a blob name.
    last_stamp: AtomicI64,
}

impl GalleryController {
    pub fn new(
        host: Host,
        camera: Arc<dyn Camera>,
        media: Arc<dyn MediaSource>,
        blobs: Arc<dyn BlobStore>,
        kv: Arc<dyn KeyValueStore>,
    ) -> Self {
        let (photos, _) = watch::channel(PhotoCollection::new());
        let (state, _) = watch::channel(InitState::Uninitialized);
        Self {
            camera,
            encoder: Encoder::new(host.clone(), media),
            persistence: PersistenceAdapter::new(blobs, kv, host.clone()),
            host,
            capture_request: CaptureRequest::default(),
            photos,
            state,
            commit: Mutex::new(()),
            last_stamp: AtomicI64::new(0),
        }
    }

    /// Override the request sent to the capture service.
    pub fn with_capture_request(mut self, request: CaptureRequest) -> Self {
        self.capture_request = request;
        self
    }

    pub fn state(&self) -> InitState {
        *self.state.borrow()
    }

    /// Snapshot of the published collection.
    pub fn photos(&self) -> PhotoCollection {
        self.photos.borrow().clone()
    }

    /// Observe every published collection, starting with the current one.
    pub fn subscribe(&self) -> watch::Receiver<PhotoCollection> {
        self.photos.subscribe()
    }

    /// Rehydrate from persisted state. Only the first call does any work; a
    /// failed rehydration returns to `Uninitialized` so the caller may retry.
    pub async fn initialize(&self) -> GalleryResult<()> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == InitState::Uninitialized {
                *state = InitState::Loading;
                true
            } else {
                false
            }
        });
        if !claimed {
            debug!(state = ?self.state(), "initialize called again, ignoring");
            return Ok(());
        }

        match self.rehydrate().await {
            Ok(photos) => {
                info!(count = photos.len(), "gallery rehydrated");
                self.photos.send_replace(photos);
                self.state.send_replace(InitState::Ready);
                Ok(())
            }
            Err(err) => {
                self.state.send_replace(InitState::Uninitialized);
                Err(err)
            }
        }
    }

    async fn rehydrate(&self) -> GalleryResult<PhotoCollection> {
        let mut photos = self.persistence.load_metadata().await?;

        let dropped = photos.dedup_locators();
        if dropped > 0 {
            warn!(dropped, "metadata held duplicate locators, keeping first occurrence");
        }

        if self.host.strategy().needs_inline_content() {
            for photo in photos.iter_mut() {
                match self.persistence.read_payload(&photo.locator).await {
                    Ok(payload) => {
                        photo.inline_content = Some(payload.to_data_uri(PHOTO_EXTENSION));
                    }
                    Err(err) => {
                        warn!(locator = %photo.locator, "skipping inline content: {}", err);
                    }
                }
            }
        }
        Ok(photos)
    }

    fn ensure_ready(&self) -> GalleryResult<()> {
        if self.state() == InitState::Ready {
            Ok(())
        } else {
            Err(GalleryError::NotReady)
        }
    }

    /// Capture, encode and persist a new photo, then publish it at the front
    /// of the gallery.
    ///
    /// If the metadata write fails the blob just written stays behind as an
    /// orphan; it is reported in the error and not rolled back.
    pub async fn take_photo(&self) -> GalleryResult<PhotoRecord> {
        self.ensure_ready()?;

        let capture = self.camera.get_photo(&self.capture_request).await?;
        let payload = self.encoder.encode(&capture).await?;

        let name = self.next_blob_name();
        let locator = self
            .persistence
            .write_payload(&name, &payload)
            .await
            .map_err(|source| GalleryError::BlobWriteFailed {
                name: name.clone(),
                source,
            })?;

        let display_reference = self
            .host
            .strategy()
            .resolve_display_reference(&locator, &capture);
        let record = PhotoRecord::new(locator.clone(), display_reference);

        let _commit = self.commit.lock().await;
        let mut next = self.photos();
        next.prepend(record.clone())
            .map_err(|dup| GalleryError::DuplicateLocator(dup.locator))?;

        if let Err(err) = self.persistence.save_metadata(&next).await {
            warn!(locator = %locator, "metadata write failed, blob left orphaned");
            return Err(match err {
                GalleryError::MetadataWriteFailed { source, .. } => {
                    GalleryError::MetadataWriteFailed {
                        orphaned: Some(locator),
                        source,
                    }
                }
                other => other,
            });
        }

        self.photos.send_replace(next);
        info!(locator = %record.locator, "photo added");
        Ok(record)
    }

    /// Remove the photo with `record`'s locator from the gallery and the
    /// metadata store, then delete its blob.
    ///
    /// A blob delete failure is reported after the gallery has already
    /// dropped the record.
    pub async fn delete_photo(&self, record: &PhotoRecord) -> GalleryResult<()> {
        self.ensure_ready()?;

        let name = record.blob_name().to_string();
        {
            let _commit = self.commit.lock().await;
            let mut next = self.photos();
            if next.remove_by_locator(&record.locator).is_some() {
                self.persistence.save_metadata(&next).await?;
                self.photos.send_replace(next);
                info!(locator = %record.locator, "photo removed");
            } else {
                debug!(locator = %record.locator, "photo not in gallery");
                // A bare name can still point at a live record's blob.
                if next.iter().any(|p| p.blob_name() == name) {
                    warn!(name = %name, "blob belongs to a live photo, not deleting");
                    return Ok(());
                }
            }
        }

        self.persistence
            .delete_payload(&record.locator)
            .await
            .map_err(|source| {
                warn!(name = %name, "blob delete failed, blob left orphaned");
                GalleryError::BlobDeleteFailed { name, source }
            })
    }

    /// Timestamp-derived blob name, unique within this process and against
    /// everything already in the gallery.
    fn next_blob_name(&self) -> String {
        let photos = self.photos.borrow();
        let mut floor = Utc::now().timestamp_millis();
        loop {
            let stamp = self.claim_stamp(floor);
            let name = format!("{}.{}", stamp, PHOTO_EXTENSION);
            if !photos.iter().any(|p| p.blob_name() == name) {
                return name;
            }
            floor = stamp + 1;
        }
    }

    fn claim_stamp(&self, floor: i64) -> i64 {
        let prev = match self
            .last_stamp
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(floor.max(last + 1))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        floor.max(prev + 1)
    }
}
