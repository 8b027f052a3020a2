//! The two durable stores the gallery sits on top of.
//!
//! `BlobStore` holds photo payloads by name inside the application's private
//! data area. `KeyValueStore` holds the serialized metadata list. Concrete
//! adapters: `FsBlobStore` (local disk) and `SqliteKeyValueStore` (SQLite).

pub mod fs_blob_store;
#[cfg(test)]
pub mod memory;
pub mod sqlite_kv;

use crate::errors::StoreResult;
use crate::models::payload::EncodedPayload;
use async_trait::async_trait;

pub use fs_blob_store::FsBlobStore;
pub use sqlite_kv::SqliteKeyValueStore;

/// Descriptor returned by a successful blob write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenBlob {
    /// Host-addressable URI of the stored payload.
    pub uri: String,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Persist `payload` under `name`, replacing any existing entry.
    async fn write(&self, name: &str, payload: &EncodedPayload) -> StoreResult<WrittenBlob>;

    /// Read the payload stored under `name`.
    async fn read(&self, name: &str) -> StoreResult<EncodedPayload>;

    /// Remove the entry stored under `name`. Deleting an absent entry succeeds.
    async fn delete(&self, name: &str) -> StoreResult<()>;
}

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> StoreResult<()>;
}
