//! In-memory stores for tests.
//!
//! Both stores count calls and can be told to fail, so controller tests can
//! walk every failure exit without touching disk.

use super::{BlobStore, KeyValueStore, WrittenBlob};
use crate::errors::{StoreError, StoreResult};
use crate::models::payload::EncodedPayload;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: Mutex<BTreeMap<String, EncodedPayload>>,
    fail_writes: AtomicBool,
    fail_deletes: AtomicBool,
    unreadable: Mutex<HashSet<String>>,
    pub writes: AtomicUsize,
    pub reads: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Make reads of `name` fail with an I/O error.
    pub fn make_unreadable(&self, name: &str) {
        self.unreadable.lock().unwrap().insert(name.to_string());
    }

    pub fn insert(&self, name: &str, payload: EncodedPayload) {
        self.blobs.lock().unwrap().insert(name.to_string(), payload);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blobs.lock().unwrap().contains_key(name)
    }

    pub fn names(&self) -> Vec<String> {
        self.blobs.lock().unwrap().keys().cloned().collect()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn write(&self, name: &str, payload: &EncodedPayload) -> StoreResult<WrittenBlob> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.insert(name, payload.clone());
        Ok(WrittenBlob {
            uri: format!("file:///data/app/files/{}", name),
        })
    }

    async fn read(&self, name: &str) -> StoreResult<EncodedPayload> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.unreadable.lock().unwrap().contains(name) {
            return Err(StoreError::Unavailable(format!("cannot read {}", name)));
        }
        self.blobs
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::BlobNotFound(name.to_string()))
    }

    async fn delete(&self, name: &str) -> StoreResult<()> {
        self.deletes.fetch_add(1, Ordering::SeqCst);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("permission denied".into()));
        }
        self.blobs.lock().unwrap().remove(name);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    fail_sets: AtomicBool,
    fail_gets: AtomicBool,
    pub gets: AtomicUsize,
    pub sets: AtomicUsize,
}

impl MemoryKeyValueStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::default();
        store
            .values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        store
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    pub fn fail_gets(&self, fail: bool) {
        self.fail_gets.store(fail, Ordering::SeqCst);
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKeyValueStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.gets.fetch_add(1, Ordering::SeqCst);
        if self.fail_gets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("storage locked".into()));
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.sets.fetch_add(1, Ordering::SeqCst);
        if self.fail_sets.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("quota exceeded".into()));
        }
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
