use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use phongtro_types::Listing;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, CollectionStore};

/// In-memory blob store for tests and embedding.
///
/// Blobs are held in a `BTreeMap` behind an `RwLock`; locators use a
/// `memory://` scheme so locator round-trips can be exercised without
/// touching disk or network.
pub struct InMemoryBlobStore {
    blobs: RwLock<BTreeMap<String, Bytes>>,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store holds no blobs.
    pub fn is_empty(&self) -> bool {
        self.blobs.read().expect("lock poisoned").is_empty()
    }

    /// The stored bytes for `path`, if present.
    pub fn get(&self, path: &str) -> Option<Bytes> {
        self.blobs.read().expect("lock poisoned").get(path).cloned()
    }

    fn in_prefix(path: &str, prefix: &str) -> bool {
        path == prefix || path.starts_with(&format!("{prefix}/"))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn put(&self, path: &str, bytes: Bytes, _content_type: &str) -> StoreResult<String> {
        self.blobs
            .write()
            .expect("lock poisoned")
            .insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        self.blobs.write().expect("lock poisoned").remove(path);
        Ok(())
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<()> {
        self.blobs
            .write()
            .expect("lock poisoned")
            .retain(|path, _| !Self::in_prefix(path, prefix));
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        Ok(self
            .blobs
            .read()
            .expect("lock poisoned")
            .keys()
            .filter(|path| Self::in_prefix(path, prefix))
            .cloned()
            .collect())
    }

    fn key_for(&self, locator: &str) -> Option<String> {
        locator.strip_prefix("memory://").map(str::to_string)
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}

/// In-memory collection store for tests and embedding.
///
/// Supports injected save failure so repository rollback paths can be
/// exercised deterministically.
pub struct InMemoryCollectionStore {
    rooms: RwLock<Vec<Listing>>,
    fail_next_save: AtomicBool,
}

impl InMemoryCollectionStore {
    pub fn new() -> Self {
        Self::with_rooms(Vec::new())
    }

    pub fn with_rooms(rooms: Vec<Listing>) -> Self {
        Self {
            rooms: RwLock::new(rooms),
            fail_next_save: AtomicBool::new(false),
        }
    }

    /// Make the next `save` call fail with `StoreError::Unavailable`.
    pub fn fail_next_save(&self) {
        self.fail_next_save.store(true, Ordering::SeqCst);
    }
}

impl Default for InMemoryCollectionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CollectionStore for InMemoryCollectionStore {
    async fn load(&self) -> StoreResult<Vec<Listing>> {
        Ok(self.rooms.read().expect("lock poisoned").clone())
    }

    async fn save(&self, rooms: &[Listing]) -> StoreResult<()> {
        if self.fail_next_save.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected save failure".into()));
        }
        *self.rooms.write().expect("lock poisoned") = rooms.to_vec();
        Ok(())
    }
}

impl std::fmt::Debug for InMemoryCollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.rooms.read().expect("lock poisoned").len();
        f.debug_struct("InMemoryCollectionStore")
            .field("room_count", &count)
            .finish()
    }
}
