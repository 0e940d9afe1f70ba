use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use phongtro_types::Listing;
use tempfile::NamedTempFile;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, CollectionStore};

/// Blob store backed by a directory on local disk.
///
/// `put("r1/1.jpg", ...)` writes `{root}/r1/1.jpg` and returns the locator
/// `{url_prefix}/r1/1.jpg`, which the server exposes by serving `root`
/// under `url_prefix`.
pub struct LocalBlobStore {
    root: PathBuf,
    url_prefix: String,
}

impl LocalBlobStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>) -> Self {
        let url_prefix = url_prefix.into();
        Self {
            root: root.into(),
            url_prefix: url_prefix.trim_end_matches('/').to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn locator(&self, path: &str) -> String {
        format!("{}/{}", self.url_prefix, path)
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn put(&self, path: &str, bytes: Bytes, _content_type: &str) -> StoreResult<String> {
        let full = self.root.join(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, &bytes).await?;
        tracing::debug!(path, size = bytes.len(), "wrote local blob");
        Ok(self.locator(path))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        match tokio::fs::remove_file(self.root.join(path)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<()> {
        match tokio::fs::remove_dir_all(self.root.join(prefix)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let base = self.root.join(prefix);
        match tokio::fs::metadata(&base).await {
            Ok(meta) if meta.is_dir() => {}
            Ok(_) => return Ok(vec![prefix.to_string()]),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(vec![]),
            Err(err) => return Err(err.into()),
        }

        let mut paths = Vec::new();
        let mut stack = vec![base];
        while let Some(dir) = stack.pop() {
            let mut entries = tokio::fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                if entry.file_type().await?.is_dir() {
                    stack.push(entry.path());
                } else {
                    let rel = entry
                        .path()
                        .strip_prefix(&self.root)
                        .map_err(|e| StoreError::Backend(e.to_string()))?
                        .to_string_lossy()
                        .replace('\\', "/");
                    paths.push(rel);
                }
            }
        }
        paths.sort();
        Ok(paths)
    }

    fn key_for(&self, locator: &str) -> Option<String> {
        locator
            .strip_prefix(&self.url_prefix)?
            .strip_prefix('/')
            .map(str::to_string)
    }
}

impl std::fmt::Debug for LocalBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalBlobStore")
            .field("root", &self.root)
            .field("url_prefix", &self.url_prefix)
            .finish()
    }
}

/// Collection store backed by a single JSON file on local disk.
///
/// Saves go through a temp file in the target's directory followed by a
/// rename, so readers never observe a partially written collection.
#[derive(Debug)]
pub struct LocalCollectionStore {
    path: PathBuf,
}

impl LocalCollectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CollectionStore for LocalCollectionStore {
    async fn load(&self) -> StoreResult<Vec<Listing>> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::Unavailable(format!(
                    "collection file not found: {}",
                    self.path.display()
                )));
            }
            Err(err) => return Err(err.into()),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, rooms: &[Listing]) -> StoreResult<()> {
        let payload = serde_json::to_vec_pretty(rooms)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || -> StoreResult<()> {
            let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
            let mut tmp = NamedTempFile::new_in(dir.unwrap_or_else(|| Path::new(".")))?;
            tmp.write_all(&payload)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;
            Ok(())
        })
        .await
        .map_err(|e| StoreError::Backend(format!("save task panicked: {e}")))?
    }
}
