use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use phongtro_store::{
    BlobStore, CollectionStore, LocalBlobStore, LocalCollectionStore, S3BlobStore,
    S3CollectionStore,
};
use serde::{Deserialize, Serialize};

use crate::error::{ServerError, ServerResult};

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Which storage backend pair a process runs against. Selected once at
/// startup; everything downstream only sees the store traits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "backend", rename_all = "lowercase")]
pub enum StorageConfig {
    Local {
        /// Directory image blobs are written under.
        media_root: PathBuf,
        /// URL prefix the server exposes `media_root` under.
        media_url_prefix: String,
        /// Path of the persisted room collection file.
        rooms_file: PathBuf,
    },
    S3 {
        bucket: String,
        region: String,
    },
}

impl StorageConfig {
    /// Read the backend selection from the environment.
    ///
    /// `STORAGE_BACKEND` is `local` (default) or `s3`. Local mode reads
    /// `MEDIA_ROOT`, `MEDIA_URL_PREFIX`, and `ROOMS_FILE`; S3 mode requires
    /// `S3_BUCKET` and reads the region from `AWS_REGION` or
    /// `AWS_DEFAULT_REGION` (default `us-east-1`). AWS credentials are
    /// picked up by the S3 client from the standard environment variables.
    pub fn from_env() -> ServerResult<Self> {
        match env_or("STORAGE_BACKEND", "local").as_str() {
            "local" => Ok(Self::Local {
                media_root: env_or("MEDIA_ROOT", "frontend/images").into(),
                media_url_prefix: env_or("MEDIA_URL_PREFIX", "/images"),
                rooms_file: env_or("ROOMS_FILE", "data/rooms.json").into(),
            }),
            "s3" => {
                let bucket = std::env::var("S3_BUCKET")
                    .map_err(|_| ServerError::Config("S3_BUCKET not configured".into()))?;
                let region = std::env::var("AWS_REGION")
                    .or_else(|_| std::env::var("AWS_DEFAULT_REGION"))
                    .unwrap_or_else(|_| "us-east-1".to_string());
                Ok(Self::S3 { bucket, region })
            }
            other => Err(ServerError::Config(format!(
                "unknown STORAGE_BACKEND {other:?} (expected \"local\" or \"s3\")"
            ))),
        }
    }

    /// Instantiate the configured backend pair.
    pub fn build_stores(&self) -> ServerResult<(Arc<dyn BlobStore>, Arc<dyn CollectionStore>)> {
        match self {
            Self::Local {
                media_root,
                media_url_prefix,
                rooms_file,
            } => Ok((
                Arc::new(LocalBlobStore::new(
                    media_root.clone(),
                    media_url_prefix.clone(),
                )),
                Arc::new(LocalCollectionStore::new(rooms_file.clone())),
            )),
            Self::S3 { bucket, region } => Ok((
                Arc::new(S3BlobStore::new(bucket.clone(), region.clone())?),
                Arc::new(S3CollectionStore::new(bucket.clone(), region.clone())?),
            )),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    /// Directory of frontend assets served as the router fallback.
    pub static_dir: PathBuf,
    /// Path of the read-only tag definitions, loaded once at startup.
    pub tags_file: PathBuf,
    pub storage: StorageConfig,
    /// Upper bound on multipart request bodies, in bytes.
    pub max_upload_bytes: usize,
}

impl ServerConfig {
    pub fn from_env() -> ServerResult<Self> {
        let bind_addr = env_or("BIND_ADDR", "127.0.0.1:5000")
            .parse()
            .map_err(|e| ServerError::Config(format!("invalid BIND_ADDR: {e}")))?;
        Ok(Self {
            bind_addr,
            static_dir: env_or("STATIC_DIR", "frontend").into(),
            tags_file: env_or("TAGS_FILE", "data/tag-definitions.json").into(),
            storage: StorageConfig::from_env()?,
            max_upload_bytes: 32 * 1024 * 1024,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5000".parse().expect("static addr"),
            static_dir: "frontend".into(),
            tags_file: "data/tag-definitions.json".into(),
            storage: StorageConfig::Local {
                media_root: "frontend/images".into(),
                media_url_prefix: "/images".into(),
                rooms_file: "data/rooms.json".into(),
            },
            max_upload_bytes: 32 * 1024 * 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let c = ServerConfig::default();
        assert_eq!(c.bind_addr, "127.0.0.1:5000".parse::<SocketAddr>().unwrap());
        assert!(matches!(c.storage, StorageConfig::Local { .. }));
    }

    #[test]
    fn local_backend_builds_stores() {
        let storage = StorageConfig::Local {
            media_root: "/tmp/media".into(),
            media_url_prefix: "/images".into(),
            rooms_file: "/tmp/rooms.json".into(),
        };
        let (blobs, _collection) = storage.build_stores().unwrap();
        assert_eq!(blobs.key_for("/images/r1/1.jpg"), Some("r1/1.jpg".into()));
    }

    #[test]
    fn storage_config_serializes_with_backend_tag() {
        let storage = StorageConfig::S3 {
            bucket: "rooms-media".into(),
            region: "ap-southeast-1".into(),
        };
        let json = serde_json::to_value(&storage).unwrap();
        assert_eq!(json["backend"], "s3");
        assert_eq!(json["bucket"], "rooms-media");
    }
}
