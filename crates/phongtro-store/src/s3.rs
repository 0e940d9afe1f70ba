use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::path::Path as ObjectPath;
use object_store::{Attribute, Attributes, ObjectStore, PutOptions, PutPayload};
use phongtro_types::Listing;

use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, CollectionStore};

/// Fixed object key under which the room collection is persisted.
pub const COLLECTION_KEY: &str = "data/rooms.json";

/// Public URL base for a bucket: virtual-hosted-style for the default
/// region, region-qualified otherwise.
fn public_base(bucket: &str, region: &str) -> String {
    if region == "us-east-1" {
        format!("https://{bucket}.s3.amazonaws.com")
    } else {
        format!("https://{bucket}.s3.{region}.amazonaws.com")
    }
}

fn build_client(bucket: &str, region: &str) -> StoreResult<Arc<dyn ObjectStore>> {
    let client = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region(region)
        .build()
        .map_err(|e| StoreError::Unavailable(e.to_string()))?;
    Ok(Arc::new(client))
}

async fn put_with_content_type(
    client: &Arc<dyn ObjectStore>,
    location: &ObjectPath,
    bytes: Bytes,
    content_type: &str,
) -> StoreResult<()> {
    let mut attributes = Attributes::new();
    attributes.insert(Attribute::ContentType, content_type.to_string().into());
    client
        .put_opts(
            location,
            PutPayload::from(bytes),
            PutOptions {
                attributes,
                ..Default::default()
            },
        )
        .await?;
    Ok(())
}

/// Blob store backed by an S3 bucket.
///
/// Blob paths are used directly as object keys; locators are public object
/// URLs. Credentials come from the standard AWS environment variables via
/// the `object_store` client.
pub struct S3BlobStore {
    client: Arc<dyn ObjectStore>,
    bucket: String,
    base_url: String,
}

impl S3BlobStore {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> StoreResult<Self> {
        let bucket = bucket.into();
        let region = region.into();
        let client = build_client(&bucket, &region)?;
        Ok(Self::with_client(client, bucket, region))
    }

    /// Wrap an existing client. Used by tests with the in-memory
    /// `object_store` backend.
    pub fn with_client(
        client: Arc<dyn ObjectStore>,
        bucket: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        let bucket = bucket.into();
        let base_url = public_base(&bucket, &region.into());
        Self {
            client,
            bucket,
            base_url,
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, path: &str, bytes: Bytes, content_type: &str) -> StoreResult<String> {
        let location = ObjectPath::from(path);
        put_with_content_type(&self.client, &location, bytes, content_type).await?;
        tracing::debug!(path, bucket = %self.bucket, "uploaded blob");
        Ok(format!("{}/{}", self.base_url, location))
    }

    async fn delete(&self, path: &str) -> StoreResult<()> {
        match self.client.delete(&ObjectPath::from(path)).await {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    async fn delete_prefix(&self, prefix: &str) -> StoreResult<()> {
        for path in self.list(prefix).await? {
            self.delete(&path).await?;
        }
        Ok(())
    }

    async fn list(&self, prefix: &str) -> StoreResult<Vec<String>> {
        let prefix = ObjectPath::from(prefix);
        let metas: Vec<_> = self.client.list(Some(&prefix)).try_collect().await?;
        let mut paths: Vec<String> = metas.into_iter().map(|m| m.location.to_string()).collect();
        paths.sort();
        Ok(paths)
    }

    fn key_for(&self, locator: &str) -> Option<String> {
        locator
            .strip_prefix(&self.base_url)?
            .strip_prefix('/')
            .map(str::to_string)
    }
}

impl std::fmt::Debug for S3BlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3BlobStore")
            .field("bucket", &self.bucket)
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Collection store persisting the room array as a single JSON object
/// under [`COLLECTION_KEY`].
pub struct S3CollectionStore {
    client: Arc<dyn ObjectStore>,
    key: ObjectPath,
    bucket: String,
}

impl S3CollectionStore {
    pub fn new(bucket: impl Into<String>, region: impl Into<String>) -> StoreResult<Self> {
        let bucket = bucket.into();
        let client = build_client(&bucket, &region.into())?;
        Ok(Self::with_client(client, bucket))
    }

    /// Wrap an existing client. Used by tests with the in-memory
    /// `object_store` backend.
    pub fn with_client(client: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self {
            client,
            key: ObjectPath::from(COLLECTION_KEY),
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl CollectionStore for S3CollectionStore {
    async fn load(&self) -> StoreResult<Vec<Listing>> {
        let bytes = self.client.get(&self.key).await?.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| StoreError::Corrupt(e.to_string()))
    }

    async fn save(&self, rooms: &[Listing]) -> StoreResult<()> {
        let payload = serde_json::to_vec_pretty(rooms)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        put_with_content_type(
            &self.client,
            &self.key,
            Bytes::from(payload),
            "application/json",
        )
        .await?;
        tracing::debug!(rooms = rooms.len(), bucket = %self.bucket, "persisted collection");
        Ok(())
    }
}

impl std::fmt::Debug for S3CollectionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3CollectionStore")
            .field("bucket", &self.bucket)
            .field("key", &self.key)
            .finish()
    }
}
