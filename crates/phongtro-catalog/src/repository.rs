use std::sync::Arc;

use bytes::Bytes;
use phongtro_store::{content_type_for, image_extension, BlobStore, CollectionStore};
use phongtro_types::Listing;
use tokio::sync::{Mutex, RwLock};

use crate::error::{CatalogError, CatalogResult};

/// Caller-supplied fields for a new listing, as they arrive from the form.
///
/// `price` and `tags` are raw strings; [`ListingRepository::create`]
/// validates and coerces them before anything is mutated.
#[derive(Clone, Debug, Default)]
pub struct ListingDraft {
    /// Storage prefix for the listing's images, conventionally equal to
    /// `room_id`.
    pub folder_name: String,
    pub room_id: String,
    pub district: String,
    pub district_label: String,
    pub ward: String,
    pub ward_label: String,
    /// Raw price string; must parse to a non-negative integer.
    pub price: String,
    /// Raw JSON-encoded string array; empty means no tags.
    pub tags: String,
    pub note: Option<String>,
}

struct ValidDraft {
    folder_name: String,
    room_id: String,
    district: String,
    district_label: String,
    ward: String,
    ward_label: String,
    price: u64,
    tags: Vec<String>,
    note: String,
}

impl ListingDraft {
    fn validate(self) -> CatalogResult<ValidDraft> {
        fn required(value: &str, field: &str) -> CatalogResult<()> {
            if value.trim().is_empty() {
                return Err(CatalogError::Validation(format!("{field} is required")));
            }
            Ok(())
        }

        required(&self.room_id, "roomId")?;
        required(&self.folder_name, "folderName")?;
        required(&self.district, "district")?;
        required(&self.ward, "ward")?;

        if self.folder_name.contains(['/', '\\']) || self.folder_name.contains("..") {
            return Err(CatalogError::Validation(
                "folderName must be a single path segment".into(),
            ));
        }

        let price: u64 = self.price.trim().parse().map_err(|_| {
            CatalogError::Validation(format!(
                "price must be a non-negative integer, got {:?}",
                self.price
            ))
        })?;

        let tags: Vec<String> = if self.tags.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&self.tags).map_err(|e| {
                CatalogError::Validation(format!("tags must be a JSON string array: {e}"))
            })?
        };

        Ok(ValidDraft {
            folder_name: self.folder_name,
            room_id: self.room_id,
            district: self.district,
            district_label: self.district_label,
            ward: self.ward,
            ward_label: self.ward_label,
            price,
            tags,
            note: self.note.unwrap_or_default(),
        })
    }
}

/// One uploaded file: original name plus contents.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Bytes,
}

/// Owner of the in-memory room collection.
///
/// Every read path reloads the collection from the backing store first, so
/// queries always observe the latest persisted state even with
/// out-of-process writers.
///
/// In-process mutations are serialized through a mutation lock. The
/// reload-mutate-persist sequence is still not atomic across processes
/// sharing a backing store, so cross-process lost updates remain possible;
/// this is accepted for a low-concurrency catalog.
pub struct ListingRepository {
    rooms: RwLock<Vec<Listing>>,
    blobs: Arc<dyn BlobStore>,
    collection: Arc<dyn CollectionStore>,
    mutation: Mutex<()>,
}

impl ListingRepository {
    pub fn new(blobs: Arc<dyn BlobStore>, collection: Arc<dyn CollectionStore>) -> Self {
        Self {
            rooms: RwLock::new(Vec::new()),
            blobs,
            collection,
            mutation: Mutex::new(()),
        }
    }

    /// Fetch the authoritative collection from the store and replace the
    /// in-memory copy entirely. Returns the fresh collection.
    pub async fn reload(&self) -> CatalogResult<Vec<Listing>> {
        let fresh = self.collection.load().await?;
        *self.rooms.write().await = fresh.clone();
        Ok(fresh)
    }

    /// Clone of the current in-memory collection, without reloading.
    pub async fn snapshot(&self) -> Vec<Listing> {
        self.rooms.read().await.clone()
    }

    /// The blob store this repository writes images through.
    pub fn blob_store(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Create a listing: upload its images, append the record, persist.
    ///
    /// Files whose extension is not on the image allow-list are silently
    /// skipped; accepted files are stored as `{folder}/{i}.{ext}` with
    /// contiguous 1-based indices in upload order. If the collection
    /// write-back fails the append is rolled back and `PersistFailed`
    /// returned; blobs uploaded in the failed attempt are left in place.
    ///
    /// Nothing rejects a `room_id` that already exists; duplicates make
    /// delete resolve by first match.
    pub async fn create(
        &self,
        draft: ListingDraft,
        images: Vec<ImageUpload>,
    ) -> CatalogResult<Listing> {
        let draft = draft.validate()?;
        let _guard = self.mutation.lock().await;
        let before = self.reload().await?;

        let mut locators = Vec::new();
        for upload in &images {
            let Some(ext) = image_extension(&upload.file_name) else {
                tracing::debug!(file = %upload.file_name, "skipping upload with disallowed extension");
                continue;
            };
            let path = format!("{}/{}.{}", draft.folder_name, locators.len() + 1, ext);
            let locator = self
                .blobs
                .put(&path, upload.bytes.clone(), content_type_for(ext))
                .await?;
            locators.push(locator);
        }

        let listing = Listing {
            room_id: draft.room_id,
            district: draft.district,
            district_label: draft.district_label,
            ward: draft.ward,
            ward_label: draft.ward_label,
            price: draft.price,
            tags: draft.tags,
            note: draft.note,
            images: locators,
        };

        {
            let mut rooms = self.rooms.write().await;
            rooms.push(listing.clone());
            if let Err(source) = self.collection.save(&rooms).await {
                *rooms = before;
                return Err(CatalogError::PersistFailed { source });
            }
        }
        // Confirm the persisted state round-trips.
        self.reload().await?;

        tracing::info!(
            room_id = %listing.room_id,
            images = listing.images.len(),
            "created listing"
        );
        Ok(listing)
    }

    /// Delete the first listing matching `room_id`, its image blobs, and
    /// anything else under its storage prefix.
    ///
    /// Blob deletion is best-effort: failures are logged and do not abort
    /// the operation. Record deletion is strict: if the collection
    /// write-back fails the in-memory collection is restored and
    /// `PersistFailed` returned.
    pub async fn delete(&self, room_id: &str) -> CatalogResult<()> {
        let _guard = self.mutation.lock().await;
        let before = self.reload().await?;

        let Some(pos) = before.iter().position(|l| l.room_id == room_id) else {
            return Err(CatalogError::NotFound(room_id.to_string()));
        };
        let target = before[pos].clone();

        for locator in &target.images {
            match self.blobs.key_for(locator) {
                Some(key) => {
                    if let Err(err) = self.blobs.delete(&key).await {
                        tracing::warn!(%locator, error = %err, "failed to delete image blob");
                    }
                }
                None => {
                    tracing::warn!(%locator, "locator not issued by the active blob store");
                }
            }
        }
        // Sweep blobs the record lost track of.
        if let Err(err) = self.blobs.delete_prefix(target.storage_prefix()).await {
            tracing::warn!(
                prefix = %target.storage_prefix(),
                error = %err,
                "prefix sweep failed"
            );
        }

        {
            let mut rooms = self.rooms.write().await;
            rooms.remove(pos);
            if let Err(source) = self.collection.save(&rooms).await {
                *rooms = before;
                return Err(CatalogError::PersistFailed { source });
            }
        }

        tracing::info!(room_id, "deleted listing");
        Ok(())
    }
}

impl std::fmt::Debug for ListingRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListingRepository").finish_non_exhaustive()
    }
}
