//! Storage backends for the phongtro catalog.
//!
//! Two store kinds back the service, each behind a trait so the listing
//! repository stays agnostic to where data lives:
//!
//! - [`BlobStore`]: image bytes under `{prefix}/{filename}` paths
//! - [`CollectionStore`]: the room collection, one JSON array read and
//!   written as a unit
//!
//! # Backends
//!
//! - [`LocalBlobStore`] / [`LocalCollectionStore`]: local filesystem;
//!   collection saves are atomic (temp file + rename)
//! - [`S3BlobStore`] / [`S3CollectionStore`]: S3 bucket via the
//!   `object_store` client; locators are public object URLs
//! - [`InMemoryBlobStore`] / [`InMemoryCollectionStore`]: for tests and
//!   embedding; the collection double supports injected save failure
//!
//! One backend pair is active per process, selected by configuration at
//! startup and injected into the repository.

pub mod error;
pub mod local;
pub mod memory;
pub mod s3;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use local::{LocalBlobStore, LocalCollectionStore};
pub use memory::{InMemoryBlobStore, InMemoryCollectionStore};
pub use s3::{S3BlobStore, S3CollectionStore, COLLECTION_KEY};
pub use traits::{
    content_type_for, image_extension, BlobStore, CollectionStore, ALLOWED_IMAGE_EXTENSIONS,
};
