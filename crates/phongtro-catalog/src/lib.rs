//! Listing repository and filter/aggregation engine for the phongtro
//! catalog.
//!
//! [`ListingRepository`] owns the in-memory room collection and wraps the
//! injected [`BlobStore`](phongtro_store::BlobStore) and
//! [`CollectionStore`](phongtro_store::CollectionStore): reads reload from
//! the backing store first, mutations follow a reload-mutate-persist
//! sequence with rollback on write-back failure.
//!
//! The [`filter`] module holds the pure aggregation functions: district
//! counts, ward counts, and filtered listing sets under a
//! [`PriceRange`](filter::PriceRange) predicate.

pub mod error;
pub mod filter;
pub mod repository;

pub use error::{CatalogError, CatalogResult};
pub use filter::{district_counts, filter_listings, ward_counts, AreaCount, PriceRange};
pub use repository::{ImageUpload, ListingDraft, ListingRepository};
