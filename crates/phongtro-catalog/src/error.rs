use phongtro_store::StoreError;

/// Errors from listing repository operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Malformed input; the operation aborted before any mutation.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Delete target does not exist; no side effects.
    #[error("no listing with roomId {0}")]
    NotFound(String),

    /// The backing store failed during a read path.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Blobs were mutated but the collection write-back failed. The
    /// in-memory collection has been rolled back to the pre-mutation
    /// snapshot; blob side effects are not reconciled.
    #[error("collection write-back failed: {source}")]
    PersistFailed {
        #[source]
        source: StoreError,
    },
}

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;
