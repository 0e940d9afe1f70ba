/// Errors from blob and collection store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing store (or the object it should hold) cannot be reached.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The persisted collection does not parse as a listing array.
    #[error("corrupt collection: {0}")]
    Corrupt(String),

    /// Serialization failure while writing the collection.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the local filesystem backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error reported by the remote object store.
    #[error("object store error: {0}")]
    Backend(String),
}

impl From<object_store::Error> for StoreError {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => {
                StoreError::Unavailable(format!("object not found: {path}"))
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
