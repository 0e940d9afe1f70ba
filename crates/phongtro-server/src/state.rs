use std::sync::Arc;

use phongtro_catalog::ListingRepository;
use phongtro_types::TagCatalog;

/// Shared state injected into every request handler.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<ListingRepository>,
    pub tags: Arc<TagCatalog>,
}

impl AppState {
    pub fn new(repository: Arc<ListingRepository>, tags: TagCatalog) -> Self {
        Self {
            repository,
            tags: Arc::new(tags),
        }
    }
}
