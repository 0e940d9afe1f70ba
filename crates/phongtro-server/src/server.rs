use std::sync::Arc;

use phongtro_catalog::ListingRepository;
use phongtro_types::TagCatalog;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

use crate::config::{ServerConfig, StorageConfig};
use crate::error::ServerResult;
use crate::router::build_router;
use crate::state::AppState;

/// The phongtro catalog server.
///
/// Wires the configured storage backend pair into a [`ListingRepository`],
/// loads the tag catalog once, and serves the HTTP surface plus the static
/// frontend assets.
pub struct CatalogServer {
    config: ServerConfig,
    state: AppState,
}

impl CatalogServer {
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let (blobs, collection) = config.storage.build_stores()?;
        let tags = TagCatalog::load(&config.tags_file)?;
        let repository = Arc::new(ListingRepository::new(blobs, collection));
        let state = AppState::new(repository, tags);
        Ok(Self { config, state })
    }

    /// Assemble with pre-built state. Used by tests and embedding.
    pub fn with_state(config: ServerConfig, state: AppState) -> Self {
        Self { config, state }
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Build the full router: API routes, locally stored media (when the
    /// local backend is active), and the static frontend fallback.
    pub fn router(&self) -> axum::Router {
        let mut app = build_router(self.state.clone(), self.config.max_upload_bytes);
        if let StorageConfig::Local {
            media_root,
            media_url_prefix,
            ..
        } = &self.config.storage
        {
            app = app.nest_service(media_url_prefix.as_str(), ServeDir::new(media_root));
        }
        app.fallback_service(ServeDir::new(&self.config.static_dir))
    }

    /// Start serving requests.
    pub async fn serve(self) -> ServerResult<()> {
        let listener = TcpListener::bind(&self.config.bind_addr).await?;
        tracing::info!("phongtro server listening on {}", self.config.bind_addr);
        axum::serve(listener, self.router())
            .await
            .map_err(|e| crate::error::ServerError::Internal(e.to_string()))
    }
}
