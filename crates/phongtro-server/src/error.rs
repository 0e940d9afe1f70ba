use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use phongtro_catalog::CatalogError;
use phongtro_store::StoreError;
use phongtro_types::TagCatalogError;
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("tag catalog error: {0}")]
    Tags(#[from] TagCatalogError),

    #[error("malformed multipart request: {0}")]
    Multipart(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Catalog(CatalogError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Catalog(CatalogError::NotFound(_)) => StatusCode::NOT_FOUND,
            Self::Catalog(CatalogError::Store(StoreError::Unavailable(_)))
            | Self::Store(StoreError::Unavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Multipart(_) => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

pub type ServerResult<T> = Result<T, ServerError>;
