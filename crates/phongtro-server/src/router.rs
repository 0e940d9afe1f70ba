use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handler;
use crate::state::AppState;

/// Build the axum router with all catalog endpoints.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(handler::health))
        .route("/districts", get(handler::districts))
        .route("/wards", get(handler::wards))
        .route("/rooms", get(handler::rooms).post(handler::create_room))
        .route("/rooms/:roomId", delete(handler::delete_room))
        .route("/tags", get(handler::tags))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
