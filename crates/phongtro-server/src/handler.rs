use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use phongtro_catalog::{
    district_counts, filter_listings, ward_counts, AreaCount, ImageUpload, ListingDraft,
    PriceRange,
};
use phongtro_types::Listing;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::{ServerError, ServerResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct BrowseQuery {
    pub district: Option<String>,
    pub ward: Option<String>,
    #[serde(rename = "priceRange")]
    pub price_range: Option<String>,
}

/// GET `/districts?priceRange=`: one entry per district with matching
/// listings, in first-seen order.
pub async fn districts(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ServerResult<Json<Vec<AreaCount>>> {
    let rooms = state.repository.reload().await?;
    let range = PriceRange::from_tag(query.price_range.as_deref());
    Ok(Json(district_counts(&rooms, range)))
}

/// GET `/wards?district=&priceRange=`: ward counts within a district.
/// An absent district matches nothing, mirroring the filter semantics.
pub async fn wards(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ServerResult<Json<Vec<AreaCount>>> {
    let rooms = state.repository.reload().await?;
    let range = PriceRange::from_tag(query.price_range.as_deref());
    let district = query.district.unwrap_or_default();
    Ok(Json(ward_counts(&rooms, &district, range)))
}

/// GET `/rooms?district=&ward=&priceRange=`: filtered listings in
/// collection order.
pub async fn rooms(
    State(state): State<AppState>,
    Query(query): Query<BrowseQuery>,
) -> ServerResult<Json<Vec<Listing>>> {
    let rooms = state.repository.reload().await?;
    let range = PriceRange::from_tag(query.price_range.as_deref());
    Ok(Json(filter_listings(
        &rooms,
        query.district.as_deref(),
        query.ward.as_deref(),
        range,
    )))
}

/// GET `/tags`: the tag catalog, as loaded at startup.
pub async fn tags(State(state): State<AppState>) -> Json<Value> {
    Json(state.tags.definitions().clone())
}

/// GET `/health`.
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// POST `/rooms`: multipart form create.
///
/// Text fields fill the [`ListingDraft`]; every `images` part becomes an
/// upload candidate (the repository applies the extension allow-list).
pub async fn create_room(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<(StatusCode, Json<Value>)> {
    let mut draft = ListingDraft::default();
    let mut images = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "images" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ServerError::Multipart(e.to_string()))?;
            if !file_name.is_empty() {
                images.push(ImageUpload { file_name, bytes });
            }
            continue;
        }
        let text = field
            .text()
            .await
            .map_err(|e| ServerError::Multipart(e.to_string()))?;
        match name.as_str() {
            "folderName" => draft.folder_name = text,
            "roomId" => draft.room_id = text,
            "district" => draft.district = text,
            "districtLabel" => draft.district_label = text,
            "ward" => draft.ward = text,
            "wardLabel" => draft.ward_label = text,
            "price" => draft.price = text,
            "tags" => draft.tags = text,
            "note" => draft.note = Some(text),
            unknown => tracing::debug!(field = unknown, "ignoring unknown form field"),
        }
    }

    let listing = state.repository.create(draft, images).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Room created", "roomId": listing.room_id })),
    ))
}

/// DELETE `/rooms/:roomId`.
pub async fn delete_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> ServerResult<Json<Value>> {
    state.repository.delete(&room_id).await?;
    Ok(Json(json!({ "message": "Room deleted" })))
}
