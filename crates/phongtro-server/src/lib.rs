//! HTTP server for the phongtro room-rental catalog.
//!
//! Thin axum wrappers over the listing repository and the filter engine:
//! browse endpoints reload the collection and aggregate it, mutation
//! endpoints drive the repository's create/delete paths, and the static
//! frontend is served as the router fallback.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;
pub mod state;

pub use config::{ServerConfig, StorageConfig};
pub use error::{ServerError, ServerResult};
pub use server::CatalogServer;
pub use state::AppState;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use phongtro_catalog::ListingRepository;
    use phongtro_store::{CollectionStore, InMemoryBlobStore, InMemoryCollectionStore};
    use phongtro_types::{Listing, TagCatalog};
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    use super::*;

    const BOUNDARY: &str = "X-PHONGTRO-TEST-BOUNDARY";

    fn listing(room_id: &str, district: &str, ward: &str, price: u64) -> Listing {
        Listing {
            room_id: room_id.into(),
            district: district.into(),
            district_label: district.to_uppercase(),
            ward: ward.into(),
            ward_label: ward.to_uppercase(),
            price,
            tags: vec![],
            note: String::new(),
            images: vec![],
        }
    }

    struct Fixture {
        app: Router,
        collection: Arc<InMemoryCollectionStore>,
    }

    fn fixture(rooms: Vec<Listing>) -> Fixture {
        let collection = Arc::new(InMemoryCollectionStore::with_rooms(rooms));
        let repository = Arc::new(ListingRepository::new(
            Arc::new(InMemoryBlobStore::new()),
            collection.clone(),
        ));
        let tags = TagCatalog::from_value(json!({
            "may-lanh": {"label": "Máy lạnh"}
        }))
        .unwrap();
        let app = router::build_router(AppState::new(repository, tags), 8 * 1024 * 1024);
        Fixture { app, collection }
    }

    fn seeded() -> Fixture {
        fixture(vec![
            listing("r1", "tan-binh", "phuong-1", 3_000_000),
            listing("r2", "tan-binh", "phuong-3", 5_000_000),
            listing("r3", "tan-phu", "phuong-5", 1_000_000),
        ])
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn text_part(name: &str, value: &str) -> String {
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        )
    }

    fn multipart_create_body(fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(text_part(name, value).as_bytes());
        }
        for (file_name, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"images\"; \
                     filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn post_create(app: Router, fields: &[(&str, &str)], files: &[(&str, &[u8])]) -> (StatusCode, Value) {
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/rooms")
                    .header(
                        header::CONTENT_TYPE,
                        format!("multipart/form-data; boundary={BOUNDARY}"),
                    )
                    .body(Body::from(multipart_create_body(fields, files)))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn create_fields<'a>(room_id: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("folderName", room_id),
            ("roomId", room_id),
            ("district", "tan-binh"),
            ("districtLabel", "Tân Bình"),
            ("ward", "phuong-1"),
            ("wardLabel", "Phường 1"),
            ("price", "3500000"),
            ("tags", r#"["may-lanh"]"#),
            ("note", "gần chợ"),
        ]
    }

    #[tokio::test]
    async fn health_endpoint() {
        let f = fixture(vec![]);
        let (status, body) = get_json(f.app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn districts_counts_and_price_filter() {
        let f = seeded();
        let (status, body) = get_json(f.app.clone(), "/districts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"name": "tan-binh", "roomCount": 2},
                {"name": "tan-phu", "roomCount": 1}
            ])
        );

        let (_, body) = get_json(f.app, "/districts?priceRange=under-4m").await;
        assert_eq!(
            body,
            json!([
                {"name": "tan-binh", "roomCount": 1},
                {"name": "tan-phu", "roomCount": 1}
            ])
        );
    }

    #[tokio::test]
    async fn wards_scoped_to_district() {
        let f = seeded();
        let (status, body) = get_json(f.app.clone(), "/wards?district=tan-binh").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!([
                {"name": "phuong-1", "roomCount": 1},
                {"name": "phuong-3", "roomCount": 1}
            ])
        );

        // Absent district matches nothing, not an error.
        let (status, body) = get_json(f.app, "/wards").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn rooms_filtering() {
        let f = seeded();
        let (_, body) = get_json(f.app.clone(), "/rooms").await;
        assert_eq!(body.as_array().unwrap().len(), 3);

        let (_, body) =
            get_json(f.app, "/rooms?district=tan-binh&ward=phuong-3&priceRange=over-4m").await;
        let rooms = body.as_array().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0]["roomId"], "r2");
    }

    #[tokio::test]
    async fn tags_served_as_loaded() {
        let f = fixture(vec![]);
        let (status, body) = get_json(f.app, "/tags").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["may-lanh"]["label"], "Máy lạnh");
    }

    #[tokio::test]
    async fn create_then_read() {
        let f = fixture(vec![]);
        let (status, body) = post_create(
            f.app.clone(),
            &create_fields("tan-binh-p1-09"),
            &[("a.jpg", b"jpegdata"), ("b.png", b"pngdata")],
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["roomId"], "tan-binh-p1-09");

        let (_, body) = get_json(f.app, "/rooms").await;
        let rooms = body.as_array().unwrap();
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0]["roomId"], "tan-binh-p1-09");
        assert_eq!(
            rooms[0]["images"],
            json!([
                "memory://tan-binh-p1-09/1.jpg",
                "memory://tan-binh-p1-09/2.png"
            ])
        );
    }

    #[tokio::test]
    async fn create_with_bad_price_is_400() {
        let f = fixture(vec![]);
        let mut fields = create_fields("r1");
        fields.retain(|(name, _)| *name != "price");
        fields.push(("price", "cheap"));
        let (status, body) = post_create(f.app, &fields, &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("price"));
    }

    #[tokio::test]
    async fn delete_then_404() {
        let f = seeded();
        let delete = |app: Router| async move {
            app.oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/rooms/r1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap()
        };

        let response = delete(f.app.clone()).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(f.collection.load().await.unwrap().len(), 2);

        let response = delete(f.app).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn read_propagates_storage_failure() {
        let collection = Arc::new(phongtro_store::LocalCollectionStore::new(
            "/nonexistent/rooms.json",
        ));
        let repository = Arc::new(ListingRepository::new(
            Arc::new(InMemoryBlobStore::new()),
            collection,
        ));
        let app = router::build_router(
            AppState::new(repository, TagCatalog::empty()),
            1024 * 1024,
        );
        let (status, body) = get_json(app, "/districts").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("unavailable"));
    }
}
