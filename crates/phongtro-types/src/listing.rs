use serde::{Deserialize, Serialize};

/// A single room-rental record.
///
/// Listings serialize with the original camelCase wire names (`roomId`,
/// `districtLabel`, ...) so the persisted `rooms.json` array and the HTTP
/// responses stay byte-compatible with existing data.
///
/// `room_id` is the primary key and doubles as the image-storage path
/// segment. Uniqueness is advisory: nothing rejects a duplicate id on
/// insert, and deletion resolves duplicates by first match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    /// Caller-supplied unique identifier, immutable once created.
    pub room_id: String,
    /// District code (e.g. `tan-binh`).
    pub district: String,
    /// Human-readable district name (e.g. `Tân Bình`).
    pub district_label: String,
    /// Ward code within the district (e.g. `phuong-1`).
    pub ward: String,
    /// Human-readable ward name (e.g. `Phường 1`).
    pub ward_label: String,
    /// Monthly rent in whole VND.
    pub price: u64,
    /// Tag identifiers, expected to resolve against the tag catalog.
    /// Unresolvable tags are preserved, not validated.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Free-text note, empty when absent.
    #[serde(default)]
    pub note: String,
    /// Image locators in upload order; the 1-based upload index is embedded
    /// in each filename.
    #[serde(default)]
    pub images: Vec<String>,
}

impl Listing {
    /// Storage prefix under which this listing's image blobs live.
    pub fn storage_prefix(&self) -> &str {
        &self.room_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_camel_case_names() {
        let listing = Listing {
            room_id: "tan-binh-p1-01".into(),
            district: "tan-binh".into(),
            district_label: "Tân Bình".into(),
            ward: "phuong-1".into(),
            ward_label: "Phường 1".into(),
            price: 3_500_000,
            tags: vec!["may-lanh".into()],
            note: String::new(),
            images: vec!["/images/tan-binh-p1-01/1.jpg".into()],
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(json["roomId"], "tan-binh-p1-01");
        assert_eq!(json["districtLabel"], "Tân Bình");
        assert_eq!(json["wardLabel"], "Phường 1");
        assert_eq!(json["price"], 3_500_000);
    }

    #[test]
    fn optional_fields_default_on_deserialize() {
        let json = r#"{
            "roomId": "r1",
            "district": "tan-phu",
            "districtLabel": "Tân Phú",
            "ward": "phuong-3",
            "wardLabel": "Phường 3",
            "price": 4200000
        }"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert!(listing.tags.is_empty());
        assert!(listing.note.is_empty());
        assert!(listing.images.is_empty());
    }

    #[test]
    fn roundtrip_preserves_image_order() {
        let listing = Listing {
            room_id: "r2".into(),
            district: "d".into(),
            district_label: "D".into(),
            ward: "w".into(),
            ward_label: "W".into(),
            price: 1,
            tags: vec![],
            note: "gác lửng".into(),
            images: vec!["/a/1.jpg".into(), "/a/2.png".into(), "/a/3.webp".into()],
        };
        let json = serde_json::to_string(&listing).unwrap();
        let back: Listing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, listing);
        assert_eq!(back.images[1], "/a/2.png");
    }

    #[test]
    fn storage_prefix_is_room_id() {
        let json = r#"{"roomId":"x","district":"d","districtLabel":"D",
                       "ward":"w","wardLabel":"W","price":0}"#;
        let listing: Listing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.storage_prefix(), "x");
    }
}
