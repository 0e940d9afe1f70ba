//! Pure filter and aggregation functions over a collection snapshot.
//!
//! Everything here is stateless: callers pass the listings they got from a
//! repository reload and get back counts or filtered sets. An empty
//! collection or an unknown district/ward yields empty results, never an
//! error.

use phongtro_types::Listing;
use serde::Serialize;

/// The fixed price boundary between the two buckets, in VND.
pub const PRICE_THRESHOLD: u64 = 4_000_000;

/// Named price-bucket predicate.
///
/// The two-bucket model and the 4M threshold are fixed business rules, not
/// configuration. Any unrecognized or absent tag means no price filtering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PriceRange {
    /// `under-4m`: price strictly below the threshold.
    Under4m,
    /// `over-4m`: price at or above the threshold.
    Over4m,
    /// No price constraint.
    #[default]
    Any,
}

impl PriceRange {
    /// Resolve a `priceRange` query value.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("under-4m") => Self::Under4m,
            Some("over-4m") => Self::Over4m,
            _ => Self::Any,
        }
    }

    /// Whether `price` falls inside this bucket.
    pub fn matches(&self, price: u64) -> bool {
        match self {
            Self::Under4m => price < PRICE_THRESHOLD,
            Self::Over4m => price >= PRICE_THRESHOLD,
            Self::Any => true,
        }
    }
}

/// One district or ward entry in an aggregate response.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AreaCount {
    pub name: String,
    #[serde(rename = "roomCount")]
    pub room_count: usize,
}

fn bump(counts: &mut Vec<AreaCount>, name: &str) {
    match counts.iter_mut().find(|c| c.name == name) {
        Some(entry) => entry.room_count += 1,
        None => counts.push(AreaCount {
            name: name.to_string(),
            room_count: 1,
        }),
    }
}

/// Listings per district under the price predicate, in first-seen order.
/// Districts with no matching listings are omitted.
pub fn district_counts(rooms: &[Listing], range: PriceRange) -> Vec<AreaCount> {
    let mut counts = Vec::new();
    for room in rooms {
        if range.matches(room.price) {
            bump(&mut counts, &room.district);
        }
    }
    counts
}

/// Listings per ward within `district` under the price predicate, in
/// first-seen order.
pub fn ward_counts(rooms: &[Listing], district: &str, range: PriceRange) -> Vec<AreaCount> {
    let mut counts = Vec::new();
    for room in rooms {
        if room.district == district && range.matches(room.price) {
            bump(&mut counts, &room.ward);
        }
    }
    counts
}

fn selector_matches(selector: Option<&str>, value: &str) -> bool {
    match selector {
        None | Some("") => true,
        Some(wanted) => wanted == value,
    }
}

/// Listings matching all provided non-empty selectors and the price
/// predicate, in collection order. An absent or empty selector matches
/// everything for that dimension.
pub fn filter_listings(
    rooms: &[Listing],
    district: Option<&str>,
    ward: Option<&str>,
    range: PriceRange,
) -> Vec<Listing> {
    rooms
        .iter()
        .filter(|room| {
            selector_matches(district, &room.district)
                && selector_matches(ward, &room.ward)
                && range.matches(room.price)
        })
        .cloned()
        .collect()
}
