//! Foundation types for the phongtro room-rental catalog.
//!
//! This crate provides the data model shared by every other phongtro crate.
//!
//! # Key Types
//!
//! - [`Listing`]: a single room-rental record with location, price, tags,
//!   and image locators
//! - [`TagCatalog`]: the read-only tag definitions loaded once at startup

pub mod listing;
pub mod tags;

pub use listing::Listing;
pub use tags::{TagCatalog, TagCatalogError};
