//! Marketplace public REST API source
//!
//! Searches listings page by page and enriches each one with item details and
//! seller information.

pub mod client;
pub mod models;

pub use client::MeliClient;
pub use models::{Paging, SearchResponse};
