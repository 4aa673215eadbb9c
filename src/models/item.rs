//! Catalog item model
//!
//! An item is a catalog entry with a finite copy count. Catalog metadata is
//! owned by the external catalog; the circulation core owns `available` and
//! mutates it only through the item store's counter operations.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Item {
    pub id: i64,
    pub isbn: String,
    pub title: String,
    pub author: String,
    /// Total copies owned by the library, at least 1
    pub total_copies: u32,
    /// Copies currently on the shelf, always within `0..=total_copies`
    pub available: u32,
}

/// Seed data for registering an item with the store
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NewItem {
    pub isbn: String,
    pub title: String,
    pub author: String,
    pub total_copies: u32,
}
