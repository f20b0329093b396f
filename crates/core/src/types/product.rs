//! Product catalog reference data.
//!
//! Products and store locations are read-only from the list view's point of
//! view. They are maintained through `ws-cli seed`.

use serde::{Deserialize, Serialize};

use super::id::{ProductId, StoreLocationId};

/// Where a product sits in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLocation {
    pub id: StoreLocationId,
    /// Display name, e.g. "Dairy".
    pub name: String,
    /// Aisle label, if the store numbers its aisles.
    pub aisle: Option<String>,
    /// Walking order through the store (lower comes first).
    pub sort_order: i32,
}

/// A product that can be put on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: Option<String>,
    /// Unit of sale, e.g. "kg" or "pack".
    pub unit: Option<String>,
    pub location: StoreLocation,
}

impl Product {
    /// Returns true if the product's name, category or location contains
    /// `needle`. The needle must already be lowercased.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self
                .category
                .as_deref()
                .is_some_and(|c| c.to_lowercase().contains(needle))
            || self.location.name.to_lowercase().contains(needle)
    }
}
