//! Integration tests for Weekly Shop.
//!
//! # Running Tests
//!
//! ```bash
//! # Controller flows against the in-memory store
//! cargo test -p weekly-shop-integration-tests
//!
//! # HTTP tests against a running server with a migrated, seeded database
//! cargo run -p weekly-shop-cli -- migrate
//! cargo run -p weekly-shop-cli -- seed crates/cli/seed/catalog.yaml
//! cargo run -p weekly-shop-web &
//! cargo test -p weekly-shop-integration-tests -- --ignored
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use weekly_shop_core::repository::memory::InMemoryShopRepository;
use weekly_shop_core::{Product, ProductId, StoreLocation, StoreLocationId, WeekZone};

/// Base URL of a running server (configurable via environment).
#[must_use]
pub fn base_url() -> String {
    std::env::var("SHOP_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Weeks counted in UTC, so results do not depend on the host zone.
#[must_use]
#[allow(clippy::unwrap_used, clippy::missing_panics_doc)]
pub fn utc_weeks() -> WeekZone {
    WeekZone::Fixed(FixedOffset::east_opt(0).unwrap())
}

/// A Saturday evening, the last day of its week.
#[must_use]
#[allow(clippy::unwrap_used, clippy::missing_panics_doc)]
pub fn saturday_evening() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 24, 21, 45, 0).unwrap()
}

fn location(id: i32, name: &str, sort_order: i32) -> StoreLocation {
    StoreLocation {
        id: StoreLocationId::new(id),
        name: name.to_string(),
        aisle: None,
        sort_order,
    }
}

/// A small catalog: milk and eggs in the fridges, apples in produce.
#[must_use]
pub fn catalog() -> Vec<Product> {
    let fridges = location(1, "Fridges", 60);
    let produce = location(2, "Produce", 10);

    vec![
        Product {
            id: ProductId::new(1),
            name: "Whole Milk".to_string(),
            category: Some("Dairy".to_string()),
            unit: Some("litre".to_string()),
            location: fridges.clone(),
        },
        Product {
            id: ProductId::new(2),
            name: "Free Range Eggs".to_string(),
            category: Some("Eggs".to_string()),
            unit: Some("dozen".to_string()),
            location: fridges,
        },
        Product {
            id: ProductId::new(3),
            name: "Apples".to_string(),
            category: Some("Fruit".to_string()),
            unit: Some("kg".to_string()),
            location: produce,
        },
    ]
}

/// An in-memory store holding [`catalog`].
#[must_use]
pub fn store() -> InMemoryShopRepository {
    InMemoryShopRepository::with_products(catalog())
}
