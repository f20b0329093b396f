//! Database operations for the shopping list `PostgreSQL` database.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `store_location` - Areas of the store, in walking order
//! - `product` - Product catalog (each product sits in one location)
//! - `weekly_shop` - One shopping list per week, keyed by `shop_date`
//! - `weekly_shop_item` - Lines on a list (`quantity >= 0`)
//!
//! Sessions live in `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p weekly-shop-cli -- migrate
//! ```

pub mod weekly_shops;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use weekly_shops::PgWeeklyShopRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// A referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// A value cannot be stored (e.g., a quantity beyond the column range).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The database did not answer in time.
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
