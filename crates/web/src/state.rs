//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use weekly_shop_core::WeekZone;

use crate::config::ShopConfig;
use crate::db::PgWeeklyShopRepository;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ShopConfig,
    pool: PgPool,
    shops: PgWeeklyShopRepository,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: ShopConfig, pool: PgPool) -> Self {
        let shops = PgWeeklyShopRepository::new(pool.clone(), config.store_timeout);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                shops,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ShopConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The shopping list store.
    #[must_use]
    pub fn shops(&self) -> &PgWeeklyShopRepository {
        &self.inner.shops
    }

    #[must_use]
    pub fn week_zone(&self) -> WeekZone {
        self.inner.config.week_zone
    }
}
