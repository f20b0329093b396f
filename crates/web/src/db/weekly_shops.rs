//! `PostgreSQL` implementation of [`WeeklyShopRepository`].
//!
//! Queries are built at runtime with `sqlx::query_as` and mapped through
//! internal `FromRow` row types. Every call is bounded by the configured
//! store timeout.

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use weekly_shop_core::{
    Product, ProductId, StoreLocation, StoreLocationId, WeeklyShop, WeeklyShopId, WeeklyShopItem,
    WeeklyShopItemId, WeeklyShopRecord, WeeklyShopRepository,
};

use super::RepositoryError;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for list queries.
#[derive(Debug, sqlx::FromRow)]
struct WeeklyShopRow {
    id: i32,
    shop_date: DateTime<Utc>,
}

impl From<WeeklyShopRow> for WeeklyShopRecord {
    fn from(row: WeeklyShopRow) -> Self {
        Self {
            id: WeeklyShopId::new(row.id),
            shop_date: row.shop_date,
        }
    }
}

/// Internal row type for a product joined with its location.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    product_id: i32,
    product_name: String,
    category: Option<String>,
    unit: Option<String>,
    location_id: i32,
    location_name: String,
    aisle: Option<String>,
    sort_order: i32,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.product_id),
            name: row.product_name,
            category: row.category,
            unit: row.unit,
            location: StoreLocation {
                id: StoreLocationId::new(row.location_id),
                name: row.location_name,
                aisle: row.aisle,
                sort_order: row.sort_order,
            },
        }
    }
}

/// Internal row type for a list item with its product.
#[derive(Debug, sqlx::FromRow)]
struct ItemRow {
    item_id: i32,
    quantity: i32,
    #[sqlx(flatten)]
    product: ProductRow,
}

impl TryFrom<ItemRow> for WeeklyShopItem {
    type Error = RepositoryError;

    fn try_from(row: ItemRow) -> Result<Self, Self::Error> {
        let quantity = u32::try_from(row.quantity).map_err(|_| {
            RepositoryError::DataCorruption(format!(
                "negative quantity {} on item {}",
                row.quantity, row.item_id
            ))
        })?;

        Ok(Self {
            id: WeeklyShopItemId::new(row.item_id),
            quantity,
            product: row.product.into(),
        })
    }
}

/// Columns selected for a product joined with its location (aliases `p`, `l`).
const PRODUCT_COLUMNS: &str = r"
    p.id AS product_id, p.name AS product_name, p.category, p.unit,
    l.id AS location_id, l.name AS location_name, l.aisle, l.sort_order";

/// Convert a domain quantity into the `INTEGER` column type.
fn quantity_column(quantity: u32) -> Result<i32, RepositoryError> {
    i32::try_from(quantity)
        .map_err(|_| RepositoryError::InvalidInput(format!("quantity {quantity} is too large")))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for shopping lists stored in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgWeeklyShopRepository {
    pool: PgPool,
    timeout: Duration,
}

impl PgWeeklyShopRepository {
    /// Create a new repository whose calls give up after `timeout`.
    #[must_use]
    pub const fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    /// Run a store call, failing with `Timeout` if it takes too long.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, RepositoryError>>,
    ) -> Result<T, RepositoryError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(operation, timeout = ?self.timeout, "store call timed out");
                Err(RepositoryError::Timeout(self.timeout))
            })
    }

    async fn fetch_items(&self, shop_id: i32) -> Result<Vec<WeeklyShopItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, ItemRow>(&format!(
            r"
            SELECT i.id AS item_id, i.quantity, {PRODUCT_COLUMNS}
            FROM shop.weekly_shop_item i
            JOIN shop.product p ON p.id = i.product_id
            JOIN shop.store_location l ON l.id = p.location_id
            WHERE i.weekly_shop_id = $1
            ORDER BY i.id
            "
        ))
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(WeeklyShopItem::try_from).collect()
    }

    async fn find_current(
        &self,
        week_start: DateTime<Utc>,
    ) -> Result<Option<WeeklyShop>, RepositoryError> {
        let row = sqlx::query_as::<_, WeeklyShopRow>(
            r"
            SELECT id, shop_date
            FROM shop.weekly_shop
            WHERE shop_date >= $1
            ORDER BY shop_date DESC, id DESC
            LIMIT 1
            ",
        )
        .bind(week_start)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.fetch_items(row.id).await?;
        Ok(Some(WeeklyShop {
            items,
            ..WeeklyShop::from_record(row.into())
        }))
    }

    async fn insert_list(&self, shop_date: DateTime<Utc>) -> Result<WeeklyShopRecord, RepositoryError> {
        let row = sqlx::query_as::<_, WeeklyShopRow>(
            r"
            INSERT INTO shop.weekly_shop (shop_date)
            VALUES ($1)
            RETURNING id, shop_date
            ",
        )
        .bind(shop_date)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn insert_item(
        &self,
        shop_id: WeeklyShopId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<WeeklyShopItem, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(&format!(
            r"
            WITH inserted AS (
                INSERT INTO shop.weekly_shop_item (weekly_shop_id, product_id, quantity)
                VALUES ($1, $2, $3)
                RETURNING id, product_id, quantity
            )
            SELECT inserted.id AS item_id, inserted.quantity, {PRODUCT_COLUMNS}
            FROM inserted
            JOIN shop.product p ON p.id = inserted.product_id
            JOIN shop.store_location l ON l.id = p.location_id
            "
        ))
        .bind(shop_id)
        .bind(product_id)
        .bind(quantity_column(quantity)?)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        WeeklyShopItem::try_from(row)
    }

    async fn delete_item(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            DELETE FROM shop.weekly_shop_item
            WHERE id = $1 AND weekly_shop_id = $2
            ",
        )
        .bind(item_id)
        .bind(shop_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn update_quantity(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
        quantity: u32,
    ) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r"
            UPDATE shop.weekly_shop_item
            SET quantity = $3, updated_at = now()
            WHERE id = $1 AND weekly_shop_id = $2
            ",
        )
        .bind(item_id)
        .bind(shop_id)
        .bind(quantity_column(quantity)?)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn fetch_products(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            r"
            SELECT {PRODUCT_COLUMNS}
            FROM shop.product p
            JOIN shop.store_location l ON l.id = p.location_id
            ORDER BY l.sort_order, p.name
            "
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Product::from).collect())
    }
}

impl WeeklyShopRepository for PgWeeklyShopRepository {
    type Error = RepositoryError;

    #[instrument(skip(self))]
    async fn find_current_list(
        &self,
        week_start: DateTime<Utc>,
    ) -> Result<Option<WeeklyShop>, Self::Error> {
        self.bounded("find_current_list", self.find_current(week_start))
            .await
    }

    #[instrument(skip(self))]
    async fn create_list(&self, shop_date: DateTime<Utc>) -> Result<WeeklyShopRecord, Self::Error> {
        self.bounded("create_list", self.insert_list(shop_date)).await
    }

    #[instrument(skip(self))]
    async fn add_item(
        &self,
        shop_id: WeeklyShopId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<WeeklyShopItem, Self::Error> {
        self.bounded("add_item", self.insert_item(shop_id, product_id, quantity))
            .await
    }

    #[instrument(skip(self))]
    async fn remove_item(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
    ) -> Result<bool, Self::Error> {
        self.bounded("remove_item", self.delete_item(shop_id, item_id))
            .await
    }

    #[instrument(skip(self))]
    async fn set_item_quantity(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
        quantity: u32,
    ) -> Result<bool, Self::Error> {
        self.bounded(
            "set_item_quantity",
            self.update_quantity(shop_id, item_id, quantity),
        )
        .await
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, Self::Error> {
        self.bounded("list_products", self.fetch_products()).await
    }
}
