//! The storage seam for shopping lists.
//!
//! The list view never talks to a database directly. It goes through
//! [`WeeklyShopRepository`], which the web crate implements for `PostgreSQL`
//! and which [`memory::InMemoryShopRepository`] implements for tests.

#[cfg(any(test, feature = "testing"))]
pub mod memory;

use std::future::Future;

use chrono::{DateTime, Utc};

use crate::types::{
    Product, ProductId, WeeklyShop, WeeklyShopId, WeeklyShopItem, WeeklyShopItemId,
    WeeklyShopRecord,
};

/// Typed access to the remote list store.
///
/// "No current list" is `Ok(None)`, never an error.
pub trait WeeklyShopRepository: Send + Sync {
    /// Error returned by every store operation.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The most recent list with `shop_date >= week_start`, expanded with its
    /// items (ordered by item ID), their products and store locations.
    fn find_current_list(
        &self,
        week_start: DateTime<Utc>,
    ) -> impl Future<Output = Result<Option<WeeklyShop>, Self::Error>> + Send;

    /// Insert a new list dated `shop_date` and return the stored row.
    fn create_list(
        &self,
        shop_date: DateTime<Utc>,
    ) -> impl Future<Output = Result<WeeklyShopRecord, Self::Error>> + Send;

    /// Put `quantity` of a product on a list and return the new item.
    fn add_item(
        &self,
        shop_id: WeeklyShopId,
        product_id: ProductId,
        quantity: u32,
    ) -> impl Future<Output = Result<WeeklyShopItem, Self::Error>> + Send;

    /// Delete an item from a list. Returns false if the list has no such item.
    fn remove_item(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Change an item's quantity. Returns false if the list has no such item.
    fn set_item_quantity(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
        quantity: u32,
    ) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// The product catalog, in store walking order.
    fn list_products(&self) -> impl Future<Output = Result<Vec<Product>, Self::Error>> + Send;
}

/// Result of looking up the current list.
#[derive(Debug)]
pub enum LoadOutcome<E> {
    /// A list exists for this week.
    Found(WeeklyShop),
    /// No list exists for this week yet.
    NotFound,
    /// The store could not be queried.
    Failed(E),
}

impl<E> From<Result<Option<WeeklyShop>, E>> for LoadOutcome<E> {
    fn from(result: Result<Option<WeeklyShop>, E>) -> Self {
        match result {
            Ok(Some(shop)) => Self::Found(shop),
            Ok(None) => Self::NotFound,
            Err(e) => Self::Failed(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("boom")]
    struct Boom;

    #[test]
    fn test_load_outcome_from_result() {
        let shop = WeeklyShop {
            id: WeeklyShopId::new(1),
            shop_date: Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap(),
            items: Vec::new(),
        };

        assert!(matches!(
            LoadOutcome::<Boom>::from(Ok(Some(shop))),
            LoadOutcome::Found(s) if s.id == WeeklyShopId::new(1)
        ));
        assert!(matches!(
            LoadOutcome::<Boom>::from(Ok(None)),
            LoadOutcome::NotFound
        ));
        assert!(matches!(
            LoadOutcome::from(Err::<Option<WeeklyShop>, _>(Boom)),
            LoadOutcome::Failed(Boom)
        ));
    }
}
