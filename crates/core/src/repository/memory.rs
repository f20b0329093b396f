//! In-memory repository for tests.
//!
//! Behaves like the `PostgreSQL` repository (same ordering and filtering
//! rules) and can be told to fail the next lookup or insert.

use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};

use super::WeeklyShopRepository;
use crate::types::{
    Product, ProductId, WeeklyShop, WeeklyShopId, WeeklyShopItem, WeeklyShopItemId,
    WeeklyShopRecord,
};

/// Errors produced by [`InMemoryShopRepository`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryStoreError {
    /// A failure injected with `fail_next_*`.
    #[error("injected failure: {0}")]
    Injected(String),
    #[error("unknown product {0}")]
    UnknownProduct(ProductId),
    #[error("unknown list {0}")]
    UnknownShop(WeeklyShopId),
}

#[derive(Debug, Default)]
struct MemoryState {
    shops: Vec<WeeklyShop>,
    products: Vec<Product>,
    next_shop_id: i32,
    next_item_id: i32,
    fail_find: Option<String>,
    fail_create: Option<String>,
    find_calls: usize,
    create_calls: usize,
}

impl MemoryState {
    fn shop_mut(&mut self, id: WeeklyShopId) -> Option<&mut WeeklyShop> {
        self.shops.iter_mut().find(|shop| shop.id == id)
    }
}

/// A [`WeeklyShopRepository`] backed by a `Vec`.
#[derive(Debug, Default)]
pub struct InMemoryShopRepository {
    state: Mutex<MemoryState>,
}

impl InMemoryShopRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository with a product catalog.
    #[must_use]
    pub fn with_products(products: Vec<Product>) -> Self {
        let repo = Self::new();
        repo.lock().products = products;
        repo
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store a list dated `shop_date` holding `(product, quantity)` lines.
    ///
    /// # Errors
    ///
    /// Returns `UnknownProduct` if a product is not in the catalog.
    pub fn seed_shop(
        &self,
        shop_date: DateTime<Utc>,
        lines: &[(ProductId, u32)],
    ) -> Result<WeeklyShop, MemoryStoreError> {
        let mut state = self.lock();
        state.next_shop_id += 1;
        let mut shop = WeeklyShop {
            id: WeeklyShopId::new(state.next_shop_id),
            shop_date,
            items: Vec::with_capacity(lines.len()),
        };

        for &(product_id, quantity) in lines {
            let product = state
                .products
                .iter()
                .find(|p| p.id == product_id)
                .cloned()
                .ok_or(MemoryStoreError::UnknownProduct(product_id))?;
            state.next_item_id += 1;
            shop.items.push(WeeklyShopItem {
                id: WeeklyShopItemId::new(state.next_item_id),
                quantity,
                product,
            });
        }

        state.shops.push(shop.clone());
        Ok(shop)
    }

    /// Make the next `find_current_list` call fail with `message`.
    pub fn fail_next_find(&self, message: impl Into<String>) {
        self.lock().fail_find = Some(message.into());
    }

    /// Make the next `create_list` call fail with `message`.
    pub fn fail_next_create(&self, message: impl Into<String>) {
        self.lock().fail_create = Some(message.into());
    }

    /// Number of `find_current_list` calls so far.
    #[must_use]
    pub fn find_calls(&self) -> usize {
        self.lock().find_calls
    }

    /// Number of `create_list` calls so far.
    #[must_use]
    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    /// Snapshot of every stored list.
    #[must_use]
    pub fn shops(&self) -> Vec<WeeklyShop> {
        self.lock().shops.clone()
    }
}

impl WeeklyShopRepository for InMemoryShopRepository {
    type Error = MemoryStoreError;

    async fn find_current_list(
        &self,
        week_start: DateTime<Utc>,
    ) -> Result<Option<WeeklyShop>, Self::Error> {
        let mut state = self.lock();
        state.find_calls += 1;
        if let Some(message) = state.fail_find.take() {
            return Err(MemoryStoreError::Injected(message));
        }

        let mut found = state
            .shops
            .iter()
            .filter(|shop| shop.shop_date >= week_start)
            .max_by_key(|shop| shop.shop_date)
            .cloned();
        if let Some(shop) = found.as_mut() {
            shop.items.sort_by_key(|item| item.id);
        }
        Ok(found)
    }

    async fn create_list(&self, shop_date: DateTime<Utc>) -> Result<WeeklyShopRecord, Self::Error> {
        let mut state = self.lock();
        state.create_calls += 1;
        if let Some(message) = state.fail_create.take() {
            return Err(MemoryStoreError::Injected(message));
        }

        state.next_shop_id += 1;
        let record = WeeklyShopRecord {
            id: WeeklyShopId::new(state.next_shop_id),
            shop_date,
        };
        state.shops.push(WeeklyShop::from_record(record));
        Ok(record)
    }

    async fn add_item(
        &self,
        shop_id: WeeklyShopId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<WeeklyShopItem, Self::Error> {
        let mut state = self.lock();
        let product = state
            .products
            .iter()
            .find(|p| p.id == product_id)
            .cloned()
            .ok_or(MemoryStoreError::UnknownProduct(product_id))?;
        state.next_item_id += 1;
        let item = WeeklyShopItem {
            id: WeeklyShopItemId::new(state.next_item_id),
            quantity,
            product,
        };
        let shop = state
            .shop_mut(shop_id)
            .ok_or(MemoryStoreError::UnknownShop(shop_id))?;
        shop.items.push(item.clone());
        Ok(item)
    }

    async fn remove_item(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
    ) -> Result<bool, Self::Error> {
        let mut state = self.lock();
        let Some(shop) = state.shop_mut(shop_id) else {
            return Ok(false);
        };
        let before = shop.items.len();
        shop.items.retain(|item| item.id != item_id);
        Ok(shop.items.len() != before)
    }

    async fn set_item_quantity(
        &self,
        shop_id: WeeklyShopId,
        item_id: WeeklyShopItemId,
        quantity: u32,
    ) -> Result<bool, Self::Error> {
        let mut state = self.lock();
        let Some(item) = state
            .shop_mut(shop_id)
            .and_then(|shop| shop.items.iter_mut().find(|item| item.id == item_id))
        else {
            return Ok(false);
        };
        item.quantity = quantity;
        Ok(true)
    }

    async fn list_products(&self) -> Result<Vec<Product>, Self::Error> {
        let mut products = self.lock().products.clone();
        products.sort_by(|a, b| {
            a.location
                .sort_order
                .cmp(&b.location.sort_order)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(products)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;
    use crate::types::{StoreLocation, StoreLocationId};

    fn catalog() -> Vec<Product> {
        vec![
            Product {
                id: ProductId::new(1),
                name: "Milk".to_string(),
                category: Some("Dairy".to_string()),
                unit: Some("litre".to_string()),
                location: StoreLocation {
                    id: StoreLocationId::new(2),
                    name: "Fridges".to_string(),
                    aisle: None,
                    sort_order: 20,
                },
            },
            Product {
                id: ProductId::new(2),
                name: "Apples".to_string(),
                category: Some("Fruit".to_string()),
                unit: Some("kg".to_string()),
                location: StoreLocation {
                    id: StoreLocationId::new(1),
                    name: "Produce".to_string(),
                    aisle: Some("1".to_string()),
                    sort_order: 10,
                },
            },
        ]
    }

    fn sunday() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 18, 0, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn test_find_returns_most_recent_list_in_week() {
        let repo = InMemoryShopRepository::with_products(catalog());
        repo.seed_shop(sunday() - Duration::days(3), &[]).unwrap();
        repo.seed_shop(sunday() + Duration::hours(10), &[]).unwrap();
        let latest = repo.seed_shop(sunday() + Duration::days(2), &[]).unwrap();

        let found = repo.find_current_list(sunday()).await.unwrap().unwrap();
        assert_eq!(found.id, latest.id);
    }

    #[tokio::test]
    async fn test_find_ignores_lists_from_previous_weeks() {
        let repo = InMemoryShopRepository::new();
        repo.seed_shop(sunday() - Duration::seconds(1), &[]).unwrap();

        assert!(repo.find_current_list(sunday()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_injected_failure_is_consumed() {
        let repo = InMemoryShopRepository::new();
        repo.fail_next_find("connection reset");

        assert_eq!(
            repo.find_current_list(sunday()).await.unwrap_err(),
            MemoryStoreError::Injected("connection reset".to_string())
        );
        assert!(repo.find_current_list(sunday()).await.unwrap().is_none());
        assert_eq!(repo.find_calls(), 2);
    }

    #[tokio::test]
    async fn test_item_commits() {
        let repo = InMemoryShopRepository::with_products(catalog());
        let shop = repo
            .seed_shop(sunday(), &[(ProductId::new(1), 2)])
            .unwrap();
        let first = shop.items.first().unwrap().id;

        let added = repo.add_item(shop.id, ProductId::new(2), 3).await.unwrap();
        assert!(repo.set_item_quantity(shop.id, added.id, 4).await.unwrap());
        assert!(repo.remove_item(shop.id, first).await.unwrap());
        assert!(!repo.remove_item(shop.id, first).await.unwrap());

        let stored = repo.find_current_list(sunday()).await.unwrap().unwrap();
        assert_eq!(stored.items.len(), 1);
        assert_eq!(stored.items.first().unwrap().quantity, 4);
    }

    #[tokio::test]
    async fn test_list_products_in_walking_order() {
        let repo = InMemoryShopRepository::with_products(catalog());
        let names: Vec<String> = repo
            .list_products()
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Apples", "Milk"]);
    }
}
