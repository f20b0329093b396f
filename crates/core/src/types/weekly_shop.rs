//! Weekly shopping lists and their items.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{WeeklyShopId, WeeklyShopItemId};
use super::product::Product;

/// One line on a shopping list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyShopItem {
    pub id: WeeklyShopItemId,
    pub quantity: u32,
    pub product: Product,
}

/// A list row exactly as the store returns it after an insert.
///
/// Inserts do not expand items, so this carries no item field at all. Use
/// [`WeeklyShop::from_record`] to turn it into a list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyShopRecord {
    pub id: WeeklyShopId,
    pub shop_date: DateTime<Utc>,
}

/// One week's shopping list with its items, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyShop {
    pub id: WeeklyShopId,
    pub shop_date: DateTime<Utc>,
    pub items: Vec<WeeklyShopItem>,
}

impl WeeklyShop {
    /// A freshly created list: the stored row plus an empty item sequence.
    #[must_use]
    pub const fn from_record(record: WeeklyShopRecord) -> Self {
        Self {
            id: record.id,
            shop_date: record.shop_date,
            items: Vec::new(),
        }
    }

    /// Look up an item by ID.
    #[must_use]
    pub fn item(&self, id: WeeklyShopItemId) -> Option<&WeeklyShopItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Copy of this list without the item `id`.
    ///
    /// Unknown IDs leave the items unchanged.
    #[must_use]
    pub fn without_item(&self, id: WeeklyShopItemId) -> Self {
        Self {
            items: self
                .items
                .iter()
                .filter(|item| item.id != id)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Copy of this list with the quantity of item `id` replaced.
    ///
    /// Unknown IDs leave the items unchanged.
    #[must_use]
    pub fn with_quantity(&self, id: WeeklyShopItemId, quantity: u32) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|item| {
                    if item.id == id {
                        WeeklyShopItem {
                            quantity,
                            ..item.clone()
                        }
                    } else {
                        item.clone()
                    }
                })
                .collect(),
            ..self.clone()
        }
    }

    /// Copy of this list with `item` appended.
    ///
    /// An item whose ID is already on the list is ignored.
    #[must_use]
    pub fn with_item(&self, item: WeeklyShopItem) -> Self {
        let mut next = self.clone();
        if self.item(item.id).is_none() {
            next.items.push(item);
        }
        next
    }

    /// Total number of units across all items.
    #[must_use]
    pub fn total_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::types::{ProductId, StoreLocation, StoreLocationId};

    fn product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: Some("Pantry".to_string()),
            unit: None,
            location: StoreLocation {
                id: StoreLocationId::new(1),
                name: "Aisle 1".to_string(),
                aisle: Some("1".to_string()),
                sort_order: 1,
            },
        }
    }

    fn item(id: i32, quantity: u32) -> WeeklyShopItem {
        WeeklyShopItem {
            id: WeeklyShopItemId::new(id),
            quantity,
            product: product(id * 10, &format!("Product {id}")),
        }
    }

    fn shop() -> WeeklyShop {
        WeeklyShop {
            id: WeeklyShopId::new(1),
            shop_date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
            items: vec![item(1, 2), item(2, 5)],
        }
    }

    fn quantities(shop: &WeeklyShop) -> Vec<(i32, u32)> {
        shop.items
            .iter()
            .map(|item| (item.id.as_i32(), item.quantity))
            .collect()
    }

    #[test]
    fn test_without_item_removes_matching_id() {
        let next = shop().without_item(WeeklyShopItemId::new(1));
        assert_eq!(quantities(&next), vec![(2, 5)]);
    }

    #[test]
    fn test_without_item_unknown_id_is_noop() {
        let original = shop();
        let next = original.without_item(WeeklyShopItemId::new(99));
        assert_eq!(next, original);
    }

    #[test]
    fn test_with_quantity_replaces_only_quantity() {
        let original = shop();
        let next = original.with_quantity(WeeklyShopItemId::new(2), 9);
        assert_eq!(quantities(&next), vec![(1, 2), (2, 9)]);

        let before = original.item(WeeklyShopItemId::new(2)).unwrap();
        let after = next.item(WeeklyShopItemId::new(2)).unwrap();
        assert_eq!(after.product, before.product);
        assert_eq!(after.id, before.id);
    }

    #[test]
    fn test_with_quantity_unknown_id_is_noop() {
        let original = shop();
        assert_eq!(original.with_quantity(WeeklyShopItemId::new(99), 3), original);
    }

    #[test]
    fn test_patches_leave_original_untouched() {
        let original = shop();
        let _ = original.without_item(WeeklyShopItemId::new(1));
        let _ = original.with_quantity(WeeklyShopItemId::new(1), 40);
        assert_eq!(quantities(&original), vec![(1, 2), (2, 5)]);
    }

    #[test]
    fn test_with_item_appends_and_skips_duplicates() {
        let next = shop().with_item(item(3, 1));
        assert_eq!(quantities(&next), vec![(1, 2), (2, 5), (3, 1)]);

        let again = next.with_item(item(3, 7));
        assert_eq!(again, next);
    }

    #[test]
    fn test_from_record_has_no_items() {
        let record = WeeklyShopRecord {
            id: WeeklyShopId::new(5),
            shop_date: Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap(),
        };
        let shop = WeeklyShop::from_record(record);
        assert_eq!(shop.id, record.id);
        assert!(shop.items.is_empty());
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(shop().total_quantity(), 7);
    }
}
