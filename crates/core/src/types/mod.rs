//! Core types for Weekly Shop.
//!
//! This module provides type-safe wrappers for the shopping list domain.

pub mod id;
pub mod notification;
pub mod product;
pub mod weekly_shop;

pub use id::*;
pub use notification::{Notification, NotificationLevel};
pub use product::{Product, StoreLocation};
pub use weekly_shop::{WeeklyShop, WeeklyShopItem, WeeklyShopRecord};
