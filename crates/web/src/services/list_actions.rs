//! Request-scoped list actions.
//!
//! Every request builds a fresh [`ListView`], mounts it, then applies one
//! [`ListAction`]. Item actions commit to the store first and only mirror the
//! change into the view once the store accepted it.

use chrono::{DateTime, Utc};
use tracing::instrument;
use weekly_shop_core::{
    Notification, Product, ProductId, WeekZone, WeeklyShopId, WeeklyShopItemId,
    WeeklyShopRepository,
};

use super::list_view::{ListView, TransitionError};

pub const ITEM_ERROR_MESSAGE: &str = "Error updating item";
pub const ITEM_MISSING_MESSAGE: &str = "That item is no longer on the list";
pub const NO_SHOP_MESSAGE: &str = "Create this week's list before adding items";

/// One user action against the week's list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    /// Only render.
    Show,
    Create,
    AddItem {
        product_id: ProductId,
        quantity: u32,
    },
    RemoveItem(WeeklyShopItemId),
    SetQuantity {
        item_id: WeeklyShopItemId,
        quantity: u32,
    },
}

/// Mount a view for the week containing `now` and apply `action` to it.
///
/// Store failures end up as notifications on the returned view.
///
/// # Errors
///
/// Returns `TransitionError` when `Create` is requested while a list already
/// exists.
#[instrument(skip(repo, search_term))]
pub async fn run<R: WeeklyShopRepository>(
    repo: &R,
    zone: WeekZone,
    now: DateTime<Utc>,
    search_term: &str,
    action: ListAction,
) -> Result<ListView, TransitionError> {
    let mut view = ListView::new();
    view.set_search_term(search_term);
    view.mount(repo, zone, now).await;

    match action {
        ListAction::Show => {}
        ListAction::Create => {
            view.create_list(repo, now).await?;
        }
        ListAction::AddItem {
            product_id,
            quantity,
        } => {
            let Some(shop_id) = shop_id(&mut view) else {
                return Ok(view);
            };
            match repo.add_item(shop_id, product_id, quantity).await {
                Ok(item) => view.on_item_added(item),
                Err(e) => item_failed(&mut view, "add", &e),
            }
        }
        ListAction::RemoveItem(item_id) => {
            let Some(shop_id) = shop_id(&mut view) else {
                return Ok(view);
            };
            match repo.remove_item(shop_id, item_id).await {
                // already gone upstream counts as removed
                Ok(_) => view.on_item_removed(item_id),
                Err(e) => item_failed(&mut view, "remove", &e),
            }
        }
        ListAction::SetQuantity { item_id, quantity } => {
            let Some(shop_id) = shop_id(&mut view) else {
                return Ok(view);
            };
            match repo.set_item_quantity(shop_id, item_id, quantity).await {
                Ok(true) => view.on_quantity_changed(item_id, quantity),
                Ok(false) => view.notify(Notification::error(ITEM_MISSING_MESSAGE)),
                Err(e) => item_failed(&mut view, "set quantity", &e),
            }
        }
    }

    Ok(view)
}

/// The shown list's id, or a notification explaining there is none.
fn shop_id(view: &mut ListView) -> Option<WeeklyShopId> {
    let id = view.current_shop().map(|shop| shop.id);
    if id.is_none() {
        view.notify(Notification::error(NO_SHOP_MESSAGE));
    }
    id
}

fn item_failed(view: &mut ListView, operation: &str, error: &dyn std::error::Error) {
    tracing::error!(operation, error = %error, "item commit failed");
    view.notify(Notification::error(ITEM_ERROR_MESSAGE));
}

/// Products for the add-item form. Empty when there is no list to add to or
/// the catalog cannot be read.
pub async fn catalog<R: WeeklyShopRepository>(repo: &R, view: &ListView) -> Vec<Product> {
    if view.current_shop().is_none() {
        return Vec::new();
    }
    repo.list_products().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "failed to load product catalog");
        Vec::new()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, FixedOffset, TimeZone};
    use weekly_shop_core::repository::memory::InMemoryShopRepository;
    use weekly_shop_core::{StoreLocation, StoreLocationId, WeeklyShop};

    use super::*;
    use crate::services::list_view::{CREATE_SUCCESS_MESSAGE, ViewPhase};

    fn utc() -> WeekZone {
        WeekZone::Fixed(FixedOffset::east_opt(0).unwrap())
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap()
    }

    fn product(id: i32, name: &str) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            category: None,
            unit: None,
            location: StoreLocation {
                id: StoreLocationId::new(1),
                name: "Pantry".to_string(),
                aisle: Some("4".to_string()),
                sort_order: 1,
            },
        }
    }

    fn seeded() -> (InMemoryShopRepository, WeeklyShop) {
        let repo =
            InMemoryShopRepository::with_products(vec![product(1, "Rice"), product(2, "Oats")]);
        let shop = repo
            .seed_shop(now() - Duration::hours(1), &[(ProductId::new(1), 1)])
            .unwrap();
        (repo, shop)
    }

    #[tokio::test]
    async fn test_show_applies_search_term() {
        let (repo, _) = seeded();
        let view = run(&repo, utc(), now(), "oats", ListAction::Show)
            .await
            .unwrap();
        assert_eq!(view.search_term(), "oats");
        assert!(view.visible_items().is_empty());
    }

    #[tokio::test]
    async fn test_create_after_empty_mount() {
        let repo = InMemoryShopRepository::new();
        let mut view = run(&repo, utc(), now(), "", ListAction::Create)
            .await
            .unwrap();
        assert!(view.current_shop().unwrap().items.is_empty());
        assert_eq!(
            view.drain_notifications(),
            vec![Notification::success(CREATE_SUCCESS_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_create_with_existing_shop_is_rejected() {
        let (repo, _) = seeded();
        let err = run(&repo, utc(), now(), "", ListAction::Create)
            .await
            .unwrap_err();
        assert_eq!(err, TransitionError::ShopExists);
        assert_eq!(repo.create_calls(), 0);
    }

    #[tokio::test]
    async fn test_add_item_commits_then_mirrors() {
        let (repo, shop) = seeded();
        let view = run(
            &repo,
            utc(),
            now(),
            "",
            ListAction::AddItem {
                product_id: ProductId::new(2),
                quantity: 3,
            },
        )
        .await
        .unwrap();

        let shown = view.current_shop().unwrap();
        assert_eq!(shown.items.len(), 2);
        assert_eq!(shown.items[1].product.name, "Oats");
        assert_eq!(repo.shops()[0].id, shop.id);
        assert_eq!(repo.shops()[0].items.len(), 2);
    }

    #[tokio::test]
    async fn test_add_unknown_product_notifies() {
        let (repo, _) = seeded();
        let view = run(
            &repo,
            utc(),
            now(),
            "",
            ListAction::AddItem {
                product_id: ProductId::new(42),
                quantity: 1,
            },
        )
        .await
        .unwrap();

        assert_eq!(view.current_shop().unwrap().items.len(), 1);
        assert_eq!(view.notifications(), &[Notification::error(ITEM_ERROR_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_item_action_without_shop_notifies() {
        let repo = InMemoryShopRepository::new();
        let view = run(
            &repo,
            utc(),
            now(),
            "",
            ListAction::RemoveItem(WeeklyShopItemId::new(1)),
        )
        .await
        .unwrap();

        assert_eq!(view.phase(), &ViewPhase::NoShop);
        assert_eq!(view.notifications(), &[Notification::error(NO_SHOP_MESSAGE)]);
    }

    #[tokio::test]
    async fn test_remove_and_set_quantity() {
        let (repo, shop) = seeded();
        let item_id = shop.items[0].id;

        let view = run(
            &repo,
            utc(),
            now(),
            "",
            ListAction::SetQuantity {
                item_id,
                quantity: 6,
            },
        )
        .await
        .unwrap();
        assert_eq!(view.current_shop().unwrap().items[0].quantity, 6);

        let view = run(&repo, utc(), now(), "", ListAction::RemoveItem(item_id))
            .await
            .unwrap();
        assert!(view.current_shop().unwrap().items.is_empty());
        assert!(view.notifications().is_empty());

        let view = run(
            &repo,
            utc(),
            now(),
            "",
            ListAction::SetQuantity {
                item_id,
                quantity: 2,
            },
        )
        .await
        .unwrap();
        assert_eq!(
            view.notifications(),
            &[Notification::error(ITEM_MISSING_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_catalog_only_with_shop() {
        let (repo, _) = seeded();
        let with_shop = run(&repo, utc(), now(), "", ListAction::Show).await.unwrap();
        assert_eq!(catalog(&repo, &with_shop).await.len(), 2);

        let empty = InMemoryShopRepository::with_products(vec![product(1, "Rice")]);
        let without_shop = run(&empty, utc(), now(), "", ListAction::Show).await.unwrap();
        assert!(catalog(&empty, &without_shop).await.is_empty());
    }
}
