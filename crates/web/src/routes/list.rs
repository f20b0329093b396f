//! Shopping list route handlers.
//!
//! Each request mounts a fresh list view, applies at most one action and
//! renders. HTMX requests get the `#list-view` fragment back with toasts.
//! Plain form posts are redirected back to the list with their notifications
//! stored as session flash.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;
use weekly_shop_core::{
    Notification, Product, ProductId, WeekZone, WeeklyShopItem, WeeklyShopItemId,
    WeeklyShopRepository,
};

use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::models::flash;
use crate::services::{ListAction, ListView, catalog, list_actions};
use crate::state::AppState;

/// Header htmx sets on every request it issues.
pub const HX_REQUEST_HEADER: &str = "hx-request";

const DEFAULT_ADD_QUANTITY: u32 = 1;

// =============================================================================
// View Models
// =============================================================================

/// One list line, ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemView {
    pub id: String,
    pub name: String,
    /// Category and unit, e.g. "Dairy · litre".
    pub detail: String,
    /// Location and aisle, e.g. "Produce · aisle 1".
    pub location: String,
    pub quantity: u32,
}

impl From<&WeeklyShopItem> for ItemView {
    fn from(item: &WeeklyShopItem) -> Self {
        let product = &item.product;
        let detail = [product.category.as_deref(), product.unit.as_deref()]
            .into_iter()
            .flatten()
            .collect::<Vec<_>>()
            .join(" · ");
        let location = match product.location.aisle.as_deref() {
            Some(aisle) => format!("{} · aisle {aisle}", product.location.name),
            None => product.location.name.clone(),
        };

        Self {
            id: item.id.to_string(),
            name: product.name.clone(),
            detail,
            location,
            quantity: item.quantity,
        }
    }
}

/// An entry in the add-item product picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductOption {
    pub id: String,
    pub label: String,
}

impl From<&Product> for ProductOption {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.to_string(),
            label: format!("{} ({})", product.name, product.location.name),
        }
    }
}

/// A toast message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastView {
    pub level: &'static str,
    pub message: String,
}

impl From<&Notification> for ToastView {
    fn from(notification: &Notification) -> Self {
        Self {
            level: notification.level.as_str(),
            message: notification.message.clone(),
        }
    }
}

/// Everything the list panel shows.
#[derive(Debug, Clone)]
pub struct ListPanel {
    pub has_shop: bool,
    pub shop_date: String,
    pub search: String,
    pub items: Vec<ItemView>,
    /// Items on the list but filtered out by the search.
    pub hidden_count: usize,
    pub summary: String,
    pub products: Vec<ProductOption>,
}

impl ListPanel {
    #[must_use]
    pub fn new(view: &ListView, products: &[Product], zone: WeekZone) -> Self {
        let Some(shop) = view.current_shop() else {
            return Self {
                has_shop: false,
                shop_date: String::new(),
                search: view.search_term().to_string(),
                items: Vec::new(),
                hidden_count: 0,
                summary: String::new(),
                products: Vec::new(),
            };
        };

        let items: Vec<ItemView> = view
            .visible_items()
            .into_iter()
            .map(ItemView::from)
            .collect();
        let line_count = shop.items.len();
        let summary = format!(
            "{line_count} {}, {} to buy",
            if line_count == 1 { "item" } else { "items" },
            shop.total_quantity()
        );

        Self {
            has_shop: true,
            shop_date: zone
                .to_local(shop.shop_date)
                .format("%A %-d %B %Y")
                .to_string(),
            search: view.search_term().to_string(),
            hidden_count: line_count.saturating_sub(items.len()),
            items,
            summary,
            products: products.iter().map(ProductOption::from).collect(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Full list page.
#[derive(Template, WebTemplate)]
#[template(path = "list/show.html")]
pub struct ListPageTemplate {
    pub panel: ListPanel,
    pub toasts: Vec<ToastView>,
}

/// List panel fragment (for HTMX).
#[derive(Template, WebTemplate)]
#[template(path = "partials/list_view.html")]
pub struct ListFragmentTemplate {
    pub panel: ListPanel,
    pub toasts: Vec<ToastView>,
}

// =============================================================================
// Forms
// =============================================================================

/// Search term carried by the list page and every form on it.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Add item form data.
#[derive(Debug, Deserialize)]
pub struct AddItemForm {
    pub product_id: ProductId,
    pub quantity: Option<u32>,
    #[serde(default)]
    pub q: String,
}

/// Change quantity form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub quantity: u32,
    #[serde(default)]
    pub q: String,
}

// =============================================================================
// Helpers
// =============================================================================

fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get(HX_REQUEST_HEADER)
        .is_some_and(|value| value.as_bytes() == b"true")
}

/// `?q=<term>` for a non-blank search term, otherwise empty.
fn query_suffix(search_term: &str) -> String {
    let term = search_term.trim();
    if term.is_empty() {
        return String::new();
    }
    let encoded: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
    format!("?q={encoded}")
}

/// The list page URL, keeping the search term.
#[must_use]
pub fn list_url(search_term: &str) -> String {
    format!("/{}", query_suffix(search_term))
}

/// Render the list, as a page or as a fragment.
async fn render<R: WeeklyShopRepository>(
    repo: &R,
    zone: WeekZone,
    mut view: ListView,
    mut notifications: Vec<Notification>,
    htmx: bool,
) -> Response {
    notifications.extend(view.drain_notifications());
    let products = catalog(repo, &view).await;
    let panel = ListPanel::new(&view, &products, zone);
    let toasts = notifications.iter().map(ToastView::from).collect();

    if htmx {
        ListFragmentTemplate { panel, toasts }.into_response()
    } else {
        ListPageTemplate { panel, toasts }.into_response()
    }
}

/// Apply `action` and answer with a fragment or a redirect.
async fn respond(
    state: &AppState,
    session: &Session,
    headers: &HeaderMap,
    search_term: &str,
    action: ListAction,
) -> Result<Response> {
    let mut view = list_actions::run(
        state.shops(),
        state.week_zone(),
        Utc::now(),
        search_term,
        action,
    )
    .await?;

    if is_htmx(headers) {
        return Ok(render(state.shops(), state.week_zone(), view, Vec::new(), true).await);
    }

    flash::push(session, view.drain_notifications()).await?;
    Ok(Redirect::to(&list_url(view.search_term())).into_response())
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the week's list.
#[instrument(skip(state, session, headers))]
pub async fn show(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Query(params): Query<SearchParams>,
) -> Result<Response> {
    let view = list_actions::run(
        state.shops(),
        state.week_zone(),
        Utc::now(),
        &params.q,
        ListAction::Show,
    )
    .await?;
    let flashed = flash::take(&session).await;

    Ok(render(state.shops(), state.week_zone(), view, flashed, is_htmx(&headers)).await)
}

/// Create this week's list.
#[instrument(skip(state, session, headers))]
pub async fn create(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<SearchParams>,
) -> Result<Response> {
    add_breadcrumb("list", "Create list", None);
    respond(&state, &session, &headers, &form.q, ListAction::Create).await
}

/// Add a product to the list.
#[instrument(skip(state, session, headers))]
pub async fn add_item(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddItemForm>,
) -> Result<Response> {
    let product_id = form.product_id.to_string();
    add_breadcrumb("list", "Add item", Some(&[("product_id", &product_id)]));

    let action = ListAction::AddItem {
        product_id: form.product_id,
        quantity: form.quantity.unwrap_or(DEFAULT_ADD_QUANTITY),
    };
    respond(&state, &session, &headers, &form.q, action).await
}

/// Remove an item from the list.
#[instrument(skip(state, session, headers))]
pub async fn remove_item(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(item_id): Path<WeeklyShopItemId>,
    Form(form): Form<SearchParams>,
) -> Result<Response> {
    let id = item_id.to_string();
    add_breadcrumb("list", "Remove item", Some(&[("item_id", &id)]));

    respond(
        &state,
        &session,
        &headers,
        &form.q,
        ListAction::RemoveItem(item_id),
    )
    .await
}

/// Change an item's quantity.
#[instrument(skip(state, session, headers))]
pub async fn change_quantity(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Path(item_id): Path<WeeklyShopItemId>,
    Form(form): Form<QuantityForm>,
) -> Result<Response> {
    let id = item_id.to_string();
    add_breadcrumb("list", "Change quantity", Some(&[("item_id", &id)]));

    let action = ListAction::SetQuantity {
        item_id,
        quantity: form.quantity,
    };
    respond(&state, &session, &headers, &form.q, action).await
}
