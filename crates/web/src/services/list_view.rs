//! The list view controller.
//!
//! Holds the state behind the shopping list screen and moves it through
//! its phases:
//!
//! ```text
//! Loading ──mount──▶ NoShop ──create_list──▶ HasShop(shop)
//!    │                                          ▲   │
//!    └──────────────mount (found)───────────────┘   └─ item events patch `shop.items`
//! ```
//!
//! `HasShop` is terminal. Store failures never escape as errors: they become
//! notifications for the user and the view falls back to `NoShop`.

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::instrument;

use weekly_shop_core::{
    LoadOutcome, Notification, WeekZone, WeeklyShop, WeeklyShopItem, WeeklyShopItemId,
    WeeklyShopRepository,
};

pub const FETCH_ERROR_MESSAGE: &str = "Error fetching current shop";
pub const CREATE_ERROR_MESSAGE: &str = "Error creating new list";
pub const CREATE_SUCCESS_MESSAGE: &str = "New shopping list created";

/// Where the view is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewPhase {
    /// Waiting for the mount-time load.
    Loading,
    /// Loaded; no list exists for this week.
    NoShop,
    /// Loaded or created; the week's list.
    HasShop(WeeklyShop),
}

/// Identifies one load. Finishing a load whose ticket is no longer the
/// latest one has no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub struct LoadTicket {
    generation: u64,
}

/// A user action that is not available in the current phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("the shopping list is still loading")]
    StillLoading,
    #[error("a shopping list already exists for this week")]
    ShopExists,
}

/// Result of asking the store for a new list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateOutcome {
    Created,
    Failed,
}

/// State of the shopping list screen.
#[derive(Debug, Clone)]
pub struct ListView {
    phase: ViewPhase,
    search_term: String,
    notifications: Vec<Notification>,
    generation: u64,
    in_flight: Option<u64>,
}

impl Default for ListView {
    fn default() -> Self {
        Self::new()
    }
}

impl ListView {
    /// A view that has not loaded anything yet.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: ViewPhase::Loading,
            search_term: String::new(),
            notifications: Vec::new(),
            generation: 0,
            in_flight: None,
        }
    }

    #[must_use]
    pub const fn phase(&self) -> &ViewPhase {
        &self.phase
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self.phase, ViewPhase::Loading)
    }

    /// The week's list, if one has been loaded or created.
    #[must_use]
    pub const fn current_shop(&self) -> Option<&WeeklyShop> {
        match &self.phase {
            ViewPhase::HasShop(shop) => Some(shop),
            ViewPhase::Loading | ViewPhase::NoShop => None,
        }
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Items matching the search term, in list order.
    ///
    /// Matches product name, category and location, ignoring case. A blank
    /// term matches everything.
    #[must_use]
    pub fn visible_items(&self) -> Vec<&WeeklyShopItem> {
        let Some(shop) = self.current_shop() else {
            return Vec::new();
        };

        let needle = self.search_term.trim().to_lowercase();
        shop.items
            .iter()
            .filter(|item| needle.is_empty() || item.product.matches(&needle))
            .collect()
    }

    /// Notifications raised so far and not yet drained.
    #[must_use]
    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    /// Queue a notification raised outside the load and create flows.
    pub fn notify(&mut self, notification: Notification) {
        self.notifications.push(notification);
    }

    /// Take every pending notification, oldest first.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.notifications)
    }

    /// Start a load. Any load started earlier becomes stale.
    pub const fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.in_flight = Some(self.generation);
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a load.
    ///
    /// Returns false, changing nothing, when the ticket is stale. Otherwise
    /// ends the loading phase: a found list is shown, an empty result means
    /// "no list yet", and a failure raises one error notification.
    pub fn finish_load<E: std::fmt::Display>(
        &mut self,
        ticket: LoadTicket,
        outcome: LoadOutcome<E>,
    ) -> bool {
        if self.in_flight != Some(ticket.generation) {
            tracing::debug!(generation = ticket.generation, "discarding stale load");
            return false;
        }
        self.in_flight = None;

        match outcome {
            LoadOutcome::Found(shop) => {
                tracing::debug!(shop_id = %shop.id, items = shop.items.len(), "current shop loaded");
                self.phase = ViewPhase::HasShop(shop);
            }
            LoadOutcome::NotFound => {
                tracing::debug!("no shop for this week");
                self.settle_without_shop();
            }
            LoadOutcome::Failed(e) => {
                tracing::error!(error = %e, "failed to fetch current shop");
                self.notifications.push(Notification::error(FETCH_ERROR_MESSAGE));
                self.settle_without_shop();
            }
        }
        true
    }

    /// Leave `Loading` for `NoShop`. A list that is already showing stays.
    fn settle_without_shop(&mut self) {
        if self.is_loading() {
            self.phase = ViewPhase::NoShop;
        }
    }

    /// Discard any load still in flight.
    ///
    /// Request handlers build a fresh view per request and never need this.
    /// It is for hosts that keep one view alive across loads, such as a
    /// long-lived connection that outlives a navigation.
    pub const fn unmount(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    /// Load the list for the week containing `now`.
    #[instrument(skip(self, repo))]
    pub async fn mount<R: WeeklyShopRepository>(
        &mut self,
        repo: &R,
        zone: WeekZone,
        now: DateTime<Utc>,
    ) {
        let ticket = self.begin_load();
        let week_start = zone.week_start(now);
        let outcome = LoadOutcome::from(repo.find_current_list(week_start).await);
        self.finish_load(ticket, outcome);
    }

    /// Create this week's list, dated `now`.
    ///
    /// Only available once loading finished without finding a list.
    ///
    /// # Errors
    ///
    /// Returns `TransitionError` without touching the store when the view
    /// is still loading or already shows a list.
    #[instrument(skip(self, repo))]
    pub async fn create_list<R: WeeklyShopRepository>(
        &mut self,
        repo: &R,
        now: DateTime<Utc>,
    ) -> Result<CreateOutcome, TransitionError> {
        match self.phase {
            ViewPhase::Loading => return Err(TransitionError::StillLoading),
            ViewPhase::HasShop(_) => return Err(TransitionError::ShopExists),
            ViewPhase::NoShop => {}
        }

        match repo.create_list(now).await {
            Ok(record) => {
                tracing::info!(shop_id = %record.id, "created shopping list");
                self.phase = ViewPhase::HasShop(WeeklyShop::from_record(record));
                self.notifications
                    .push(Notification::success(CREATE_SUCCESS_MESSAGE));
                Ok(CreateOutcome::Created)
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to create shopping list");
                self.notifications.push(Notification::error(CREATE_ERROR_MESSAGE));
                Ok(CreateOutcome::Failed)
            }
        }
    }

    /// Replace the shown list with `patch(list)`. No-op without a list.
    fn patch_shop(&mut self, patch: impl FnOnce(&WeeklyShop) -> WeeklyShop) {
        if let ViewPhase::HasShop(shop) = &self.phase {
            self.phase = ViewPhase::HasShop(patch(shop));
        }
    }

    /// Mirror an item that was added upstream.
    pub fn on_item_added(&mut self, item: WeeklyShopItem) {
        self.patch_shop(|shop| shop.with_item(item));
    }

    /// Mirror an item that was removed upstream.
    pub fn on_item_removed(&mut self, item_id: WeeklyShopItemId) {
        self.patch_shop(|shop| shop.without_item(item_id));
    }

    /// Mirror a quantity change that was committed upstream.
    pub fn on_quantity_changed(&mut self, item_id: WeeklyShopItemId, quantity: u32) {
        self.patch_shop(|shop| shop.with_quantity(item_id, quantity));
    }
}
