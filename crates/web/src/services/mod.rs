//! List view state and the actions requests apply to it.

pub mod list_actions;
pub mod list_view;

pub use list_actions::{ListAction, catalog, run};
pub use list_view::{CreateOutcome, ListView, TransitionError, ViewPhase};
