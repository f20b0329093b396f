//! Weekly Shop Core - Shared types library.
//!
//! This crate provides common types used across all Weekly Shop components:
//! - `web` - The shopping list web application
//! - `cli` - Command-line tools for migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate contains only types, pure functions and traits - no database
//! access, no HTTP. Storage is reached through [`WeeklyShopRepository`], which
//! the web crate implements on top of `PostgreSQL`.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, shopping lists, products and notifications
//! - [`week`] - Calendar week boundaries
//! - [`repository`] - The storage seam and load outcomes

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod repository;
pub mod types;
pub mod week;

pub use repository::{LoadOutcome, WeeklyShopRepository};
pub use types::*;
pub use week::{WeekZone, start_of_week};
