//! Weekly Shop web application library.
//!
//! Serves the week's shopping list: find or create it, then edit its items.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
