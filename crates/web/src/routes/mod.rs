//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                            - List view (query: q = search term)
//! GET  /health                      - Health check
//! GET  /health/ready                - Readiness check (database ping)
//! GET  /static/*                    - Stylesheet
//!
//! # List (HTMX fragments, or redirect back to / for plain posts)
//! POST /list                        - Create this week's list
//! POST /list/items                  - Add a product
//! POST /list/items/{id}/remove      - Remove an item
//! POST /list/items/{id}/quantity    - Change an item's quantity
//! ```

pub mod health;
pub mod list;

use axum::{
    Router,
    body::Body,
    http::Request,
    middleware::from_fn,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::{SessionManagerLayer, SessionStore};

use crate::middleware::{request_id_middleware, security_headers_middleware};
use crate::state::AppState;

/// Directory static assets are served from, relative to the workspace root.
pub const STATIC_DIR: &str = "crates/web/static";

/// Create the list routes router.
pub fn list_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(list::create))
        .route("/items", post(list::add_item))
        .route("/items/{id}/remove", post(list::remove_item))
        .route("/items/{id}/quantity", post(list::change_quantity))
}

/// Create all page routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list::show))
        .nest("/list", list_routes())
}

/// The full application: routes, static files and middleware.
///
/// Sentry layers are added by the binary, outside of this router.
pub fn app<S>(state: AppState, session_layer: SessionManagerLayer<S>) -> Router
where
    S: SessionStore + Clone,
{
    Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        .merge(routes())
        .nest_service("/static", ServeDir::new(STATIC_DIR))
        .layer(from_fn(security_headers_middleware))
        .layer(session_layer)
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = tracing::field::Empty,
                )
            }),
        )
        .with_state(state)
}
