//! Public route configuration.

use crate::api::handlers::{health_handler, redirect_handler};
use crate::state::AppState;
use axum::{Router, routing::get};

/// Routes served without authentication.
///
/// # Endpoints
///
/// - `GET /health` - Database and click queue status
/// - `GET /{slug}` - Redirect to the link destination
///
/// The static `/health` route takes precedence over the slug capture.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/{slug}", get(redirect_handler))
}
