//! Handler for slug redirects.

use axum::{
    Extension,
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use std::net::SocketAddr;
use tracing::debug;

use crate::api::middleware::identity::CurrentUser;
use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::Enqueue;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a slug to its destination URL.
///
/// # Endpoint
///
/// `GET /{slug}`
///
/// # Request Flow
///
/// 1. Look the link up by slug (case-insensitive)
/// 2. Hash the peer address with the configured secret
/// 3. Offer a click event to the bounded queue without waiting
/// 4. Return 307 Temporary Redirect
///
/// A full or closing click queue never delays or fails the redirect; the
/// click is dropped and counted.
///
/// # Errors
///
/// Returns 404 Not Found if no link has the slug.
pub async fn redirect_handler(
    Path(slug): Path<String>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    user: Option<Extension<CurrentUser>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let link = state.link_service.get_by_slug(&slug).await?;

    let event = ClickEvent::new(
        link.id,
        user.map(|Extension(CurrentUser(id))| id),
        Some(state.ip_hasher.hash(addr.ip())),
        headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok()),
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );

    match state.click_sender.record(event) {
        Enqueue::Accepted => {}
        dropped => debug!(slug = %link.slug, outcome = ?dropped, "Click not queued"),
    }

    Ok(Redirect::temporary(&link.url))
}
