//! Repository trait for click persistence.

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::Click;
use crate::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for click events.
///
/// `record_click` is called only by the click pipeline's background
/// consumer, never from a request handler.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqlClickRepository`] - portable SQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ClickRepository: Send + Sync {
    /// Appends one click event.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the link was deleted after the
    /// click was queued.
    async fn record_click(&self, event: &ClickEvent) -> Result<Click, StoreError>;

    /// Number of stored clicks for a link.
    async fn count_for_link(&self, link_id: Uuid) -> Result<i64, StoreError>;

    /// Latest clicks for a link, newest first.
    async fn recent_for_link(&self, link_id: Uuid, limit: i64) -> Result<Vec<Click>, StoreError>;
}
