//! Repository trait for users.

use crate::domain::entities::{User, UserLogin};
use crate::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for users.
///
/// Users are written by the login flow only; the core never deletes them.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqlUserRepository`] - portable SQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Creates the user on first login or refreshes email, display name
    /// and role on later ones. The display-name slug is re-derived when the
    /// display name changes.
    async fn upsert_login(&self, login: UserLogin) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;
}
