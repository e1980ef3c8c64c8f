//! Read surface of the ownership relation used for authorization.

use crate::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Narrow, read-only view of `link_owners`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OwnershipRepository: Send + Sync {
    /// True if the user appears in the link's ownership set, primary or not.
    async fn is_owner(&self, user_id: Uuid, link_id: Uuid) -> Result<bool, StoreError>;
}
