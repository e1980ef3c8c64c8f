//! Ownership invariant helper.
//!
//! A link has exactly one primary owner, fixed at creation, plus any number
//! of co-owners. This module holds the pure rules and the single read used
//! by authorization. It never mutates.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::Role;
use crate::domain::repositories::OwnershipRepository;
use crate::error::StoreError;

/// Decides whether an owner row may be deleted.
///
/// `is_primary` is the flag of the `(link_id, user_id)` row, or `None` if
/// there is no such row.
///
/// # Errors
///
/// Returns [`StoreError::NotFound`] for a missing row and
/// [`StoreError::PrimaryOwnerImmutable`] for the primary owner.
pub fn ensure_removable(
    link_id: Uuid,
    user_id: Uuid,
    is_primary: Option<bool>,
) -> Result<(), StoreError> {
    match is_primary {
        None => Err(StoreError::not_found(
            "link owner",
            format!("{link_id}/{user_id}"),
        )),
        Some(true) => Err(StoreError::PrimaryOwnerImmutable { link_id, user_id }),
        Some(false) => Ok(()),
    }
}

/// Authorization check shared with the HTTP layer.
pub struct OwnershipGuard<R: OwnershipRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: OwnershipRepository + ?Sized> OwnershipGuard<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// True if `role` is admin or the user owns the link, primary or not.
    ///
    /// Admins are answered without touching the database; everyone else
    /// costs one read.
    pub async fn is_owner_or_admin(
        &self,
        user_id: Uuid,
        link_id: Uuid,
        role: Role,
    ) -> Result<bool, StoreError> {
        if role.is_admin() {
            return Ok(true);
        }
        self.repository.is_owner(user_id, link_id).await
    }
}
