//! Repository trait for link data access.

use crate::domain::entities::{Link, LinkUpdate, NewLink, Tag};
use crate::error::StoreError;
use async_trait::async_trait;
use uuid::Uuid;

/// Repository interface for links, their owners and their tags.
///
/// Every mutating method runs inside a single database transaction; a
/// failure leaves no partial state behind. Inputs are expected to be
/// validated already (see [`crate::application::services::LinkService`]).
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqlLinkRepository`] - portable SQL implementation
/// - Test mocks available with `cfg(test)`
///
/// # Examples
///
/// See integration tests: `tests/repository_link.rs`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts the link and its primary owner row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::SlugTaken`] if the slug exists in any case.
    /// Returns [`StoreError::NotFound`] if the owner does not exist.
    async fn create(&self, new_link: NewLink) -> Result<Link, StoreError>;

    /// Finds a link by id with owners and tags loaded.
    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError>;

    /// Finds a link by slug, ignoring case, with owners and tags loaded.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, StoreError>;

    /// Lists every link the user owns, primary or co-owned, most recently
    /// updated first.
    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Link>, StoreError>;

    /// Replaces url, title and description.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the link does not exist.
    async fn update(&self, id: Uuid, update: LinkUpdate) -> Result<Link, StoreError>;

    /// Deletes the link; owner, tag and click rows go with it by cascade.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the link does not exist, including
    /// when it was already deleted.
    async fn delete(&self, id: Uuid) -> Result<(), StoreError>;

    /// Adds a co-owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateOwner`] if the pair already exists.
    /// Returns [`StoreError::NotFound`] if the link or user does not exist.
    async fn add_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    /// Removes a co-owner.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::PrimaryOwnerImmutable`] for the primary owner.
    /// Returns [`StoreError::NotFound`] if the pair does not exist.
    async fn remove_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError>;

    /// Makes the link's tag set equal to `tag_names`, upserting tags as
    /// needed. Returns the resulting tag set ordered by slug.
    ///
    /// Idempotent: repeating the call with the same names changes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if the link does not exist.
    /// Returns [`StoreError::InvalidTag`] if a name slugifies to nothing.
    async fn set_tags(&self, link_id: Uuid, tag_names: Vec<String>)
    -> Result<Vec<Tag>, StoreError>;

    /// Counts all links.
    async fn count_all(&self) -> Result<i64, StoreError>;
}
