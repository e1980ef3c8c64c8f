//! Repository trait for the tag taxonomy.

use crate::domain::entities::{Tag, TagWithCount};
use crate::error::StoreError;
use async_trait::async_trait;

/// Repository interface for tags.
///
/// Tags are keyed by derived slug. Upserts rely on an atomic
/// insert-if-absent so concurrent callers never create duplicates.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::SqlTagRepository`] - portable SQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Returns the tag with `slug`, creating it with `name` if absent.
    ///
    /// An existing tag is returned unchanged; the first display name wins.
    async fn upsert(&self, name: &str, slug: &str) -> Result<Tag, StoreError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, StoreError>;

    /// All tags ordered by slug.
    async fn list(&self) -> Result<Vec<Tag>, StoreError>;

    /// Tags attached to at least one link, most used first.
    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>, StoreError>;

    /// Tags whose slug starts with `prefix`, ordered by slug.
    async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<Tag>, StoreError>;
}
