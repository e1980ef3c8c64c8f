//! Tag store facade.

use std::sync::Arc;

use crate::domain::entities::{Tag, TagWithCount};
use crate::domain::repositories::TagRepository;
use crate::error::StoreError;
use crate::utils::slug::{MAX_TAG_NAME_LENGTH, slugify};

/// Default number of autocomplete suggestions.
pub const DEFAULT_SUGGEST_LIMIT: i64 = 10;

/// Upper bound on suggestions per request.
pub const MAX_SUGGEST_LIMIT: i64 = 50;

/// Service over the global tag taxonomy.
pub struct TagService<T: TagRepository + ?Sized> {
    tag_repository: Arc<T>,
}

impl<T: TagRepository + ?Sized> TagService<T> {
    pub fn new(tag_repository: Arc<T>) -> Self {
        Self { tag_repository }
    }

    /// Returns the tag for `name`'s derived slug, creating it if needed.
    ///
    /// `"Engineering Tools"` and `"engineering tools"` resolve to the same
    /// tag; the first display name stored wins.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTag`] if the name has no usable
    /// characters or is too long.
    pub async fn upsert(&self, name: &str) -> Result<Tag, StoreError> {
        let name = name.trim();
        let slug = slugify(name);
        if slug.is_empty() || name.chars().count() > MAX_TAG_NAME_LENGTH {
            return Err(StoreError::InvalidTag(name.to_string()));
        }

        self.tag_repository.upsert(name, &slug).await
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Tag, StoreError> {
        self.tag_repository
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::not_found("tag", slug))
    }

    pub async fn list(&self) -> Result<Vec<Tag>, StoreError> {
        self.tag_repository.list().await
    }

    /// Tags in use, most used first. Unused tags are omitted.
    pub async fn list_with_counts(&self) -> Result<Vec<TagWithCount>, StoreError> {
        self.tag_repository.list_with_counts().await
    }

    /// Autocomplete by slug prefix.
    ///
    /// The prefix is slugified first; a prefix with nothing left matches no
    /// tags. `limit` defaults to [`DEFAULT_SUGGEST_LIMIT`] and is clamped to
    /// `1..=MAX_SUGGEST_LIMIT`.
    pub async fn suggest(&self, prefix: &str, limit: Option<i64>) -> Result<Vec<Tag>, StoreError> {
        let prefix = slugify(prefix);
        if prefix.is_empty() {
            return Ok(Vec::new());
        }

        let limit = limit
            .unwrap_or(DEFAULT_SUGGEST_LIMIT)
            .clamp(1, MAX_SUGGEST_LIMIT);

        self.tag_repository.suggest(&prefix, limit).await
    }
}
