//! Link store facade.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{Link, LinkUpdate, NewLink, Tag};
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;
use crate::utils::slug::{normalize_tag_names, validate_slug};
use crate::utils::url_normalizer::normalize_url;

/// Longest stored title, in characters.
pub const MAX_TITLE_LENGTH: usize = 255;

/// Longest stored description, in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 4000;

/// Service for creating, reading and mutating links.
///
/// Every input is validated in memory before the repository is called, so
/// bad slugs, reserved slugs and bad URLs never cost a round trip. Each
/// operation then makes exactly one repository call.
pub struct LinkService<L: LinkRepository + ?Sized> {
    link_repository: Arc<L>,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    pub fn new(link_repository: Arc<L>) -> Self {
        Self { link_repository }
    }

    /// Creates a link owned by `owner_id`.
    ///
    /// The slug is lowercased and validated, and the URL normalized. Title
    /// and description are trimmed and clipped to their column widths.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidSlug`], [`StoreError::ReservedSlug`] or
    /// [`StoreError::InvalidUrl`] before any I/O, and
    /// [`StoreError::SlugTaken`] if another link already uses the slug.
    pub async fn create(
        &self,
        slug: &str,
        url: &str,
        title: &str,
        description: &str,
        owner_id: Uuid,
    ) -> Result<Link, StoreError> {
        let slug = validate_slug(slug)?;
        let url = normalize_url(url)?;

        let new_link = NewLink {
            slug,
            url,
            title: clip(title, MAX_TITLE_LENGTH),
            description: clip(description, MAX_DESCRIPTION_LENGTH),
            owner_id,
        };

        self.link_repository.create(new_link).await
    }

    /// Looks a link up by slug, ignoring case.
    ///
    /// A string that could never be a valid slug is answered with
    /// [`StoreError::NotFound`] without a query.
    pub async fn get_by_slug(&self, slug: &str) -> Result<Link, StoreError> {
        let Ok(normalized) = validate_slug(slug) else {
            return Err(StoreError::not_found("link", slug));
        };

        self.link_repository
            .find_by_slug(&normalized)
            .await?
            .ok_or_else(|| StoreError::not_found("link", normalized))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Link, StoreError> {
        self.link_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("link", id))
    }

    /// Every link the user owns or co-owns, most recently updated first.
    pub async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Link>, StoreError> {
        self.link_repository.list_by_owner(user_id).await
    }

    /// Replaces url, title and description. The slug cannot be changed.
    pub async fn update(
        &self,
        id: Uuid,
        url: &str,
        title: &str,
        description: &str,
    ) -> Result<Link, StoreError> {
        let update = LinkUpdate {
            url: normalize_url(url)?,
            title: clip(title, MAX_TITLE_LENGTH),
            description: clip(description, MAX_DESCRIPTION_LENGTH),
        };

        self.link_repository.update(id, update).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        self.link_repository.delete(id).await
    }

    pub async fn add_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        self.link_repository.add_owner(link_id, user_id).await
    }

    pub async fn remove_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        self.link_repository.remove_owner(link_id, user_id).await
    }

    /// Makes the link's tag set equal to `tag_names`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidTag`] before any I/O if a name has no
    /// usable characters.
    pub async fn set_tags(
        &self,
        link_id: Uuid,
        tag_names: Vec<String>,
    ) -> Result<Vec<Tag>, StoreError> {
        normalize_tag_names(&tag_names)?;
        self.link_repository.set_tags(link_id, tag_names).await
    }

    pub async fn count_all(&self) -> Result<i64, StoreError> {
        self.link_repository.count_all().await
    }
}

fn clip(value: &str, max_chars: usize) -> String {
    value.trim().chars().take(max_chars).collect()
}
