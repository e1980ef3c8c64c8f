//! Raw row shapes and their conversion into entities.
//!
//! Columns come back as the portable storage encoding (UUID text, BIGINT
//! microseconds, 0/1 integers) and are decoded here in one place.

use uuid::Uuid;

use crate::domain::entities::{Click, Link, LinkOwner, Role, Tag, TagWithCount, User};
use crate::error::StoreError;
use crate::utils::time::from_micros;

pub(crate) const LINK_COLUMNS: &str = "id, slug, url, title, description, created_at, updated_at";
pub(crate) const TAG_COLUMNS: &str = "id, name, slug, created_at";
pub(crate) const USER_COLUMNS: &str = "id, provider, subject, email, display_name, \
     display_name_slug, role, created_at, updated_at";

pub(crate) fn parse_uuid(value: &str) -> Result<Uuid, StoreError> {
    Uuid::parse_str(value).map_err(|e| StoreError::Database(sqlx::Error::Decode(Box::new(e))))
}

/// `?, ?, ?` for an `IN (...)` list of `n` items.
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LinkRow {
    pub id: String,
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl LinkRow {
    pub fn into_link(self, owners: Vec<LinkOwner>, tags: Vec<Tag>) -> Result<Link, StoreError> {
        Ok(Link {
            id: parse_uuid(&self.id)?,
            slug: self.slug,
            url: self.url,
            title: self.title,
            description: self.description,
            created_at: from_micros(self.created_at),
            updated_at: from_micros(self.updated_at),
            owners,
            tags,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OwnerRow {
    pub link_id: String,
    pub user_id: String,
    pub is_primary: i64,
    pub added_at: i64,
}

impl OwnerRow {
    pub fn into_owner(self) -> Result<LinkOwner, StoreError> {
        Ok(LinkOwner {
            user_id: parse_uuid(&self.user_id)?,
            is_primary: self.is_primary == 1,
            added_at: from_micros(self.added_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TagRow {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub created_at: i64,
}

impl TagRow {
    pub fn into_tag(self) -> Result<Tag, StoreError> {
        Ok(Tag {
            id: parse_uuid(&self.id)?,
            name: self.name,
            slug: self.slug,
            created_at: from_micros(self.created_at),
        })
    }
}

/// A tag joined through `link_tags`.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct LinkTagRow {
    pub link_id: String,
    #[sqlx(flatten)]
    pub tag: TagRow,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct TagCountRow {
    #[sqlx(flatten)]
    pub tag: TagRow,
    pub link_count: i64,
}

impl TagCountRow {
    pub fn into_tag_with_count(self) -> Result<TagWithCount, StoreError> {
        Ok(TagWithCount {
            tag: self.tag.into_tag()?,
            link_count: self.link_count,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct UserRow {
    pub id: String,
    pub provider: String,
    pub subject: String,
    pub email: String,
    pub display_name: String,
    pub display_name_slug: Option<String>,
    pub role: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl UserRow {
    pub fn into_user(self) -> Result<User, StoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|e: String| StoreError::Database(sqlx::Error::Decode(e.into())))?;

        Ok(User {
            id: parse_uuid(&self.id)?,
            provider: self.provider,
            subject: self.subject,
            email: self.email,
            display_name: self.display_name,
            display_name_slug: self.display_name_slug.unwrap_or_default(),
            role,
            created_at: from_micros(self.created_at),
            updated_at: from_micros(self.updated_at),
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ClickRow {
    pub id: String,
    pub link_id: String,
    pub user_id: Option<String>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: i64,
}

impl ClickRow {
    pub fn into_click(self) -> Result<Click, StoreError> {
        Ok(Click {
            id: parse_uuid(&self.id)?,
            link_id: parse_uuid(&self.link_id)?,
            user_id: self.user_id.as_deref().map(parse_uuid).transpose()?,
            ip_hash: self.ip_hash,
            user_agent: self.user_agent,
            referrer: self.referrer,
            clicked_at: from_micros(self.clicked_at),
        })
    }
}
