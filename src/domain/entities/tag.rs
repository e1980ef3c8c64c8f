//! Tag entity: a global classification label.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A tag. `slug` is the unique upsert key; `name` is whatever the first
/// creator typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

/// A tag together with the number of links carrying it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagWithCount {
    #[serde(flatten)]
    pub tag: Tag,
    pub link_count: i64,
}
