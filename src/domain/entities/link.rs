//! Link entity: a slug mapped to a destination URL.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::Tag;

/// A short link with its ownership set and tag set materialized.
///
/// The slug is immutable after creation. Ownership lives only in the
/// `link_owners` relation; there is no owner column on the link itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Link {
    pub id: Uuid,
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Primary owner first, then co-owners in the order they were added.
    pub owners: Vec<LinkOwner>,
    /// Ordered by tag slug.
    pub tags: Vec<Tag>,
}

impl Link {
    /// The creator of the link. `None` only if the ownership invariant has
    /// been broken outside this crate.
    pub fn primary_owner(&self) -> Option<&LinkOwner> {
        self.owners.iter().find(|o| o.is_primary)
    }

    pub fn co_owners(&self) -> impl Iterator<Item = &LinkOwner> {
        self.owners.iter().filter(|o| !o.is_primary)
    }

    /// True if the user is the primary owner or a co-owner.
    pub fn is_owned_by(&self, user_id: Uuid) -> bool {
        self.owners.iter().any(|o| o.user_id == user_id)
    }

    pub fn tag_slugs(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.slug.as_str()).collect()
    }
}

/// One row of the ownership relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkOwner {
    pub user_id: Uuid,
    pub is_primary: bool,
    pub added_at: DateTime<Utc>,
}

/// Input for creating a link. `owner_id` becomes the primary owner.
#[derive(Debug, Clone)]
pub struct NewLink {
    pub slug: String,
    pub url: String,
    pub title: String,
    pub description: String,
    pub owner_id: Uuid,
}

/// The mutable field set of a link. The slug is deliberately absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpdate {
    pub url: String,
    pub title: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(user_id: Uuid, is_primary: bool) -> LinkOwner {
        LinkOwner {
            user_id,
            is_primary,
            added_at: Utc::now(),
        }
    }

    fn link_with_owners(owners: Vec<LinkOwner>) -> Link {
        Link {
            id: Uuid::new_v4(),
            slug: "docs".to_string(),
            url: "https://example.com/".to_string(),
            title: String::new(),
            description: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            owners,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_primary_and_co_owners() {
        let creator = Uuid::new_v4();
        let helper = Uuid::new_v4();
        let link = link_with_owners(vec![owner(creator, true), owner(helper, false)]);

        assert_eq!(link.primary_owner().unwrap().user_id, creator);
        assert_eq!(
            link.co_owners().map(|o| o.user_id).collect::<Vec<_>>(),
            vec![helper]
        );
        assert!(link.is_owned_by(creator));
        assert!(link.is_owned_by(helper));
        assert!(!link.is_owned_by(Uuid::new_v4()));
    }

    #[test]
    fn test_empty_owner_set_is_tolerated() {
        let link = link_with_owners(Vec::new());
        assert!(link.primary_owner().is_none());
        assert_eq!(link.co_owners().count(), 0);
    }
}
