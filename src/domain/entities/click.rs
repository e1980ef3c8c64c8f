//! Click entity representing a single persisted redirect.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A click event as stored. Append-only; there is no update path.
///
/// `user_id` is set to `NULL` by the database if the visiting user is
/// later deleted. `ip_hash` is a keyed hash, never the raw address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Click {
    pub id: Uuid,
    pub link_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}
