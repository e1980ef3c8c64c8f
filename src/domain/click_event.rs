//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::utils::time;

/// Longest stored user agent, in bytes.
pub const MAX_USER_AGENT_LEN: usize = 1024;

/// Longest stored referrer, in bytes.
pub const MAX_REFERRER_LEN: usize = 2048;

/// A visit captured on the redirect path, waiting to be persisted.
///
/// Built in the redirect handler, pushed into the bounded click queue
/// without awaiting, and written by the single background consumer.
/// The timestamp is taken at the redirect, not at persistence time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickEvent {
    pub link_id: Uuid,
    pub user_id: Option<Uuid>,
    pub ip_hash: Option<String>,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a click event stamped with the current time.
    ///
    /// Header values are truncated to the stored column widths.
    pub fn new(
        link_id: Uuid,
        user_id: Option<Uuid>,
        ip_hash: Option<String>,
        user_agent: Option<&str>,
        referrer: Option<&str>,
    ) -> Self {
        Self {
            link_id,
            user_id,
            ip_hash,
            user_agent: user_agent.map(|s| truncate(s, MAX_USER_AGENT_LEN)),
            referrer: referrer.map(|s| truncate(s, MAX_REFERRER_LEN)),
            clicked_at: time::now(),
        }
    }
}

fn truncate(value: &str, max: usize) -> String {
    if value.len() <= max {
        return value.to_string();
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}
