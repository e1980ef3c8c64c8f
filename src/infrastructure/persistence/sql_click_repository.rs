//! Portable SQL implementation of click storage.

use async_trait::async_trait;
use sqlx::AnyPool;
use uuid::Uuid;

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::Click;
use crate::domain::repositories::ClickRepository;
use crate::error::StoreError;
use crate::infrastructure::database::{Database, Dialect};
use crate::infrastructure::persistence::rows::ClickRow;
use crate::utils::db_error::is_foreign_key_violation;

/// SQL repository for the append-only `click_events` table.
pub struct SqlClickRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlClickRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dialect: db.dialect(),
        }
    }
}

#[async_trait]
impl ClickRepository for SqlClickRepository {
    async fn record_click(&self, event: &ClickEvent) -> Result<Click, StoreError> {
        let id = Uuid::new_v4();

        sqlx::query(&self.dialect.sql(
            "INSERT INTO click_events \
             (id, link_id, user_id, ip_hash, user_agent, referrer, clicked_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        ))
        .bind(id.to_string())
        .bind(event.link_id.to_string())
        .bind(event.user_id.map(|u| u.to_string()))
        .bind(event.ip_hash.as_deref())
        .bind(event.user_agent.as_deref())
        .bind(event.referrer.as_deref())
        .bind(crate::utils::time::to_micros(event.clicked_at))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            // The link was deleted while the event sat in the queue.
            if is_foreign_key_violation(&e) {
                StoreError::not_found("link", event.link_id)
            } else {
                e.into()
            }
        })?;

        Ok(Click {
            id,
            link_id: event.link_id,
            user_id: event.user_id,
            ip_hash: event.ip_hash.clone(),
            user_agent: event.user_agent.clone(),
            referrer: event.referrer.clone(),
            clicked_at: event.clicked_at,
        })
    }

    async fn count_for_link(&self, link_id: Uuid) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            &self.dialect.sql("SELECT COUNT(*) FROM click_events WHERE link_id = ?"),
        )
        .bind(link_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count)
    }

    async fn recent_for_link(&self, link_id: Uuid, limit: i64) -> Result<Vec<Click>, StoreError> {
        sqlx::query_as::<_, ClickRow>(&self.dialect.sql(
            "SELECT id, link_id, user_id, ip_hash, user_agent, referrer, clicked_at \
             FROM click_events WHERE link_id = ? ORDER BY clicked_at DESC, id LIMIT ?",
        ))
        .bind(link_id.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(ClickRow::into_click)
        .collect()
    }
}
