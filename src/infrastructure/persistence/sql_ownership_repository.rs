//! Portable SQL implementation of the ownership lookup.

use async_trait::async_trait;
use sqlx::AnyPool;
use uuid::Uuid;

use crate::domain::repositories::OwnershipRepository;
use crate::error::StoreError;
use crate::infrastructure::database::{Database, Dialect};

pub struct SqlOwnershipRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlOwnershipRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dialect: db.dialect(),
        }
    }
}

#[async_trait]
impl OwnershipRepository for SqlOwnershipRepository {
    async fn is_owner(&self, user_id: Uuid, link_id: Uuid) -> Result<bool, StoreError> {
        let count: i64 = sqlx::query_scalar(&self.dialect.sql(
            "SELECT COUNT(*) FROM link_owners WHERE link_id = ? AND user_id = ?",
        ))
        .bind(link_id.to_string())
        .bind(user_id.to_string())
        .fetch_one(&self.pool)
        .await?;
        Ok(count > 0)
    }
}
