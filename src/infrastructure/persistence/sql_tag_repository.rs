//! Portable SQL implementation of the tag repository.

use async_trait::async_trait;
use sqlx::{AnyConnection, AnyPool};
use uuid::Uuid;

use crate::domain::entities::{Tag, TagWithCount};
use crate::domain::repositories::TagRepository;
use crate::error::StoreError;
use crate::infrastructure::database::{Database, Dialect};
use crate::infrastructure::persistence::rows::{TAG_COLUMNS, TagCountRow, TagRow};
use crate::utils::time;

/// Inserts the tag if its slug is free, then reads back whichever row owns
/// the slug.
///
/// Runs on the caller's connection so it can join an open transaction.
/// Concurrent callers converge on one row through the unique slug index.
pub(crate) async fn upsert_tag_in(
    conn: &mut AnyConnection,
    dialect: Dialect,
    name: &str,
    slug: &str,
) -> Result<Tag, StoreError> {
    let insert = dialect.insert_ignore(
        "tags",
        &["id", "name", "slug", "created_at"],
        &["slug"],
    );

    sqlx::query(&dialect.sql(&insert))
        .bind(Uuid::new_v4().to_string())
        .bind(name)
        .bind(slug)
        .bind(time::to_micros(time::now()))
        .execute(&mut *conn)
        .await?;

    // A row inserted by a concurrent caller may postdate this transaction's
    // snapshot.
    let select = format!(
        "SELECT {TAG_COLUMNS} FROM tags WHERE slug = ?{}",
        dialect.latest_committed()
    );
    sqlx::query_as::<_, TagRow>(&dialect.sql(&select))
        .bind(slug)
        .fetch_one(&mut *conn)
        .await?
        .into_tag()
}

/// SQL repository for the tag taxonomy.
pub struct SqlTagRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlTagRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dialect: db.dialect(),
        }
    }
}

#[async_trait]
impl TagRepository for SqlTagRepository {
    async fn upsert(&self, name: &str, slug: &str) -> Result<Tag, StoreError> {
        let mut conn = self.pool.acquire().await?;
        upsert_tag_in(&mut conn, self.dialect, name, slug).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Tag>, StoreError> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE slug = ?");
        sqlx::query_as::<_, TagRow>(&self.dialect.sql(&sql))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?
            .map(TagRow::into_tag)
            .transpose()
    }

    async fn list(&self) -> Result<Vec<Tag>, StoreError> {
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags ORDER BY slug");
        sqlx::query_as::<_, TagRow>(&sql)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TagRow::into_tag)
            .collect()
    }

    async fn list_with_counts(&self) -> Result<Vec<TagWithCount>, StoreError> {
        sqlx::query_as::<_, TagCountRow>(
            "SELECT t.id, t.name, t.slug, t.created_at, COUNT(lt.link_id) AS link_count \
             FROM tags t JOIN link_tags lt ON lt.tag_id = t.id \
             GROUP BY t.id, t.name, t.slug, t.created_at \
             ORDER BY link_count DESC, t.slug",
        )
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(TagCountRow::into_tag_with_count)
        .collect()
    }

    async fn suggest(&self, prefix: &str, limit: i64) -> Result<Vec<Tag>, StoreError> {
        // Prefixes are slugified upstream, so they never carry LIKE wildcards.
        let sql = format!("SELECT {TAG_COLUMNS} FROM tags WHERE slug LIKE ? ORDER BY slug LIMIT ?");
        sqlx::query_as::<_, TagRow>(&self.dialect.sql(&sql))
            .bind(format!("{prefix}%"))
            .bind(limit)
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(TagRow::into_tag)
            .collect()
    }
}
