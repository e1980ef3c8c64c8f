//! Portable SQL implementation of the link repository.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use sqlx::{AnyConnection, AnyPool};
use uuid::Uuid;

use crate::domain::entities::{Link, LinkOwner, LinkUpdate, NewLink, Tag};
use crate::domain::ownership::ensure_removable;
use crate::domain::repositories::LinkRepository;
use crate::error::StoreError;
use crate::infrastructure::database::{Database, Dialect, begin_write};
use crate::infrastructure::persistence::rows::{
    LINK_COLUMNS, LinkRow, LinkTagRow, OwnerRow, placeholders,
};
use crate::infrastructure::persistence::sql_tag_repository::upsert_tag_in;
use crate::utils::db_error::{is_foreign_key_violation, is_unique_violation};
use crate::utils::slug::normalize_tag_names;
use crate::utils::time;

/// SQL repository for links, their ownership rows and tag associations.
///
/// Multi-row mutations run in one transaction taken from the pool. A
/// dropped transaction rolls back, so every early `?` return leaves the
/// database untouched.
pub struct SqlLinkRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlLinkRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dialect: db.dialect(),
        }
    }

    async fn materialize(
        &self,
        conn: &mut AnyConnection,
        rows: Vec<LinkRow>,
    ) -> Result<Vec<Link>, StoreError> {
        materialize(conn, self.dialect, rows).await
    }
}

/// Loads owners and tags for `rows` with one query each.
async fn materialize(
    conn: &mut AnyConnection,
    dialect: Dialect,
    rows: Vec<LinkRow>,
) -> Result<Vec<Link>, StoreError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
    let in_list = placeholders(ids.len());

    let owners_raw = format!(
        "SELECT link_id, user_id, is_primary, added_at FROM link_owners \
         WHERE link_id IN ({in_list}) ORDER BY is_primary DESC, added_at, user_id"
    );
    let owners_sql = dialect.sql(&owners_raw);
    let mut owners_query = sqlx::query_as::<_, OwnerRow>(&owners_sql);
    for id in &ids {
        owners_query = owners_query.bind(*id);
    }
    let owner_rows = owners_query.fetch_all(&mut *conn).await?;

    let tags_raw = format!(
        "SELECT lt.link_id, t.id, t.name, t.slug, t.created_at FROM link_tags lt \
         JOIN tags t ON t.id = lt.tag_id WHERE lt.link_id IN ({in_list}) ORDER BY t.slug"
    );
    let tags_sql = dialect.sql(&tags_raw);
    let mut tags_query = sqlx::query_as::<_, LinkTagRow>(&tags_sql);
    for id in &ids {
        tags_query = tags_query.bind(*id);
    }
    let tag_rows = tags_query.fetch_all(&mut *conn).await?;

    let mut owners: HashMap<String, Vec<LinkOwner>> = HashMap::new();
    for row in owner_rows {
        let link_id = row.link_id.clone();
        owners.entry(link_id).or_default().push(row.into_owner()?);
    }

    let mut tags: HashMap<String, Vec<Tag>> = HashMap::new();
    for row in tag_rows {
        tags.entry(row.link_id).or_default().push(row.tag.into_tag()?);
    }

    rows.into_iter()
        .map(|row| {
            let link_owners = owners.remove(&row.id).unwrap_or_default();
            let link_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_link(link_owners, link_tags)
        })
        .collect()
}

async fn find_by_id_in(
    conn: &mut AnyConnection,
    dialect: Dialect,
    id: Uuid,
) -> Result<Option<Link>, StoreError> {
    let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?");
    let row = sqlx::query_as::<_, LinkRow>(&dialect.sql(&sql))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    let Some(row) = row else {
        return Ok(None);
    };
    Ok(materialize(conn, dialect, vec![row]).await?.pop())
}

async fn ensure_link_exists(
    conn: &mut AnyConnection,
    dialect: Dialect,
    id: Uuid,
) -> Result<(), StoreError> {
    let found: Option<String> = sqlx::query_scalar(&dialect.sql("SELECT id FROM links WHERE id = ?"))
        .bind(id.to_string())
        .fetch_optional(&mut *conn)
        .await?;

    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::not_found("link", id)),
    }
}

#[async_trait]
impl LinkRepository for SqlLinkRepository {
    async fn create(&self, new_link: NewLink) -> Result<Link, StoreError> {
        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        let taken_sql = format!("SELECT id FROM links WHERE {}", d.eq_ignore_case("slug"));
        let taken: Option<String> = sqlx::query_scalar(&d.sql(&taken_sql))
            .bind(&new_link.slug)
            .fetch_optional(&mut *tx)
            .await?;
        if taken.is_some() {
            return Err(StoreError::SlugTaken(new_link.slug));
        }

        let id = Uuid::new_v4();
        let now = time::now();
        let ts = time::to_micros(now);

        sqlx::query(&d.sql(
            "INSERT INTO links (id, slug, url, title, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        ))
        .bind(id.to_string())
        .bind(&new_link.slug)
        .bind(&new_link.url)
        .bind(&new_link.title)
        .bind(&new_link.description)
        .bind(ts)
        .bind(ts)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::SlugTaken(new_link.slug.clone())
            } else {
                e.into()
            }
        })?;

        sqlx::query(&d.sql(
            "INSERT INTO link_owners (link_id, user_id, is_primary, added_at) VALUES (?, ?, 1, ?)",
        ))
        .bind(id.to_string())
        .bind(new_link.owner_id.to_string())
        .bind(ts)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::not_found("user", new_link.owner_id)
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;

        tracing::debug!(link_id = %id, slug = %new_link.slug, "Link created");

        Ok(Link {
            id,
            slug: new_link.slug,
            url: new_link.url,
            title: new_link.title,
            description: new_link.description,
            created_at: now,
            updated_at: now,
            owners: vec![LinkOwner {
                user_id: new_link.owner_id,
                is_primary: true,
                added_at: now,
            }],
            tags: Vec::new(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Link>, StoreError> {
        let mut conn = self.pool.acquire().await?;
        find_by_id_in(&mut conn, self.dialect, id).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Link>, StoreError> {
        let d = self.dialect;
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE {}",
            d.eq_ignore_case("slug")
        );
        let row = sqlx::query_as::<_, LinkRow>(&d.sql(&sql))
            .bind(slug)
            .fetch_optional(&mut *conn)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };
        Ok(self.materialize(&mut conn, vec![row]).await?.pop())
    }

    async fn list_by_owner(&self, user_id: Uuid) -> Result<Vec<Link>, StoreError> {
        let mut conn = self.pool.acquire().await?;

        let rows = sqlx::query_as::<_, LinkRow>(&self.dialect.sql(
            "SELECT l.id, l.slug, l.url, l.title, l.description, l.created_at, l.updated_at \
             FROM links l JOIN link_owners o ON o.link_id = l.id \
             WHERE o.user_id = ? ORDER BY l.updated_at DESC, l.slug",
        ))
        .bind(user_id.to_string())
        .fetch_all(&mut *conn)
        .await?;

        self.materialize(&mut conn, rows).await
    }

    async fn update(&self, id: Uuid, update: LinkUpdate) -> Result<Link, StoreError> {
        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        let result = sqlx::query(&d.sql(
            "UPDATE links SET url = ?, title = ?, description = ?, updated_at = ? WHERE id = ?",
        ))
        .bind(&update.url)
        .bind(&update.title)
        .bind(&update.description)
        .bind(time::to_micros(time::now()))
        .bind(id.to_string())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("link", id));
        }

        let link = find_by_id_in(&mut tx, d, id)
            .await?
            .ok_or_else(|| StoreError::not_found("link", id))?;

        tx.commit().await?;
        Ok(link)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StoreError> {
        let result = sqlx::query(&self.dialect.sql("DELETE FROM links WHERE id = ?"))
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("link", id));
        }

        tracing::debug!(link_id = %id, "Link deleted");
        Ok(())
    }

    async fn add_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        ensure_link_exists(&mut tx, d, link_id).await?;

        sqlx::query(&d.sql(
            "INSERT INTO link_owners (link_id, user_id, is_primary, added_at) VALUES (?, ?, 0, ?)",
        ))
        .bind(link_id.to_string())
        .bind(user_id.to_string())
        .bind(time::to_micros(time::now()))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateOwner { link_id, user_id }
            } else if is_foreign_key_violation(&e) {
                StoreError::not_found("user", user_id)
            } else {
                e.into()
            }
        })?;

        tx.commit().await?;
        Ok(())
    }

    async fn remove_owner(&self, link_id: Uuid, user_id: Uuid) -> Result<(), StoreError> {
        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        let is_primary: Option<i64> = sqlx::query_scalar(&d.sql(
            "SELECT is_primary FROM link_owners WHERE link_id = ? AND user_id = ?",
        ))
        .bind(link_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&mut *tx)
        .await?;

        ensure_removable(link_id, user_id, is_primary.map(|flag| flag == 1))?;

        sqlx::query(&d.sql(
            "DELETE FROM link_owners WHERE link_id = ? AND user_id = ? AND is_primary = 0",
        ))
        .bind(link_id.to_string())
        .bind(user_id.to_string())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn set_tags(
        &self,
        link_id: Uuid,
        tag_names: Vec<String>,
    ) -> Result<Vec<Tag>, StoreError> {
        let desired = normalize_tag_names(&tag_names)?;

        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        ensure_link_exists(&mut tx, d, link_id).await?;

        let mut tags = Vec::with_capacity(desired.len());
        for (name, slug) in &desired {
            tags.push(upsert_tag_in(&mut tx, d, name, slug).await?);
        }

        let current: HashSet<String> =
            sqlx::query_scalar::<_, String>(&d.sql("SELECT tag_id FROM link_tags WHERE link_id = ?"))
                .bind(link_id.to_string())
                .fetch_all(&mut *tx)
                .await?
                .into_iter()
                .collect();
        let wanted: HashSet<String> = tags.iter().map(|t| t.id.to_string()).collect();

        let insert_sql = d.insert_ignore("link_tags", &["link_id", "tag_id"], &["link_id", "tag_id"]);
        let mut changed = false;

        for tag_id in wanted.difference(&current) {
            sqlx::query(&d.sql(&insert_sql))
                .bind(link_id.to_string())
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
            changed = true;
        }

        for tag_id in current.difference(&wanted) {
            sqlx::query(&d.sql("DELETE FROM link_tags WHERE link_id = ? AND tag_id = ?"))
                .bind(link_id.to_string())
                .bind(tag_id)
                .execute(&mut *tx)
                .await?;
            changed = true;
        }

        if changed {
            sqlx::query(&d.sql("UPDATE links SET updated_at = ? WHERE id = ?"))
                .bind(time::to_micros(time::now()))
                .bind(link_id.to_string())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tags.sort_by(|a, b| a.slug.cmp(&b.slug));
        Ok(tags)
    }

    async fn count_all(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM links")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
