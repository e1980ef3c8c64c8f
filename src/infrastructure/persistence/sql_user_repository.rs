//! Portable SQL implementation of the user repository.

use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::{AnyConnection, AnyPool};
use uuid::Uuid;

use crate::domain::entities::{User, UserLogin};
use crate::domain::repositories::UserRepository;
use crate::error::StoreError;
use crate::infrastructure::database::{Database, Dialect, begin_write};
use crate::infrastructure::persistence::rows::{USER_COLUMNS, UserRow};
use crate::utils::db_error::is_unique_violation;
use crate::utils::slug::slugify;
use crate::utils::time;

/// Concurrent first logins can race for the same display-name slug.
const MAX_UPSERT_ATTEMPTS: usize = 3;

/// Fallback when a display name has no slug-able characters.
const DEFAULT_DISPLAY_SLUG: &str = "user";

/// SQL repository for users.
pub struct SqlUserRepository {
    pool: AnyPool,
    dialect: Dialect,
}

impl SqlUserRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            pool: db.pool().clone(),
            dialect: db.dialect(),
        }
    }

    async fn try_upsert_login(&self, login: &UserLogin) -> Result<UserRow, sqlx::Error> {
        let d = self.dialect;
        let mut tx = begin_write(&self.pool, d).await?;

        let select = format!("SELECT {USER_COLUMNS} FROM users WHERE provider = ? AND subject = ?");
        let existing = sqlx::query_as::<_, UserRow>(&d.sql(&select))
            .bind(&login.provider)
            .bind(&login.subject)
            .fetch_optional(&mut *tx)
            .await?;

        let now = time::to_micros(time::now());

        let id = match existing {
            Some(row) => {
                let slug = match row.display_name_slug {
                    Some(slug) if row.display_name == login.display_name => slug,
                    _ => next_free_slug(&mut tx, d, &login.display_name, Some(&row.id)).await?,
                };

                sqlx::query(&d.sql(
                    "UPDATE users SET email = ?, display_name = ?, display_name_slug = ?, \
                     role = ?, updated_at = ? WHERE id = ?",
                ))
                .bind(&login.email)
                .bind(&login.display_name)
                .bind(slug)
                .bind(login.role.as_str())
                .bind(now)
                .bind(&row.id)
                .execute(&mut *tx)
                .await?;

                row.id
            }
            None => {
                let id = Uuid::new_v4().to_string();
                let slug = next_free_slug(&mut tx, d, &login.display_name, None).await?;

                sqlx::query(&d.sql(
                    "INSERT INTO users (id, provider, subject, email, display_name, \
                     display_name_slug, role, created_at, updated_at) \
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
                ))
                .bind(&id)
                .bind(&login.provider)
                .bind(&login.subject)
                .bind(&login.email)
                .bind(&login.display_name)
                .bind(slug)
                .bind(login.role.as_str())
                .bind(now)
                .bind(now)
                .execute(&mut *tx)
                .await?;

                id
            }
        };

        let select = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        let row = sqlx::query_as::<_, UserRow>(&d.sql(&select))
            .bind(&id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }
}

/// Picks `base`, or the first `base-N` (N >= 2) not held by another user.
///
/// One query fetches every candidate that could collide.
async fn next_free_slug(
    conn: &mut AnyConnection,
    dialect: Dialect,
    display_name: &str,
    exclude_id: Option<&str>,
) -> Result<String, sqlx::Error> {
    let base = match slugify(display_name) {
        s if s.is_empty() => DEFAULT_DISPLAY_SLUG.to_string(),
        s => s,
    };

    let sql = format!(
        "SELECT display_name_slug FROM users \
         WHERE (display_name_slug = ? OR display_name_slug LIKE ({})) AND id <> ?",
        dialect.concat(&["?", "'-%'"])
    );
    let taken: HashSet<String> = sqlx::query_scalar::<_, Option<String>>(&dialect.sql(&sql))
        .bind(&base)
        .bind(&base)
        .bind(exclude_id.unwrap_or(""))
        .fetch_all(&mut *conn)
        .await?
        .into_iter()
        .flatten()
        .collect();

    if !taken.contains(&base) {
        return Ok(base);
    }

    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if !taken.contains(&candidate) {
            return Ok(candidate);
        }
        n += 1;
    }
}

#[async_trait]
impl UserRepository for SqlUserRepository {
    async fn upsert_login(&self, login: UserLogin) -> Result<User, StoreError> {
        let mut attempt = 1;
        loop {
            match self.try_upsert_login(&login).await {
                Ok(row) => return row.into_user(),
                Err(e) if is_unique_violation(&e) && attempt < MAX_UPSERT_ATTEMPTS => {
                    tracing::debug!(
                        provider = %login.provider,
                        attempt,
                        "User upsert raced another login, retrying"
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?");
        sqlx::query_as::<_, UserRow>(&self.dialect.sql(&sql))
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .map(UserRow::into_user)
            .transpose()
    }
}
