//! Connection pool construction and schema migrations.
//!
//! All engines are reached through `sqlx`'s `Any` driver, so repositories
//! hold one pool type regardless of deployment. The [`Dialect`] travels
//! next to the pool and is consulted wherever syntax diverges.

pub mod dialect;

use std::time::Duration;

use sqlx::any::{AnyPoolOptions, install_default_drivers};
use sqlx::{Any, AnyPool, Executor, Transaction};

use crate::error::StoreError;

pub use dialect::{Dialect, UnsupportedDialect};

/// Opens a transaction for a multi-row mutation.
///
/// Every repository write path goes through here so SQLite writers queue
/// on the write lock instead of failing on upgrade.
pub async fn begin_write(
    pool: &AnyPool,
    dialect: Dialect,
) -> Result<Transaction<'static, Any>, sqlx::Error> {
    match dialect.begin_write() {
        Some(statement) => pool.begin_with(statement).await,
        None => pool.begin().await,
    }
}

/// Pool tuning knobs.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub idle_timeout: Duration,
    pub max_lifetime: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            acquire_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            max_lifetime: Duration::from_secs(1800),
        }
    }
}

/// A connection pool bound to its dialect.
#[derive(Debug, Clone)]
pub struct Database {
    pool: AnyPool,
    dialect: Dialect,
}

impl Database {
    /// Opens a pool for `url`.
    ///
    /// Every new connection runs the dialect's connection pragmas before it
    /// is handed out, so SQLite enforces foreign keys on all of them.
    pub async fn connect(
        url: &str,
        dialect: Dialect,
        settings: &PoolSettings,
    ) -> Result<Self, sqlx::Error> {
        install_default_drivers();

        let pool = AnyPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .idle_timeout(settings.idle_timeout)
            .max_lifetime(settings.max_lifetime)
            .after_connect(move |conn, _meta| {
                Box::pin(async move {
                    for pragma in dialect.connection_pragmas() {
                        (&mut *conn).execute(*pragma).await?;
                    }
                    Ok(())
                })
            })
            .connect(url)
            .await?;

        tracing::debug!(dialect = %dialect, "Database pool opened");

        Ok(Self { pool, dialect })
    }

    pub fn pool(&self) -> &AnyPool {
        &self.pool
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Applies pending forward-only migrations for this dialect.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        self.dialect.migrator().run(&self.pool).await
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
