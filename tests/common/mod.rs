#![allow(dead_code)]

use std::sync::Arc;

use golinks::application::services::LinkService;
use golinks::domain::click_worker::{ClickWorker, spawn_click_pipeline};
use golinks::domain::entities::{Link, Role, User, UserLogin};
use golinks::domain::repositories::UserRepository;
use golinks::infrastructure::database::{Database, Dialect, PoolSettings};
use golinks::infrastructure::persistence::{
    SqlClickRepository, SqlLinkRepository, SqlUserRepository,
};
use golinks::state::AppState;
use golinks::utils::ip_hash::IpHasher;
use tempfile::TempDir;
use tokio::sync::watch;
use uuid::Uuid;

pub const TEST_IP_SECRET: &str = "test-ip-secret";

/// A migrated SQLite database in a temporary directory.
///
/// The directory is removed when this is dropped, so keep it alive for the
/// whole test.
pub struct TestDb {
    pub db: Database,
    _dir: TempDir,
}

pub async fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("golinks.db").display());

    let db = Database::connect(&url, Dialect::Sqlite, &PoolSettings::default())
        .await
        .unwrap();
    db.migrate().await.unwrap();

    TestDb { db, _dir: dir }
}

pub async fn create_test_user(db: &Database, display_name: &str) -> User {
    create_user_with_role(db, display_name, Role::User).await
}

pub async fn create_user_with_role(db: &Database, display_name: &str, role: Role) -> User {
    SqlUserRepository::new(db)
        .upsert_login(UserLogin {
            provider: "test".to_string(),
            subject: Uuid::new_v4().to_string(),
            email: format!("{}@example.com", Uuid::new_v4().simple()),
            display_name: display_name.to_string(),
            role,
        })
        .await
        .unwrap()
}

pub fn link_service(db: &Database) -> LinkService<SqlLinkRepository> {
    LinkService::new(Arc::new(SqlLinkRepository::new(db)))
}

pub async fn create_test_link(db: &Database, slug: &str, url: &str, owner_id: Uuid) -> Link {
    link_service(db)
        .create(slug, url, "", "", owner_id)
        .await
        .unwrap()
}

pub async fn count_rows(db: &Database, sql: &str, link_id: Uuid) -> i64 {
    sqlx::query_scalar(sql)
        .bind(link_id.to_string())
        .fetch_one(db.pool())
        .await
        .unwrap()
}

/// Application state over `db` with a live click pipeline.
///
/// Flip the returned sender to `true` and join the worker to drain it.
pub fn create_test_state(db: &Database) -> (AppState, ClickWorker, watch::Sender<bool>) {
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let (click_sender, click_worker) =
        spawn_click_pipeline(Arc::new(SqlClickRepository::new(db)), 64, shutdown_rx);

    let state = AppState::new(db.clone(), click_sender, IpHasher::new(TEST_IP_SECRET));

    (state, click_worker, shutdown_tx)
}
