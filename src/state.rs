//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, TagService, UserService};
use crate::domain::click_worker::ClickSender;
use crate::domain::ownership::OwnershipGuard;
use crate::infrastructure::database::Database;
use crate::infrastructure::persistence::{
    SqlLinkRepository, SqlOwnershipRepository, SqlTagRepository, SqlUserRepository,
};
use crate::utils::ip_hash::IpHasher;

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub link_service: Arc<LinkService<SqlLinkRepository>>,
    pub tag_service: Arc<TagService<SqlTagRepository>>,
    pub user_service: Arc<UserService<SqlUserRepository>>,
    pub ownership: Arc<OwnershipGuard<SqlOwnershipRepository>>,
    pub click_sender: ClickSender,
    pub ip_hasher: Arc<IpHasher>,
}

impl AppState {
    /// Builds the stores over `db`. The click pipeline is started by the
    /// caller, which keeps the worker handle for shutdown.
    pub fn new(db: Database, click_sender: ClickSender, ip_hasher: IpHasher) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(Arc::new(SqlLinkRepository::new(&db)))),
            tag_service: Arc::new(TagService::new(Arc::new(SqlTagRepository::new(&db)))),
            user_service: Arc::new(UserService::new(Arc::new(SqlUserRepository::new(&db)))),
            ownership: Arc::new(OwnershipGuard::new(Arc::new(SqlOwnershipRepository::new(
                &db,
            )))),
            click_sender,
            ip_hasher: Arc::new(ip_hasher),
            db,
        }
    }
}
