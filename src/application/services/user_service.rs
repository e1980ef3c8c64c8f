//! User lookups and login upserts.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::entities::{User, UserLogin};
use crate::domain::repositories::UserRepository;
use crate::error::StoreError;

pub struct UserService<U: UserRepository + ?Sized> {
    user_repository: Arc<U>,
}

impl<U: UserRepository + ?Sized> UserService<U> {
    pub fn new(user_repository: Arc<U>) -> Self {
        Self { user_repository }
    }

    /// Records a successful login. The display name falls back to the email
    /// when blank.
    pub async fn login(&self, mut login: UserLogin) -> Result<User, StoreError> {
        login.provider = login.provider.trim().to_string();
        login.subject = login.subject.trim().to_string();
        login.email = login.email.trim().to_string();
        login.display_name = login.display_name.trim().to_string();

        if login.display_name.is_empty() {
            login.display_name = login.email.clone();
        }

        self.user_repository.upsert_login(login).await
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<User, StoreError> {
        self.user_repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| StoreError::not_found("user", id))
    }
}
