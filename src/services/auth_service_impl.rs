//! `SeaORM` implementation of the `AuthService` trait.

use async_trait::async_trait;

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::services::auth_service::{Actor, AuthError, AuthService, LoginResult, UserInfo};

pub struct SeaOrmAuthService {
    store: Store,
    security: SecurityConfig,
}

impl SeaOrmAuthService {
    #[must_use]
    pub const fn new(store: Store, security: SecurityConfig) -> Self {
        Self { store, security }
    }
}

#[async_trait]
impl AuthService for SeaOrmAuthService {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError> {
        let is_valid = self.store.verify_user_password(username, password).await?;

        if !is_valid {
            return Err(AuthError::InvalidCredentials);
        }

        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(LoginResult {
            username: user.username,
            role: user.role,
            api_key: user.api_key,
        })
    }

    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Actor>, AuthError> {
        let user = self.store.verify_api_key(api_key).await?;
        Ok(user.map(|u| Actor {
            username: u.username,
            role: u.role,
        }))
    }

    async fn resolve_actor(&self, username: &str) -> Result<Option<Actor>, AuthError> {
        let user = self.store.get_user_by_username(username).await?;

        // A session can outlive a deactivation; re-check on every request.
        Ok(user.filter(|u| u.active).map(|u| Actor {
            username: u.username,
            role: u.role,
        }))
    }

    async fn get_user_info(&self, username: &str) -> Result<UserInfo, AuthError> {
        let user = self
            .store
            .get_user_by_username(username)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        Ok(UserInfo {
            username: user.username,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
            updated_at: user.updated_at,
        })
    }

    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError> {
        if new_password.len() < 8 {
            return Err(AuthError::Validation(
                "New password must be at least 8 characters".to_string(),
            ));
        }

        if current_password == new_password {
            return Err(AuthError::Validation(
                "New password must be different from current password".to_string(),
            ));
        }

        let is_valid = self
            .store
            .verify_user_password(username, current_password)
            .await?;

        if !is_valid {
            return Err(AuthError::Validation(
                "Current password is incorrect".to_string(),
            ));
        }

        self.store
            .update_user_password(username, new_password, Some(&self.security))
            .await?;

        Ok(())
    }
}
