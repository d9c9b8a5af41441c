//! Domain service for authentication and user management.
//!
//! Handles login, session identity lookup, password changes, and API key
//! management. Role checks happen at the HTTP layer; this service only
//! reports what the identity is.

use serde::Serialize;
use thiserror::Error;

/// Errors specific to authentication operations.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User not found")]
    UserNotFound,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<sea_orm::DbErr> for AuthError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for AuthError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// User info DTO for responses.
#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub username: String,
    pub email: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Login result containing the authenticated identity.
#[derive(Debug, Clone, Serialize)]
pub struct LoginResult {
    pub username: String,
    pub role: String,
    pub api_key: String,
}

/// Authenticated identity as seen by downstream middleware and handlers.
#[derive(Debug, Clone)]
pub struct Actor {
    pub username: String,
    pub role: String,
}

impl Actor {
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}

/// Domain service trait for authentication.
#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    /// Verifies credentials and returns the identity.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] if login fails or the
    /// account is inactive.
    async fn login(&self, username: &str, password: &str) -> Result<LoginResult, AuthError>;

    /// Verifies an API key and returns the associated actor if valid.
    async fn verify_api_key(&self, api_key: &str) -> Result<Option<Actor>, AuthError>;

    /// Resolves a session username into an actor, if still valid.
    async fn resolve_actor(&self, username: &str) -> Result<Option<Actor>, AuthError>;

    /// Gets information for a specific user.
    async fn get_user_info(&self, username: &str) -> Result<UserInfo, AuthError>;

    /// Changes a user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] if current password is incorrect or new password invalid.
    async fn change_password(
        &self,
        username: &str,
        current_password: &str,
        new_password: &str,
    ) -> Result<(), AuthError>;
}
