/// Account operations
///
/// Sign-up, sign-in and profile maintenance on top of a `UserRepository`.
/// Password hashing runs on the blocking pool since bcrypt is slow on purpose.

use std::sync::Arc;

use crate::auth::{hash_password, verify_password, TokenIssuer, TokenPair};
use crate::domain::{Credential, NewCredential, PasswordHash};
use crate::error::{AppError, AuthError};
use crate::repository::UserRepository;
use crate::validators::is_valid_username;

pub struct UserService {
    repository: Arc<dyn UserRepository>,
    tokens: TokenIssuer,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, tokens: TokenIssuer) -> Self {
        Self { repository, tokens }
    }

    pub async fn create_user(&self, username: &str, password: &str) -> Result<Credential, AppError> {
        // Reject a bad username before paying for a bcrypt round
        let username = is_valid_username(username)?;
        let password_hash = hash_blocking(password.to_string()).await?;
        let credential = NewCredential::new(&username, password_hash)?;

        let user = self.repository.insert(credential).await?;
        tracing::info!(user_id = user.id, username = %user.username, "User created");
        Ok(user)
    }

    pub async fn list_users(&self) -> Result<Vec<Credential>, AppError> {
        self.repository.list().await
    }

    pub async fn get_user_by_id(&self, user_id: i64) -> Result<Credential, AppError> {
        self.repository
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Auth(AuthError::UserNotFound))
    }

    /// Lookup with the same whitespace normalisation sign-up applies
    pub async fn get_user_by_username(&self, username: &str) -> Result<Credential, AppError> {
        self.repository
            .find_by_username(username.trim())
            .await?
            .ok_or(AppError::Auth(AuthError::UserNotFound))
    }

    pub async fn update_password(&self, username: &str, password: &str) -> Result<Credential, AppError> {
        let mut user = self.get_user_by_username(username).await?;

        let password_hash = hash_blocking(password.to_string()).await?;
        user.update_password(password_hash);
        self.repository.update_password(&user).await?;

        tracing::info!(user_id = user.id, "Password updated");
        Ok(user)
    }

    pub async fn delete_user(&self, username: &str) -> Result<(), AppError> {
        let user = self.get_user_by_username(username).await?;
        self.repository.delete(user.id).await?;

        tracing::info!(user_id = user.id, "User deleted");
        Ok(())
    }

    /// Check credentials and hand out an access/refresh token pair
    ///
    /// # Errors
    /// - `UserNotFound` if no account has `username`
    /// - `InvalidPassword` if the password does not match
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<TokenPair, AppError> {
        let user = self.get_user_by_username(username).await?;

        let stored = user.password_hash().clone();
        let password = password.to_string();
        let matches = actix_web::web::block(move || verify_password(&password, &stored))
            .await
            .map_err(|e| AppError::Internal(format!("Password check aborted: {}", e)))??;

        if !matches {
            return Err(AppError::Auth(AuthError::InvalidPassword));
        }

        self.tokens.issue_pair(&user.username)
    }
}

async fn hash_blocking(password: String) -> Result<PasswordHash, AppError> {
    actix_web::web::block(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing aborted: {}", e)))?
}
