use std::sync::Arc;

use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2, PasswordHash, PasswordVerifier,
};
use rand::rngs::OsRng;
use rand::{distributions::Alphanumeric, Rng};
use sha2::{Digest, Sha256};
use tracing::info;

use crate::domain::{
    models::{session::SessionRecord, user::User},
    ports::{SessionRepository, UserRepository},
};
use crate::error::{is_unique_violation, AppError, ValidationError};

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    /// Creates a user with a hashed credential. Does not log the user in;
    /// the caller is expected to send them to the login form next.
    pub async fn register(&self, username: &str, password: &str) -> Result<User, AppError> {
        if username.is_empty() {
            return Err(ValidationError::UsernameRequired.into());
        }
        if password.is_empty() {
            return Err(ValidationError::PasswordRequired.into());
        }
        if self.users.find_by_username(username).await?.is_some() {
            return Err(ValidationError::UsernameTaken(username.to_string()).into());
        }

        let password_hash = hash_password(password.to_string()).await?;

        let user = match self.users.create(username, &password_hash).await {
            Ok(user) => user,
            // The unique constraint stays the final authority when a
            // concurrent registration slips past the pre-check.
            Err(AppError::Database(e)) if is_unique_violation(&e) => {
                return Err(ValidationError::UsernameTaken(username.to_string()).into());
            }
            Err(e) => return Err(e),
        };

        info!("Registered user {} (id {})", user.username, user.id);
        Ok(user)
    }

    /// Verifies the credential and opens a fresh session, discarding the
    /// caller's prior one if a token is supplied. Returns the raw token
    /// the caller keeps as its cookie; only its hash is stored.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        prior_token: Option<&str>,
    ) -> Result<String, AppError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !verify_password(password.to_string(), user.password_hash.clone()).await? {
            return Err(AppError::InvalidCredentials);
        }

        if let Some(token) = prior_token {
            self.sessions.delete(&self.hash_token(token)).await?;
        }

        let token: String = rand::thread_rng()
            .sample_iter(&Alphanumeric)
            .take(64)
            .map(char::from)
            .collect();

        self.sessions
            .create(&SessionRecord::new(self.hash_token(&token), user.id))
            .await?;

        info!("User {} logged in", user.id);
        Ok(token)
    }

    /// Drops the session behind the token. Idempotent: an unknown token
    /// deletes nothing and still succeeds.
    pub async fn logout(&self, token: &str) -> Result<(), AppError> {
        self.sessions.delete(&self.hash_token(token)).await
    }

    /// Resolves a session token to its user, or None when the session is
    /// unknown or the user row has since disappeared.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<User>, AppError> {
        let Some(session) = self.sessions.find(&self.hash_token(token)).await? else {
            return Ok(None);
        };
        self.users.find_by_id(session.user_id).await
    }

    pub fn hash_token(&self, token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

// Argon2 hashing is CPU-bound, so both directions run on the blocking pool.

async fn hash_password(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| {
                tracing::error!("Password hashing failed: {}", e);
                AppError::Internal
            })
    })
    .await
    .map_err(|_| AppError::Internal)?
}

async fn verify_password(password: String, password_hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&password_hash).map_err(|e| {
            tracing::error!("Stored password hash is malformed: {}", e);
            AppError::Internal
        })?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok())
    })
    .await
    .map_err(|_| AppError::Internal)?
}
