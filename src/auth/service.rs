use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

use super::password::{PasswordError, PasswordHasher};
use super::token::{TokenCodec, TokenError};
use super::Credentials;
use crate::models::UserId;
use crate::store::{with_deadline, CredentialStore, StoreError};

// Verified against when the username is unknown so both login failure paths
// cost one bcrypt verification.
const TIMING_DUMMY_PASSWORD: &str = "taskgate-timing-equaliser";

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("username is already taken")]
    UsernameTaken,
    /// Unknown user and wrong password are intentionally the same error.
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hashing(#[from] PasswordError),
    #[error("token issuance failed: {0}")]
    TokenIssuance(#[source] TokenError),
    #[error("credential store unavailable: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// Signup and login orchestration on top of a [`CredentialStore`].
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    hasher: PasswordHasher,
    codec: Arc<TokenCodec>,
    store_timeout: Duration,
    dummy_hash: String,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        hasher: PasswordHasher,
        codec: Arc<TokenCodec>,
        store_timeout: Duration,
    ) -> Result<Self, AuthError> {
        let dummy_hash = hasher.hash(TIMING_DUMMY_PASSWORD)?;
        Ok(Self {
            store,
            hasher,
            codec,
            store_timeout,
            dummy_hash,
        })
    }

    /// Registers a new user and returns its id.
    pub async fn signup(&self, credentials: Credentials) -> Result<UserId, AuthError> {
        if credentials.username.trim().is_empty() || credentials.password.is_empty() {
            return Err(AuthError::Validation(
                "username and password are required".into(),
            ));
        }
        let Credentials { username, password } = credentials;

        let password_hash = self.run_hasher(move |hasher| hasher.hash(&password)).await??;

        let user_id = with_deadline(
            self.store_timeout,
            self.store.create(&username, &password_hash),
        )
        .await
        .map_err(|err| match err {
            StoreError::UniqueViolation => {
                debug!("signup rejected: username {:?} already registered", username);
                AuthError::UsernameTaken
            }
            other => AuthError::StoreUnavailable(other),
        })?;

        info!("registered user {} as {:?}", user_id, username);
        Ok(user_id)
    }

    /// Checks the credentials and issues a session token.
    pub async fn login(&self, credentials: Credentials) -> Result<String, AuthError> {
        let Credentials { username, password } = credentials;

        let user = with_deadline(self.store_timeout, self.store.get_by_username(&username))
            .await
            .map_err(AuthError::StoreUnavailable)?;

        let (user_id, stored_hash) = match user {
            Some(user) => (Some(user.id), user.password_hash),
            None => (None, self.dummy_hash.clone()),
        };
        let verified = self
            .run_hasher(move |hasher| hasher.verify(&password, &stored_hash))
            .await?;

        let user_id = match (user_id, verified) {
            (Some(user_id), Ok(true)) => user_id,
            (None, _) => {
                debug!("login rejected for {:?}: unknown username", username);
                return Err(AuthError::InvalidCredentials);
            }
            (Some(user_id), Ok(false)) => {
                debug!("login rejected for user {}: password mismatch", user_id);
                return Err(AuthError::InvalidCredentials);
            }
            (Some(user_id), Err(err)) => {
                error!("login rejected for user {}: {}", user_id, err);
                return Err(AuthError::InvalidCredentials);
            }
        };

        let token = self
            .codec
            .issue(user_id)
            .map_err(AuthError::TokenIssuance)?;
        info!("user {} logged in", user_id);
        Ok(token)
    }

    /// bcrypt is CPU bound; keep it off the async workers.
    async fn run_hasher<T, F>(&self, job: F) -> Result<T, AuthError>
    where
        F: FnOnce(PasswordHasher) -> T + Send + 'static,
        T: Send + 'static,
    {
        let hasher = self.hasher;
        tokio::task::spawn_blocking(move || job(hasher))
            .await
            .map_err(|err| AuthError::Hashing(PasswordError::Worker(err.to_string())))
    }
}
