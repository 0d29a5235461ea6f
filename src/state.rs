use actix_web::http::StatusCode;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthError, AuthService, PasswordHasher, TokenCodec};
use crate::config::Config;
use crate::store::{CredentialStore, TaskStore};

/// Everything handlers need, built once before the server starts and shared
/// read-only between workers.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub tasks: Arc<dyn TaskStore>,
    pub codec: Arc<TokenCodec>,
    pub store_timeout: Duration,
    pub username_taken_status: StatusCode,
}

impl AppState {
    pub fn new(
        config: &Config,
        credentials: Arc<dyn CredentialStore>,
        tasks: Arc<dyn TaskStore>,
    ) -> Result<Self, AuthError> {
        let codec = Arc::new(TokenCodec::new(&config.auth));
        let auth = AuthService::new(
            credentials,
            PasswordHasher::new(config.bcrypt_cost),
            Arc::clone(&codec),
            config.store_timeout,
        )?;

        Ok(Self {
            auth: Arc::new(auth),
            tasks,
            codec,
            store_timeout: config.store_timeout,
            username_taken_status: config.username_taken_status,
        })
    }
}
