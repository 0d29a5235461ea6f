//! Persistence boundary.
//!
//! The auth core only needs two things from storage: look a user up by
//! username and create a user with a unique username. The task routes need
//! owner-scoped CRUD. Both are expressed as object-safe async traits so the
//! application can run against PostgreSQL in production and against
//! [`MemoryStore`] in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

use crate::models::{Task, TaskInput, User, UserId};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a store backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The username is already registered.
    #[error("unique constraint violated")]
    UniqueViolation,
    /// The backend did not answer within the configured deadline.
    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
    #[error("database error: {0}")]
    Database(#[source] sqlx::Error),
    /// A row could not be mapped onto the domain model.
    #[error("invalid record: {0}")]
    InvalidRecord(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> Self {
        match &error {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                StoreError::UniqueViolation
            }
            _ => StoreError::Database(error),
        }
    }
}

/// Username/password-hash persistence used by signup and login.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Returns the user registered under `username`, if any.
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;

    /// Registers a new user. Fails with [`StoreError::UniqueViolation`] when
    /// the username is taken.
    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError>;
}

/// Task persistence. Every operation is keyed by the owning user; a task that
/// belongs to somebody else behaves exactly like a task that does not exist.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self, owner: UserId) -> Result<Vec<Task>, StoreError>;

    async fn create(&self, owner: UserId, input: TaskInput) -> Result<Task, StoreError>;

    async fn get(&self, owner: UserId, id: i64) -> Result<Option<Task>, StoreError>;

    /// Returns `None` when no task with `id` is owned by `owner`.
    async fn update(
        &self,
        owner: UserId,
        id: i64,
        input: TaskInput,
    ) -> Result<Option<Task>, StoreError>;

    /// Returns `false` when no task with `id` is owned by `owner`.
    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, StoreError>;
}

/// Bounds a store call so a stalled backend surfaces as an error instead of
/// hanging the request.
pub async fn with_deadline<T, F>(deadline: Duration, call: F) -> Result<T, StoreError>
where
    F: Future<Output = Result<T, StoreError>>,
{
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(StoreError::Timeout(deadline)),
    }
}
