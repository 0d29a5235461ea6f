//! PostgreSQL backend built on `sqlx`.
//!
//! Queries are runtime-checked (`query_as`) so the crate builds without a live
//! database. The schema lives in `migrations/`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{CredentialStore, StoreError, TaskStore};
use crate::models::{Task, TaskInput, User, UserId};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, completed, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    username: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[derive(FromRow)]
struct TaskRow {
    id: i64,
    user_id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn user_id_from_db(raw: i64) -> Result<UserId, StoreError> {
    u64::try_from(raw)
        .map(UserId)
        .map_err(|_| StoreError::InvalidRecord(format!("negative user id {}", raw)))
}

fn user_id_to_db(id: UserId) -> Result<i64, StoreError> {
    i64::try_from(id.0)
        .map_err(|_| StoreError::InvalidRecord(format!("user id {} out of range", id)))
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(User {
            id: user_id_from_db(row.id)?,
            username: row.username,
            password_hash: row.password_hash,
            created_at: row.created_at,
        })
    }
}

impl TryFrom<TaskRow> for Task {
    type Error = StoreError;

    fn try_from(row: TaskRow) -> Result<Self, Self::Error> {
        Ok(Task {
            id: row.id,
            user_id: user_id_from_db(row.user_id)?,
            title: row.title,
            description: row.description,
            completed: row.completed,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, username, password_hash, created_at FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO users (username, password_hash) VALUES ($1, $2) RETURNING id",
        )
        .bind(username)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await?;

        user_id_from_db(id)
    }
}

#[async_trait]
impl TaskStore for PgStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            TASK_COLUMNS
        );
        let rows = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id_to_db(owner)?)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Task::try_from).collect()
    }

    async fn create(&self, owner: UserId, input: TaskInput) -> Result<Task, StoreError> {
        let sql = format!(
            "INSERT INTO tasks (user_id, title, description, completed) \
             VALUES ($1, $2, $3, $4) RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(user_id_to_db(owner)?)
            .bind(input.title)
            .bind(input.description)
            .bind(input.completed)
            .fetch_one(&self.pool)
            .await?;

        Task::try_from(row)
    }

    async fn get(&self, owner: UserId, id: i64) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(id)
            .bind(user_id_to_db(owner)?)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Task::try_from).transpose()
    }

    async fn update(
        &self,
        owner: UserId,
        id: i64,
        input: TaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "UPDATE tasks SET title = $1, description = $2, completed = $3, updated_at = NOW() \
             WHERE id = $4 AND user_id = $5 RETURNING {}",
            TASK_COLUMNS
        );
        let row = sqlx::query_as::<_, TaskRow>(&sql)
            .bind(input.title)
            .bind(input.description)
            .bind(input.completed)
            .bind(id)
            .bind(user_id_to_db(owner)?)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Task::try_from).transpose()
    }

    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id_to_db(owner)?)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_conversion_rejects_out_of_range_values() {
        assert_eq!(user_id_from_db(12).unwrap(), UserId(12));
        assert!(matches!(
            user_id_from_db(-1),
            Err(StoreError::InvalidRecord(_))
        ));
        assert_eq!(user_id_to_db(UserId(12)).unwrap(), 12);
        assert!(matches!(
            user_id_to_db(UserId(u64::MAX)),
            Err(StoreError::InvalidRecord(_))
        ));
    }
}
