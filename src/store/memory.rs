//! In-process store backend.
//!
//! Holds users and tasks behind a single `tokio::sync::RwLock`. Used by the
//! test suites and handy for running the API locally without PostgreSQL;
//! nothing survives a restart.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{CredentialStore, StoreError, TaskStore};
use crate::models::{Task, TaskInput, User, UserId};

#[derive(Default)]
struct Inner {
    users: HashMap<String, User>,
    next_user_id: u64,
    tasks: BTreeMap<i64, Task>,
    next_task_id: i64,
}

#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn get_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        Ok(self.inner.read().await.users.get(username).cloned())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<UserId, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.users.contains_key(username) {
            return Err(StoreError::UniqueViolation);
        }
        inner.next_user_id += 1;
        let id = UserId(inner.next_user_id);
        inner.users.insert(
            username.to_string(),
            User {
                id,
                username: username.to_string(),
                password_hash: password_hash.to_string(),
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }
}

#[async_trait]
impl TaskStore for MemoryStore {
    async fn list(&self, owner: UserId) -> Result<Vec<Task>, StoreError> {
        let inner = self.inner.read().await;
        // Ids are handed out in increasing order, so reverse id order is newest first.
        Ok(inner
            .tasks
            .values()
            .rev()
            .filter(|task| task.user_id == owner)
            .cloned()
            .collect())
    }

    async fn create(&self, owner: UserId, input: TaskInput) -> Result<Task, StoreError> {
        let mut inner = self.inner.write().await;
        inner.next_task_id += 1;
        let task = Task::new(inner.next_task_id, owner, input, Utc::now());
        inner.tasks.insert(task.id, task.clone());
        Ok(task)
    }

    async fn get(&self, owner: UserId, id: i64) -> Result<Option<Task>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .get(&id)
            .filter(|task| task.user_id == owner)
            .cloned())
    }

    async fn update(
        &self,
        owner: UserId,
        id: i64,
        input: TaskInput,
    ) -> Result<Option<Task>, StoreError> {
        let mut inner = self.inner.write().await;
        match inner.tasks.get_mut(&id) {
            Some(task) if task.user_id == owner => {
                task.apply(input, Utc::now());
                Ok(Some(task.clone()))
            }
            _ => Ok(None),
        }
    }

    async fn delete(&self, owner: UserId, id: i64) -> Result<bool, StoreError> {
        let mut inner = self.inner.write().await;
        let owned = inner
            .tasks
            .get(&id)
            .is_some_and(|task| task.user_id == owner);
        if owned {
            inner.tasks.remove(&id);
        }
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: title.to_string(),
            description: None,
            completed: false,
        }
    }

    #[actix_rt::test]
    async fn test_usernames_are_unique() {
        let store = MemoryStore::new();
        let first = CredentialStore::create(&store, "alice", "hash-a").await.unwrap();
        let second = CredentialStore::create(&store, "bob", "hash-b").await.unwrap();
        assert_ne!(first, second);

        let duplicate = CredentialStore::create(&store, "alice", "hash-c").await;
        assert!(matches!(duplicate, Err(StoreError::UniqueViolation)));

        let alice = store.get_by_username("alice").await.unwrap().unwrap();
        assert_eq!(alice.id, first);
        assert_eq!(alice.password_hash, "hash-a");
        assert!(store.get_by_username("carol").await.unwrap().is_none());
    }

    #[actix_rt::test]
    async fn test_tasks_are_scoped_by_owner() {
        let store = MemoryStore::new();
        let alice = UserId(1);
        let bob = UserId(2);

        let first = TaskStore::create(&store, alice, input("first")).await.unwrap();
        let second = TaskStore::create(&store, alice, input("second")).await.unwrap();
        TaskStore::create(&store, bob, input("bob's")).await.unwrap();

        let titles: Vec<String> = store
            .list(alice)
            .await
            .unwrap()
            .into_iter()
            .map(|task| task.title)
            .collect();
        assert_eq!(titles, vec!["second".to_string(), "first".to_string()]);

        assert!(store.get(bob, first.id).await.unwrap().is_none());
        assert!(store
            .update(bob, first.id, input("hijacked"))
            .await
            .unwrap()
            .is_none());
        assert!(!store.delete(bob, second.id).await.unwrap());

        let untouched = store.get(alice, first.id).await.unwrap().unwrap();
        assert_eq!(untouched.title, "first");

        let updated = store
            .update(alice, first.id, input("renamed"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.title, "renamed");
        assert!(store.delete(alice, second.id).await.unwrap());
        assert!(store.get(alice, second.id).await.unwrap().is_none());
    }
}
