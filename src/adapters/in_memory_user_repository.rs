use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{Settlement, UserSnapshot};
use crate::ports::{RepositoryError, RepositoryResult, UserRepository};

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<Uuid, UserSnapshot>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get(&self, user_id: Uuid) -> RepositoryResult<Option<UserSnapshot>> {
        Ok(self.users.read().await.get(&user_id).cloned())
    }

    async fn put(&self, user_id: Uuid, snapshot: UserSnapshot) -> RepositoryResult<()> {
        self.users.write().await.insert(user_id, snapshot);
        Ok(())
    }

    async fn settle(&self, user_id: Uuid, settlement: &Settlement) -> RepositoryResult<UserSnapshot> {
        let mut users = self.users.write().await;
        let current = users.get(&user_id).cloned().unwrap_or_default();
        let next = current
            .settle(user_id, settlement)
            .map_err(|e| RepositoryError::Conflict(e.to_string()))?;
        users.insert(user_id, next.clone());
        Ok(next)
    }
}
