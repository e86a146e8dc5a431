use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::db::{User, UserStore};
use crate::error::{AppError, DatabaseError};

/// Process-local user store keyed by username.
#[derive(Default, Clone)]
pub struct MemoryUserStore {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.users.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.read().await.get(username).cloned())
    }

    async fn save(&self, user: &User) -> Result<(), AppError> {
        let mut users = self.users.write().await;

        let taken = users.contains_key(&user.username)
            || users.values().any(|existing| existing.email == user.email);
        if taken {
            return Err(DatabaseError::Duplicate.into());
        }

        users.insert(user.username.clone(), user.clone());
        Ok(())
    }
}
