use async_trait::async_trait;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::application::domain::entities::Account;
use crate::auth::application::ports::outgoing::account_store::{
    AccountStore, AccountStoreError, MAX_USERNAME_LENGTH,
};

/// In-process store. The uniqueness check and the insert happen under one
/// write lock.
#[derive(Clone, Debug, Default)]
pub struct AccountStoreMemory {
    accounts: Arc<RwLock<HashMap<String, Account>>>,
}

impl AccountStoreMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountStore for AccountStoreMemory {
    async fn create(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<Account, AccountStoreError> {
        if username.chars().count() > MAX_USERNAME_LENGTH {
            return Err(AccountStoreError::UsernameTooLong {
                max: MAX_USERNAME_LENGTH,
            });
        }

        let mut accounts = self.accounts.write().await;

        match accounts.entry(username.to_string()) {
            Entry::Occupied(_) => Err(AccountStoreError::DuplicateAccount),
            Entry::Vacant(slot) => {
                let account = Account {
                    id: Uuid::new_v4(),
                    username: username.to_string(),
                    password_hash: password_hash.to_string(),
                    created_at: chrono::Utc::now(),
                };
                Ok(slot.insert(account).clone())
            }
        }
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        Ok(self.accounts.read().await.get(username).cloned())
    }
}
