use async_trait::async_trait;
use migration::{Migrator, MigratorTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
};
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::application::domain::entities::Account;
use crate::auth::application::ports::outgoing::account_store::{
    AccountStore, AccountStoreError, MAX_USERNAME_LENGTH,
};

use super::sea_orm_entity::accounts::{
    ActiveModel as AccountActiveModel, Column as AccountColumn, Entity as AccountEntity,
    Model as AccountModel,
};

/// Postgres-backed store. Uniqueness is enforced by the unique key on
/// `accounts.username`, so concurrent creates cannot both succeed.
#[derive(Clone, Debug)]
pub struct AccountStorePostgres {
    db: Arc<DatabaseConnection>,
}

impl AccountStorePostgres {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Applies pending schema migrations for the `accounts` table.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&*self.db, None).await
    }

    fn map_to_account(model: AccountModel) -> Account {
        Account {
            id: model.id,
            username: model.username,
            password_hash: model.password_hash,
            created_at: model.created_at.with_timezone(&chrono::Utc),
        }
    }
}

fn is_unique_violation(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("23505")
        || message.contains("duplicate key")
        || message.contains("unique constraint")
}

#[async_trait]
impl AccountStore for AccountStorePostgres {
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

        let active_account = AccountActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username.to_string()),
            password_hash: Set(password_hash.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let inserted = active_account.insert(&*self.db).await.map_err(|e| {
            if is_unique_violation(&e.to_string()) {
                return AccountStoreError::DuplicateAccount;
            }
            AccountStoreError::DatabaseError(e.to_string())
        })?;

        Ok(Self::map_to_account(inserted))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<Account>, AccountStoreError> {
        let account = AccountEntity::find()
            .filter(AccountColumn::Username.eq(username))
            .one(&*self.db)
            .await
            .map_err(|e| AccountStoreError::DatabaseError(e.to_string()))?;

        Ok(account.map(Self::map_to_account))
    }
}
