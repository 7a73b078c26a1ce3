use async_trait::async_trait;

use crate::auth::application::domain::entities::Account;

/// Longest username, in characters, any store accepts. Matches the
/// `accounts.username` column width.
pub const MAX_USERNAME_LENGTH: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AccountStoreError {
    #[error("Account already exists")]
    DuplicateAccount,

    #[error("Username must be at most {max} characters")]
    UsernameTooLong { max: usize },

    #[error("Database error: {0}")]
    DatabaseError(String),
}

/// Storage contract for account records.
///
/// `create` must be atomic with respect to the username uniqueness check:
/// when two callers race on the same username exactly one of them gets the
/// account back and the other gets `DuplicateAccount`. Usernames longer than
/// `MAX_USERNAME_LENGTH` characters are refused with `UsernameTooLong` before
/// anything is written.
#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn create(&self, username: &str, password_hash: &str)
        -> Result<Account, AccountStoreError>;

    async fn find_by_username(&self, username: &str)
        -> Result<Option<Account>, AccountStoreError>;
}
