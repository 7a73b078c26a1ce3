use async_trait::async_trait;
use std::sync::Arc;

use crate::auth::application::domain::entities::{AccountProfile, Credentials};
use crate::auth::application::ports::incoming::password_policy::PasswordPolicyError;
use crate::auth::application::ports::outgoing::account_store::{AccountStore, AccountStoreError};
use crate::auth::application::ports::outgoing::password_hasher::{HashError, PasswordHasher};

// ====================== Register Error =============================
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegisterAccountError {
    #[error("Username is already taken")]
    DuplicateAccount,

    #[error("Username must be at most {max} characters")]
    UsernameTooLong { max: usize },

    #[error("Password rejected: {0}")]
    PasswordRejected(PasswordPolicyError),

    #[error("Password hashing failed: {0}")]
    HashingFailure(HashError),

    #[error("Account store error: {0}")]
    StoreError(String),
}

impl From<HashError> for RegisterAccountError {
    fn from(error: HashError) -> Self {
        match error {
            HashError::Rejected(reason) => RegisterAccountError::PasswordRejected(reason),
            other => RegisterAccountError::HashingFailure(other),
        }
    }
}

impl From<AccountStoreError> for RegisterAccountError {
    fn from(error: AccountStoreError) -> Self {
        match error {
            AccountStoreError::DuplicateAccount => RegisterAccountError::DuplicateAccount,
            AccountStoreError::UsernameTooLong { max } => {
                RegisterAccountError::UsernameTooLong { max }
            }
            AccountStoreError::DatabaseError(msg) => RegisterAccountError::StoreError(msg),
        }
    }
}

// ============================ Register Account Use Case =============================
#[async_trait]
pub trait IRegisterAccountUseCase: Send + Sync {
    async fn execute(&self, credentials: Credentials)
        -> Result<AccountProfile, RegisterAccountError>;
}

#[derive(Clone)]
pub struct RegisterAccountUseCase<S>
where
    S: AccountStore,
{
    store: S,
    password_hasher: Arc<dyn PasswordHasher>,
}

impl<S> RegisterAccountUseCase<S>
where
    S: AccountStore,
{
    pub fn new(store: S, password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            password_hasher,
        }
    }
}

#[async_trait]
impl<S> IRegisterAccountUseCase for RegisterAccountUseCase<S>
where
    S: AccountStore,
{
    async fn execute(
        &self,
        credentials: Credentials,
    ) -> Result<AccountProfile, RegisterAccountError> {
        // 1. Fail fast on a taken username; the store re-checks atomically below.
        if self
            .store
            .find_by_username(credentials.username())
            .await?
            .is_some()
        {
            tracing::debug!(username = credentials.username(), "Username already taken");
            return Err(RegisterAccountError::DuplicateAccount);
        }

        // 2. Hash password. Failures propagate, never retried.
        let password_hash = self
            .password_hasher
            .hash_password(credentials.password())
            .await?;

        // 3. Persist. Losing a concurrent race surfaces as DuplicateAccount.
        let account = self
            .store
            .create(credentials.username(), &password_hash)
            .await?;

        tracing::info!(account_id = %account.id, "Account registered");

        Ok(account.profile())
    }
}
