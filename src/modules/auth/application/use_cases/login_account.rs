use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::OnceCell;

use crate::auth::application::domain::entities::{AuthenticatedIdentity, Credentials};
use crate::auth::application::ports::outgoing::account_store::AccountStore;
use crate::auth::application::ports::outgoing::password_hasher::{HashError, PasswordHasher};

// ====================== Login Error =============================
/// `AuthenticationFailed` covers both an unknown username and a wrong
/// password.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginAccountError {
    #[error("Invalid username or password")]
    AuthenticationFailed,

    #[error("Password verification failed: {0}")]
    HashingFailure(HashError),

    #[error("Account store error: {0}")]
    StoreError(String),
}

// ============================ Login Account Use Case =============================
#[async_trait]
pub trait ILoginAccountUseCase: Send + Sync {
    async fn execute(&self, credentials: Credentials)
        -> Result<AuthenticatedIdentity, LoginAccountError>;
}

#[derive(Clone)]
pub struct LoginAccountUseCase<S>
where
    S: AccountStore,
{
    store: S,
    password_hasher: Arc<dyn PasswordHasher>,
    decoy_hash: Arc<OnceCell<String>>,
}

impl<S> LoginAccountUseCase<S>
where
    S: AccountStore,
{
    pub fn new(store: S, password_hasher: Arc<dyn PasswordHasher>) -> Self {
        Self {
            store,
            password_hasher,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Computes the decoy hash up front so the first unknown-username login
    /// costs the same as every later one.
    pub async fn warm_up(&self) -> Result<(), HashError> {
        self.decoy_hash().await.map(|_| ())
    }

    // Hashed once per use case; only ever compared against, never stored.
    async fn decoy_hash(&self) -> Result<&String, HashError> {
        self.decoy_hash
            .get_or_try_init(|| async { self.password_hasher.decoy_hash().await })
            .await
    }

    // Burns one verification so an unknown username takes as long as a wrong
    // password. Hasher failures surface exactly as they would for a real
    // account.
    async fn verify_against_decoy(&self, password: &str) -> Result<(), LoginAccountError> {
        let hash = self
            .decoy_hash()
            .await
            .map_err(LoginAccountError::HashingFailure)?;

        match self.password_hasher.verify_password(password, hash).await {
            Ok(_) => Ok(()),
            Err(e) if e.is_malformed() => {
                tracing::error!(error = %e, "Decoy hash is unusable");
                Ok(())
            }
            Err(e) => Err(LoginAccountError::HashingFailure(e)),
        }
    }
}

#[async_trait]
impl<S> ILoginAccountUseCase for LoginAccountUseCase<S>
where
    S: AccountStore,
{
    async fn execute(
        &self,
        credentials: Credentials,
    ) -> Result<AuthenticatedIdentity, LoginAccountError> {
        // 1. Find account
        let account = self
            .store
            .find_by_username(credentials.username())
            .await
            .map_err(|e| LoginAccountError::StoreError(e.to_string()))?;

        let Some(account) = account else {
            self.verify_against_decoy(credentials.password()).await?;
            tracing::info!(reason = "no_such_account", "Login rejected");
            return Err(LoginAccountError::AuthenticationFailed);
        };

        // 2. Verify password
        match self
            .password_hasher
            .verify_password(credentials.password(), &account.password_hash)
            .await
        {
            Ok(true) => {
                tracing::info!(account_id = %account.id, "Login succeeded");
                Ok(account.identity())
            }
            Ok(false) => {
                tracing::info!(
                    reason = "bad_credentials",
                    account_id = %account.id,
                    "Login rejected"
                );
                Err(LoginAccountError::AuthenticationFailed)
            }
            Err(e) if e.is_malformed() => {
                // Corrupt data or a downgrade attempt; the caller still only
                // sees a generic failure.
                tracing::error!(
                    reason = "malformed_encoded_hash",
                    account_id = %account.id,
                    error = %e,
                    "Stored password hash is unusable"
                );
                Err(LoginAccountError::AuthenticationFailed)
            }
            Err(e) => Err(LoginAccountError::HashingFailure(e)),
        }
    }
}
