use async_trait::async_trait;
use std::time::Duration;

use crate::auth::application::ports::incoming::password_policy::PasswordPolicyError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HashError {
    #[error("Password rejected: {0}")]
    Rejected(#[from] PasswordPolicyError),

    #[error("Password hashing failed: {0}")]
    HashFailed(String),

    #[error("Encoded hash is malformed: {0}")]
    MalformedHash(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Password hashing timed out after {0:?}")]
    TimedOut(Duration),

    #[error("Background task failed")]
    TaskFailed,
}

impl HashError {
    /// True when the stored hash itself is unusable, as opposed to the
    /// hashing machinery failing.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            HashError::MalformedHash(_) | HashError::UnsupportedAlgorithm(_)
        )
    }
}

/// Never assigned to an account; only its hash is ever compared against.
pub const DECOY_PASSWORD: &str = "decoy-password-never-assigned-01";

#[async_trait]
pub trait PasswordHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, HashError>;
    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashError>;

    /// Hash of `DECOY_PASSWORD` at the current cost, used to give unknown
    /// usernames the same verification work as known ones. Implementations
    /// with a password policy must not apply it here.
    async fn decoy_hash(&self) -> Result<String, HashError> {
        self.hash_password(DECOY_PASSWORD).await
    }
}
