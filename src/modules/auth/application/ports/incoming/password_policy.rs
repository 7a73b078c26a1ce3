pub trait PasswordPolicy: Send + Sync {
    fn validate(&self, password: &str) -> Result<(), PasswordPolicyError>;

    /// Longest plaintext, in bytes, the policy will ever accept.
    fn max_length(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PasswordPolicyError {
    #[error("Password cannot be empty")]
    Empty,

    #[error("Password must be at least {min} bytes")]
    TooShort { min: usize },

    #[error("Password must be at most {max} bytes")]
    TooLong { max: usize },
}
