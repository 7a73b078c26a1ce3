use crate::auth::application::ports::incoming::password_policy::{
    PasswordPolicy, PasswordPolicyError,
};

pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 1;
pub const DEFAULT_MAX_PASSWORD_LENGTH: usize = 128;

/// Length-only policy, measured in bytes. The upper bound keeps
/// pathologically long inputs away from the hash function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicPasswordPolicy {
    min_length: usize,
    max_length: usize,
}

impl BasicPasswordPolicy {
    pub fn new(min_length: usize, max_length: usize) -> Self {
        let min_length = min_length.max(1);
        Self {
            min_length,
            max_length: max_length.max(min_length),
        }
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }
}

impl Default for BasicPasswordPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_PASSWORD_LENGTH, DEFAULT_MAX_PASSWORD_LENGTH)
    }
}

impl PasswordPolicy for BasicPasswordPolicy {
    fn validate(&self, password: &str) -> Result<(), PasswordPolicyError> {
        if password.is_empty() {
            return Err(PasswordPolicyError::Empty);
        }

        if password.len() < self.min_length {
            return Err(PasswordPolicyError::TooShort {
                min: self.min_length,
            });
        }

        if password.len() > self.max_length {
            return Err(PasswordPolicyError::TooLong {
                max: self.max_length,
            });
        }

        Ok(())
    }

    fn max_length(&self) -> usize {
        self.max_length
    }
}
