use bcrypt::{hash, verify, BcryptError, DEFAULT_COST};

use super::hash_scheme::{algorithm_id, HashScheme, HashingAlgorithm};
use crate::auth::application::ports::incoming::password_policy::PasswordPolicyError;
use crate::auth::application::ports::outgoing::password_hasher::HashError;

pub const MIN_COST: u32 = 4;
pub const MAX_COST: u32 = 31;
/// bcrypt only reads the first 72 bytes of its input.
pub const MAX_PASSWORD_BYTES: usize = 72;

const BCRYPT_IDS: [&str; 4] = ["2a", "2b", "2x", "2y"];

#[derive(Debug, Clone, Copy)]
pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn with_cost(cost: u32) -> Result<Self, BcryptError> {
        if !(MIN_COST..=MAX_COST).contains(&cost) {
            return Err(BcryptError::CostNotAllowed(cost));
        }
        Ok(Self { cost })
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self { cost: DEFAULT_COST }
    }
}

impl HashScheme for BcryptHasher {
    fn algorithm(&self) -> HashingAlgorithm {
        HashingAlgorithm::Bcrypt
    }

    fn recognizes(&self, encoded: &str) -> bool {
        algorithm_id(encoded).is_some_and(|id| BCRYPT_IDS.contains(&id))
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        // Refuse instead of silently truncating.
        if password.len() > MAX_PASSWORD_BYTES {
            return Err(HashError::Rejected(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_BYTES,
            }));
        }

        hash(password, self.cost).map_err(|e| HashError::HashFailed(e.to_string()))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, HashError> {
        if password.len() > MAX_PASSWORD_BYTES {
            return Ok(false);
        }

        verify(password, encoded).map_err(|e| HashError::MalformedHash(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> BcryptHasher {
        BcryptHasher::with_cost(MIN_COST).unwrap()
    }

    #[test]
    fn test_bcrypt_hash_and_verify_password() {
        let hasher = fast_hasher();
        let password = "SecurePassword123";

        // Hash the password
        let hashed_password = hasher.hash(password);
        assert!(
            hashed_password.is_ok(),
            "Expected password hashing to succeed"
        );

        let hashed_password = hashed_password.unwrap();
        assert!(hashed_password.starts_with("$2b$04$"));

        // Verify the correct password
        assert_eq!(hasher.verify(password, &hashed_password), Ok(true));

        // Verify an incorrect password
        assert_eq!(hasher.verify("WrongPassword", &hashed_password), Ok(false));

        // Verify invalid hash
        let verify_invalid_hash = hasher.verify(password, "invalid-hash");
        assert!(
            matches!(verify_invalid_hash, Err(HashError::MalformedHash(_))),
            "Expected error for invalid hash format"
        );
    }

    #[test]
    fn test_truncated_hash_is_malformed() {
        let hasher = fast_hasher();
        let hashed_password = hasher.hash("password123").unwrap();
        let truncated = &hashed_password[..hashed_password.len() - 10];

        assert!(matches!(
            hasher.verify("password123", truncated),
            Err(HashError::MalformedHash(_))
        ));
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hasher = fast_hasher();

        let first = hasher.hash("pw").unwrap();
        let second = hasher.hash("pw").unwrap();

        assert_ne!(first, second);
    }

    #[test]
    fn test_lower_cost_hash_verifies_with_higher_cost_hasher() {
        let old_hash = fast_hasher().hash("legacy").unwrap();
        let new_hasher = BcryptHasher::with_cost(6).unwrap();

        assert_eq!(new_hasher.verify("legacy", &old_hash), Ok(true));
    }

    #[test]
    fn test_refuses_passwords_bcrypt_would_truncate() {
        let hasher = fast_hasher();
        let long_password = "p".repeat(MAX_PASSWORD_BYTES + 1);

        assert_eq!(
            hasher.hash(&long_password),
            Err(HashError::Rejected(PasswordPolicyError::TooLong {
                max: MAX_PASSWORD_BYTES
            }))
        );

        let at_limit = "p".repeat(MAX_PASSWORD_BYTES);
        let hashed = hasher.hash(&at_limit).unwrap();
        assert_eq!(hasher.verify(&at_limit, &hashed), Ok(true));
        assert_eq!(hasher.verify(&long_password, &hashed), Ok(false));
    }

    #[test]
    fn test_cost_bounds() {
        assert!(BcryptHasher::with_cost(3).is_err());
        assert!(BcryptHasher::with_cost(32).is_err());
        assert_eq!(BcryptHasher::with_cost(10).unwrap().cost(), 10);
        assert_eq!(BcryptHasher::default().cost(), DEFAULT_COST);
    }

    #[test]
    fn test_recognizes_bcrypt_prefixes() {
        let hasher = fast_hasher();

        assert!(hasher.recognizes("$2a$10$abcdefghijklmnopqrstuv"));
        assert!(hasher.recognizes("$2b$10$abcdefghijklmnopqrstuv"));
        assert!(hasher.recognizes("$2y$10$abcdefghijklmnopqrstuv"));
        assert!(!hasher.recognizes("$argon2id$v=19$m=1024,t=1,p=1$salt$hash"));
    }
}
