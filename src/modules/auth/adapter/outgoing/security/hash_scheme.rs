use std::fmt;
use std::str::FromStr;

use crate::auth::application::ports::outgoing::password_hasher::HashError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashingAlgorithm {
    Argon2id,
    Bcrypt,
}

impl fmt::Display for HashingAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HashingAlgorithm::Argon2id => write!(f, "argon2id"),
            HashingAlgorithm::Bcrypt => write!(f, "bcrypt"),
        }
    }
}

impl FromStr for HashingAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "argon2" | "argon2id" => Ok(HashingAlgorithm::Argon2id),
            "bcrypt" => Ok(HashingAlgorithm::Bcrypt),
            other => Err(other.to_string()),
        }
    }
}

/// A synchronous, CPU-bound password hashing scheme.
///
/// Implementations never run on the async scheduler directly; the
/// credential hasher moves every call onto the blocking pool.
pub trait HashScheme: Send + Sync {
    fn algorithm(&self) -> HashingAlgorithm;

    /// Whether `encoded` carries this scheme's algorithm identifier.
    fn recognizes(&self, encoded: &str) -> bool;

    fn hash(&self, password: &str) -> Result<String, HashError>;

    /// `Ok(false)` only for a well-formed hash that does not match.
    fn verify(&self, password: &str, encoded: &str) -> Result<bool, HashError>;
}

/// Pulls the algorithm identifier out of a `$id$...` encoded hash.
pub(crate) fn algorithm_id(encoded: &str) -> Option<&str> {
    let rest = encoded.strip_prefix('$')?;
    let id = rest.split('$').next()?;
    if id.is_empty() || rest.len() == id.len() {
        return None;
    }
    Some(id)
}
