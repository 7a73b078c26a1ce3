use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::{
    Error as PasswordHashError, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
};
use rand_core::{OsRng, RngCore};

use super::hash_scheme::{algorithm_id, HashScheme, HashingAlgorithm};
use crate::auth::application::ports::outgoing::password_hasher::HashError;

const SALT_LEN: usize = 16;
const ARGON2_IDS: [&str; 3] = ["argon2id", "argon2i", "argon2d"];

#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
    #[cfg(test)]
    salt_override: Option<SaltString>,
}

impl Argon2Hasher {
    /// OWASP baseline: 19 MiB memory, 2 iterations, 1 lane.
    pub fn new() -> Self {
        Self::from_params(Params::DEFAULT)
    }

    /// Create with custom params (for testing or different environments)
    pub fn with_params(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, argon2::Error> {
        let params = Params::new(memory_kib, iterations, parallelism, None)?;
        Ok(Self::from_params(params))
    }

    /// Budget VPS friendly: 4MB memory, 3 iterations, 1 thread
    pub fn budget_vps() -> Self {
        Self::with_params(4 * 1024, 3, 1).unwrap_or_default()
    }

    /// Cheap parameters for development and test runs.
    pub fn fast_env() -> Self {
        Self::with_params(1024, 1, 1).unwrap_or_default()
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    fn from_params(params: Params) -> Self {
        Self {
            params,
            #[cfg(test)]
            salt_override: None,
        }
    }

    #[cfg(test)]
    pub fn with_fixed_salt(salt: &str) -> Self {
        Self {
            params: Params::new(1024, 1, 1, None).expect("Invalid params"),
            salt_override: Some(SaltString::from_b64(salt).expect("Invalid salt")),
        }
    }

    fn salt(&self) -> Result<SaltString, HashError> {
        #[cfg(test)]
        {
            if let Some(salt) = &self.salt_override {
                return Ok(salt.clone());
            }
        }

        fresh_salt()
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new()
    }
}

// A broken entropy source is reported, not panicked on.
fn fresh_salt() -> Result<SaltString, HashError> {
    let mut bytes = [0u8; SALT_LEN];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| HashError::HashFailed(format!("Entropy source unavailable: {}", e)))?;

    SaltString::encode_b64(&bytes).map_err(|e| HashError::HashFailed(e.to_string()))
}

impl HashScheme for Argon2Hasher {
    fn algorithm(&self) -> HashingAlgorithm {
        HashingAlgorithm::Argon2id
    }

    fn recognizes(&self, encoded: &str) -> bool {
        algorithm_id(encoded).is_some_and(|id| ARGON2_IDS.contains(&id))
    }

    fn hash(&self, password: &str) -> Result<String, HashError> {
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone());
        let salt = self.salt()?;

        argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| HashError::HashFailed(e.to_string()))
    }

    fn verify(&self, password: &str, encoded: &str) -> Result<bool, HashError> {
        let parsed_hash =
            PasswordHash::new(encoded).map_err(|e| HashError::MalformedHash(e.to_string()))?;

        if Algorithm::new(parsed_hash.algorithm.as_str()).is_err() {
            return Err(HashError::UnsupportedAlgorithm(
                parsed_hash.algorithm.to_string(),
            ));
        }

        if parsed_hash.salt.is_none() || parsed_hash.hash.is_none() {
            return Err(HashError::MalformedHash("missing salt or hash".to_string()));
        }

        // Cost, version and salt come from the encoded hash, so hashes made
        // under older parameters keep verifying. The output comparison inside
        // is constant-time.
        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(PasswordHashError::Password) => Ok(false),
            Err(e) => Err(HashError::MalformedHash(e.to_string())),
        }
    }
}
