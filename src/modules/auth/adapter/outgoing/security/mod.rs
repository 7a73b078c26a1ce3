pub mod argon2_hasher;
pub mod bcrypt_hasher;
pub mod credential_hasher;
pub mod hash_scheme;

pub use credential_hasher::CredentialHasher;
pub use hash_scheme::{HashScheme, HashingAlgorithm};
