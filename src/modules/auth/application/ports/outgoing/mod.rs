pub mod account_store;
pub mod password_hasher;

pub use account_store::{AccountStore, AccountStoreError, MAX_USERNAME_LENGTH};
pub use password_hasher::{HashError, PasswordHasher, DECOY_PASSWORD};
