use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::auth::adapter::outgoing::security::credential_hasher::{
    default_concurrency, DEFAULT_TIMEOUT,
};
use crate::auth::adapter::outgoing::security::HashingAlgorithm;
use crate::auth::application::services::password::basic_password_policy::{
    DEFAULT_MAX_PASSWORD_LENGTH, DEFAULT_MIN_PASSWORD_LENGTH,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} is not set")]
    Missing(String),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: String, value: String },

    #[error("Unknown password hash algorithm: {0}")]
    UnknownAlgorithm(String),
}

/// Loads `.env.{RUST_ENV}` if present, otherwise `.env`.
pub fn load_dotenv() {
    let env = env::var("RUST_ENV").unwrap_or_else(|_| "development".to_string());

    let env_file = format!(".env.{}", env);
    if dotenvy::from_filename(&env_file).is_err() {
        dotenvy::dotenv().ok();
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue {
                key: key.to_string(),
                value,
            }),
    }
}

// ============================ Hasher Config =================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HasherConfig {
    pub algorithm: HashingAlgorithm,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    pub bcrypt_cost: u32,
    pub timeout: Duration,
    pub max_concurrency: usize,
    pub min_password_length: usize,
    pub max_password_length: usize,
}

impl Default for HasherConfig {
    fn default() -> Self {
        Self {
            algorithm: HashingAlgorithm::Argon2id,
            argon2_memory_kib: argon2::Params::DEFAULT_M_COST,
            argon2_iterations: argon2::Params::DEFAULT_T_COST,
            argon2_parallelism: argon2::Params::DEFAULT_P_COST,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            timeout: DEFAULT_TIMEOUT,
            max_concurrency: default_concurrency(),
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
            max_password_length: DEFAULT_MAX_PASSWORD_LENGTH,
        }
    }
}

impl HasherConfig {
    /// Budget VPS friendly: 4MB memory, 3 iterations, 1 thread
    pub fn budget_vps() -> Self {
        Self {
            argon2_memory_kib: 4 * 1024,
            argon2_iterations: 3,
            argon2_parallelism: 1,
            ..Self::default()
        }
    }

    /// Cheap costs for development and tests. Never use in production.
    pub fn fast_env() -> Self {
        Self {
            argon2_memory_kib: 1024,
            argon2_iterations: 1,
            argon2_parallelism: 1,
            bcrypt_cost: 4,
            ..Self::default()
        }
    }

    /// Environment-based configuration. Unset keys keep their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let algorithm = match lookup("PASSWORD_HASH_ALGORITHM") {
            None => defaults.algorithm,
            Some(value) => value.parse().map_err(ConfigError::UnknownAlgorithm)?,
        };

        let timeout_ms = parse_or(
            &lookup,
            "PASSWORD_HASH_TIMEOUT_MS",
            defaults.timeout.as_millis() as u64,
        )?;

        Ok(Self {
            algorithm,
            argon2_memory_kib: parse_or(&lookup, "ARGON2_MEMORY_KIB", defaults.argon2_memory_kib)?,
            argon2_iterations: parse_or(&lookup, "ARGON2_ITERATIONS", defaults.argon2_iterations)?,
            argon2_parallelism: parse_or(
                &lookup,
                "ARGON2_PARALLELISM",
                defaults.argon2_parallelism,
            )?,
            bcrypt_cost: parse_or(&lookup, "BCRYPT_COST", defaults.bcrypt_cost)?,
            timeout: Duration::from_millis(timeout_ms),
            max_concurrency: parse_or(
                &lookup,
                "PASSWORD_HASH_MAX_CONCURRENCY",
                defaults.max_concurrency,
            )?,
            min_password_length: parse_or(
                &lookup,
                "PASSWORD_MIN_LENGTH",
                defaults.min_password_length,
            )?,
            max_password_length: parse_or(
                &lookup,
                "PASSWORD_MAX_LENGTH",
                defaults.max_password_length,
            )?,
        })
    }
}

// ============================ Database Config =================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

impl DatabaseConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("DATABASE_URL")
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))?;

        Ok(Self {
            url,
            max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 50)?,
            min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", 10)?,
        })
    }

    pub async fn connect(&self) -> Result<DatabaseConnection, DbErr> {
        let mut opt = ConnectOptions::new(self.url.clone());
        opt.max_connections(self.max_connections)
            .min_connections(self.min_connections)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(5))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(1800))
            .sqlx_logging(false);

        Database::connect(opt).await
    }
}
