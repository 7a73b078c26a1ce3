use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::argon2_hasher::Argon2Hasher;
use super::bcrypt_hasher::BcryptHasher;
use super::hash_scheme::{algorithm_id, HashScheme, HashingAlgorithm};
use crate::auth::application::ports::incoming::password_policy::PasswordPolicy;
use crate::auth::application::ports::outgoing::password_hasher::{
    HashError, PasswordHasher, DECOY_PASSWORD,
};
use crate::auth::application::services::password::basic_password_policy::BasicPasswordPolicy;
use crate::config::HasherConfig;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Hashes with one primary scheme and verifies against every known scheme.
///
/// All hashing work runs on tokio's blocking pool. A semaphore bounds how many
/// jobs run at once, and each call is bounded by a timeout that includes the
/// wait for a permit.
#[derive(Clone)]
pub struct CredentialHasher {
    primary: Arc<dyn HashScheme>,
    schemes: Vec<Arc<dyn HashScheme>>,
    policy: BasicPasswordPolicy,
    limiter: Arc<Semaphore>,
    timeout: Duration,
}

impl CredentialHasher {
    /// Production defaults for `algorithm`; the other scheme stays available
    /// for verifying existing hashes.
    pub fn new(algorithm: HashingAlgorithm) -> Self {
        let argon2: Arc<dyn HashScheme> = Arc::new(Argon2Hasher::new());
        let bcrypt: Arc<dyn HashScheme> = Arc::new(BcryptHasher::default());
        Self::assemble(algorithm, argon2, bcrypt)
    }

    pub fn from_config(config: &HasherConfig) -> Result<Self, HashError> {
        let argon2 = Argon2Hasher::with_params(
            config.argon2_memory_kib,
            config.argon2_iterations,
            config.argon2_parallelism,
        )
        .map_err(|e| HashError::HashFailed(format!("Invalid Argon2 params: {}", e)))?;
        let bcrypt = BcryptHasher::with_cost(config.bcrypt_cost)
            .map_err(|e| HashError::HashFailed(format!("Invalid bcrypt cost: {}", e)))?;

        Ok(Self::assemble(config.algorithm, Arc::new(argon2), Arc::new(bcrypt))
            .with_policy(BasicPasswordPolicy::new(
                config.min_password_length,
                config.max_password_length,
            ))
            .with_timeout(config.timeout)
            .with_max_concurrency(config.max_concurrency))
    }

    /// Single-scheme hasher, mostly for tests.
    pub fn with_scheme(scheme: impl HashScheme + 'static) -> Self {
        let scheme: Arc<dyn HashScheme> = Arc::new(scheme);
        Self::from_schemes(scheme.clone(), vec![scheme])
    }

    fn assemble(
        algorithm: HashingAlgorithm,
        argon2: Arc<dyn HashScheme>,
        bcrypt: Arc<dyn HashScheme>,
    ) -> Self {
        let primary = match algorithm {
            HashingAlgorithm::Argon2id => argon2.clone(),
            HashingAlgorithm::Bcrypt => bcrypt.clone(),
        };
        Self::from_schemes(primary, vec![argon2, bcrypt])
    }

    fn from_schemes(primary: Arc<dyn HashScheme>, schemes: Vec<Arc<dyn HashScheme>>) -> Self {
        Self {
            primary,
            schemes,
            policy: BasicPasswordPolicy::default(),
            limiter: Arc::new(Semaphore::new(default_concurrency())),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_policy(mut self, policy: BasicPasswordPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.limiter = Arc::new(Semaphore::new(max_concurrency.max(1)));
        self
    }

    pub fn algorithm(&self) -> HashingAlgorithm {
        self.primary.algorithm()
    }

    fn scheme_for(&self, encoded: &str) -> Result<Arc<dyn HashScheme>, HashError> {
        if let Some(scheme) = self.schemes.iter().find(|s| s.recognizes(encoded)) {
            return Ok(Arc::clone(scheme));
        }

        match algorithm_id(encoded) {
            Some(id) => Err(HashError::UnsupportedAlgorithm(id.to_string())),
            None => Err(HashError::MalformedHash(
                "missing algorithm identifier".to_string(),
            )),
        }
    }

    async fn run_blocking<T, F>(&self, job: F) -> Result<T, HashError>
    where
        T: Send + 'static,
        F: FnOnce() -> Result<T, HashError> + Send + 'static,
    {
        let limiter = Arc::clone(&self.limiter);

        let work = async move {
            let permit = limiter
                .acquire_owned()
                .await
                .map_err(|_| HashError::TaskFailed)?;

            // The permit moves into the blocking job so the bound still holds
            // after a caller has given up waiting.
            tokio::task::spawn_blocking(move || {
                let _permit = permit;
                job()
            })
            .await
            .map_err(|_| HashError::TaskFailed)?
        };

        tokio::time::timeout(self.timeout, work)
            .await
            .map_err(|_| HashError::TimedOut(self.timeout))?
    }
}

pub(crate) fn default_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}

#[async_trait]
impl PasswordHasher for CredentialHasher {
    async fn hash_password(&self, password: &str) -> Result<String, HashError> {
        self.policy.validate(password)?;

        let scheme = Arc::clone(&self.primary);
        let password = password.to_string();

        let encoded = self.run_blocking(move || scheme.hash(&password)).await;
        if let Err(e) = &encoded {
            tracing::error!(algorithm = %self.algorithm(), error = %e, "Password hashing failed");
        }
        encoded
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool, HashError> {
        let scheme = self.scheme_for(hash)?;

        // Nothing this long was ever accepted for hashing.
        if password.len() > self.policy.max_length() {
            return Ok(false);
        }

        let password = password.to_string();
        let hash = hash.to_string();

        self.run_blocking(move || scheme.verify(&password, &hash))
            .await
    }

    // Bypasses the policy: the decoy must exist whatever lengths are configured.
    async fn decoy_hash(&self) -> Result<String, HashError> {
        let scheme = Arc::clone(&self.primary);

        self.run_blocking(move || scheme.hash(DECOY_PASSWORD)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::application::ports::incoming::password_policy::PasswordPolicyError;
    use crate::auth::adapter::outgoing::security::bcrypt_hasher::MIN_COST;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn fast_hasher(algorithm: HashingAlgorithm) -> CredentialHasher {
        let argon2: Arc<dyn HashScheme> = Arc::new(Argon2Hasher::fast_env());
        let bcrypt: Arc<dyn HashScheme> = Arc::new(BcryptHasher::with_cost(MIN_COST).unwrap());
        CredentialHasher::assemble(algorithm, argon2, bcrypt)
    }

    // Sleeps inside the blocking job and records peak concurrency.
    struct SlowScheme {
        delay: Duration,
        running: Arc<AtomicUsize>,
        peak: Arc<AtomicUsize>,
    }

    impl SlowScheme {
        fn new(delay: Duration) -> Self {
            Self {
                delay,
                running: Arc::new(AtomicUsize::new(0)),
                peak: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl HashScheme for SlowScheme {
        fn algorithm(&self) -> HashingAlgorithm {
            HashingAlgorithm::Argon2id
        }

        fn recognizes(&self, encoded: &str) -> bool {
            encoded.starts_with("$slow$")
        }

        fn hash(&self, _password: &str) -> Result<String, HashError> {
            let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.running.fetch_sub(1, Ordering::SeqCst);
            Ok("$slow$hash".to_string())
        }

        fn verify(&self, _password: &str, _encoded: &str) -> Result<bool, HashError> {
            std::thread::sleep(self.delay);
            Ok(true)
        }
    }

    #[tokio::test]
    async fn test_argon2_primary_hash_and_verify() {
        let hasher = fast_hasher(HashingAlgorithm::Argon2id);

        let hash = hasher.hash_password("secret1").await.unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert_eq!(hasher.verify_password("secret1", &hash).await, Ok(true));
        assert_eq!(hasher.verify_password("wrong", &hash).await, Ok(false));
    }

    #[tokio::test]
    async fn test_bcrypt_primary_hash_and_verify() {
        let hasher = fast_hasher(HashingAlgorithm::Bcrypt);

        let hash = hasher.hash_password("secret1").await.unwrap();

        assert!(hash.starts_with("$2b$"));
        assert_eq!(hasher.algorithm(), HashingAlgorithm::Bcrypt);
        assert_eq!(hasher.verify_password("secret1", &hash).await, Ok(true));
    }

    #[tokio::test]
    async fn test_verifies_hashes_from_the_other_scheme() {
        let bcrypt_hash = fast_hasher(HashingAlgorithm::Bcrypt)
            .hash_password("legacy")
            .await
            .unwrap();
        let argon2_primary = fast_hasher(HashingAlgorithm::Argon2id);

        assert_eq!(
            argon2_primary.verify_password("legacy", &bcrypt_hash).await,
            Ok(true)
        );
        assert_eq!(
            argon2_primary.verify_password("nope", &bcrypt_hash).await,
            Ok(false)
        );
    }

    #[tokio::test]
    async fn test_empty_password_rejected_before_hashing() {
        let hasher = fast_hasher(HashingAlgorithm::Argon2id);

        assert_eq!(
            hasher.hash_password("").await,
            Err(HashError::Rejected(PasswordPolicyError::Empty))
        );
    }

    #[tokio::test]
    async fn test_overlong_password_rejected_before_hashing() {
        let hasher =
            fast_hasher(HashingAlgorithm::Argon2id).with_policy(BasicPasswordPolicy::new(1, 16));
        let long_password = "x".repeat(17);

        assert_eq!(
            hasher.hash_password(&long_password).await,
            Err(HashError::Rejected(PasswordPolicyError::TooLong { max: 16 }))
        );

        let hash = hasher.hash_password("short").await.unwrap();
        assert_eq!(hasher.verify_password(&long_password, &hash).await, Ok(false));
    }

    #[tokio::test]
    async fn test_malformed_and_unsupported_hashes_are_classified() {
        let hasher = fast_hasher(HashingAlgorithm::Argon2id);

        let cases = [
            ("", "malformed"),
            ("not-a-hash", "malformed"),
            ("$argon2id$garbage", "malformed"),
            ("$2b$04$short", "malformed"),
            ("$scrypt$ln=16,r=8,p=1$salt$hash", "unsupported"),
            ("$md5$whatever", "unsupported"),
        ];

        for (encoded, expected) in cases {
            // Same input, same classification.
            for _ in 0..2 {
                let result = hasher.verify_password("secret1", encoded).await;
                match expected {
                    "malformed" => assert!(
                        matches!(result, Err(HashError::MalformedHash(_))),
                        "{encoded:?} gave {result:?}"
                    ),
                    _ => assert!(
                        matches!(result, Err(HashError::UnsupportedAlgorithm(_))),
                        "{encoded:?} gave {result:?}"
                    ),
                }
                assert!(result.unwrap_err().is_malformed());
            }
        }
    }

    #[tokio::test]
    async fn test_overlong_password_does_not_hide_malformed_hash() {
        let hasher =
            fast_hasher(HashingAlgorithm::Argon2id).with_policy(BasicPasswordPolicy::new(1, 16));
        let long_password = "x".repeat(17);

        assert!(matches!(
            hasher.verify_password(&long_password, "not-a-hash").await,
            Err(HashError::MalformedHash(_))
        ));
        assert!(matches!(
            hasher.verify_password(&long_password, "$md5$c2FsdA$aGFzaA").await,
            Err(HashError::UnsupportedAlgorithm(_))
        ));
    }

    #[tokio::test]
    async fn test_decoy_hash_ignores_password_policy() {
        for policy in [BasicPasswordPolicy::new(40, 128), BasicPasswordPolicy::new(1, 8)] {
            let hasher = fast_hasher(HashingAlgorithm::Argon2id).with_policy(policy);

            assert!(hasher.hash_password(DECOY_PASSWORD).await.is_err());

            let decoy = hasher.decoy_hash().await.unwrap();
            assert!(decoy.starts_with("$argon2id$"));
            assert_eq!(
                Argon2Hasher::fast_env().verify(DECOY_PASSWORD, &decoy),
                Ok(true)
            );
        }
    }

    #[tokio::test]
    async fn test_hash_times_out() {
        let hasher = CredentialHasher::with_scheme(SlowScheme::new(Duration::from_millis(300)))
            .with_timeout(Duration::from_millis(50));

        let result = hasher.hash_password("secret1").await;

        assert_eq!(result, Err(HashError::TimedOut(Duration::from_millis(50))));
    }

    #[tokio::test]
    async fn test_verify_times_out() {
        let hasher = CredentialHasher::with_scheme(SlowScheme::new(Duration::from_millis(300)))
            .with_timeout(Duration::from_millis(50));

        let result = hasher.verify_password("secret1", "$slow$hash").await;

        assert!(matches!(result, Err(HashError::TimedOut(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrency_is_bounded() {
        let scheme = SlowScheme::new(Duration::from_millis(40));
        let peak = Arc::clone(&scheme.peak);
        let hasher = CredentialHasher::with_scheme(scheme).with_max_concurrency(2);

        let mut handles = Vec::new();
        for _ in 0..6 {
            let hasher = hasher.clone();
            handles.push(tokio::spawn(async move {
                hasher.hash_password("secret1").await
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().is_ok());
        }

        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_from_config() {
        let config = HasherConfig {
            algorithm: HashingAlgorithm::Bcrypt,
            bcrypt_cost: MIN_COST,
            max_password_length: 8,
            ..HasherConfig::fast_env()
        };

        let hasher = CredentialHasher::from_config(&config).unwrap();

        assert_eq!(hasher.algorithm(), HashingAlgorithm::Bcrypt);
        assert!(matches!(
            hasher.hash_password("123456789").await,
            Err(HashError::Rejected(PasswordPolicyError::TooLong { max: 8 }))
        ));
    }

    #[test]
    fn test_from_config_rejects_invalid_costs() {
        let bad_bcrypt = HasherConfig {
            bcrypt_cost: 2,
            ..HasherConfig::fast_env()
        };
        assert!(CredentialHasher::from_config(&bad_bcrypt).is_err());

        let bad_argon2 = HasherConfig {
            argon2_memory_kib: 0,
            ..HasherConfig::fast_env()
        };
        assert!(CredentialHasher::from_config(&bad_argon2).is_err());
    }
}
