use std::sync::Arc;

use crate::auth::adapter::outgoing::security::CredentialHasher;
use crate::auth::adapter::outgoing::AccountStoreMemory;
use crate::auth::application::ports::outgoing::PasswordHasher;
use crate::auth::application::use_cases::login_account::LoginAccountUseCase;
use crate::auth::application::use_cases::register_account::RegisterAccountUseCase;
use crate::config::HasherConfig;

/// Register and login wired over one in-memory store and one real hasher.
pub struct CredentialFlows {
    pub store: AccountStoreMemory,
    pub hasher: Arc<CredentialHasher>,
    pub register: RegisterAccountUseCase<AccountStoreMemory>,
    pub login: LoginAccountUseCase<AccountStoreMemory>,
}

impl CredentialFlows {
    pub fn with_config(config: &HasherConfig) -> Self {
        let hasher =
            Arc::new(CredentialHasher::from_config(config).expect("Invalid hasher config"));
        Self::with_hasher(hasher)
    }

    pub fn with_hasher(hasher: Arc<CredentialHasher>) -> Self {
        let store = AccountStoreMemory::new();
        let password_hasher: Arc<dyn PasswordHasher> = hasher.clone();

        Self {
            register: RegisterAccountUseCase::new(store.clone(), password_hasher.clone()),
            login: LoginAccountUseCase::new(store.clone(), password_hasher),
            store,
            hasher,
        }
    }

    pub fn fast() -> Self {
        Self::with_config(&HasherConfig::fast_env())
    }
}
