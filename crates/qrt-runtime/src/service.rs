//! The fake runtime service.

use std::fmt;
use std::sync::Arc;

use qrt_adapter_fake::FakeProvider;
use qrt_hal::{Backend, EnvTokenProvider, TokenProvider};
use tracing::debug;

use crate::account::{AccountConfig, AccountStore};
use crate::channel::Channel;
use crate::error::{RuntimeError, RuntimeResult};
use crate::target::resolve_name;

/// Environment variable selecting the channel for [`FakeRuntimeService::from_env`].
pub const CHANNEL_ENV_VAR: &str = "QRT_CHANNEL";

/// Stand-in for the remote runtime service.
///
/// Holds a validated account and hands out the fake device backends (and the
/// local simulator) by name. Nothing leaves the process.
pub struct FakeRuntimeService {
    account: AccountConfig,
    provider: FakeProvider,
}

impl FakeRuntimeService {
    /// Connect with an explicit channel and token.
    ///
    /// Non-local channels reject an empty token.
    pub fn new(channel: Channel, token: impl Into<String>) -> RuntimeResult<Self> {
        let token = token.into();
        let token = (!token.is_empty()).then_some(token);
        Self::from_account(AccountConfig::new(channel, token))
    }

    /// Connect with a full account configuration.
    pub fn from_account(account: AccountConfig) -> RuntimeResult<Self> {
        account.validate()?;
        debug!("Runtime service ready on channel {}", account.channel);
        Ok(Self {
            account,
            provider: FakeProvider::new(),
        })
    }

    /// Connect with an account saved in the default store.
    pub fn from_saved(name: &str) -> RuntimeResult<Self> {
        Self::from_store(&AccountStore::default_location()?, name)
    }

    /// Connect with an account saved in `store`.
    pub fn from_store(store: &AccountStore, name: &str) -> RuntimeResult<Self> {
        Self::from_account(store.load_account(name)?)
    }

    /// Connect using `QRT_CHANNEL` (default `ibm_quantum`) and `QRT_TOKEN`.
    pub async fn from_env() -> RuntimeResult<Self> {
        let channel = match std::env::var(CHANNEL_ENV_VAR) {
            Ok(raw) => raw.parse()?,
            Err(_) => Channel::default(),
        };
        let provider = EnvTokenProvider::qrt();
        let token = provider.get_token().await.ok();
        if token.is_none() && channel.requires_token() {
            return Err(RuntimeError::Account(format!(
                "{} is not set",
                provider.env_var()
            )));
        }
        Self::from_account(AccountConfig::new(channel, token))
    }

    /// The channel of the active account.
    pub fn channel(&self) -> Channel {
        self.account.channel
    }

    /// The active account.
    pub fn account(&self) -> &AccountConfig {
        &self.account
    }

    /// Names of all backends the service offers, sorted.
    pub fn backends(&self) -> Vec<String> {
        let mut names = self.provider.backends();
        #[cfg(feature = "local-simulator")]
        names.push(crate::target::LOCAL_SIMULATOR.to_string());
        names.sort();
        names
    }

    /// Get a backend by name.
    pub fn backend(&self, name: &str) -> RuntimeResult<Arc<dyn Backend>> {
        resolve_name(name)
    }
}

impl fmt::Debug for FakeRuntimeService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FakeRuntimeService")
            .field("account", &self.account)
            .field("backends", &self.backends())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrt_hal::auth::TOKEN_ENV_VAR;

    #[test]
    fn test_service_with_token() {
        let service = FakeRuntimeService::new(Channel::IbmQuantum, "my_token").unwrap();
        assert_eq!(service.channel(), Channel::IbmQuantum);
        assert_eq!(service.account().token.as_deref(), Some("my_token"));
        assert!(!format!("{service:?}").contains("my_token"));
    }

    #[test]
    fn test_empty_token_rejected() {
        assert!(matches!(
            FakeRuntimeService::new(Channel::IbmCloud, ""),
            Err(RuntimeError::Account(_))
        ));
        assert!(FakeRuntimeService::new(Channel::Local, "").is_ok());
    }

    // Both cases share one test: the variables are process-wide.
    #[tokio::test]
    async fn test_from_env() {
        // SAFETY: no other test in this crate reads these variables
        unsafe {
            std::env::set_var(CHANNEL_ENV_VAR, "local");
            std::env::remove_var(TOKEN_ENV_VAR);
        }
        let local = FakeRuntimeService::from_env().await.unwrap();
        assert_eq!(local.channel(), Channel::Local);
        assert_eq!(local.account().token, None);

        // SAFETY: as above
        unsafe {
            std::env::set_var(CHANNEL_ENV_VAR, "ibm_quantum");
        }
        match FakeRuntimeService::from_env().await {
            Err(RuntimeError::Account(msg)) => assert!(msg.contains(TOKEN_ENV_VAR)),
            other => panic!("expected a missing-token error, got {other:?}"),
        }

        // SAFETY: as above
        unsafe {
            std::env::set_var(TOKEN_ENV_VAR, "env_token");
        }
        let quantum = FakeRuntimeService::from_env().await.unwrap();
        assert_eq!(quantum.channel(), Channel::IbmQuantum);
        assert_eq!(quantum.account().token.as_deref(), Some("env_token"));

        // SAFETY: as above
        unsafe {
            std::env::set_var(CHANNEL_ENV_VAR, "ibm_moon");
        }
        assert!(matches!(
            FakeRuntimeService::from_env().await,
            Err(RuntimeError::UnknownChannel(_))
        ));

        // SAFETY: cleaning up
        unsafe {
            std::env::remove_var(CHANNEL_ENV_VAR);
            std::env::remove_var(TOKEN_ENV_VAR);
        }
    }

    #[test]
    fn test_backends() {
        let service = FakeRuntimeService::new(Channel::Local, "").unwrap();
        let names = service.backends();
        assert!(names.contains(&"fake_manila".to_string()));
        assert!(names.contains(&"fake_almaden".to_string()));

        let manila = service.backend("fake_manila").unwrap();
        assert_eq!(manila.capabilities().num_qubits, 5);
        assert!(service.backend("ibm_nowhere").is_err());
    }

    #[test]
    fn test_from_store() {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("accounts.yaml"));
        let account = AccountConfig::new(Channel::IbmCloud, Some("cloud_token".into()));
        store.save_account("cloud", &account, false).unwrap();

        let service = FakeRuntimeService::from_store(&store, "cloud").unwrap();
        assert_eq!(service.channel(), Channel::IbmCloud);
        assert!(FakeRuntimeService::from_store(&store, "missing").is_err());
    }
}
