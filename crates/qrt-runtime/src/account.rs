//! Saved service accounts.
//!
//! Accounts live in a YAML file mapping account names to
//! [`AccountConfig`] entries:
//!
//! ```yaml
//! default:
//!   channel: ibm_quantum
//!   token: my_token
//! ```
//!
//! The file is `$QRT_CONFIG_DIR/accounts.yaml` when the variable is set,
//! otherwise `~/.qrt/accounts.yaml`.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::channel::Channel;
use crate::error::{RuntimeError, RuntimeResult};

/// Environment variable overriding the config directory.
pub const CONFIG_DIR_ENV_VAR: &str = "QRT_CONFIG_DIR";

const ACCOUNTS_FILE: &str = "accounts.yaml";

/// Name used when no account name is given.
pub const DEFAULT_ACCOUNT: &str = "default";

/// Credentials and settings of one service account.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountConfig {
    /// Service channel.
    pub channel: Channel,
    /// Access token; not needed for the local channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Service instance (hub/group/project or cloud CRN).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    /// Service URL override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl AccountConfig {
    /// An account on `channel` with an optional token.
    pub fn new(channel: Channel, token: Option<String>) -> Self {
        Self {
            channel,
            token,
            instance: None,
            url: None,
        }
    }

    /// Set the instance.
    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    /// Check that the account can be used on its channel.
    pub fn validate(&self) -> RuntimeResult<()> {
        let has_token = self.token.as_deref().is_some_and(|t| !t.trim().is_empty());
        if self.channel.requires_token() && !has_token {
            return Err(RuntimeError::Account(format!(
                "channel {} requires a non-empty token",
                self.channel
            )));
        }
        Ok(())
    }
}

impl fmt::Debug for AccountConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountConfig")
            .field("channel", &self.channel)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("instance", &self.instance)
            .field("url", &self.url)
            .finish()
    }
}

/// A YAML file of named accounts.
#[derive(Debug, Clone)]
pub struct AccountStore {
    path: PathBuf,
}

impl AccountStore {
    /// Store backed by a specific file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default location.
    pub fn default_location() -> RuntimeResult<Self> {
        let dir = match std::env::var_os(CONFIG_DIR_ENV_VAR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .ok_or_else(|| {
                    RuntimeError::Account("could not determine home directory".into())
                })?
                .join(".qrt"),
        };
        Ok(Self::at(dir.join(ACCOUNTS_FILE)))
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> RuntimeResult<BTreeMap<String, AccountConfig>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(serde_yaml_ng::from_str(&raw)?)
    }

    /// Save `config` under `name`.
    ///
    /// An existing entry is only replaced when `overwrite` is set.
    pub fn save_account(
        &self,
        name: &str,
        config: &AccountConfig,
        overwrite: bool,
    ) -> RuntimeResult<()> {
        config.validate()?;
        let mut accounts = self.read_all()?;
        if accounts.contains_key(name) && !overwrite {
            return Err(RuntimeError::Account(format!(
                "account '{name}' already exists in {} (pass overwrite to replace it)",
                self.path.display()
            )));
        }
        accounts.insert(name.to_string(), config.clone());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_yaml_ng::to_string(&accounts)?)?;
        debug!("Saved account '{}' to {}", name, self.path.display());
        Ok(())
    }

    /// Load the account saved under `name`.
    pub fn load_account(&self, name: &str) -> RuntimeResult<AccountConfig> {
        self.read_all()?.remove(name).ok_or_else(|| {
            RuntimeError::Account(format!(
                "no account named '{name}' in {}",
                self.path.display()
            ))
        })
    }

    /// Names of all saved accounts, sorted.
    pub fn accounts(&self) -> RuntimeResult<Vec<String>> {
        Ok(self.read_all()?.into_keys().collect())
    }
}

/// Save an account in the default store.
pub fn save_account(name: &str, config: &AccountConfig, overwrite: bool) -> RuntimeResult<()> {
    AccountStore::default_location()?.save_account(name, config, overwrite)
}

/// Load an account from the default store.
pub fn load_account(name: &str) -> RuntimeResult<AccountConfig> {
    AccountStore::default_location()?.load_account(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, AccountStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = AccountStore::at(dir.path().join("nested").join(ACCOUNTS_FILE));
        (dir, store)
    }

    #[test]
    fn test_round_trip() {
        let (_dir, store) = store();
        let config = AccountConfig::new(Channel::IbmQuantum, Some("my_token".into()))
            .with_instance("hub/group/project");

        store.save_account("work", &config, false).unwrap();
        assert_eq!(store.load_account("work").unwrap(), config);
        assert_eq!(store.accounts().unwrap(), vec!["work"]);

        let raw = fs::read_to_string(store.path()).unwrap();
        assert!(raw.contains("channel: ibm_quantum"));
    }

    #[test]
    fn test_overwrite_guard() {
        let (_dir, store) = store();
        let first = AccountConfig::new(Channel::Local, None);
        let second = AccountConfig::new(Channel::IbmCloud, Some("t".into()));

        store.save_account(DEFAULT_ACCOUNT, &first, false).unwrap();
        assert!(matches!(
            store.save_account(DEFAULT_ACCOUNT, &second, false),
            Err(RuntimeError::Account(_))
        ));
        store.save_account(DEFAULT_ACCOUNT, &second, true).unwrap();
        assert_eq!(store.load_account(DEFAULT_ACCOUNT).unwrap(), second);
    }

    #[test]
    fn test_missing_account() {
        let (_dir, store) = store();
        assert!(store.accounts().unwrap().is_empty());
        assert!(matches!(
            store.load_account("nobody"),
            Err(RuntimeError::Account(_))
        ));
    }

    #[test]
    fn test_token_required_off_local() {
        let config = AccountConfig::new(Channel::IbmQuantum, Some("  ".into()));
        assert!(config.validate().is_err());
        assert!(AccountConfig::new(Channel::Local, None).validate().is_ok());
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = AccountConfig::new(Channel::IbmQuantum, Some("secret-token".into()));
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("[REDACTED]"));
    }
}
