//! Token providers for service accounts.

use std::fmt;

use crate::error::{HalError, HalResult};

/// Environment variable read by [`EnvTokenProvider::qrt`].
pub const TOKEN_ENV_VAR: &str = "QRT_TOKEN";

/// Source of an access token.
#[async_trait::async_trait]
pub trait TokenProvider: Send + Sync {
    /// Get a valid access token.
    async fn get_token(&self) -> HalResult<String>;

    /// Check if a token is available without fetching it.
    fn has_valid_token(&self) -> bool;
}

/// Reads the token from an environment variable.
pub struct EnvTokenProvider {
    env_var: String,
}

impl EnvTokenProvider {
    /// Create a provider for an arbitrary variable.
    pub fn new(env_var: impl Into<String>) -> Self {
        Self {
            env_var: env_var.into(),
        }
    }

    /// Provider for `QRT_TOKEN`.
    pub fn qrt() -> Self {
        Self::new(TOKEN_ENV_VAR)
    }

    /// The variable this provider reads.
    pub fn env_var(&self) -> &str {
        &self.env_var
    }
}

#[async_trait::async_trait]
impl TokenProvider for EnvTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        match std::env::var(&self.env_var) {
            Ok(token) if !token.is_empty() => Ok(token),
            _ => Err(HalError::Auth(format!(
                "Environment variable {} not set",
                self.env_var
            ))),
        }
    }

    fn has_valid_token(&self) -> bool {
        std::env::var(&self.env_var).is_ok_and(|t| !t.is_empty())
    }
}

/// A token supplied directly, e.g. from a saved account.
#[derive(Clone)]
pub struct StaticTokenProvider {
    token: String,
}

impl StaticTokenProvider {
    /// Wrap a token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl fmt::Debug for StaticTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticTokenProvider")
            .field("token", &"[REDACTED]")
            .finish()
    }
}

#[async_trait::async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn get_token(&self) -> HalResult<String> {
        if self.token.is_empty() {
            return Err(HalError::Auth("token is empty".into()));
        }
        Ok(self.token.clone())
    }

    fn has_valid_token(&self) -> bool {
        !self.token.is_empty()
    }
}
