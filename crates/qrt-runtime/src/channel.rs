//! Service channels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::RuntimeError;

/// Where a runtime service account lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    /// The quantum platform channel.
    #[default]
    IbmQuantum,
    /// The cloud channel.
    IbmCloud,
    /// Local execution only; no token needed.
    Local,
}

impl Channel {
    /// Channel name as written in account files.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::IbmQuantum => "ibm_quantum",
            Channel::IbmCloud => "ibm_cloud",
            Channel::Local => "local",
        }
    }

    /// Whether accounts on this channel need a token.
    pub fn requires_token(self) -> bool {
        !matches!(self, Channel::Local)
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ibm_quantum" => Ok(Channel::IbmQuantum),
            "ibm_cloud" => Ok(Channel::IbmCloud),
            "local" => Ok(Channel::Local),
            other => Err(RuntimeError::UnknownChannel(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_channels() {
        assert_eq!("ibm_quantum".parse::<Channel>().unwrap(), Channel::IbmQuantum);
        assert_eq!("local".parse::<Channel>().unwrap(), Channel::Local);
        assert!(matches!(
            "ibm_moon".parse::<Channel>(),
            Err(RuntimeError::UnknownChannel(_))
        ));
    }

    #[test]
    fn test_token_requirement() {
        assert!(Channel::IbmQuantum.requires_token());
        assert!(Channel::IbmCloud.requires_token());
        assert!(!Channel::Local.requires_token());
        assert_eq!(Channel::IbmCloud.to_string(), "ibm_cloud");
    }
}
