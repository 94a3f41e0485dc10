//! Provider credentials.

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

/// API key credentials for completion providers.
///
/// The key is redacted from `Debug` output and is never serialized.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct ApiKeyCredentials {
    api_key: String,
}

impl ApiKeyCredentials {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Returns the raw key for handing to the provider client.
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns true if the key is empty or whitespace-only.
    pub fn is_blank(&self) -> bool {
        self.api_key.trim().is_empty()
    }
}

impl fmt::Debug for ApiKeyCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKeyCredentials")
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

impl FromStr for ApiKeyCredentials {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_key() {
        let credentials = ApiKeyCredentials::new("sk-secret-value");
        let debug = format!("{credentials:?}");

        assert!(!debug.contains("sk-secret-value"));
        assert!(debug.contains("REDACTED"));
        assert_eq!(credentials.api_key(), "sk-secret-value");
    }

    #[test]
    fn blank_keys() {
        assert!(ApiKeyCredentials::new("  ").is_blank());
        assert!(!ApiKeyCredentials::new("k").is_blank());
    }
}
