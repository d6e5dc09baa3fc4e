//! Backend configuration.
//!
//! Remote settings load from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{Error, Result};

/// Default request timeout for the hosted backend
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Which [`FriendshipStore`](crate::friends::FriendshipStore) to use
#[derive(Debug, Clone)]
pub enum BackendConfig {
    /// Embedded SQLite
    Local {
        /// Database file, `None` for in-memory
        database_path: Option<String>,
        /// Whether the local expanded-friends procedure answers
        rpc_enabled: bool,
    },
    /// Hosted PostgREST backend
    Remote(RemoteConfig),
}

impl BackendConfig {
    /// Local store with the procedure enabled
    pub fn local(database_path: Option<String>) -> Self {
        BackendConfig::Local {
            database_path,
            rpc_enabled: true,
        }
    }

    /// Check the configuration before connecting
    pub fn validate(&self) -> Result<()> {
        match self {
            BackendConfig::Local { database_path, .. } => match database_path {
                Some(path) if path.trim().is_empty() => {
                    Err(Error::InvalidConfig("database path is empty".into()))
                }
                _ => Ok(()),
            },
            BackendConfig::Remote(remote) => remote.validate(),
        }
    }
}

/// Connection settings for the hosted backend
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    pub base_url: String,
    /// Anonymous API key, sent as `apikey`
    pub api_key: String,
    /// Signed-in user's token; the API key is used as bearer when absent
    pub access_token: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl RemoteConfig {
    /// Create a config with the default timeout
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            access_token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Load configuration from environment variables.
    ///
    /// `PANTRY_URL`, `PANTRY_ANON_KEY`, `PANTRY_ACCESS_TOKEN`,
    /// `PANTRY_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup("PANTRY_URL").unwrap_or_default(),
            api_key: lookup("PANTRY_ANON_KEY").unwrap_or_default(),
            access_token: lookup("PANTRY_ACCESS_TOKEN").filter(|t| !t.is_empty()),
            timeout_secs: lookup("PANTRY_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Reject settings that cannot work
    pub fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if url.is_empty() {
            return Err(Error::InvalidConfig("PANTRY_URL is not set".into()));
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "backend URL must start with http:// or https://: {}",
                url
            )));
        }
        if self.api_key.trim().is_empty() {
            return Err(Error::InvalidConfig("PANTRY_ANON_KEY is not set".into()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::InvalidConfig("timeout must be at least one second".into()));
        }
        Ok(())
    }

    /// `{base_url}/rest/v1`
    pub fn rest_url(&self) -> String {
        format!("{}/rest/v1", self.base_url.trim().trim_end_matches('/'))
    }

    /// Token for the `Authorization` header
    pub fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.api_key)
    }

    /// Per-request timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_keys() {
        let config = RemoteConfig::from_lookup(lookup(&[
            ("PANTRY_URL", "https://demo.example.co/"),
            ("PANTRY_ANON_KEY", "anon"),
            ("PANTRY_ACCESS_TOKEN", "jwt"),
            ("PANTRY_TIMEOUT_SECS", "3"),
        ]));

        assert!(config.validate().is_ok());
        assert_eq!(config.rest_url(), "https://demo.example.co/rest/v1");
        assert_eq!(config.bearer(), "jwt");
        assert_eq!(config.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_defaults() {
        let config = RemoteConfig::from_lookup(lookup(&[
            ("PANTRY_URL", "http://localhost:54321"),
            ("PANTRY_ANON_KEY", "anon"),
            ("PANTRY_ACCESS_TOKEN", ""),
            ("PANTRY_TIMEOUT_SECS", "soon"),
        ]));

        assert_eq!(config.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.bearer(), "anon");
    }

    #[test]
    fn test_validate_rejects_bad_settings() {
        assert!(RemoteConfig::from_lookup(lookup(&[])).validate().is_err());
        assert!(RemoteConfig::new("ftp://x", "anon").validate().is_err());
        assert!(RemoteConfig::new("https://x", " ").validate().is_err());

        let mut zero = RemoteConfig::new("https://x", "anon");
        zero.timeout_secs = 0;
        assert_eq!(zero.validate().unwrap_err().code(), 100);
    }

    #[test]
    fn test_backend_validate() {
        assert!(BackendConfig::local(None).validate().is_ok());
        assert!(BackendConfig::local(Some("".into())).validate().is_err());
        assert!(BackendConfig::Remote(RemoteConfig::new("", "anon"))
            .validate()
            .is_err());
    }
}
