//! Credential storage configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

const fn default_durable_access_cookie_days() -> u32 {
    7
}

const fn default_durable_refresh_cookie_days() -> u32 {
    30
}

const fn default_session_cookie_days() -> u32 {
    1
}

fn default_keyring_service() -> String {
    "lexa-cli".to_string()
}

/// Where durable ("remember me") credentials are kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DurableBackend {
    /// `credentials.json` under [`StorageConfig::dir`], mode 0600.
    #[default]
    File,
    /// OS keychain via the `keyring` crate.
    Keyring,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    /// Directory for the durable credentials file and the cookie jar.
    /// Empty means `<data_dir>/lexa`.
    #[serde(default)]
    pub dir: String,

    #[serde(default)]
    pub durable_backend: DurableBackend,

    /// Keyring service name when `durable_backend = "keyring"`.
    #[serde(default = "default_keyring_service")]
    pub keyring_service: String,

    #[serde(default = "default_durable_access_cookie_days")]
    pub durable_access_cookie_days: u32,

    #[serde(default = "default_durable_refresh_cookie_days")]
    pub durable_refresh_cookie_days: u32,

    /// Cookie lifetime for logins without "remember me".
    #[serde(default = "default_session_cookie_days")]
    pub session_cookie_days: u32,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: String::new(),
            durable_backend: DurableBackend::default(),
            keyring_service: default_keyring_service(),
            durable_access_cookie_days: default_durable_access_cookie_days(),
            durable_refresh_cookie_days: default_durable_refresh_cookie_days(),
            session_cookie_days: default_session_cookie_days(),
        }
    }
}

impl StorageConfig {
    /// Resolve the storage directory.
    ///
    /// Returns `None` only when `dir` is empty and the platform has no data
    /// directory.
    pub fn resolved_dir(&self) -> Option<PathBuf> {
        if !self.dir.trim().is_empty() {
            return Some(PathBuf::from(self.dir.trim()));
        }
        dirs::data_dir().map(|dir| dir.join("lexa"))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        for (field, days) in [
            (
                "storage.durable_access_cookie_days",
                self.durable_access_cookie_days,
            ),
            (
                "storage.durable_refresh_cookie_days",
                self.durable_refresh_cookie_days,
            ),
            ("storage.session_cookie_days", self.session_cookie_days),
        ] {
            if days == 0 {
                return Err(ConfigError::invalid(field, "must be at least one day"));
            }
        }
        if self.durable_backend == DurableBackend::Keyring && self.keyring_service.trim().is_empty()
        {
            return Err(ConfigError::invalid(
                "storage.keyring_service",
                "must not be empty with the keyring backend",
            ));
        }
        Ok(())
    }
}
