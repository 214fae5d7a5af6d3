//! # lex-config
//!
//! Layered configuration loading for Lexa using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`LEXA_*` prefix, `__` as separator)
//! 2. Project-level `.lexa/config.toml`
//! 3. User-level `~/.config/lexa/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `LEXA_API__BASE_URL` -> `api.base_url`,
//! `LEXA_STORAGE__DURABLE_BACKEND` -> `storage.durable_backend`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use lex_config::LexConfig;
//!
//! let config = LexConfig::load_with_dotenv().expect("config");
//! println!("backend: {}", config.api.origin());
//! ```

mod api;
mod billing;
mod error;
mod general;
mod storage;

pub use api::{ApiConfig, DEFAULT_BASE_URL};
pub use billing::BillingConfig;
pub use error::ConfigError;
pub use general::GeneralConfig;
pub use storage::{DurableBackend, StorageConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_PREFIX: &str = "LEXA_";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct LexConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub billing: BillingConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl LexConfig {
    /// Load configuration from all sources (TOML files + environment variables)
    /// and validate it.
    ///
    /// Does NOT call `dotenvy`; use [`LexConfig::load_with_dotenv`] for `.env` support.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment directly or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".lexa/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Check cross-field constraints figment cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.storage.validate()
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("lexa").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = LexConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.billing.charge_chat_messages);
        assert!(!config.general.remember_me);
    }

    #[test]
    fn invalid_api_section_fails_validation() {
        let mut config = LexConfig::default();
        config.api.base_url = "ftp://files.example".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("api.base_url"));
    }
}
