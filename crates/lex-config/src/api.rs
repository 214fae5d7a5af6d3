//! Backend API configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

pub const DEFAULT_BASE_URL: &str = "https://voice.eca.kz:2247";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_probe_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    format!("lexa-cli/{}", env!("CARGO_PKG_VERSION"))
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// Backend origin, e.g. `https://voice.eca.kz:2247`. Trailing slashes are ignored.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upper bound for a single HTTP exchange, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Timeout of the reachability probe that precedes login and chat sends.
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            probe_timeout_secs: default_probe_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl ApiConfig {
    /// Base URL without trailing slashes.
    pub fn origin(&self) -> &str {
        self.base_url.trim().trim_end_matches('/')
    }

    /// Join a backend path (`/api/token`) onto the origin.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.origin(), path.trim_start_matches('/'))
    }

    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        let origin = self.origin();
        let Some((scheme, rest)) = origin.split_once("://") else {
            return Err(ConfigError::invalid(
                "api.base_url",
                "must start with http:// or https://",
            ));
        };
        if scheme != "http" && scheme != "https" {
            return Err(ConfigError::invalid(
                "api.base_url",
                format!("unsupported scheme '{scheme}'"),
            ));
        }
        let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
        check_authority(authority)?;
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.request_timeout_secs",
                "must be greater than zero",
            ));
        }
        if self.probe_timeout_secs == 0 {
            return Err(ConfigError::invalid(
                "api.probe_timeout_secs",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// `host[:port]` with a DNS name, IPv4 address or bracketed IPv6 address.
fn check_authority(authority: &str) -> Result<(), ConfigError> {
    let (host, port) = if let Some(bracketed) = authority.strip_prefix('[') {
        let Some((host, tail)) = bracketed.split_once(']') else {
            return Err(ConfigError::invalid("api.base_url", "unclosed '[' in host"));
        };
        if host.is_empty() || !host.chars().all(|c| c.is_ascii_hexdigit() || c == ':' || c == '.') {
            return Err(ConfigError::invalid("api.base_url", format!("invalid host '[{host}]'")));
        }
        match tail {
            "" => (host, None),
            _ => match tail.strip_prefix(':') {
                Some(port) => (host, Some(port)),
                None => {
                    return Err(ConfigError::invalid(
                        "api.base_url",
                        format!("unexpected '{tail}' after host"),
                    ));
                }
            },
        }
    } else {
        let mut pieces = authority.splitn(2, ':');
        let host = pieces.next().unwrap_or_default();
        let port = pieces.next();
        if host.is_empty() {
            return Err(ConfigError::invalid("api.base_url", "missing host"));
        }
        if !host
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        {
            return Err(ConfigError::invalid("api.base_url", format!("invalid host '{host}'")));
        }
        (host, port)
    };

    if let Some(port) = port {
        if port.parse::<u16>().is_err() {
            return Err(ConfigError::invalid(
                "api.base_url",
                format!("invalid port '{port}' for host '{host}'"),
            ));
        }
    }
    Ok(())
}
