//! Credential kinds, storage keys and durability tiers.

use serde::{Deserialize, Serialize};

/// Which of the two bearer credentials a value is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub const ALL: [Self; 2] = [Self::Access, Self::Refresh];

    /// Stable key used in every physical storage location.
    #[must_use]
    pub const fn storage_key(self) -> &'static str {
        match self {
            Self::Access => "accessToken",
            Self::Refresh => "refreshToken",
        }
    }
}

/// Whether a credential should survive a restart.
///
/// `Durable` corresponds to "remember me": durable store plus long-lived
/// cookie. `Ephemeral` lives in process memory plus a short-lived cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Durability {
    Durable,
    Ephemeral,
}

impl Durability {
    #[must_use]
    pub const fn from_remember_me(remember_me: bool) -> Self {
        if remember_me {
            Self::Durable
        } else {
            Self::Ephemeral
        }
    }
}

/// The pair of tokens as currently visible through the credential store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credential {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credential {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.access_token.is_none() && self.refresh_token.is_none()
    }
}

/// Token pair issued by `POST /api/token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

impl std::fmt::Debug for TokenPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenPair")
            .field("access", &"<redacted>")
            .field("refresh", &"<redacted>")
            .finish()
    }
}
