//! Client error types.

use lex_auth::AuthError;
use lex_core::CoreError;
use thiserror::Error;

/// Errors surfaced by the typed API clients.
///
/// Callers branch on the kind (see the `is_*` predicates), never on the
/// message text.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Authentication pipeline failure, including network errors.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The server answered 402: the balance cannot cover the action.
    #[error("insufficient funds: top up with `lex balance topup <amount>`")]
    InsufficientFunds,

    /// The server answered with a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server-provided detail or the raw body.
        message: String,
    },

    /// A success response could not be decoded.
    #[error("parse error: {0}")]
    Parse(String),

    /// Input rejected before any request was made.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl From<CoreError> for ClientError {
    fn from(error: CoreError) -> Self {
        match error {
            CoreError::Validation(message) => Self::Validation(message),
            CoreError::Parse(message) => Self::Parse(message),
        }
    }
}

impl ClientError {
    #[must_use]
    pub const fn is_insufficient_funds(&self) -> bool {
        matches!(self, Self::InsufficientFunds)
    }

    /// The refresh failed or was impossible; the user has to log in again.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(self, Self::Auth(AuthError::SessionExpired))
    }

    /// Either no credentials at all or an expired session.
    #[must_use]
    pub const fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::SessionExpired | AuthError::NotAuthenticated)
        )
    }

    /// No response was received, or the reachability probe failed.
    #[must_use]
    pub const fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Auth(AuthError::NetworkUnreachable(_) | AuthError::ServerUnreachable(_))
        )
    }
}
