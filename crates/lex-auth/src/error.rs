use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("not authenticated: run `lex auth login`")]
    NotAuthenticated,

    #[error("session expired: run `lex auth login` again")]
    SessionExpired,

    #[error("login rejected: {0}")]
    InvalidCredentials(String),

    #[error("registration rejected: {0}")]
    Registration(String),

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("server unreachable: {0}")]
    ServerUnreachable(String),

    #[error("server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("token store error: {0}")]
    TokenStore(String),

    #[error("keyring error: {0}")]
    Keyring(String),
}

/// Failure to get any HTTP response at all.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Unreachable(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<TransportError> for AuthError {
    fn from(error: TransportError) -> Self {
        Self::NetworkUnreachable(error.to_string())
    }
}
