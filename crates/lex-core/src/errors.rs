//! Cross-cutting error types for Lexa.
//!
//! Domain-specific errors (`AuthError`, `ClientError`, `ConfigError`) live in
//! their respective crates. A unified error is deferred to `lex-cli` where all
//! crate errors converge into `anyhow`.

use thiserror::Error;

/// Errors that can be raised by any Lexa crate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// Data failed local validation before reaching the server.
    #[error("Validation error: {0}")]
    Validation(String),

    /// A server value could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),
}
