//! # lex-auth
//!
//! The authenticated-request pipeline for the Lexa backend.
//!
//! Provides a three-location credential store (process memory, a durable
//! file or OS keychain slot, and a cookie jar), a single-flight access-token
//! refresh coordinator, and [`AuthedClient`], which attaches bearer tokens and
//! transparently refreshes and retries once on 401.

pub mod error;
pub mod executor;
pub mod jwt;
pub mod login;
pub mod refresh;
pub mod token_store;
pub mod transport;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use error::{AuthError, TransportError};
pub use executor::AuthedClient;
pub use login::Registered;
pub use refresh::RefreshCoordinator;
pub use token_store::{CredentialStore, StoreLocation};
pub use transport::{ApiRequest, ApiResponse, FormPart, Method, RequestBody, Transport};
