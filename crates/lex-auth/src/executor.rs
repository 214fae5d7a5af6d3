//! Authenticated Request Executor.
//!
//! Every authenticated call goes through [`AuthedClient::request`]: it reads
//! the access token fresh from the store, sends, and on a 401 asks the
//! [`RefreshCoordinator`] for a new token and retries exactly once.

use std::sync::Arc;

use lex_config::{ApiConfig, LexConfig};
use lex_core::TokenKind;

use crate::error::AuthError;
use crate::refresh::RefreshCoordinator;
use crate::token_store::CredentialStore;
use crate::transport::{ApiRequest, ApiResponse, ReqwestTransport, Transport};

pub const UNAUTHORIZED: u16 = 401;

#[derive(Clone)]
pub struct AuthedClient {
    store: Arc<CredentialStore>,
    transport: Arc<dyn Transport>,
    refresher: RefreshCoordinator,
    api: ApiConfig,
}

impl std::fmt::Debug for AuthedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthedClient")
            .field("origin", &self.api.origin())
            .field("store", &self.store)
            .field("refresher", &self.refresher)
            .finish_non_exhaustive()
    }
}

impl AuthedClient {
    #[must_use]
    pub fn new(store: Arc<CredentialStore>, transport: Arc<dyn Transport>, api: ApiConfig) -> Self {
        let refresher =
            RefreshCoordinator::from_config(Arc::clone(&store), Arc::clone(&transport), &api);
        Self {
            store,
            transport,
            refresher,
            api,
        }
    }

    /// Production client: configured credential store over a `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Fails if the storage directory cannot be resolved or the HTTP client
    /// cannot be built.
    pub fn from_config(config: &LexConfig) -> Result<Self, AuthError> {
        let store = Arc::new(CredentialStore::from_config(&config.storage)?);
        let transport = ReqwestTransport::from_config(&config.api)?;
        Ok(Self::new(store, Arc::new(transport), config.api.clone()))
    }

    /// Absolute URL for an API path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        self.api.endpoint(path)
    }

    /// Send `request` with the stored bearer token, refreshing and retrying
    /// once on 401.
    ///
    /// A 401 is returned as a response, not an error: either the refresh
    /// failed (credentials are now cleared) or the retry was rejected too.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NetworkUnreachable` when no response was received.
    /// Transport failures are never retried.
    pub async fn request(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        let token = self.store.read(TokenKind::Access);
        let first = self.send_with(request.clone(), token).await?;
        if first.status != UNAUTHORIZED {
            return Ok(first);
        }

        tracing::debug!(url = %request.url, "access token rejected; refreshing");
        let Some(token) = self.refresher.refresh().await else {
            tracing::warn!(url = %request.url, "token refresh failed; session expired");
            return Ok(first);
        };

        let retried = self.send_with(request, Some(token)).await?;
        if retried.status == UNAUTHORIZED {
            tracing::warn!("request rejected again after token refresh");
        }
        Ok(retried)
    }

    /// Send without credentials and without the refresh dance (login, register).
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NetworkUnreachable` when no response was received.
    pub async fn send_anonymous(&self, request: ApiRequest) -> Result<ApiResponse, AuthError> {
        self.send_with(request, None).await
    }

    /// Fail fast when no access token is stored at all.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NotAuthenticated` without touching the network.
    pub fn ensure_signed_in(&self) -> Result<(), AuthError> {
        if self.store.read(TokenKind::Access).is_some() {
            Ok(())
        } else {
            Err(AuthError::NotAuthenticated)
        }
    }

    /// Short-timeout reachability check of the API origin.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ServerUnreachable` if nothing answered in time.
    pub async fn probe(&self) -> Result<(), AuthError> {
        self.transport
            .probe(self.api.origin(), self.api.probe_timeout())
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, origin = self.api.origin(), "server unreachable");
                AuthError::ServerUnreachable(e.to_string())
            })
    }

    #[must_use]
    pub const fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    #[must_use]
    pub const fn refresher(&self) -> &RefreshCoordinator {
        &self.refresher
    }

    #[must_use]
    pub const fn api(&self) -> &ApiConfig {
        &self.api
    }

    async fn send_with(
        &self,
        mut request: ApiRequest,
        token: Option<String>,
    ) -> Result<ApiResponse, AuthError> {
        request.bearer = token;
        // Multipart boundaries are set by the transport.
        if !request.is_multipart() && request.header_value("content-type").is_none() {
            request
                .headers
                .push(("Content-Type".into(), "application/json".into()));
        }
        self.transport.send(request).await.map_err(AuthError::from)
    }
}
