//! Token Refresh Coordinator.
//!
//! At most one refresh exchange runs at a time. The pending operation lives in
//! a mutex-guarded slot that is filled before the first await and emptied by
//! the operation itself once it settles; concurrent callers clone the shared
//! future out of the slot and all observe the same outcome.
//!
//! Terminal failures are published on a `watch` channel so session holders
//! can drop their signed-in state without waiting for their own next call.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use futures::FutureExt as _;
use futures::future::{BoxFuture, Shared};
use lex_config::ApiConfig;
use lex_core::TokenKind;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::watch;

use crate::token_store::CredentialStore;
use crate::transport::{ApiRequest, Transport};

pub const REFRESH_PATH: &str = "/api/token/refresh";

type RefreshOperation = Shared<BoxFuture<'static, Option<String>>>;

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
    #[serde(default)]
    refresh: Option<String>,
}

struct Inner {
    store: Arc<CredentialStore>,
    transport: Arc<dyn Transport>,
    refresh_url: String,
    in_flight: Mutex<Option<RefreshOperation>>,
    exchanges: AtomicU64,
    expired: watch::Sender<u64>,
}

/// Cloneable handle; clones share the same in-flight slot.
#[derive(Clone)]
pub struct RefreshCoordinator {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("refresh_url", &self.inner.refresh_url)
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    #[must_use]
    pub fn new(
        store: Arc<CredentialStore>,
        transport: Arc<dyn Transport>,
        refresh_url: impl Into<String>,
    ) -> Self {
        let (expired, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                store,
                transport,
                refresh_url: refresh_url.into(),
                in_flight: Mutex::new(None),
                exchanges: AtomicU64::new(0),
                expired,
            }),
        }
    }

    #[must_use]
    pub fn from_config(
        store: Arc<CredentialStore>,
        transport: Arc<dyn Transport>,
        config: &ApiConfig,
    ) -> Self {
        Self::new(store, transport, config.endpoint(REFRESH_PATH))
    }

    /// Obtain a new access token, joining the in-flight exchange if any.
    ///
    /// Resolves `None` when no refresh token is stored or the exchange failed;
    /// in the latter case every stored credential has been cleared.
    pub async fn refresh(&self) -> Option<String> {
        let operation = {
            let mut slot = self
                .inner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            if let Some(operation) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                operation.clone()
            } else {
                let inner = Arc::clone(&self.inner);
                let operation = async move {
                    let outcome = inner.exchange().await;
                    inner
                        .in_flight
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .take();
                    outcome
                }
                .boxed()
                .shared();
                *slot = Some(operation.clone());
                operation
            }
        };
        operation.await
    }

    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.inner
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Number of exchange requests issued by this coordinator.
    #[must_use]
    pub fn exchanges_started(&self) -> u64 {
        self.inner.exchanges.load(Ordering::Relaxed)
    }

    /// Count of terminal refresh failures; changes every time the session
    /// is lost.
    #[must_use]
    pub fn subscribe_expiry(&self) -> watch::Receiver<u64> {
        self.inner.expired.subscribe()
    }
}

impl Inner {
    async fn exchange(&self) -> Option<String> {
        let Some(refresh_token) = self.store.read(TokenKind::Refresh) else {
            tracing::warn!("no refresh token stored; cannot refresh access token");
            self.announce_expiry();
            return None;
        };

        // The tier is decided before the exchange so a concurrent logout
        // cannot flip it mid-flight.
        let durability = self.store.durability_of(TokenKind::Access);
        self.exchanges.fetch_add(1, Ordering::Relaxed);

        let request = ApiRequest::post(&self.refresh_url)
            .header("Content-Type", "application/json")
            .json(json!({ "refresh": refresh_token }));

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(error) => {
                tracing::warn!(%error, "token refresh failed to reach the server");
                return self.give_up();
            }
        };
        if !response.is_success() {
            tracing::warn!(
                status = response.status,
                detail = %response.error_message(),
                "token refresh rejected"
            );
            return self.give_up();
        }
        let body: RefreshResponse = match response.json() {
            Ok(body) => body,
            Err(error) => {
                tracing::warn!(%error, "token refresh returned a malformed body");
                return self.give_up();
            }
        };
        if body.access.trim().is_empty() {
            tracing::warn!("token refresh returned an empty access token");
            return self.give_up();
        }

        if let Err(error) = self.store.write(TokenKind::Access, &body.access, durability) {
            tracing::warn!(%error, "refreshed access token could not be persisted");
        }
        if let Some(rotated) = body.refresh.filter(|token| !token.trim().is_empty()) {
            if let Err(error) = self.store.write(TokenKind::Refresh, &rotated, durability) {
                tracing::warn!(%error, "rotated refresh token could not be persisted");
            }
        }

        tracing::info!(?durability, "access token refreshed");
        Some(body.access)
    }

    fn give_up(&self) -> Option<String> {
        self.store.clear();
        self.announce_expiry();
        None
    }

    fn announce_expiry(&self) {
        self.expired.send_modify(|count| *count += 1);
    }
}
