//! Session State Projector.
//!
//! Publishes the UI-visible [`Session`] through a `tokio::sync::watch`
//! channel. Every change replaces the whole value, so a subscriber never sees
//! a half-applied update. Each state-changing operation takes a generation
//! number; a profile fetch that settles after a newer operation started is
//! discarded instead of overwriting fresher state.

use std::sync::atomic::{AtomicU64, Ordering};

use lex_auth::AuthedClient;
use lex_core::entities::Session;
use lex_core::{Durability, TokenKind};
use tokio::sync::watch;

use crate::error::ClientError;
use crate::profile::ProfileApi;

pub const SESSION_EXPIRED: &str = "session expired, sign in again";

#[derive(Debug)]
pub struct SessionProjector {
    client: AuthedClient,
    profiles: ProfileApi,
    state: watch::Sender<Session>,
    generation: AtomicU64,
}

impl SessionProjector {
    #[must_use]
    pub fn new(client: AuthedClient) -> Self {
        let (state, _) = watch::channel(Session::initial());
        Self {
            profiles: ProfileApi::new(client.clone()),
            client,
            state,
            generation: AtomicU64::new(0),
        }
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Probe the credential store; with an access token, load the profile.
    pub async fn initialize(&self) -> Session {
        if self.client.store().read(TokenKind::Access).is_none() {
            let generation = self.begin();
            tracing::debug!("no stored access token; starting signed out");
            return self.publish(generation, Session::signed_out());
        }
        self.refresh_profile().await
    }

    /// Re-fetch the profile and derive the session from the outcome.
    pub async fn refresh_profile(&self) -> Session {
        let generation = self.begin();
        self.state
            .send_modify(|session| *session = std::mem::take(session).into_loading());

        let next = match self.profiles.get().await {
            Ok(profile) => Session::signed_in(profile),
            Err(error) => {
                tracing::warn!(%error, "profile fetch failed");
                Session::failed(error.to_string())
            }
        };
        self.publish(generation, next)
    }

    /// Sign in, then load the profile.
    ///
    /// # Errors
    ///
    /// Propagates login failures; the published session then carries the
    /// error and stays signed out.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        durability: Durability,
    ) -> Result<Session, ClientError> {
        let generation = self.begin();
        if let Err(error) = self.client.login(username, password, durability).await {
            self.publish(generation, Session::failed(error.to_string()));
            return Err(error.into());
        }
        Ok(self.refresh_profile().await)
    }

    /// Clear every stored credential and publish the signed-out state.
    /// Makes no network call.
    pub fn logout(&self) -> Session {
        let generation = self.begin();
        self.client.logout();
        self.publish(generation, Session::signed_out())
    }

    /// Publish the signed-out state after the refresh token was refused.
    /// Credentials are already gone; makes no network call.
    pub fn expire(&self) -> Session {
        let generation = self.begin();
        tracing::info!("session expired; signed out");
        self.publish(generation, Session::failed(SESSION_EXPIRED.to_string()))
    }

    fn begin(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Apply `next` unless a newer operation has started since `generation`.
    fn publish(&self, generation: u64, next: Session) -> Session {
        let applied = self.state.send_if_modified(|session| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *session = next;
            true
        });
        if !applied {
            tracing::debug!(generation, "discarding stale session update");
        }
        self.current()
    }
}
