//! # lex-client
//!
//! Typed clients for the Lexa backend, all routed through the authenticated
//! request executor of `lex-auth`:
//!
//! - [`ProfileApi`]: profile read/update, avatar upload, usage stats
//! - [`ChatApi`]: questions with optional documents, dialog history
//! - [`PaymentApi`]: balance, fee deduction, top-ups, transactions
//! - [`BillingGate`]: fail-open pay-before-send for chat messages
//! - [`SessionProjector`]: observable authentication state
//!
//! [`LexClient`] wires them together from a [`LexConfig`]. When the refresh
//! token is refused it forgets the cached balance and publishes the
//! expired session.

mod attachment;
pub mod billing;
pub mod chat;
pub mod error;
pub mod http;
pub mod payment;
pub mod profile;
pub mod session;

use std::sync::Arc;

use lex_auth::AuthedClient;
use lex_config::LexConfig;
use lex_core::entities::{ChatReply, Session};

pub use attachment::Attachment;
pub use billing::{BillingGate, Charge};
pub use chat::ChatApi;
pub use error::ClientError;
pub use payment::{PaymentApi, TopUp};
pub use profile::ProfileApi;
pub use session::SessionProjector;

/// All API clients over one shared executor and credential store.
#[derive(Debug)]
pub struct LexClient {
    config: LexConfig,
    auth: AuthedClient,
    profile: ProfileApi,
    chat: ChatApi,
    payments: PaymentApi,
    billing: Arc<BillingGate>,
    session: Arc<SessionProjector>,
}

impl LexClient {
    /// Build the production client described by `config`.
    ///
    /// # Errors
    ///
    /// Fails if the credential store or HTTP client cannot be set up.
    pub fn from_config(config: LexConfig) -> Result<Self, ClientError> {
        let auth = AuthedClient::from_config(&config)?;
        Ok(Self::with_auth(config, auth))
    }

    /// Build over an existing executor (tests, custom transports).
    #[must_use]
    pub fn with_auth(config: LexConfig, auth: AuthedClient) -> Self {
        let payments = PaymentApi::new(auth.clone());
        let billing = Arc::new(BillingGate::new(payments.clone()));
        let session = Arc::new(SessionProjector::new(auth.clone()));
        watch_expiry(&auth, &billing, &session);
        Self {
            profile: ProfileApi::new(auth.clone()),
            chat: ChatApi::new(auth.clone()),
            billing,
            session,
            payments,
            auth,
            config,
        }
    }

    #[must_use]
    pub const fn config(&self) -> &LexConfig {
        &self.config
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthedClient {
        &self.auth
    }

    #[must_use]
    pub const fn profile(&self) -> &ProfileApi {
        &self.profile
    }

    #[must_use]
    pub const fn chat(&self) -> &ChatApi {
        &self.chat
    }

    #[must_use]
    pub const fn payments(&self) -> &PaymentApi {
        &self.payments
    }

    #[must_use]
    pub fn billing(&self) -> &BillingGate {
        &self.billing
    }

    #[must_use]
    pub fn session(&self) -> &SessionProjector {
        &self.session
    }

    /// Send a chat message, behind the billing gate when
    /// `billing.charge_chat_messages` is on.
    ///
    /// # Errors
    ///
    /// [`ClientError::InsufficientFunds`] when the fee was refused, otherwise
    /// the errors of [`ChatApi::send_message`].
    pub async fn send_chat(
        &self,
        dialog_id: Option<&str>,
        content: &str,
        file: Option<Attachment>,
    ) -> Result<ChatReply, ClientError> {
        if !self.config.billing.charge_chat_messages {
            return self.chat.send_message(dialog_id, content, file).await;
        }
        // Nothing is deducted for a message that could never be sent.
        self.chat.preflight(content, file.is_some()).await?;
        self.billing
            .gate(|| self.chat.post_message(dialog_id, content, file))
            .await
    }

    /// Forget credentials and the cached balance. Purely local.
    pub fn logout(&self) -> Session {
        self.billing.forget_balance();
        self.session.logout()
    }
}

/// Follow terminal refresh failures for as long as the client lives.
///
/// The task holds weak handles only; it ends once the client is dropped and
/// the coordinator's channel closes.
fn watch_expiry(auth: &AuthedClient, billing: &Arc<BillingGate>, session: &Arc<SessionProjector>) {
    let Ok(runtime) = tokio::runtime::Handle::try_current() else {
        tracing::debug!("no async runtime; session expiry is not projected");
        return;
    };
    let mut expiry = auth.refresher().subscribe_expiry();
    let billing = Arc::downgrade(billing);
    let session = Arc::downgrade(session);
    runtime.spawn(async move {
        while expiry.changed().await.is_ok() {
            let (Some(billing), Some(session)) = (billing.upgrade(), session.upgrade()) else {
                break;
            };
            billing.forget_balance();
            session.expire();
        }
    });
}
