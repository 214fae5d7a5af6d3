//! Billing Gate: charge the per-message fee before a paid action runs.
//!
//! The gate is fail-open. Only an explicit insufficient-funds answer stops
//! the action; any other billing failure is logged and the action proceeds.
//! While no balance has been fetched in this session the charge is skipped.

use std::future::Future;
use std::sync::{Mutex, PoisonError};

use crate::error::ClientError;
use crate::payment::PaymentApi;

/// What happened to the fee before a gated action ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Charge {
    /// No balance known yet; nothing was charged.
    Skipped,
    /// Fee taken; the server reported this balance afterwards.
    Deducted { balance: f64 },
    /// Billing failed for a reason other than insufficient funds.
    Failed { reason: String },
}

#[derive(Debug)]
pub struct BillingGate {
    payments: PaymentApi,
    balance: Mutex<Option<f64>>,
}

impl BillingGate {
    #[must_use]
    pub const fn new(payments: PaymentApi) -> Self {
        Self {
            payments,
            balance: Mutex::new(None),
        }
    }

    /// Last balance seen from the server, if any.
    #[must_use]
    pub fn cached_balance(&self) -> Option<f64> {
        *self.balance.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_cached_balance(&self, balance: Option<f64>) {
        *self.balance.lock().unwrap_or_else(PoisonError::into_inner) = balance;
    }

    /// Drop the cached balance, e.g. on logout.
    pub fn forget_balance(&self) {
        self.set_cached_balance(None);
    }

    /// Fetch the balance and cache it.
    ///
    /// # Errors
    ///
    /// Propagates [`PaymentApi::balance`] failures; the cache is left as is.
    pub async fn refresh_balance(&self) -> Result<f64, ClientError> {
        let balance = self.payments.balance().await?;
        self.set_cached_balance(Some(balance));
        Ok(balance)
    }

    /// Best-effort balance fetch. Failures leave the balance unknown, which
    /// lets the next gated action through uncharged.
    pub async fn prime_balance(&self) -> Option<f64> {
        match self.refresh_balance().await {
            Ok(balance) => Some(balance),
            Err(error) => {
                tracing::warn!(%error, "balance unavailable; charging is skipped");
                self.cached_balance()
            }
        }
    }

    /// Charge the fee according to the gate policy without running anything.
    ///
    /// # Errors
    ///
    /// Only [`ClientError::InsufficientFunds`].
    pub async fn charge(&self) -> Result<Charge, ClientError> {
        if self.cached_balance().is_none() {
            tracing::debug!("balance unknown; skipping fee deduction");
            return Ok(Charge::Skipped);
        }
        match self.payments.deduct_fee().await {
            Ok(balance) => {
                self.set_cached_balance(Some(balance));
                Ok(Charge::Deducted { balance })
            }
            Err(ClientError::InsufficientFunds) => {
                tracing::info!("fee deduction refused: insufficient funds");
                Err(ClientError::InsufficientFunds)
            }
            Err(error) => {
                tracing::warn!(%error, "fee deduction failed; continuing without charge");
                Ok(Charge::Failed {
                    reason: error.to_string(),
                })
            }
        }
    }

    /// Run `action` behind the fee.
    ///
    /// # Errors
    ///
    /// [`ClientError::InsufficientFunds`] without running `action`, or
    /// whatever `action` returns.
    pub async fn gate<T, F, Fut>(&self, action: F) -> Result<T, ClientError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        self.charge().await?;
        action().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use lex_auth::testing::{ScriptedTransport, json_response};
    use lex_auth::{AuthedClient, CredentialStore, TransportError};
    use lex_config::ApiConfig;
    use lex_core::{Durability, TokenKind};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn gate_over(transport: &Arc<ScriptedTransport>) -> BillingGate {
        let store = Arc::new(CredentialStore::in_memory());
        store
            .write(TokenKind::Access, "a1", Durability::Ephemeral)
            .expect("seed");
        BillingGate::new(PaymentApi::new(AuthedClient::new(
            store,
            transport.clone(),
            ApiConfig {
                base_url: "https://api.test".into(),
                ..ApiConfig::default()
            },
        )))
    }

    async fn counted_action(calls: &AtomicUsize) -> Result<&'static str, ClientError> {
        calls.fetch_add(1, Ordering::SeqCst);
        Ok("sent")
    }

    #[tokio::test]
    async fn unknown_balance_skips_deduction() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"balance": "0"})))
        }));
        let gate = gate_over(&transport);
        let calls = AtomicUsize::new(0);

        let result = gate.gate(|| counted_action(&calls)).await.expect("action ran");

        assert_eq!(result, "sent");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(transport.requests().is_empty());
        assert_eq!(gate.cached_balance(), None);
    }

    #[tokio::test]
    async fn successful_deduction_updates_cache_then_runs() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"balance": "900.00"})))
        }));
        let gate = gate_over(&transport);
        gate.set_cached_balance(Some(1000.0));
        let calls = AtomicUsize::new(0);

        gate.gate(|| counted_action(&calls)).await.expect("action ran");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(transport.calls_to("/payment/balance/"), 1);
        assert_eq!(gate.cached_balance(), Some(900.0));
    }

    #[tokio::test]
    async fn insufficient_funds_blocks_action() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(402, &json!({"detail": "Insufficient funds"})))
        }));
        let gate = gate_over(&transport);
        gate.set_cached_balance(Some(10.0));
        let calls = AtomicUsize::new(0);

        let err = gate.gate(|| counted_action(&calls)).await.unwrap_err();

        assert!(err.is_insufficient_funds());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(gate.cached_balance(), Some(10.0));
    }

    #[tokio::test]
    async fn server_error_fails_open() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(500, &json!({"detail": "billing down"})))
        }));
        let gate = gate_over(&transport);
        gate.set_cached_balance(Some(1000.0));
        let calls = AtomicUsize::new(0);

        let result = gate.gate(|| counted_action(&calls)).await;

        assert_eq!(result.expect("action still ran"), "sent");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(gate.cached_balance(), Some(1000.0));
    }

    #[tokio::test]
    async fn network_error_and_malformed_body_fail_open() {
        let unreachable = Arc::new(ScriptedTransport::new(|_| {
            Err(TransportError::Unreachable("reset".into()))
        }));
        let gate = gate_over(&unreachable);
        gate.set_cached_balance(Some(1000.0));
        assert!(matches!(gate.charge().await, Ok(Charge::Failed { .. })));

        let malformed = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"unexpected": true})))
        }));
        let gate = gate_over(&malformed);
        gate.set_cached_balance(Some(1000.0));
        assert!(matches!(gate.charge().await, Ok(Charge::Failed { .. })));
    }

    #[tokio::test]
    async fn action_errors_propagate() {
        let transport = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"balance": "5"})))
        }));
        let gate = gate_over(&transport);
        let err = gate
            .gate(|| async { Err::<(), _>(ClientError::Validation("empty".into())) })
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Validation(_)));
    }

    #[tokio::test]
    async fn prime_balance_is_best_effort() {
        let ok = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(200, &json!({"balance": "42.5"})))
        }));
        let gate = gate_over(&ok);
        assert_eq!(gate.prime_balance().await, Some(42.5));
        assert_eq!(gate.cached_balance(), Some(42.5));

        let down = Arc::new(ScriptedTransport::new(|_| {
            Ok(json_response(503, &json!({})))
        }));
        let gate = gate_over(&down);
        assert_eq!(gate.prime_balance().await, None);
    }
}
