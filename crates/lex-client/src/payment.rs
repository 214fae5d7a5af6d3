//! Balance, fee deduction, top-ups and transaction history.

use lex_auth::{ApiRequest, AuthedClient};
use lex_core::entities::{BalanceResponse, Payment, PaymentOutcome, PaymentStatus, Transaction};
use serde::Serialize;

use crate::error::ClientError;
use crate::http::fetch_json;

pub const BALANCE_PATH: &str = "/payment/balance/";
pub const TOPUP_PATH: &str = "/payment/topup/";
pub const CONFIRM_PATH: &str = "/payment/confirm/";
pub const TRANSACTIONS_PATH: &str = "/payment/transactions/";

pub const DEFAULT_CURRENCY: &str = "KZT";
pub const DEFAULT_TOPUP_DESCRIPTION: &str = "Balance top-up";

/// Body of `POST /payment/topup/`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopUp {
    pub amount: f64,
    pub currency: String,
    pub description: String,
}

impl TopUp {
    #[must_use]
    pub fn new(amount: f64) -> Self {
        Self {
            amount,
            currency: DEFAULT_CURRENCY.to_string(),
            description: DEFAULT_TOPUP_DESCRIPTION.to_string(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    fn validate(&self) -> Result<(), ClientError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ClientError::Validation(format!(
                "top-up amount must be positive, got {}",
                self.amount
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(ClientError::Validation("currency must not be empty".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct PaymentApi {
    client: AuthedClient,
}

impl PaymentApi {
    #[must_use]
    pub const fn new(client: AuthedClient) -> Self {
        Self { client }
    }

    /// Current balance as reported by the server.
    ///
    /// # Errors
    ///
    /// Transport, status or decoding errors; [`ClientError::Parse`] if the
    /// balance string is not a number.
    pub async fn balance(&self) -> Result<f64, ClientError> {
        let body: BalanceResponse = fetch_json(
            &self.client,
            ApiRequest::get(self.client.url(BALANCE_PATH)),
            "balance",
        )
        .await?;
        Ok(body.amount()?)
    }

    /// Charge the per-message fee; returns the post-deduction balance.
    ///
    /// # Errors
    ///
    /// [`ClientError::InsufficientFunds`] on 402; otherwise transport, status
    /// or decoding errors.
    pub async fn deduct_fee(&self) -> Result<f64, ClientError> {
        let body: BalanceResponse = fetch_json(
            &self.client,
            ApiRequest::post(self.client.url(BALANCE_PATH)),
            "fee deduction",
        )
        .await?;
        let balance = body.amount()?;
        tracing::debug!(balance, "fee deducted");
        Ok(balance)
    }

    /// Create a payment with the provider; the returned record may carry a
    /// `payment_url` to complete it.
    ///
    /// # Errors
    ///
    /// [`ClientError::Validation`] for a non-positive amount; otherwise
    /// transport, status or decoding errors.
    pub async fn create_topup(&self, topup: &TopUp) -> Result<Payment, ClientError> {
        topup.validate()?;
        let body = serde_json::to_value(topup)
            .map_err(|e| ClientError::Validation(format!("top-up: {e}")))?;
        let payment: Payment = fetch_json(
            &self.client,
            ApiRequest::post(self.client.url(TOPUP_PATH)).json(body),
            "payment",
        )
        .await?;
        tracing::info!(payment_id = %payment.id, amount = topup.amount, "top-up created");
        Ok(payment)
    }

    /// Report the provider's verdict for `payment_id`.
    ///
    /// # Errors
    ///
    /// Transport, status or decoding errors.
    pub async fn confirm(
        &self,
        payment_id: &str,
        status: PaymentStatus,
    ) -> Result<PaymentOutcome, ClientError> {
        let url = format!(
            "{}?payment_id={}&status={}",
            self.client.url(CONFIRM_PATH),
            urlencoding::encode(payment_id.trim()),
            status.as_str()
        );
        fetch_json(&self.client, ApiRequest::get(url), "payment confirmation").await
    }

    /// # Errors
    ///
    /// Transport, status or decoding errors.
    pub async fn transactions(&self) -> Result<Vec<Transaction>, ClientError> {
        fetch_json(
            &self.client,
            ApiRequest::get(self.client.url(TRANSACTIONS_PATH)),
            "transactions",
        )
        .await
    }
}
