use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::serde_util::{opt_string_or_number, parse_amount, string_or_number};

/// Body of `GET /payment/balance/` and of the fee-deduction `POST`.
///
/// The server formats money as a decimal string; numbers are accepted too.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub balance: String,
}

impl BalanceResponse {
    /// # Errors
    ///
    /// Returns [`CoreError::Parse`] if the balance is not a finite number.
    pub fn amount(&self) -> Result<f64, CoreError> {
        parse_amount(&self.balance)
            .ok_or_else(|| CoreError::Parse(format!("invalid balance value '{}'", self.balance)))
    }
}

/// A top-up payment created through `POST /payment/topup/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub payment_url: Option<String>,
}

/// Result reported to the payment-confirmation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Success,
    Failure,
}

impl PaymentStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failure => "failure",
        }
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Self::Success),
            "failure" => Ok(Self::Failure),
            other => Err(CoreError::Validation(format!(
                "payment status must be 'success' or 'failure', got '{other}'"
            ))),
        }
    }
}

/// Outcome of confirming a payment after the provider redirect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentOutcome {
    pub success: bool,
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub new_balance: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Completed,
    Pending,
    Failed,
}

/// Entry of `GET /payment/transactions/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(deserialize_with = "string_or_number")]
    pub amount: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
    pub status: TransactionStatus,
}
