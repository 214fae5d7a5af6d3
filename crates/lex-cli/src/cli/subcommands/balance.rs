use clap::{Args, Subcommand, ValueEnum};
use lex_core::entities::PaymentStatus;

/// Balance and payment commands.
#[derive(Clone, Debug, Subcommand)]
pub enum BalanceCommands {
    /// Show the current balance.
    Show,
    /// Start a top-up payment.
    Topup(BalanceTopupArgs),
    /// Report the payment provider's result for a top-up.
    Confirm(BalanceConfirmArgs),
    /// List past transactions.
    History,
}

#[derive(Clone, Debug, Args)]
pub struct BalanceTopupArgs {
    /// Amount in KZT.
    pub amount: f64,
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct BalanceConfirmArgs {
    pub payment_id: String,
    #[arg(long, default_value = "success")]
    pub status: ConfirmStatus,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum ConfirmStatus {
    Success,
    Failure,
}

impl From<ConfirmStatus> for PaymentStatus {
    fn from(status: ConfirmStatus) -> Self {
        match status {
            ConfirmStatus::Success => Self::Success,
            ConfirmStatus::Failure => Self::Failure,
        }
    }
}
