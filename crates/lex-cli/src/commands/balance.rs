use lex_client::{LexClient, TopUp};
use lex_core::entities::PaymentStatus;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::BalanceCommands;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct BalanceResponse {
    balance: f64,
    currency: &'static str,
}

/// Handle `lex balance <subcommand>`.
pub async fn handle(
    action: &BalanceCommands,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        BalanceCommands::Show => {
            let balance = client.billing().refresh_balance().await?;
            output(
                &BalanceResponse {
                    balance,
                    currency: "KZT",
                },
                flags.format,
            )
        }
        BalanceCommands::Topup(args) => {
            let mut topup = TopUp::new(args.amount);
            if let Some(description) = &args.description {
                topup = topup.with_description(description.clone());
            }
            let payment = Progress::run(
                "Creating payment...",
                "top-up failed",
                client.payments().create_topup(&topup),
            )
            .await?;
            output(&payment, flags.format)
        }
        BalanceCommands::Confirm(args) => {
            let status = PaymentStatus::from(args.status);
            let outcome = client.payments().confirm(&args.payment_id, status).await?;
            // The server may report the new balance; keep the gate in sync.
            if let Some(balance) = outcome
                .new_balance
                .as_deref()
                .and_then(|raw| raw.trim().parse::<f64>().ok())
            {
                client.billing().set_cached_balance(Some(balance));
            }
            output(&outcome, flags.format)
        }
        BalanceCommands::History => {
            let transactions = client.payments().transactions().await?;
            output(&transactions, flags.format)
        }
    }
}
