use clap::Subcommand;

use crate::cli::subcommands::{AuthCommands, BalanceCommands, ChatCommands, ProfileCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Sign in, sign out, register, inspect stored credentials.
    Auth {
        #[command(subcommand)]
        action: AuthCommands,
    },
    /// Your profile and usage statistics.
    Profile {
        #[command(subcommand)]
        action: ProfileCommands,
    },
    /// Balance, top-ups and transaction history.
    Balance {
        #[command(subcommand)]
        action: BalanceCommands,
    },
    /// Ask questions and browse dialogs.
    Chat {
        #[command(subcommand)]
        action: ChatCommands,
    },
}
