pub mod auth;
pub mod balance;
pub mod chat;
pub mod profile;

use lex_client::LexClient;

use crate::cli::{Commands, GlobalFlags};

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Auth { action } => auth::handle(&action, client, flags).await,
        Commands::Profile { action } => profile::handle(&action, client, flags).await,
        Commands::Balance { action } => balance::handle(&action, client, flags).await,
        Commands::Chat { action } => chat::handle(&action, client, flags).await,
    }
}
