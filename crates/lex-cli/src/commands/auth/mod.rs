mod login;
mod logout;
mod register;
mod status;

use anyhow::Context;
use lex_client::LexClient;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::AuthCommands;

/// Handle `lex auth <subcommand>`.
pub async fn handle(
    action: &AuthCommands,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        AuthCommands::Login(args) => login::handle(args, client, flags).await,
        AuthCommands::Register(args) => register::handle(args, client, flags).await,
        AuthCommands::Logout => logout::handle(client, flags),
        AuthCommands::Status => status::handle(client, flags).await,
    }
}

/// The `--password` value, or an interactive prompt without echo.
fn password_or_prompt(given: Option<&str>) -> anyhow::Result<String> {
    match given {
        Some(password) => Ok(password.to_string()),
        None => rpassword::prompt_password("Password: ").context("failed to read password"),
    }
}
