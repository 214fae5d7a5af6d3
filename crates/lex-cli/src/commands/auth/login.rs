use lex_client::LexClient;
use lex_core::{Durability, TokenKind};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthLoginArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct AuthLoginResponse {
    authenticated: bool,
    user: Option<String>,
    durability: Durability,
    stored_in: Option<String>,
    note: Option<String>,
}

pub async fn handle(
    args: &AuthLoginArgs,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let password = super::password_or_prompt(args.password.as_deref())?;
    let durability =
        Durability::from_remember_me(args.remember || client.config().general.remember_me);

    let session = Progress::run(
        "Signing in...",
        "sign-in failed",
        client.session().login(&args.username, &password, durability),
    )
    .await?;

    output(
        &AuthLoginResponse {
            authenticated: session.is_authenticated,
            user: session.profile.as_ref().and_then(|profile| profile.display_name()),
            durability,
            stored_in: client
                .auth()
                .store()
                .locate(TokenKind::Access)
                .map(|location| location.to_string()),
            // Signed in, but the profile could not be loaded.
            note: session.error,
        },
        flags.format,
    )
}
