use lex_auth::Registered;
use lex_client::LexClient;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::auth::AuthRegisterArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct AuthRegisterResponse {
    registered: bool,
    username: String,
    signed_in: bool,
    next_step: Option<&'static str>,
}

pub async fn handle(
    args: &AuthRegisterArgs,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let password = super::password_or_prompt(args.password.as_deref())?;

    let outcome = Progress::run(
        "Creating account...",
        "registration failed",
        client.auth().register(&args.username, &args.email, &password),
    )
    .await?;

    let signed_in = outcome == Registered::SignedIn;

    output(
        &AuthRegisterResponse {
            registered: true,
            username: args.username.trim().to_string(),
            signed_in,
            next_step: (!signed_in).then_some("lex auth login <username>"),
        },
        flags.format,
    )
}
