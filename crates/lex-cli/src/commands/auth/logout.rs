use lex_client::LexClient;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;

#[derive(Serialize)]
struct AuthLogoutResponse {
    cleared: bool,
    had_credentials: bool,
}

pub fn handle(client: &LexClient, flags: &GlobalFlags) -> anyhow::Result<()> {
    let had_credentials = client.auth().store().has_any_token();
    let session = client.logout();
    output(
        &AuthLogoutResponse {
            cleared: !session.is_authenticated,
            had_credentials,
        },
        flags.format,
    )
}
