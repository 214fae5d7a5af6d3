use chrono::{DateTime, Utc};
use lex_auth::jwt;
use lex_client::LexClient;
use lex_core::TokenKind;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct TokenStatus {
    stored_in: Option<String>,
    expires_at: Option<String>,
    cookie_expires_at: Option<String>,
}

#[derive(Serialize)]
struct AuthStatusResponse {
    authenticated: bool,
    user: Option<String>,
    access: TokenStatus,
    refresh: TokenStatus,
    note: Option<String>,
}

pub async fn handle(client: &LexClient, flags: &GlobalFlags) -> anyhow::Result<()> {
    let spinner = Progress::spinner("Checking session...");
    // Loads the profile, which may refresh the access token on the way.
    let session = client.session().initialize().await;
    spinner.finish_clear();

    let note = session.error.clone().or_else(|| {
        (!session.is_authenticated).then(|| "not signed in; run `lex auth login`".to_string())
    });

    output(
        &AuthStatusResponse {
            authenticated: session.is_authenticated,
            user: session.profile.as_ref().and_then(|profile| profile.display_name()),
            access: token_status(client, TokenKind::Access),
            refresh: token_status(client, TokenKind::Refresh),
            note,
        },
        flags.format,
    )
}

fn token_status(client: &LexClient, kind: TokenKind) -> TokenStatus {
    let store = client.auth().store();
    TokenStatus {
        stored_in: store.locate(kind).map(|location| location.to_string()),
        expires_at: store
            .read(kind)
            .and_then(|token| jwt::decode_expiry(&token).ok())
            .map(|at| rfc3339(&at)),
        cookie_expires_at: store.cookie_expiry(kind).map(|at| rfc3339(&at)),
    }
}

fn rfc3339(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}
