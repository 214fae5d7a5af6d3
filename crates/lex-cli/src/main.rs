use clap::Parser;
use lex_auth::AuthError;
use lex_client::ClientError;

mod bootstrap;
mod cli;
mod commands;
mod output;
mod progress;
mod ui;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("lex error: {error:#}");
        if let Some(hint) = hint_for(&error) {
            eprintln!("hint: {hint}");
        }
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let flags = cli.global_flags();
    ui::init(&flags);

    let config = bootstrap::load_config()?;
    let client = bootstrap::build_client(config)?;

    commands::dispatch(cli.command, &client, &flags).await
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env("LEXA_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn hint_for(error: &anyhow::Error) -> Option<&'static str> {
    let auth_error = match error.downcast_ref::<ClientError>() {
        Some(ClientError::Auth(auth_error)) => auth_error,
        Some(_) => return None,
        None => error.downcast_ref::<AuthError>()?,
    };
    match auth_error {
        AuthError::SessionExpired | AuthError::NotAuthenticated => {
            Some("run `lex auth login <username>` to sign in again")
        }
        AuthError::NetworkUnreachable(_) | AuthError::ServerUnreachable(_) => {
            Some("check LEXA_API__BASE_URL and your network connection")
        }
        _ => None,
    }
}
