use clap::{Args, Subcommand};

/// Authentication commands.
#[derive(Clone, Debug, Subcommand)]
pub enum AuthCommands {
    /// Log in with username and password.
    Login(AuthLoginArgs),
    /// Create an account.
    Register(AuthRegisterArgs),
    /// Clear stored credentials.
    Logout,
    /// Show current auth status and where tokens are stored.
    Status,
}

#[derive(Clone, Debug, Args)]
pub struct AuthLoginArgs {
    pub username: String,
    /// Password (prompted when omitted).
    #[arg(long)]
    pub password: Option<String>,
    /// Keep the session across runs (durable storage and long-lived cookies).
    #[arg(long)]
    pub remember: bool,
}

#[derive(Clone, Debug, Args)]
pub struct AuthRegisterArgs {
    pub username: String,
    #[arg(long)]
    pub email: String,
    /// Password (prompted when omitted).
    #[arg(long)]
    pub password: Option<String>,
}
