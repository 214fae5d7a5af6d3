use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Profile commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProfileCommands {
    /// Show the signed-in user's profile.
    Show,
    /// Change profile fields. Unset flags keep their current value.
    Update(ProfileUpdateArgs),
    /// Upload a new avatar image.
    Avatar(ProfileAvatarArgs),
    /// Consultation and spending statistics.
    Stats,
}

#[derive(Clone, Debug, Default, Args)]
pub struct ProfileUpdateArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub surname: Option<String>,
    #[arg(long)]
    pub patronymic: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    /// Birthday as YYYY-MM-DD.
    #[arg(long)]
    pub birthday: Option<String>,
    #[arg(long)]
    pub additional_info: Option<String>,
}

#[derive(Clone, Debug, Args)]
pub struct ProfileAvatarArgs {
    pub path: PathBuf,
}
