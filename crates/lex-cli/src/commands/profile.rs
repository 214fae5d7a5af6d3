use lex_client::{Attachment, LexClient};
use lex_core::entities::{Profile, ProfileUpdate};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ProfileCommands;
use crate::cli::subcommands::profile::ProfileUpdateArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct ProfileUpdateResponse {
    updated: bool,
    profile: ProfileUpdate,
}

#[derive(Serialize)]
struct AvatarResponse {
    uploaded: bool,
    file_name: String,
    avatar_url: String,
}

/// Handle `lex profile <subcommand>`.
pub async fn handle(
    action: &ProfileCommands,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Show => {
            let profile = client.profile().get().await?;
            output(&profile, flags.format)
        }
        ProfileCommands::Update(args) => {
            let current = client.profile().get().await?;
            let update = merge_update(&current, args);
            client.profile().update(update.clone()).await?;
            output(
                &ProfileUpdateResponse {
                    updated: true,
                    profile: update,
                },
                flags.format,
            )
        }
        ProfileCommands::Avatar(args) => {
            let image = Attachment::load(&args.path).await?;
            let file_name = image.file_name.clone();
            let avatar_url = Progress::run(
                "Uploading avatar...",
                "avatar upload failed",
                client.profile().upload_avatar(image),
            )
            .await?;
            output(
                &AvatarResponse {
                    uploaded: true,
                    file_name,
                    avatar_url,
                },
                flags.format,
            )
        }
        ProfileCommands::Stats => {
            let stats = client.profile().stats().await?;
            output(&stats, flags.format)
        }
    }
}

/// The settings form always submits every field; start from what the server
/// has and overlay the flags that were given.
fn merge_update(current: &Profile, args: &ProfileUpdateArgs) -> ProfileUpdate {
    let pick = |given: &Option<String>, existing: &Option<String>| {
        given
            .clone()
            .or_else(|| existing.clone())
            .unwrap_or_default()
    };
    ProfileUpdate {
        name: pick(&args.name, &current.name),
        surname: pick(&args.surname, &current.surname),
        patronymic: pick(&args.patronymic, &current.patronymic),
        phone: pick(&args.phone, &current.phone),
        birthday: pick(&args.birthday, &current.birthday),
        additional_info: pick(&args.additional_info, &current.additional_info),
    }
}
