use lex_client::{Attachment, LexClient};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::ChatCommands;
use crate::cli::subcommands::chat::ChatSendArgs;
use crate::output::output;
use crate::progress::Progress;

#[derive(Serialize)]
struct ChatSendResponse {
    dialog_id: String,
    dialog_name: Option<String>,
    answer: String,
    balance: Option<f64>,
}

#[derive(Serialize)]
struct ChatDeleteResponse {
    deleted: bool,
    dialog_id: String,
}

/// Handle `lex chat <subcommand>`.
pub async fn handle(
    action: &ChatCommands,
    client: &LexClient,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        ChatCommands::Send(args) => send(args, client, flags).await,
        ChatCommands::List => {
            let dialogs = client.chat().dialogs().await?;
            output(&dialogs, flags.format)
        }
        ChatCommands::Show(args) => {
            let dialog = client.chat().dialog(&args.dialog_id).await?;
            output(&dialog.messages, flags.format)
        }
        ChatCommands::Delete(args) => {
            client.chat().delete_dialog(&args.dialog_id).await?;
            output(
                &ChatDeleteResponse {
                    deleted: true,
                    dialog_id: args.dialog_id.clone(),
                },
                flags.format,
            )
        }
    }
}

async fn send(args: &ChatSendArgs, client: &LexClient, flags: &GlobalFlags) -> anyhow::Result<()> {
    let file = match &args.file {
        Some(path) => Some(Attachment::load(path).await?),
        None => None,
    };

    let spinner = Progress::spinner("Checking balance...");
    if client.config().billing.charge_chat_messages {
        // A fresh process has no balance yet; without one the fee is skipped.
        client.billing().prime_balance().await;
    }
    spinner.set_message("Waiting for the answer...");

    let result = client
        .send_chat(args.dialog.as_deref(), &args.message, file)
        .await;
    let reply = match result {
        Ok(reply) => {
            spinner.finish_clear();
            reply
        }
        Err(error) => {
            spinner.finish_err("message not sent");
            return Err(error.into());
        }
    };

    output(
        &ChatSendResponse {
            dialog_id: reply.dialog_id,
            dialog_name: reply.dialog_name,
            answer: reply.assistant_message.content,
            balance: client.billing().cached_balance(),
        },
        flags.format,
    )
}
