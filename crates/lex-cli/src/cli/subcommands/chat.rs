use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Chat commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ChatCommands {
    /// Ask a question, optionally attaching a document.
    Send(ChatSendArgs),
    /// List your dialogs.
    List,
    /// Show the messages of one dialog.
    Show(ChatDialogArgs),
    /// Delete a dialog.
    Delete(ChatDialogArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ChatSendArgs {
    pub message: String,
    /// Continue an existing dialog instead of starting a new one.
    #[arg(long)]
    pub dialog: Option<String>,
    /// Document to attach.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Clone, Debug, Args)]
pub struct ChatDialogArgs {
    pub dialog_id: String,
}
