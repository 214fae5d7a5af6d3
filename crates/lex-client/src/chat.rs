//! Chat endpoints: sending questions and browsing dialogs.

use lex_auth::{ApiRequest, AuthedClient, FormPart};
use lex_core::entities::{ChatReply, Dialog, DialogDetail};

use crate::attachment::Attachment;
use crate::error::ClientError;
use crate::http::{execute, fetch_json};

pub const CHAT_PATH: &str = "/chat/";
pub const DIALOGS_PATH: &str = "/dialogs/";

#[derive(Debug, Clone)]
pub struct ChatApi {
    client: AuthedClient,
}

impl ChatApi {
    #[must_use]
    pub const fn new(client: AuthedClient) -> Self {
        Self { client }
    }

    /// Send a question, optionally with a document, to a new or existing dialog.
    ///
    /// Checks for a stored token and probes the server before the upload so
    /// a dead connection fails fast instead of after a large multipart body.
    ///
    /// # Errors
    ///
    /// - `Validation` when there is neither text nor a file
    /// - `NotAuthenticated` when no token is stored (no request is made)
    /// - `ServerUnreachable` when the probe fails
    /// - `InsufficientFunds` when the server answers 402
    /// - `SessionExpired` when the refresh+retry did not help
    pub async fn send_message(
        &self,
        dialog_id: Option<&str>,
        content: &str,
        file: Option<Attachment>,
    ) -> Result<ChatReply, ClientError> {
        self.preflight(content, file.is_some()).await?;
        self.post_message(dialog_id, content, file).await
    }

    /// Local checks and the reachability probe that must pass before a
    /// message costs anything.
    pub(crate) async fn preflight(&self, content: &str, has_file: bool) -> Result<(), ClientError> {
        if content.trim().is_empty() && !has_file {
            return Err(ClientError::Validation("message is empty".into()));
        }
        self.client.ensure_signed_in()?;
        self.client.probe().await?;
        Ok(())
    }

    /// The upload itself; callers run [`Self::preflight`] first.
    pub(crate) async fn post_message(
        &self,
        dialog_id: Option<&str>,
        content: &str,
        file: Option<Attachment>,
    ) -> Result<ChatReply, ClientError> {
        let mut parts = vec![FormPart::text("content", content.trim())];
        if let Some(file) = file {
            parts.push(file.into_part("file"));
        }
        if let Some(dialog_id) = dialog_id {
            parts.push(FormPart::text("dialog_id", dialog_id));
        }

        let reply: ChatReply = fetch_json(
            &self.client,
            ApiRequest::post(self.client.url(CHAT_PATH)).multipart(parts),
            "chat reply",
        )
        .await?;
        tracing::debug!(dialog_id = %reply.dialog_id, "message answered");
        Ok(reply)
    }

    /// # Errors
    ///
    /// `NotAuthenticated` without a stored token; otherwise transport,
    /// status or decoding errors.
    pub async fn dialogs(&self) -> Result<Vec<Dialog>, ClientError> {
        self.client.ensure_signed_in()?;
        fetch_json(
            &self.client,
            ApiRequest::get(self.client.url(DIALOGS_PATH)),
            "dialogs",
        )
        .await
    }

    /// # Errors
    ///
    /// `NotAuthenticated` without a stored token; otherwise transport,
    /// status or decoding errors.
    pub async fn dialog(&self, dialog_id: &str) -> Result<DialogDetail, ClientError> {
        self.client.ensure_signed_in()?;
        fetch_json(
            &self.client,
            ApiRequest::get(self.dialog_url(dialog_id, "")),
            "dialog",
        )
        .await
    }

    /// # Errors
    ///
    /// `NotAuthenticated` without a stored token; otherwise transport or
    /// status errors.
    pub async fn delete_dialog(&self, dialog_id: &str) -> Result<(), ClientError> {
        self.client.ensure_signed_in()?;
        execute(
            &self.client,
            ApiRequest::delete(self.dialog_url(dialog_id, "delete/")),
        )
        .await?;
        tracing::info!(dialog_id, "dialog deleted");
        Ok(())
    }

    fn dialog_url(&self, dialog_id: &str, suffix: &str) -> String {
        self.client.url(&format!(
            "{DIALOGS_PATH}{}/{suffix}",
            urlencoding::encode(dialog_id.trim())
        ))
    }
}
