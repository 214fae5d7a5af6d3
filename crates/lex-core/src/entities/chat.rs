use serde::{Deserialize, Serialize};

use crate::serde_util::{opt_string_or_number, string_or_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    #[serde(other)]
    System,
}

/// A single message inside a dialog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub role: MessageRole,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Dialog summary as listed by `GET /dialogs/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dialog {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default, alias = "dialog_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Dialog with its message history, from `GET /dialogs/{id}/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogDetail {
    #[serde(default, deserialize_with = "opt_string_or_number")]
    pub id: Option<String>,
    #[serde(default, alias = "dialog_name")]
    pub name: Option<String>,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

/// Response of `POST /chat/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(deserialize_with = "string_or_number")]
    pub dialog_id: String,
    #[serde(default)]
    pub dialog_name: Option<String>,
    pub user_message: ChatMessage,
    pub assistant_message: ChatMessage,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_reply_accepts_numeric_ids() {
        let reply: ChatReply = serde_json::from_str(
            r#"{
                "dialog_id": 42,
                "dialog_name": "Lease dispute",
                "user_message": {"id": 1, "role": "user", "content": "hi"},
                "assistant_message": {"id": "2", "role": "assistant", "content": "hello", "file": null}
            }"#,
        )
        .expect("reply should parse");
        assert_eq!(reply.dialog_id, "42");
        assert_eq!(reply.user_message.id, "1");
        assert_eq!(reply.assistant_message.role, MessageRole::Assistant);
        assert_eq!(reply.assistant_message.file, None);
    }

    #[test]
    fn dialog_detail_defaults_missing_messages() {
        let detail: DialogDetail = serde_json::from_str(r#"{"id": 5}"#).expect("should parse");
        assert_eq!(detail.id.as_deref(), Some("5"));
        assert!(detail.messages.is_empty());
    }

    #[test]
    fn unknown_role_maps_to_system() {
        let message: ChatMessage =
            serde_json::from_str(r#"{"id": 3, "role": "tool", "content": ""}"#)
                .expect("should parse");
        assert_eq!(message.role, MessageRole::System);
    }
}
