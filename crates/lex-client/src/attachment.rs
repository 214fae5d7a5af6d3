use std::path::Path;

use lex_auth::FormPart;

use crate::error::ClientError;

/// A file sent alongside a chat message or as an avatar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub file_name: String,
    pub mime: Option<String>,
    pub bytes: Vec<u8>,
}

impl Attachment {
    #[must_use]
    pub fn new(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let file_name = file_name.into();
        let mime = guess_mime(&file_name).map(str::to_string);
        Self {
            file_name,
            mime,
            bytes,
        }
    }

    /// Read a file from disk.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Validation`] if the file cannot be read.
    pub async fn load(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| ClientError::Validation(format!("cannot read {}: {e}", path.display())))?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());
        Ok(Self::new(file_name, bytes))
    }

    pub(crate) fn into_part(self, field: &str) -> FormPart {
        FormPart::file(field, self.file_name, self.mime, self.bytes)
    }
}

fn guess_mime(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name).extension()?.to_str()?.to_ascii_lowercase();
    Some(match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => return None,
    })
}
