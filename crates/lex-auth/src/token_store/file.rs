use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use super::slot::SecretSlot;
use crate::error::AuthError;

pub const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Durable slot backed by a JSON object on disk (`0600`, parent `0700` on Unix).
#[derive(Debug)]
pub struct FileSlot {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileSlot {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// `credentials.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self::new(dir.join(CREDENTIALS_FILE_NAME))
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SecretSlot for FileSlot {
    fn name(&self) -> &'static str {
        "file"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let values = read_map::<String>(&self.path)?;
        Ok(values.get(key).filter(|v| !v.trim().is_empty()).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = read_map::<String>(&self.path)?;
        values.insert(key.to_string(), value.to_string());
        write_map(&self.path, &values)
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut values = read_map::<String>(&self.path)?;
        if values.remove(key).is_none() {
            return Ok(());
        }
        if values.is_empty() {
            return fs::remove_file(&self.path).map_err(|e| {
                AuthError::TokenStore(format!("failed to delete {}: {e}", self.path.display()))
            });
        }
        write_map(&self.path, &values)
    }
}

// --- Private file helpers ---

pub(super) fn read_map<T>(path: &Path) -> Result<BTreeMap<String, T>, AuthError>
where
    T: serde::de::DeserializeOwned,
{
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => {
            return Err(AuthError::TokenStore(format!(
                "read {}: {e}",
                path.display()
            )));
        }
    };
    if raw.trim().is_empty() {
        return Ok(BTreeMap::new());
    }
    serde_json::from_str(&raw)
        .map_err(|e| AuthError::TokenStore(format!("parse {}: {e}", path.display())))
}

pub(super) fn write_map<T>(path: &Path, values: &BTreeMap<String, T>) -> Result<(), AuthError>
where
    T: serde::Serialize,
{
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| AuthError::TokenStore(format!("mkdir {}: {e}", parent.display())))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            if let Err(e) = fs::set_permissions(parent, fs::Permissions::from_mode(0o700)) {
                tracing::warn!("failed to chmod 0700 {}: {e}", parent.display());
            }
        }
    }

    let body = serde_json::to_string_pretty(values)
        .map_err(|e| AuthError::TokenStore(format!("serialize {}: {e}", path.display())))?;
    fs::write(path, body)
        .map_err(|e| AuthError::TokenStore(format!("write {}: {e}", path.display())))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))
            .map_err(|e| AuthError::TokenStore(format!("chmod {}: {e}", path.display())))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_set_get_remove_cycle() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let slot = FileSlot::in_dir(&tmp.path().join("nested"));

        assert_eq!(slot.get("accessToken").expect("get"), None);

        slot.set("accessToken", "a1").expect("set access");
        slot.set("refreshToken", "r1").expect("set refresh");
        assert_eq!(slot.get("accessToken").expect("get").as_deref(), Some("a1"));
        assert_eq!(slot.get("refreshToken").expect("get").as_deref(), Some("r1"));

        slot.remove("accessToken").expect("remove");
        assert_eq!(slot.get("accessToken").expect("get"), None);
        assert!(slot.path().exists(), "refresh token still stored");

        slot.remove("refreshToken").expect("remove");
        assert!(!slot.path().exists(), "empty file is deleted");
        slot.remove("refreshToken").expect("removing again is a no-op");
    }

    #[cfg(unix)]
    #[test]
    fn file_is_private() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let slot = FileSlot::in_dir(tmp.path());
        slot.set("accessToken", "a1").expect("set");

        let mode = fs::metadata(slot.path())
            .expect("metadata")
            .permissions()
            .mode()
            & 0o777;
        assert_eq!(mode, 0o600, "credentials file should be 0600");
    }

    #[test]
    fn corrupt_file_is_reported() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let slot = FileSlot::in_dir(tmp.path());
        fs::write(slot.path(), "{not json").expect("write");
        assert!(matches!(slot.get("accessToken"), Err(AuthError::TokenStore(_))));
    }

    #[test]
    fn whitespace_only_file_is_empty() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let slot = FileSlot::in_dir(tmp.path());
        fs::write(slot.path(), "   \n  ").expect("write");
        assert_eq!(slot.get("accessToken").expect("get"), None);
    }

    #[test]
    fn existing_file_is_shared_and_blank_values_read_as_absent() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        fs::write(
            tmp.path().join(CREDENTIALS_FILE_NAME),
            r#"{"accessToken": "  ", "refreshToken": "r1"}"#,
        )
        .expect("write");

        let slot = FileSlot::in_dir(tmp.path());
        assert_eq!(slot.get("accessToken").expect("get"), None);
        assert_eq!(slot.get("refreshToken").expect("get").as_deref(), Some("r1"));

        slot.set("accessToken", "a2").expect("set");
        let reopened = FileSlot::in_dir(tmp.path());
        assert_eq!(reopened.get("accessToken").expect("get").as_deref(), Some("a2"));
        assert_eq!(reopened.get("refreshToken").expect("get").as_deref(), Some("r1"));
    }
}
