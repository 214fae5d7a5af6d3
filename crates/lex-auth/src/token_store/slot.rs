use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::error::AuthError;

/// One physical key/value location for secrets.
///
/// Implementations report failures; the [`CredentialStore`](super::CredentialStore)
/// decides whether a failure degrades to "not found".
pub trait SecretSlot: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &'static str;

    fn get(&self, key: &str) -> Result<Option<String>, AuthError>;

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError>;

    /// Remove `key`. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), AuthError>;
}

/// Process-memory slot. Backs the ephemeral tier and stands in for the
/// durable tier in tests.
#[derive(Debug, Default)]
pub struct MemorySlot {
    values: Mutex<HashMap<String, String>>,
}

impl MemorySlot {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretSlot for MemorySlot {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        let values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(values.get(key).filter(|v| !v.is_empty()).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        let mut values = self.values.lock().unwrap_or_else(PoisonError::into_inner);
        values.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_get_remove_cycle() {
        let slot = MemorySlot::new();
        assert_eq!(slot.get("accessToken").expect("get"), None);

        slot.set("accessToken", "abc").expect("set");
        assert_eq!(slot.get("accessToken").expect("get").as_deref(), Some("abc"));

        slot.set("accessToken", "def").expect("overwrite");
        assert_eq!(slot.get("accessToken").expect("get").as_deref(), Some("def"));

        slot.remove("accessToken").expect("remove");
        slot.remove("accessToken").expect("second remove is a no-op");
        assert_eq!(slot.get("accessToken").expect("get"), None);
    }

    #[test]
    fn empty_value_reads_as_absent() {
        let slot = MemorySlot::new();
        slot.set("refreshToken", "").expect("set");
        assert_eq!(slot.get("refreshToken").expect("get"), None);
    }
}
