use super::slot::SecretSlot;
use crate::error::AuthError;

/// Durable slot backed by the OS keychain, one entry per key.
///
/// The service name can be overridden with `LEXA_KEYRING_SERVICE` so test
/// runs never touch real credentials.
#[derive(Debug, Clone)]
pub struct KeyringSlot {
    service: String,
}

impl KeyringSlot {
    #[must_use]
    pub fn new(service: impl Into<String>) -> Self {
        let service = std::env::var("LEXA_KEYRING_SERVICE").unwrap_or_else(|_| service.into());
        Self { service }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<keyring::Entry, AuthError> {
        keyring::Entry::new(&self.service, key)
            .map_err(|e| AuthError::Keyring(format!("open {}/{key}: {e}", self.service)))
    }
}

impl SecretSlot for KeyringSlot {
    fn name(&self) -> &'static str {
        "keyring"
    }

    fn get(&self, key: &str) -> Result<Option<String>, AuthError> {
        match self.entry(key)?.get_password() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(AuthError::Keyring(format!("read {key}: {e}"))),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), AuthError> {
        self.entry(key)?
            .set_password(value)
            .map_err(|e| AuthError::Keyring(format!("write {key}: {e}")))
    }

    fn remove(&self, key: &str) -> Result<(), AuthError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(AuthError::Keyring(format!("delete {key}: {e}"))),
        }
    }
}
