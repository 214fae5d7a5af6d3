//! Credential Store: access/refresh tokens across three physical locations.
//!
//! Read priority is fixed: ephemeral slot, then durable slot, then cookie jar;
//! the first non-empty value wins. Writes target one tier (durable slot plus a
//! long-lived cookie, or ephemeral slot plus a short-lived cookie). A location
//! that fails to answer degrades to "not found" and is logged, never raised.

mod cookie;
mod file;
mod keychain;
mod slot;

use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use lex_config::{DurableBackend, StorageConfig};
use lex_core::{Credential, Durability, TokenKind, TokenPair};
use serde::Serialize;

pub use cookie::{COOKIES_FILE_NAME, CookieJar};
pub use file::{CREDENTIALS_FILE_NAME, FileSlot};
pub use keychain::KeyringSlot;
pub use slot::{MemorySlot, SecretSlot};

use crate::error::AuthError;

/// The three physical locations, in read-priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreLocation {
    Ephemeral,
    Durable,
    Cookie,
}

impl StoreLocation {
    pub const READ_ORDER: [Self; 3] = [Self::Ephemeral, Self::Durable, Self::Cookie];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ephemeral => "ephemeral",
            Self::Durable => "durable",
            Self::Cookie => "cookie",
        }
    }
}

impl std::fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cookie lifetimes per tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CookiePolicy {
    pub durable_access: TimeDelta,
    pub durable_refresh: TimeDelta,
    pub session: TimeDelta,
}

impl Default for CookiePolicy {
    fn default() -> Self {
        Self {
            durable_access: TimeDelta::days(7),
            durable_refresh: TimeDelta::days(30),
            session: TimeDelta::days(1),
        }
    }
}

impl CookiePolicy {
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            durable_access: TimeDelta::days(i64::from(config.durable_access_cookie_days)),
            durable_refresh: TimeDelta::days(i64::from(config.durable_refresh_cookie_days)),
            session: TimeDelta::days(i64::from(config.session_cookie_days)),
        }
    }

    #[must_use]
    pub const fn lifetime(&self, kind: TokenKind, durability: Durability) -> TimeDelta {
        match (durability, kind) {
            (Durability::Durable, TokenKind::Access) => self.durable_access,
            (Durability::Durable, TokenKind::Refresh) => self.durable_refresh,
            (Durability::Ephemeral, _) => self.session,
        }
    }
}

pub struct CredentialStore {
    ephemeral: Arc<dyn SecretSlot>,
    durable: Arc<dyn SecretSlot>,
    cookies: CookieJar,
    cookie_policy: CookiePolicy,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("ephemeral", &self.ephemeral.name())
            .field("durable", &self.durable.name())
            .field("cookie_policy", &self.cookie_policy)
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    #[must_use]
    pub fn new(
        ephemeral: Arc<dyn SecretSlot>,
        durable: Arc<dyn SecretSlot>,
        cookies: CookieJar,
    ) -> Self {
        Self {
            ephemeral,
            durable,
            cookies,
            cookie_policy: CookiePolicy::default(),
        }
    }

    /// All three locations in process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemorySlot::new()),
            Arc::new(MemorySlot::new()),
            CookieJar::in_memory(),
        )
    }

    #[must_use]
    pub const fn with_cookie_policy(mut self, policy: CookiePolicy) -> Self {
        self.cookie_policy = policy;
        self
    }

    /// Build the store described by `[storage]`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::TokenStore` if no storage directory can be resolved.
    pub fn from_config(config: &StorageConfig) -> Result<Self, AuthError> {
        let dir = config.resolved_dir().ok_or_else(|| {
            AuthError::TokenStore(
                "no data directory found; set LEXA_STORAGE__DIR to store credentials".into(),
            )
        })?;

        let durable: Arc<dyn SecretSlot> = match config.durable_backend {
            DurableBackend::File => Arc::new(FileSlot::in_dir(&dir)),
            DurableBackend::Keyring => Arc::new(KeyringSlot::new(config.keyring_service.clone())),
        };

        tracing::debug!(
            dir = %dir.display(),
            durable = durable.name(),
            "credential store configured"
        );

        Ok(Self::new(
            Arc::new(MemorySlot::new()),
            durable,
            CookieJar::in_dir(&dir),
        )
        .with_cookie_policy(CookiePolicy::from_config(config)))
    }

    /// Read a token: ephemeral, then durable, then cookie. First non-empty wins.
    #[must_use]
    pub fn read(&self, kind: TokenKind) -> Option<String> {
        self.read_located(kind).map(|(_, value)| value)
    }

    /// Which location [`CredentialStore::read`] would answer from.
    #[must_use]
    pub fn locate(&self, kind: TokenKind) -> Option<StoreLocation> {
        self.read_located(kind).map(|(location, _)| location)
    }

    /// Persist `value` in the given tier, replacing any copy in the other tier.
    ///
    /// # Errors
    ///
    /// Returns the last location error only if neither the tier's slot nor
    /// the cookie jar accepted the value.
    pub fn write(
        &self,
        kind: TokenKind,
        value: &str,
        durability: Durability,
    ) -> Result<(), AuthError> {
        let key = kind.storage_key();
        let (target, other) = match durability {
            Durability::Durable => (&self.durable, &self.ephemeral),
            Durability::Ephemeral => (&self.ephemeral, &self.durable),
        };

        let mut last_error = None;
        let mut written = 0usize;

        match target.set(key, value) {
            Ok(()) => written += 1,
            Err(error) => {
                tracing::warn!(%error, slot = target.name(), key, "credential write failed");
                last_error = Some(error);
            }
        }

        let max_age = self.cookie_policy.lifetime(kind, durability);
        match self.cookies.set(key, value, max_age) {
            Ok(()) => written += 1,
            Err(error) => {
                tracing::warn!(%error, key, "cookie write failed");
                last_error = Some(error);
            }
        }

        if let Err(error) = other.remove(key) {
            tracing::warn!(%error, slot = other.name(), key, "failed to drop stale credential");
        }

        match (written, last_error) {
            (0, Some(error)) => Err(error),
            _ => Ok(()),
        }
    }

    /// Remove both tokens from every location. Idempotent; never fails.
    pub fn clear(&self) {
        for kind in TokenKind::ALL {
            let key = kind.storage_key();
            for slot in [&self.ephemeral, &self.durable] {
                if let Err(error) = slot.remove(key) {
                    tracing::warn!(%error, slot = slot.name(), key, "credential removal failed");
                }
            }
            if let Err(error) = self.cookies.remove(key) {
                tracing::warn!(%error, key, "cookie removal failed");
            }
        }
    }

    /// Replace whatever is stored with a fresh login's token pair.
    ///
    /// # Errors
    ///
    /// Propagates [`CredentialStore::write`] failures.
    pub fn store_login(&self, pair: &TokenPair, durability: Durability) -> Result<(), AuthError> {
        self.clear();
        self.write(TokenKind::Access, &pair.access, durability)?;
        self.write(TokenKind::Refresh, &pair.refresh, durability)
    }

    /// Whether the durable slot currently holds `kind`.
    #[must_use]
    pub fn holds_durable(&self, kind: TokenKind) -> bool {
        matches!(self.durable.get(kind.storage_key()), Ok(Some(_)))
    }

    /// Tier a refreshed `kind` should be written to.
    #[must_use]
    pub fn durability_of(&self, kind: TokenKind) -> Durability {
        if self.holds_durable(kind) {
            Durability::Durable
        } else {
            Durability::Ephemeral
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Credential {
        Credential {
            access_token: self.read(TokenKind::Access),
            refresh_token: self.read(TokenKind::Refresh),
        }
    }

    #[must_use]
    pub fn has_any_token(&self) -> bool {
        !self.snapshot().is_empty()
    }

    /// Expiry of the cookie copy of `kind`, if one is live.
    #[must_use]
    pub fn cookie_expiry(&self, kind: TokenKind) -> Option<DateTime<Utc>> {
        self.cookies.expires_at(kind.storage_key()).ok().flatten()
    }

    #[must_use]
    pub fn ephemeral_slot(&self) -> &dyn SecretSlot {
        self.ephemeral.as_ref()
    }

    #[must_use]
    pub fn durable_slot(&self) -> &dyn SecretSlot {
        self.durable.as_ref()
    }

    #[must_use]
    pub const fn cookie_jar(&self) -> &CookieJar {
        &self.cookies
    }

    fn read_located(&self, kind: TokenKind) -> Option<(StoreLocation, String)> {
        let key = kind.storage_key();
        StoreLocation::READ_ORDER.into_iter().find_map(|location| {
            let result = match location {
                StoreLocation::Ephemeral => self.ephemeral.get(key),
                StoreLocation::Durable => self.durable.get(key),
                StoreLocation::Cookie => self.cookies.get(key),
            };
            match result {
                Ok(Some(value)) => Some((location, value)),
                Ok(None) => None,
                Err(error) => {
                    tracing::warn!(%error, %location, key, "credential location unreadable");
                    None
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Slot whose every operation fails, like a locked keychain.
    struct BrokenSlot;

    impl SecretSlot for BrokenSlot {
        fn name(&self) -> &'static str {
            "broken"
        }
        fn get(&self, _key: &str) -> Result<Option<String>, AuthError> {
            Err(AuthError::Keyring("locked".into()))
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), AuthError> {
            Err(AuthError::Keyring("locked".into()))
        }
        fn remove(&self, _key: &str) -> Result<(), AuthError> {
            Err(AuthError::Keyring("locked".into()))
        }
    }

    fn access_key() -> &'static str {
        TokenKind::Access.storage_key()
    }

    #[test]
    fn read_prefers_ephemeral_then_durable_then_cookie() {
        let store = CredentialStore::in_memory();
        store
            .cookie_jar()
            .set(access_key(), "from-cookie", TimeDelta::days(1))
            .expect("cookie");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("from-cookie"));
        assert_eq!(store.locate(TokenKind::Access), Some(StoreLocation::Cookie));

        store.durable_slot().set(access_key(), "from-durable").expect("durable");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("from-durable"));

        store.ephemeral_slot().set(access_key(), "from-ephemeral").expect("ephemeral");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("from-ephemeral"));
        assert_eq!(store.locate(TokenKind::Access), Some(StoreLocation::Ephemeral));
    }

    #[test]
    fn durable_write_survives_loss_of_ephemeral_and_cookie() {
        let store = CredentialStore::in_memory();
        store
            .write(TokenKind::Access, "tok-d", Durability::Durable)
            .expect("write");

        store.ephemeral_slot().remove(access_key()).expect("clear ephemeral");
        store.cookie_jar().remove(access_key()).expect("clear cookie");

        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("tok-d"));
        assert_eq!(store.locate(TokenKind::Access), Some(StoreLocation::Durable));
    }

    #[test]
    fn ephemeral_write_lives_only_in_ephemeral_and_cookie() {
        let store = CredentialStore::in_memory();
        store
            .write(TokenKind::Access, "tok-e", Durability::Ephemeral)
            .expect("write");
        assert!(!store.holds_durable(TokenKind::Access));

        store.durable_slot().remove(access_key()).expect("clear durable");
        store.cookie_jar().remove(access_key()).expect("clear cookie");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("tok-e"));

        store.ephemeral_slot().remove(access_key()).expect("clear ephemeral");
        assert_eq!(store.read(TokenKind::Access), None);
    }

    #[test]
    fn ephemeral_write_with_only_durable_cleared_is_found_in_cookie() {
        let store = CredentialStore::in_memory();
        store
            .write(TokenKind::Refresh, "ref-e", Durability::Ephemeral)
            .expect("write");
        store.ephemeral_slot().remove(TokenKind::Refresh.storage_key()).expect("clear");
        assert_eq!(store.locate(TokenKind::Refresh), Some(StoreLocation::Cookie));
    }

    #[test]
    fn cookie_lifetime_depends_on_tier() {
        let store = CredentialStore::in_memory();
        store
            .write(TokenKind::Refresh, "r", Durability::Durable)
            .expect("write");
        let durable_expiry = store.cookie_expiry(TokenKind::Refresh).expect("cookie set");
        assert!(durable_expiry > Utc::now() + TimeDelta::days(29));

        store
            .write(TokenKind::Refresh, "r2", Durability::Ephemeral)
            .expect("write");
        let session_expiry = store.cookie_expiry(TokenKind::Refresh).expect("cookie set");
        assert!(session_expiry < Utc::now() + TimeDelta::days(2));
    }

    #[test]
    fn write_replaces_copy_in_other_tier() {
        let store = CredentialStore::in_memory();
        store
            .write(TokenKind::Access, "old", Durability::Ephemeral)
            .expect("write");
        store
            .write(TokenKind::Access, "new", Durability::Durable)
            .expect("write");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("new"));
        assert_eq!(store.ephemeral_slot().get(access_key()).expect("get"), None);
    }

    #[test]
    fn clear_twice_equals_clear_once() {
        let store = CredentialStore::in_memory();
        store
            .store_login(
                &TokenPair {
                    access: "a".into(),
                    refresh: "r".into(),
                },
                Durability::Durable,
            )
            .expect("login");

        store.clear();
        let after_once = store.snapshot();
        store.clear();
        let after_twice = store.snapshot();

        assert_eq!(after_once, after_twice);
        assert!(after_twice.is_empty());
        for kind in TokenKind::ALL {
            let key = kind.storage_key();
            assert_eq!(store.ephemeral_slot().get(key).expect("get"), None);
            assert_eq!(store.durable_slot().get(key).expect("get"), None);
            assert_eq!(store.cookie_jar().get(key).expect("get"), None);
        }
    }

    #[test]
    fn store_login_discards_previous_tier() {
        let store = CredentialStore::in_memory();
        let pair = |a: &str, r: &str| TokenPair {
            access: a.into(),
            refresh: r.into(),
        };
        store
            .store_login(&pair("a1", "r1"), Durability::Durable)
            .expect("first login");
        store
            .store_login(&pair("a2", "r2"), Durability::Ephemeral)
            .expect("second login");

        assert!(!store.holds_durable(TokenKind::Access));
        assert!(!store.holds_durable(TokenKind::Refresh));
        assert_eq!(
            store.snapshot(),
            Credential {
                access_token: Some("a2".into()),
                refresh_token: Some("r2".into()),
            }
        );
    }

    #[test]
    fn unreadable_location_degrades_to_not_found() {
        let store = CredentialStore::new(
            Arc::new(BrokenSlot),
            Arc::new(MemorySlot::new()),
            CookieJar::in_memory(),
        );
        assert_eq!(store.read(TokenKind::Access), None);

        store
            .durable_slot()
            .set(access_key(), "still-here")
            .expect("durable");
        assert_eq!(store.read(TokenKind::Access).as_deref(), Some("still-here"));
        store.clear();
    }

    #[test]
    fn write_fails_only_when_nothing_accepted_it() {
        let store = CredentialStore::new(
            Arc::new(MemorySlot::new()),
            Arc::new(BrokenSlot),
            CookieJar::in_memory(),
        );
        store
            .write(TokenKind::Access, "a", Durability::Durable)
            .expect("cookie still accepted the value");
        assert_eq!(store.locate(TokenKind::Access), Some(StoreLocation::Cookie));
    }

    #[test]
    fn durability_of_follows_durable_slot() {
        let store = CredentialStore::in_memory();
        assert_eq!(store.durability_of(TokenKind::Access), Durability::Ephemeral);
        store
            .write(TokenKind::Access, "a", Durability::Durable)
            .expect("write");
        assert_eq!(store.durability_of(TokenKind::Access), Durability::Durable);
    }

    #[test]
    fn from_config_uses_file_backend_in_dir() {
        let tmp = tempfile::TempDir::new().expect("tmp dir");
        let config = StorageConfig {
            dir: tmp.path().to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        let store = CredentialStore::from_config(&config).expect("store");
        store
            .write(TokenKind::Access, "persisted", Durability::Durable)
            .expect("write");

        assert!(tmp.path().join(CREDENTIALS_FILE_NAME).exists());
        assert!(tmp.path().join(COOKIES_FILE_NAME).exists());

        let reopened = CredentialStore::from_config(&config).expect("store");
        assert_eq!(reopened.read(TokenKind::Access).as_deref(), Some("persisted"));
        assert_eq!(reopened.locate(TokenKind::Access), Some(StoreLocation::Durable));
    }
}
