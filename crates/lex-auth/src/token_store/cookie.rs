use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use super::file::{read_map, write_map};
use crate::error::AuthError;

pub const COOKIES_FILE_NAME: &str = "cookies.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct CookieRecord {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CookieRecord {
    fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now && !self.value.is_empty()
    }
}

/// Cookie location: values with an expiry, optionally persisted to disk.
///
/// Expired cookies read as absent and are pruned on the next write.
#[derive(Debug)]
pub struct CookieJar {
    path: Option<PathBuf>,
    memory: Mutex<BTreeMap<String, CookieRecord>>,
}

impl CookieJar {
    /// Jar that lives only in process memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            memory: Mutex::new(BTreeMap::new()),
        }
    }

    /// Jar persisted to `cookies.json` inside `dir`.
    #[must_use]
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            path: Some(dir.join(COOKIES_FILE_NAME)),
            memory: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn get(&self, name: &str) -> Result<Option<String>, AuthError> {
        let now = Utc::now();
        Ok(self
            .load()?
            .get(name)
            .filter(|record| record.is_live(now))
            .map(|record| record.value.clone()))
    }

    /// Set a cookie living for `max_age` from now.
    pub fn set(&self, name: &str, value: &str, max_age: TimeDelta) -> Result<(), AuthError> {
        self.set_with_expiry(name, value, Utc::now() + max_age)
    }

    pub fn set_with_expiry(
        &self,
        name: &str,
        value: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let mut guard = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load_locked(&guard)?;
        let now = Utc::now();
        records.retain(|_, record| record.is_live(now));
        records.insert(
            name.to_string(),
            CookieRecord {
                value: value.to_string(),
                expires_at,
            },
        );
        self.store_locked(&mut guard, records)
    }

    /// Expire a cookie immediately. Missing cookies are not an error.
    pub fn remove(&self, name: &str) -> Result<(), AuthError> {
        let mut guard = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.load_locked(&guard)?;
        if records.remove(name).is_none() {
            return Ok(());
        }
        self.store_locked(&mut guard, records)
    }

    /// Expiry of a live cookie, for status display.
    pub fn expires_at(&self, name: &str) -> Result<Option<DateTime<Utc>>, AuthError> {
        let now = Utc::now();
        Ok(self
            .load()?
            .get(name)
            .filter(|record| record.is_live(now))
            .map(|record| record.expires_at))
    }

    fn load(&self) -> Result<BTreeMap<String, CookieRecord>, AuthError> {
        let guard = self.memory.lock().unwrap_or_else(PoisonError::into_inner);
        self.load_locked(&guard)
    }

    fn load_locked(
        &self,
        memory: &BTreeMap<String, CookieRecord>,
    ) -> Result<BTreeMap<String, CookieRecord>, AuthError> {
        match &self.path {
            Some(path) => read_map(path),
            None => Ok(memory.clone()),
        }
    }

    fn store_locked(
        &self,
        memory: &mut BTreeMap<String, CookieRecord>,
        records: BTreeMap<String, CookieRecord>,
    ) -> Result<(), AuthError> {
        match &self.path {
            Some(path) if records.is_empty() => match std::fs::remove_file(path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(AuthError::TokenStore(format!(
                    "failed to delete {}: {e}",
                    path.display()
                ))),
            },
            Some(path) => write_map(path, &records),
            None => {
                *memory = records;
                Ok(())
            }
        }
    }
}
