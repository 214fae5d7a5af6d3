use serde::{Deserialize, Serialize};

use super::Profile;

/// UI-visible authentication state.
///
/// Derived from the credential store and the last profile fetch; never
/// persisted. Replaced as a whole on every change so observers never see a
/// partially updated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub is_authenticated: bool,
    pub profile: Option<Profile>,
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// State before the credential store has been probed.
    #[must_use]
    pub const fn initial() -> Self {
        Self {
            is_authenticated: false,
            profile: None,
            loading: true,
            error: None,
        }
    }

    #[must_use]
    pub const fn signed_out() -> Self {
        Self {
            is_authenticated: false,
            profile: None,
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn signed_in(profile: Profile) -> Self {
        Self {
            is_authenticated: true,
            profile: Some(profile),
            loading: false,
            error: None,
        }
    }

    #[must_use]
    pub const fn failed(error: String) -> Self {
        Self {
            is_authenticated: false,
            profile: None,
            loading: false,
            error: Some(error),
        }
    }

    /// Same state with `loading` raised and the previous error cleared.
    #[must_use]
    pub fn into_loading(self) -> Self {
        Self {
            loading: true,
            error: None,
            ..self
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::initial()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_are_consistent() {
        assert!(Session::initial().loading);
        assert!(!Session::signed_out().loading);
        let signed_in = Session::signed_in(Profile::default());
        assert!(signed_in.is_authenticated);
        assert!(signed_in.profile.is_some());
        let failed = Session::failed("boom".into());
        assert!(!failed.is_authenticated);
        assert_eq!(failed.error.as_deref(), Some("boom"));
    }

    #[test]
    fn into_loading_keeps_profile_and_clears_error() {
        let mut session = Session::signed_in(Profile::default());
        session.error = Some("stale".into());
        let loading = session.into_loading();
        assert!(loading.loading);
        assert!(loading.is_authenticated);
        assert!(loading.profile.is_some());
        assert_eq!(loading.error, None);
    }
}
