use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// User profile as returned by `GET /api/userprofile`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub user: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub surname: Option<String>,
    #[serde(default)]
    pub patronymic: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub birthday: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub additional_info: Option<String>,
}

impl Profile {
    /// "Surname Name Patronymic", skipping blanks. `None` when nothing is set.
    #[must_use]
    pub fn display_name(&self) -> Option<String> {
        let parts = [&self.surname, &self.name, &self.patronymic]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" "))
        }
    }
}

/// Body of `POST /api/userprofile` for the settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub name: String,
    pub surname: String,
    #[serde(default)]
    pub patronymic: String,
    pub phone: String,
    pub birthday: String,
    #[serde(default)]
    pub additional_info: String,
}

impl ProfileUpdate {
    /// Check required fields and normalize the birthday to `YYYY-MM-DD`.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] naming every missing required field.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        let missing = [
            ("name", &self.name),
            ("surname", &self.surname),
            ("phone", &self.phone),
            ("birthday", &self.birthday),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect::<Vec<_>>();

        if !missing.is_empty() {
            return Err(CoreError::Validation(format!(
                "required profile fields are empty: {}",
                missing.join(", ")
            )));
        }

        if let Some((date, _)) = self.birthday.split_once('T') {
            self.birthday = date.to_string();
        }
        chrono::NaiveDate::parse_from_str(self.birthday.trim(), "%Y-%m-%d").map_err(|_| {
            CoreError::Validation(format!(
                "birthday must be a YYYY-MM-DD date, got '{}'",
                self.birthday
            ))
        })?;
        self.birthday = self.birthday.trim().to_string();

        Ok(self)
    }
}

/// Aggregate counters from `GET /api/userstats/`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStats {
    #[serde(default)]
    pub total_consultations: u64,
    #[serde(default)]
    pub completed_consultations: u64,
    #[serde(default)]
    pub total_spent: f64,
    #[serde(default)]
    pub current_balance: f64,
}
