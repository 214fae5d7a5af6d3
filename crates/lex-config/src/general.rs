//! General application configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default for `lex auth login --remember`: keep tokens in the durable store.
    #[serde(default)]
    pub remember_me: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert!(!config.remember_me);
    }
}
