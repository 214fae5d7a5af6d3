//! Billing configuration.

use serde::{Deserialize, Serialize};

const fn default_charge_chat_messages() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BillingConfig {
    /// Deduct the per-message fee before each chat send.
    #[serde(default = "default_charge_chat_messages")]
    pub charge_chat_messages: bool,
}

impl Default for BillingConfig {
    fn default() -> Self {
        Self {
            charge_chat_messages: default_charge_chat_messages(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn charging_is_on_by_default() {
        assert!(BillingConfig::default().charge_chat_messages);
    }
}
