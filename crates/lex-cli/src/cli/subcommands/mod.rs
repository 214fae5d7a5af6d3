pub mod auth;
pub mod balance;
pub mod chat;
pub mod profile;

pub use auth::AuthCommands;
pub use balance::{BalanceCommands, ConfirmStatus};
pub use chat::ChatCommands;
pub use profile::ProfileCommands;
