//! Entity structs for the backend records the client handles.
//!
//! Field names follow the backend's JSON so the structs deserialize responses
//! directly. Optional fields are explicit `Option`s; missing keys default.

mod billing;
mod chat;
mod profile;
mod session;

pub use billing::{
    BalanceResponse, Payment, PaymentOutcome, PaymentStatus, Transaction, TransactionKind,
    TransactionStatus,
};
pub use chat::{ChatMessage, ChatReply, Dialog, DialogDetail, MessageRole};
pub use profile::{Profile, ProfileUpdate, UserStats};
pub use session::Session;
