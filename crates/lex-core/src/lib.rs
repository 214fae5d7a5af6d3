//! # lex-core
//!
//! Core types and error types for the Lexa client.
//!
//! This crate provides the foundational types shared across all Lexa crates:
//! - Credential kinds, storage keys and durability tiers
//! - Entity structs for backend records (profile, chat, billing)
//! - The derived, UI-visible [`entities::Session`]
//! - Cross-cutting error types
//!
//! Nothing in here performs I/O.

pub mod credential;
pub mod entities;
pub mod errors;
mod serde_util;

pub use credential::{Credential, Durability, TokenKind, TokenPair};
pub use errors::CoreError;
