//! Core domain types for the gemini-relay bot.
//!
//! This crate provides the foundational identifier types shared by the
//! conversation, AI, and transport crates.

pub mod id;

pub use id::{ChatId, DispatchId, UserId};
