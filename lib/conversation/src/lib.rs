//! Conversation state and reply generation for the gemini-relay bot.
//!
//! This crate provides:
//!
//! - **Context Store**: Bounded per-user conversation buffers
//! - **Conversation Engine**: Turns one inbound message into one reply
//!   plus an updated buffer, via the AI responder seam
//!
//! All conversation state is in-memory and lost on restart; that is a
//! design property of the system, not an omission.

pub mod context;
pub mod engine;
pub mod error;
pub mod turn;

pub use context::{ContextStore, ConversationBuffer, MAX_TURNS};
pub use engine::ConversationEngine;
pub use error::EngineError;
pub use turn::{ConversationTurn, TurnRole};
