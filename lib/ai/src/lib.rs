//! Generative AI primitives for the gemini-relay bot.
//!
//! This crate provides:
//!
//! - **Responder**: The [`AiResponder`] seam the conversation engine
//!   calls to turn (context, prompt) into generated text
//! - **Gemini backend**: A [`GeminiBackend`] implementation against the
//!   Gemini `generateContent` REST API
//!
//! Provider failures are classified into the structured
//! [`ProviderError`] taxonomy at this boundary; callers never see raw
//! HTTP errors.

pub mod error;
pub mod gemini;
pub mod responder;

pub use error::ProviderError;
pub use gemini::{GeminiBackend, GeminiConfig};
pub use responder::{AiResponder, ChatMessage, ChatRole};
