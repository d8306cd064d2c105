//! AI responder abstraction.
//!
//! Provides a unified interface for generative backends. The backend is
//! stateless per call: all conversation context is passed explicitly on
//! every request, there is no server-side session.

use crate::error::ProviderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// The role of a message sender in the generation context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// User/human message.
    User,
    /// Model-generated message.
    Model,
}

/// A message in the generation context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// The role of the message sender.
    pub role: ChatRole,
    /// The content of the message.
    pub content: String,
}

impl ChatMessage {
    /// Creates a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    /// Creates a model message.
    #[must_use]
    pub fn model(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Model,
            content: content.into(),
        }
    }
}

/// Trait for generative AI backends.
///
/// Implementations map provider-specific failures into the
/// [`ProviderError`] taxonomy; callers must not need to inspect raw
/// provider payloads to classify a failure.
#[async_trait]
pub trait AiResponder: Send + Sync {
    /// Generates a reply to `prompt` given the prior conversation
    /// `context`, oldest message first.
    ///
    /// # Errors
    ///
    /// Returns a classified [`ProviderError`] if generation fails.
    async fn generate(
        &self,
        context: &[ChatMessage],
        prompt: &str,
    ) -> Result<String, ProviderError>;

    /// Returns the model identifier this responder targets.
    fn model(&self) -> &str;
}
