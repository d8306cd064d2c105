//! Conversation engine: one inbound message in, one reply out.

use crate::context::ContextStore;
use crate::error::EngineError;
use crate::turn::TurnRole;
use gemini_relay_ai::{AiResponder, ChatMessage};
use gemini_relay_core::UserId;
use std::sync::Arc;

/// Wraps the context store with the AI responder.
///
/// Calls for different users, and even rapid calls for the same user,
/// run independently; the responder call is the only suspension point.
/// When two calls for one user race, their exchanges are appended in
/// responder-completion order, not arrival order.
pub struct ConversationEngine {
    store: Arc<ContextStore>,
    responder: Arc<dyn AiResponder>,
}

impl ConversationEngine {
    /// Creates an engine over a store and a responder.
    #[must_use]
    pub fn new(store: Arc<ContextStore>, responder: Arc<dyn AiResponder>) -> Self {
        Self { store, responder }
    }

    /// Generates a reply to `user_text` for `user_id` and records the
    /// exchange.
    ///
    /// On responder failure the buffer is left untouched; no partial
    /// turn is ever recorded, so the user/model pairing always holds.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::EmptyInput`] for whitespace-only input
    /// (no responder call is made), or the classified provider failure.
    pub async fn respond(&self, user_id: &UserId, user_text: &str) -> Result<String, EngineError> {
        let prompt = user_text.trim();
        if prompt.is_empty() {
            return Err(EngineError::EmptyInput);
        }

        let context: Vec<ChatMessage> = self
            .store
            .get(user_id)
            .turns()
            .iter()
            .map(|turn| match turn.role {
                TurnRole::User => ChatMessage::user(&turn.text),
                TurnRole::Model => ChatMessage::model(&turn.text),
            })
            .collect();

        tracing::debug!(
            user_id = %user_id,
            context_turns = context.len(),
            model = self.responder.model(),
            "requesting model reply"
        );

        match self.responder.generate(&context, prompt).await {
            Ok(reply) => {
                self.store.append(user_id, prompt, &reply);
                Ok(reply)
            }
            Err(err) => {
                let classified = EngineError::from(err);
                match &classified {
                    EngineError::ProviderRateLimit => {
                        tracing::warn!(user_id = %user_id, "provider rate limited");
                    }
                    other => {
                        tracing::error!(user_id = %user_id, error = %other, "provider call failed");
                    }
                }
                Err(classified)
            }
        }
    }
}
