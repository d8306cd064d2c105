//! Dispatcher: routes normalized updates and delivers replies.

use crate::api::{ChatTransport, MAX_MESSAGE_LEN};
use crate::update::InboundUpdate;
use gemini_relay_conversation::{ContextStore, ConversationEngine};
use gemini_relay_core::{ChatId, DispatchId};
use std::sync::Arc;

/// Reply to `/start`.
pub const WELCOME_REPLY: &str = "Welcome! Send me any message and I'll reply.";
/// Reply to `/clear`.
pub const CLEAR_ACK_REPLY: &str = "Conversation history cleared.";
/// Reply to a command this bot does not know.
pub const UNKNOWN_COMMAND_REPLY: &str = "Unknown command. Try /start or /clear.";
/// Reply to a message with no usable text.
pub const EMPTY_TEXT_REPLY: &str = "Please send a text message.";

/// Routes one normalized inbound update to the conversation engine or
/// an administrative action, and delivers the outbound reply.
///
/// All transport failures are absorbed here: one failed delivery is
/// logged and never propagates into other in-flight dispatches.
pub struct Dispatcher {
    engine: ConversationEngine,
    store: Arc<ContextStore>,
    transport: Arc<dyn ChatTransport>,
    max_message_len: usize,
}

impl Dispatcher {
    /// Creates a dispatcher delivering through `transport`.
    #[must_use]
    pub fn new(
        engine: ConversationEngine,
        store: Arc<ContextStore>,
        transport: Arc<dyn ChatTransport>,
    ) -> Self {
        Self {
            engine,
            store,
            transport,
            max_message_len: MAX_MESSAGE_LEN,
        }
    }

    /// Overrides the single-message size limit.
    #[must_use]
    pub fn with_max_message_len(mut self, max_message_len: usize) -> Self {
        self.max_message_len = max_message_len;
        self
    }

    /// Handles one inbound update end to end. Never fails: every
    /// outcome, including engine errors, becomes a reply or a log line.
    pub async fn handle(&self, update: InboundUpdate) {
        let dispatch_id = DispatchId::new();
        tracing::debug!(
            dispatch_id = %dispatch_id,
            user_id = %update.user_id,
            chat_id = %update.chat_id,
            command = update.command.as_deref().unwrap_or(""),
            "handling inbound update"
        );

        let reply = self.route(&update).await;
        self.deliver(dispatch_id, update.chat_id, &reply).await;
    }

    async fn route(&self, update: &InboundUpdate) -> String {
        if let Some(command) = &update.command {
            return match command.as_str() {
                "start" => WELCOME_REPLY.to_string(),
                "clear" => {
                    self.store.clear(&update.user_id);
                    tracing::info!(user_id = %update.user_id, "conversation history cleared");
                    CLEAR_ACK_REPLY.to_string()
                }
                other => {
                    tracing::debug!(command = other, "unrecognized command");
                    UNKNOWN_COMMAND_REPLY.to_string()
                }
            };
        }

        if update.text.trim().is_empty() {
            return EMPTY_TEXT_REPLY.to_string();
        }

        // Best-effort; a failed indicator never blocks the reply.
        if let Err(e) = self.transport.send_typing(update.chat_id).await {
            tracing::debug!(chat_id = %update.chat_id, error = %e, "typing indicator failed");
        }

        match self.engine.respond(&update.user_id, &update.text).await {
            Ok(reply) => reply,
            Err(err) => err.user_reply().to_string(),
        }
    }

    async fn deliver(&self, dispatch_id: DispatchId, chat_id: ChatId, reply: &str) {
        for chunk in chunk_text(reply, self.max_message_len) {
            if let Err(e) = self.transport.send_message(chat_id, chunk).await {
                tracing::error!(
                    dispatch_id = %dispatch_id,
                    chat_id = %chat_id,
                    error = %e,
                    "failed to deliver reply"
                );
                // Stop rather than deliver the remainder with a gap.
                return;
            }
        }
    }
}

/// Splits `text` into chunks of at most `max_chars` characters,
/// preserving character order. Concatenating the chunks reproduces the
/// input exactly. Splits on character boundaries, so multi-byte text is
/// never cut mid-character.
fn chunk_text(text: &str, max_chars: usize) -> Vec<&str> {
    if text.is_empty() {
        return vec![""];
    }

    let mut chunks = Vec::new();
    let mut rest = text;
    while !rest.is_empty() {
        let split_at = rest
            .char_indices()
            .nth(max_chars)
            .map_or(rest.len(), |(idx, _)| idx);
        let (chunk, tail) = rest.split_at(split_at);
        chunks.push(chunk);
        rest = tail;
    }
    chunks
}
