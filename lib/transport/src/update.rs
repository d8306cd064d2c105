//! Telegram update payloads and normalization.
//!
//! Raw Bot API payloads are decoded into the `Telegram*` types below
//! and normalized into [`InboundUpdate`], the delivery-mode-independent
//! shape the dispatcher consumes. Only the fields this bot needs are
//! modeled; unknown fields are ignored on decode.

use gemini_relay_core::{ChatId, UserId};
use serde::{Deserialize, Serialize};

/// One update from the Bot API, polled or pushed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUpdate {
    /// Monotonically increasing update identifier.
    pub update_id: i64,
    /// The message, if this update carries one.
    pub message: Option<TelegramMessage>,
}

/// A message within an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramMessage {
    pub message_id: i64,
    /// The sender. Absent for channel posts.
    pub from: Option<TelegramUser>,
    pub chat: TelegramChat,
    /// Absent for non-text messages (photos, stickers, ...).
    pub text: Option<String>,
}

/// The sender of a message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
}

/// The chat a message belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramChat {
    pub id: i64,
}

impl TelegramUpdate {
    /// Normalizes this update into the dispatcher's inbound shape.
    ///
    /// Returns `None` for updates this bot cannot act on: no message,
    /// or a message without an identifiable sender.
    #[must_use]
    pub fn normalize(self) -> Option<InboundUpdate> {
        let message = self.message?;
        let from = message.from?;
        let text = message.text.unwrap_or_default();
        let command = parse_command(&text);

        Some(InboundUpdate {
            user_id: UserId::from(from.id),
            chat_id: ChatId::new(message.chat.id),
            text,
            command,
        })
    }
}

/// Normalized representation of one incoming message, independent of
/// whether it arrived by polling or webhook push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundUpdate {
    /// The sender's identity.
    pub user_id: UserId,
    /// Destination for replies. Differs from `user_id` in groups.
    pub chat_id: ChatId,
    /// The message text, possibly empty.
    pub text: String,
    /// Command name if the text starts with a command marker.
    pub command: Option<String>,
}

impl InboundUpdate {
    /// Returns true if this update is a command.
    #[must_use]
    pub fn is_command(&self) -> bool {
        self.command.is_some()
    }
}

/// Extracts a command name from message text.
///
/// A command is a leading `/` followed by the name, terminated by
/// whitespace or an `@botname` suffix. Names are case-insensitive.
fn parse_command(text: &str) -> Option<String> {
    let rest = text.strip_prefix('/')?;
    let name: String = rest
        .chars()
        .take_while(|c| !c.is_whitespace() && *c != '@')
        .collect();
    if name.is_empty() {
        return None;
    }
    Some(name.to_lowercase())
}
