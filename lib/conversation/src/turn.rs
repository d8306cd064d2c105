//! Turn types for conversation buffers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    /// User/human turn.
    User,
    /// Model-generated turn.
    Model,
}

/// One exchange unit in a conversation. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who authored this turn.
    pub role: TurnRole,
    /// The turn text.
    pub text: String,
    /// When the turn was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Creates a new turn.
    #[must_use]
    pub fn new(role: TurnRole, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates a user turn.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(TurnRole::User, text)
    }

    /// Creates a model turn.
    #[must_use]
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(TurnRole::Model, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_creation() {
        let turn = ConversationTurn::user("Hello!");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.text, "Hello!");
    }

    #[test]
    fn turn_serde_roundtrip() {
        let turn = ConversationTurn::model("hi there");
        let json = serde_json::to_string(&turn).expect("serialize");
        let parsed: ConversationTurn = serde_json::from_str(&json).expect("deserialize");

        assert_eq!(turn, parsed);
    }
}
