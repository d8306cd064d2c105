//! Identifier types for conversation participants and dispatches.
//!
//! `UserId` and `ChatId` wrap identities assigned by the chat transport;
//! they are opaque to this system and never generated locally.
//! `DispatchId` is a locally generated ULID used to correlate log lines
//! for a single inbound update as it moves through the dispatcher.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ulid::Ulid;

/// Opaque identifier for a conversation participant.
///
/// Derived from the transport's user identity scheme; uniqueness is the
/// transport's responsibility and is not re-validated here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Creates a user ID from a transport-assigned identity.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identity as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for UserId {
    fn from(id: i64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Destination for outbound replies.
///
/// In group contexts this differs from the sender's [`UserId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(i64);

impl ChatId {
    /// Creates a chat ID from the transport's numeric chat identifier.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the underlying numeric identifier.
    #[must_use]
    pub const fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Error returned when parsing an ID from a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIdError {
    /// The type of ID that failed to parse.
    pub id_type: &'static str,
    /// The reason for the parse failure.
    pub reason: String,
}

impl fmt::Display for ParseIdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to parse {}: {}", self.id_type, self.reason)
    }
}

impl std::error::Error for ParseIdError {}

/// Macro to generate a strongly-typed ID wrapper around ULID.
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Ulid);

        impl $name {
            /// Creates a new ID with a randomly generated ULID.
            #[must_use]
            pub fn new() -> Self {
                Self(Ulid::new())
            }

            /// Creates an ID from a ULID.
            #[must_use]
            pub const fn from_ulid(ulid: Ulid) -> Self {
                Self(ulid)
            }

            /// Returns the underlying ULID.
            #[must_use]
            pub const fn as_ulid(&self) -> Ulid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}_{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = ParseIdError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let prefix_with_underscore = concat!($prefix, "_");
                let ulid_str = s.strip_prefix(prefix_with_underscore).unwrap_or(s);

                Ulid::from_str(ulid_str)
                    .map(Self)
                    .map_err(|e| ParseIdError {
                        id_type: stringify!($name),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

define_id!(
    /// Correlation identifier for one inbound update's trip through
    /// the dispatcher.
    DispatchId,
    "dsp"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_id_from_numeric_identity() {
        let id = UserId::from(123456789_i64);
        assert_eq!(id.as_str(), "123456789");
    }

    #[test]
    fn user_id_display_is_raw_identity() {
        let id = UserId::new("42");
        assert_eq!(id.to_string(), "42");
    }

    #[test]
    fn chat_id_roundtrip() {
        let id = ChatId::new(-1001234567890);
        assert_eq!(id.as_i64(), -1001234567890);
    }

    #[test]
    fn dispatch_id_display_format() {
        let id = DispatchId::new();
        assert!(id.to_string().starts_with("dsp_"));
    }

    #[test]
    fn dispatch_id_parse_with_prefix() {
        let id = DispatchId::new();
        let parsed: DispatchId = id.to_string().parse().expect("parse");
        assert_eq!(id, parsed);
    }

    #[test]
    fn dispatch_id_parse_rejects_garbage() {
        let result: Result<DispatchId, _> = "not-a-ulid".parse();
        assert!(result.is_err());
    }

    #[test]
    fn user_id_serde_transparent() {
        let id = UserId::new("987");
        let json = serde_json::to_string(&id).expect("serialize");
        assert_eq!(json, "\"987\"");
    }
}
