//! Error types for the transport crate.

use std::fmt;

/// Errors from Telegram API operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The HTTP request could not be completed.
    RequestFailed { reason: String },
    /// The Bot API answered with `ok: false`.
    ApiRejected { description: String },
    /// The response payload could not be decoded.
    PayloadInvalid { reason: String },
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RequestFailed { reason } => {
                write!(f, "transport request failed: {reason}")
            }
            Self::ApiRejected { description } => {
                write!(f, "transport API rejected request: {description}")
            }
            Self::PayloadInvalid { reason } => {
                write!(f, "invalid transport payload: {reason}")
            }
        }
    }
}

impl std::error::Error for TransportError {}

/// Errors from the delivery-mode controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerError {
    /// `start` was called while not in the idle state. This is a
    /// configuration error surfaced at startup, not a runtime fault.
    NotIdle { state: String },
    /// Webhook registration failed at startup. Fatal: the process must
    /// not silently fall back to polling.
    RegistrationFailed { reason: String },
    /// A pushed update arrived while the webhook path is not active.
    NotAcceptingPushes { state: String },
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotIdle { state } => {
                write!(f, "controller already started (state: {state})")
            }
            Self::RegistrationFailed { reason } => {
                write!(f, "webhook registration failed: {reason}")
            }
            Self::NotAcceptingPushes { state } => {
                write!(f, "pushed update rejected in state: {state}")
            }
        }
    }
}

impl std::error::Error for ControllerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transport_error_display() {
        let err = TransportError::ApiRejected {
            description: "Unauthorized".to_string(),
        };
        assert!(err.to_string().contains("Unauthorized"));
    }

    #[test]
    fn controller_error_display() {
        let err = ControllerError::NotIdle {
            state: "polling".to_string(),
        };
        assert!(err.to_string().contains("polling"));
    }
}
