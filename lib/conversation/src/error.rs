//! Error types for the conversation crate.

use gemini_relay_ai::ProviderError;
use std::fmt;

/// Errors from the conversation engine.
///
/// Provider failures are classified here from the structured
/// [`ProviderError`] taxonomy; each class maps to a fixed user-facing
/// fallback via [`EngineError::user_reply`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// The user sent no usable text; no provider call was made.
    EmptyInput,
    /// The provider rejected our credentials. Retrying cannot succeed.
    ProviderAuth { reason: String },
    /// The provider is throttling us.
    ProviderRateLimit,
    /// Any other provider failure.
    ProviderUnknown { reason: String },
}

impl EngineError {
    /// Returns the fixed user-facing reply for this failure class.
    #[must_use]
    pub fn user_reply(&self) -> &'static str {
        match self {
            Self::EmptyInput => "Please send me some text to respond to.",
            Self::ProviderAuth { .. } => {
                "The AI service is misconfigured. Please contact the bot operator."
            }
            Self::ProviderRateLimit => "Rate limit reached. Please try again in a moment.",
            Self::ProviderUnknown { .. } => {
                "I'm having trouble processing your request. Please try again."
            }
        }
    }
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "empty input"),
            Self::ProviderAuth { reason } => {
                write!(f, "provider authentication failed: {reason}")
            }
            Self::ProviderRateLimit => write!(f, "provider rate limited"),
            Self::ProviderUnknown { reason } => {
                write!(f, "provider failure: {reason}")
            }
        }
    }
}

impl std::error::Error for EngineError {}

impl From<ProviderError> for EngineError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::AuthFailed { reason } => Self::ProviderAuth { reason },
            ProviderError::RateLimited { .. } => Self::ProviderRateLimit,
            ProviderError::RequestFailed { reason }
            | ProviderError::ResponseInvalid { reason } => Self::ProviderUnknown { reason },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_classify_into_taxonomy() {
        let auth = EngineError::from(ProviderError::AuthFailed {
            reason: "bad key".to_string(),
        });
        assert!(matches!(auth, EngineError::ProviderAuth { .. }));

        let throttled = EngineError::from(ProviderError::RateLimited {
            retry_after_secs: None,
        });
        assert_eq!(throttled, EngineError::ProviderRateLimit);

        let network = EngineError::from(ProviderError::RequestFailed {
            reason: "connection reset".to_string(),
        });
        assert!(matches!(network, EngineError::ProviderUnknown { .. }));
    }

    #[test]
    fn each_class_has_a_fixed_user_reply() {
        assert_ne!(
            EngineError::ProviderRateLimit.user_reply(),
            EngineError::EmptyInput.user_reply()
        );
        assert!(
            EngineError::ProviderAuth {
                reason: String::new()
            }
            .user_reply()
            .contains("misconfigured")
        );
    }

    #[test]
    fn display_includes_reason() {
        let err = EngineError::ProviderUnknown {
            reason: "boom".to_string(),
        };
        assert!(err.to_string().contains("boom"));
    }
}
