//! Error types for the AI crate.
//!
//! Backend implementations classify provider-specific failures into
//! `ProviderError` at the responder boundary, so downstream code can
//! branch on failure class without matching on message text.

use std::fmt;

/// Errors from AI responder operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The provider rejected our credentials.
    AuthFailed { reason: String },
    /// The provider is throttling us.
    RateLimited { retry_after_secs: Option<u64> },
    /// The request could not be completed (network failure, non-auth
    /// HTTP error, timeout).
    RequestFailed { reason: String },
    /// The provider answered but the response was unusable (malformed
    /// payload, no candidates, empty text).
    ResponseInvalid { reason: String },
}

impl ProviderError {
    /// Returns true if retrying the same request cannot succeed.
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::AuthFailed { .. })
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuthFailed { reason } => {
                write!(f, "provider authentication failed: {reason}")
            }
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::RequestFailed { reason } => {
                write!(f, "provider request failed: {reason}")
            }
            Self::ResponseInvalid { reason } => {
                write!(f, "unusable provider response: {reason}")
            }
        }
    }
}

impl std::error::Error for ProviderError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_error_display() {
        let err = ProviderError::AuthFailed {
            reason: "invalid API key".to_string(),
        };
        assert!(err.to_string().contains("invalid API key"));
        assert!(err.is_permanent());
    }

    #[test]
    fn rate_limited_display_with_hint() {
        let err = ProviderError::RateLimited {
            retry_after_secs: Some(30),
        };
        assert!(err.to_string().contains("30s"));
        assert!(!err.is_permanent());
    }

    #[test]
    fn request_failed_display() {
        let err = ProviderError::RequestFailed {
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("connection refused"));
    }
}
