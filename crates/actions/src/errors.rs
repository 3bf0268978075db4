//! Error types for action validation and dispatch

use thiserror::Error;

/// Failures reported by the rendering host while injecting events or
/// resolving geometry. They reach the caller unmodified.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// Element reference does not resolve to a live element
    #[error("no such element: {0}")]
    NoSuchElement(String),

    /// Element reference points to a detached element
    #[error("stale element reference: {0}")]
    StaleElement(String),

    /// Event injection was rejected by the host
    #[error("event injection failed: {0}")]
    Injection(String),
}

impl HostError {
    pub fn code(&self) -> &'static str {
        match self {
            HostError::NoSuchElement(_) => "no such element",
            HostError::StaleElement(_) => "stale element reference",
            HostError::Injection(_) => "unknown error",
        }
    }
}

/// Error taxonomy of the actions engine
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// Malformed, missing or inconsistent action chain fields, including
    /// input-source kind or subtype conflicts
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Recognised but unsupported input (pointerCancel, pen and touch pointers)
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// Computed pointer destination lies outside the viewport
    #[error("move target out of bounds: {0}")]
    MoveTargetOutOfBounds(String),

    /// Host capability failure
    #[error(transparent)]
    Host(#[from] HostError),
}

pub type ActionResult<T> = Result<T, ActionError>;

impl ActionError {
    pub fn invalid(message: impl Into<String>) -> Self {
        ActionError::InvalidArgument(message.into())
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        ActionError::UnsupportedOperation(message.into())
    }

    /// WebDriver error code for the wire response
    pub fn code(&self) -> &'static str {
        match self {
            ActionError::InvalidArgument(_) => "invalid argument",
            ActionError::UnsupportedOperation(_) => "unsupported operation",
            ActionError::MoveTargetOutOfBounds(_) => "move target out of bounds",
            ActionError::Host(err) => err.code(),
        }
    }

    /// True for errors raised while validating, before any event is injected
    pub fn is_validation(&self) -> bool {
        matches!(self, ActionError::InvalidArgument(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_webdriver_names() {
        assert_eq!(ActionError::invalid("x").code(), "invalid argument");
        assert_eq!(ActionError::unsupported("x").code(), "unsupported operation");
        assert_eq!(
            ActionError::MoveTargetOutOfBounds("x".into()).code(),
            "move target out of bounds"
        );
        let host: ActionError = HostError::NoSuchElement("e1".into()).into();
        assert_eq!(host.code(), "no such element");
        assert_eq!(host.to_string(), "no such element: e1");
    }

    #[test]
    fn only_invalid_argument_is_a_validation_error() {
        assert!(ActionError::invalid("bad").is_validation());
        assert!(!ActionError::unsupported("pen").is_validation());
    }
}
