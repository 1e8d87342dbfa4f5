//! Error taxonomy shared by extractors, handlers and the dispatcher.
//!
//! The `Display` text of every variant is what gets spoken and shown to the
//! user, so handlers phrase their messages when they build the error.

use thiserror::Error;

/// Coarse classification of an [`AssistantError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Ambiguous,
    Service,
    Malformed,
    Unrecognized,
}

#[derive(Debug, Error)]
pub enum AssistantError {
    /// An alias, city, currency code or file is absent.
    #[error("{0}")]
    NotFound(String),

    /// The encyclopedia topic matches several pages.
    #[error("Your query is ambiguous. Did you mean: {suggestion}?")]
    Ambiguous { suggestion: String },

    /// Network or API failure. `detail` is logged, never spoken.
    #[error("{message}")]
    Service { message: String, detail: String },

    /// A trigger matched but its sub-pattern did not.
    #[error("{hint}")]
    Malformed { hint: String },

    /// No intent matched the command.
    #[error("Sorry, I couldn't understand.")]
    Unrecognized,
}

impl AssistantError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Ambiguous { .. } => ErrorKind::Ambiguous,
            Self::Service { .. } => ErrorKind::Service,
            Self::Malformed { .. } => ErrorKind::Malformed,
            Self::Unrecognized => ErrorKind::Unrecognized,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn malformed(hint: impl Into<String>) -> Self {
        Self::Malformed { hint: hint.into() }
    }

    /// Wrap a collaborator failure with the sentence the user should hear.
    pub fn service(message: impl Into<String>, err: impl std::fmt::Display) -> Self {
        Self::Service {
            message: message.into(),
            detail: err.to_string(),
        }
    }
}

pub type AssistantResult<T> = Result<T, AssistantError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_spoken_text() {
        let err = AssistantError::Ambiguous {
            suggestion: "Mercury (planet)".into(),
        };
        assert_eq!(
            err.to_string(),
            "Your query is ambiguous. Did you mean: Mercury (planet)?"
        );
        assert_eq!(err.kind(), ErrorKind::Ambiguous);
    }

    #[test]
    fn test_service_hides_detail() {
        let err = AssistantError::service("Translation failed.", "connection refused");
        assert_eq!(err.to_string(), "Translation failed.");
        match err {
            AssistantError::Service { detail, .. } => assert_eq!(detail, "connection refused"),
            other => panic!("unexpected variant: {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_message() {
        assert_eq!(
            AssistantError::Unrecognized.to_string(),
            "Sorry, I couldn't understand."
        );
    }
}
