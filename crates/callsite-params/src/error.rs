//! Error types for parameter resolution.

use crate::value::ValueKind;

/// Errors that can occur while resolving a parameter.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    /// The backing request context needed by a source is not available.
    #[error("cannot resolve parameter '{key}': {reason}")]
    Unavailable { key: String, reason: String },

    /// No source produced a value for a required parameter.
    #[error("parameter '{0}' is missing")]
    Missing(String),

    /// A value was present but could not be parsed into the requested type.
    #[error(
        "unable to resolve parameter \"{key}\" as {}; contents of parameter was {content}",
        .expected.description()
    )]
    Parse {
        key: String,
        expected: ValueKind,
        content: String,
    },
}

impl ParamError {
    /// Create an unavailable-context error.
    pub fn unavailable(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing-parameter error.
    pub fn missing(key: impl Into<String>) -> Self {
        Self::Missing(key.into())
    }

    /// Create a parse error.
    pub fn parse(key: impl Into<String>, expected: ValueKind, content: impl Into<String>) -> Self {
        Self::Parse {
            key: key.into(),
            expected,
            content: content.into(),
        }
    }

    /// Returns true if this is a [`ParamError::Missing`].
    pub fn is_missing(&self) -> bool {
        matches!(self, ParamError::Missing(_))
    }

    /// The parameter key this error refers to.
    pub fn key(&self) -> &str {
        match self {
            ParamError::Unavailable { key, .. } => key,
            ParamError::Missing(key) => key,
            ParamError::Parse { key, .. } => key,
        }
    }
}

/// Result type for resolution operations.
pub type ParamResult<T> = std::result::Result<T, ParamError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_names_key_and_content() {
        let err = ParamError::parse("limit", ValueKind::Int, "ten");
        let msg = err.to_string();
        assert!(msg.contains("\"limit\""));
        assert!(msg.contains("an integer"));
        assert!(msg.contains("ten"));
    }

    #[test]
    fn key_is_reported_for_every_variant() {
        assert_eq!(ParamError::missing("a").key(), "a");
        assert_eq!(ParamError::unavailable("b", "gone").key(), "b");
        assert_eq!(ParamError::parse("c", ValueKind::Bool, "x").key(), "c");
    }

    #[test]
    fn only_missing_is_missing() {
        assert!(ParamError::missing("a").is_missing());
        assert!(!ParamError::unavailable("a", "r").is_missing());
    }
}
