//! Error types for OWNERS and OWNERS_ALIASES parsing.
//!
//! The underlying YAML errors only carry their location inside the message
//! text, so line recovery is a separate best-effort step.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

static LINE_NUMBER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"line (\d+)").ok());

/// A configuration file that could not be parsed under any accepted schema.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct ConfigSyntaxError {
    /// The underlying error text.
    pub message: String,
    /// Absolute line in the file, when the error text names one (1-based).
    pub line: Option<usize>,
}

impl ConfigSyntaxError {
    /// Creates an error, recovering the line number from the message if present.
    pub fn new(message: impl Into<String>) -> Self {
        let message = message.into();
        let line = extract_line_number(&message);
        Self { message, line }
    }

    /// Creates an error that is not tied to any line.
    pub fn without_line(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            line: None,
        }
    }

    /// Creates an error from a YAML deserialization failure.
    pub fn from_yaml(error: &serde_yaml::Error) -> Self {
        Self::new(error.to_string())
    }
}

/// Extracts the first decimal number following the word `line` in `message`.
///
/// Returns `None` when the message names no line or the number overflows.
pub fn extract_line_number(message: &str) -> Option<usize> {
    LINE_NUMBER
        .as_ref()?
        .captures(message)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_line_from_yaml_style_message() {
        assert_eq!(
            extract_line_number("did not find expected key at line 4 column 3"),
            Some(4)
        );
    }

    #[test]
    fn first_line_mention_wins() {
        assert_eq!(
            extract_line_number("line 12: mapping values, see line 2"),
            Some(12)
        );
    }

    #[test]
    fn no_line_mention() {
        assert_eq!(extract_line_number("invalid type: sequence"), None);
        assert_eq!(extract_line_number("line: unknown"), None);
    }

    #[test]
    fn overflowing_number_is_ignored() {
        assert_eq!(
            extract_line_number("line 99999999999999999999999999 column 1"),
            None
        );
    }

    #[test]
    fn new_recovers_line() {
        let error = ConfigSyntaxError::new("bad indentation at line 7 column 1");
        assert_eq!(error.line, Some(7));
        assert_eq!(error.to_string(), "bad indentation at line 7 column 1");
    }

    #[test]
    fn without_line_never_recovers() {
        let error = ConfigSyntaxError::without_line("pattern on line 3 is invalid");
        assert_eq!(error.line, None);
    }

    #[test]
    fn from_yaml_error() {
        let yaml_error = serde_yaml::from_str::<Vec<String>>("- a\n- b\n  c: d\n").unwrap_err();
        let error = ConfigSyntaxError::from_yaml(&yaml_error);
        assert!(error.line.is_some());
        assert_eq!(error.message, yaml_error.to_string());
    }
}
