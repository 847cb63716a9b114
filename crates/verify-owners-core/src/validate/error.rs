//! Error types for OWNERS validation.
//!
//! [`ValidationError`] describes a violation found in one file and doubles as
//! the text of the inline review comment. [`VerifyError`] is a failure that
//! aborts the whole run.

use super::github_client::GithubClientError;
use super::membership::RosterError;
use serde::Serialize;
use thiserror::Error;

/// A violation found in an OWNERS or OWNERS_ALIASES file.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ValidationError {
    /// The file could not be parsed under any accepted schema.
    #[error("Cannot parse file: {message}.")]
    Unparseable {
        /// The underlying syntax error.
        message: String,
        /// Absolute line named by the syntax error, if any (1-based).
        line: Option<usize>,
    },

    /// The file declares labels that are not allowed.
    #[error("File contains blacklisted labels: {}.", labels.join(", "))]
    BlacklistedLabels {
        /// The offending labels, sorted.
        labels: Vec<String>,
    },

    /// The repository root OWNERS file lists no approvers.
    #[error("No approvers defined in this root directory {file_name} file.")]
    NoRootApprovers {
        /// The OWNERS file name.
        file_name: String,
    },
}

impl ValidationError {
    /// Creates an unparseable file error.
    pub fn unparseable(message: impl Into<String>, line: Option<usize>) -> Self {
        Self::Unparseable {
            message: message.into(),
            line,
        }
    }

    /// Creates a blacklisted labels error.
    pub fn blacklisted_labels<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        labels.sort();
        labels.dedup();
        Self::BlacklistedLabels { labels }
    }

    /// Creates a missing root approvers error.
    pub fn no_root_approvers(file_name: impl Into<String>) -> Self {
        Self::NoRootApprovers {
            file_name: file_name.into(),
        }
    }

    /// Returns the absolute line the error points at, if known.
    pub fn line(&self) -> Option<usize> {
        match self {
            ValidationError::Unparseable { line, .. } => *line,
            _ => None,
        }
    }
}

/// A violation anchored to a position in a file's diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocatedError {
    /// The file the violation was found in.
    pub path: String,
    /// Position inside the file's diff (1-based).
    pub position: usize,
    /// The violation.
    pub error: ValidationError,
}

impl LocatedError {
    /// Creates a located error.
    pub fn new(path: impl Into<String>, position: usize, error: ValidationError) -> Self {
        Self {
            path: path.into(),
            position,
            error,
        }
    }
}

/// A failure that aborts a validation run.
#[derive(Debug, Error)]
pub enum VerifyError {
    /// The list of changed files could not be fetched.
    #[error("error getting PR changes: {0}")]
    ChangeListUnavailable(#[source] GithubClientError),

    /// A changed file could not be read.
    #[error("failed to read {path}: {source}")]
    FileReadUnavailable {
        /// The file path.
        path: String,
        /// The client error.
        #[source]
        source: GithubClientError,
    },

    /// The membership roster could not be fetched or parsed.
    #[error("failed to get members: {0}")]
    RosterUnavailable(#[from] RosterError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unparseable_message() {
        let err = ValidationError::unparseable("did not find expected key at line 4 column 1", Some(4));
        assert_eq!(
            err.to_string(),
            "Cannot parse file: did not find expected key at line 4 column 1."
        );
        assert_eq!(err.line(), Some(4));
    }

    #[test]
    fn blacklisted_labels_are_sorted() {
        let err = ValidationError::blacklisted_labels(["priority/critical-urgent", "kind/flake"]);
        assert_eq!(
            err.to_string(),
            "File contains blacklisted labels: kind/flake, priority/critical-urgent."
        );
        assert_eq!(err.line(), None);
    }

    #[test]
    fn no_root_approvers_message() {
        let err = ValidationError::no_root_approvers("OWNERS");
        assert_eq!(
            err.to_string(),
            "No approvers defined in this root directory OWNERS file."
        );
    }

    #[test]
    fn serializes_with_type_tag() {
        let err = ValidationError::no_root_approvers("OWNERS");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "no_root_approvers");
        assert_eq!(json["file_name"], "OWNERS");
    }

    #[test]
    fn verify_error_display() {
        let err = VerifyError::ChangeListUnavailable(GithubClientError::NetworkError(
            "timeout".to_string(),
        ));
        assert!(err.to_string().contains("timeout"));

        let err = VerifyError::FileReadUnavailable {
            path: "pkg/OWNERS".to_string(),
            source: GithubClientError::ApiError("500".to_string()),
        };
        assert!(err.to_string().contains("pkg/OWNERS"));

        let err: VerifyError = RosterError::Status {
            url: "https://example.com".to_string(),
            status: 502,
        }
        .into();
        assert!(matches!(err, VerifyError::RosterUnavailable(_)));
    }
}
