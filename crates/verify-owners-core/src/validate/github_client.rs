//! GitHub client trait abstraction for the pull request operations.
//!
//! The validator only needs a handful of calls against the code-hosting API.
//! They are gathered behind [`PullRequestClient`] so hosts can plug in any
//! transport (octocrab, a dry-run wrapper, an in-memory fake).

use async_trait::async_trait;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// How a file was touched by a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    /// The file is new.
    Added,
    /// The file was edited.
    #[default]
    Modified,
    /// The file was deleted.
    Removed,
    /// The file was moved (possibly with edits).
    Renamed,
    /// Any other status reported by the API.
    #[serde(other)]
    Other,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileStatus::Added => write!(f, "added"),
            FileStatus::Modified => write!(f, "modified"),
            FileStatus::Removed => write!(f, "removed"),
            FileStatus::Renamed => write!(f, "renamed"),
            FileStatus::Other => write!(f, "other"),
        }
    }
}

/// A file changed by a pull request, with its unified diff.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChangedFile {
    /// Path relative to the repository root.
    pub path: String,
    /// How the file was changed.
    #[serde(default)]
    pub status: FileStatus,
    /// The unified diff of the change; empty for binary or oversized files.
    #[serde(default)]
    pub patch: String,
}

impl ChangedFile {
    /// Creates a modified file entry.
    pub fn new(path: impl Into<String>, patch: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status: FileStatus::Modified,
            patch: patch.into(),
        }
    }

    /// Sets the file status.
    pub fn with_status(mut self, status: FileStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns the final path component.
    pub fn base_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Returns true if the file sits at the repository root.
    pub fn is_at_root(&self) -> bool {
        !self.path.contains('/')
    }
}

/// The kind of review being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReviewAction {
    /// A plain comment review.
    #[default]
    Comment,
    /// A review requesting changes.
    RequestChanges,
}

/// An inline comment of a draft review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReviewComment {
    /// File the comment is attached to.
    pub path: String,
    /// Position inside the file's diff (1-based).
    pub position: usize,
    /// Comment text.
    pub body: String,
}

/// A review to submit on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftReview {
    /// Head commit the review applies to.
    #[serde(rename = "commit_id", skip_serializing_if = "Option::is_none")]
    pub commit_sha: Option<String>,
    /// Review summary text.
    pub body: String,
    /// The review kind.
    #[serde(rename = "event")]
    pub action: ReviewAction,
    /// Inline comments.
    pub comments: Vec<DraftReviewComment>,
}

/// A review comment previously posted on a pull request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewComment {
    /// Comment identifier.
    pub id: u64,
    /// Comment text.
    #[serde(default)]
    pub body: String,
}

/// Errors that can occur when interacting with the GitHub client.
#[derive(Debug, Error)]
pub enum GithubClientError {
    /// An API error occurred.
    #[error("GitHub API error: {0}")]
    ApiError(String),

    /// A network error occurred.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Trait for the pull request operations the validator performs.
///
/// # Example
///
/// ```rust,ignore
/// use verify_owners_core::validate::github_client::{ChangedFile, PullRequestClient, GithubClientError};
///
/// struct MyClient { /* ... */ }
///
/// #[async_trait::async_trait]
/// impl PullRequestClient for MyClient {
///     async fn pull_request_changes(&self, org: &str, repo: &str, number: u64)
///         -> Result<Vec<ChangedFile>, GithubClientError> {
///         // List the files of the pull request
///         Ok(Vec::new())
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait PullRequestClient: Send + Sync {
    /// Lists the files changed by a pull request.
    async fn pull_request_changes(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>, GithubClientError>;

    /// Reads a file at a given commit or branch.
    ///
    /// Returns `Ok(None)` if the file does not exist at that revision.
    async fn file_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, GithubClientError>;

    /// Adds a label to a pull request.
    async fn add_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError>;

    /// Removes a label from a pull request.
    async fn remove_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError>;

    /// Submits a review.
    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        review: &DraftReview,
    ) -> Result<(), GithubClientError>;

    /// Lists the review comments of a pull request.
    async fn review_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewComment>, GithubClientError>;

    /// Deletes a review comment.
    async fn delete_review_comment(
        &self,
        org: &str,
        repo: &str,
        comment_id: u64,
    ) -> Result<(), GithubClientError>;

    /// Deletes every review comment whose body satisfies `matches`.
    ///
    /// Individual deletion failures are logged and skipped. Returns the
    /// number of deleted comments.
    async fn prune_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        matches: &(dyn for<'s> Fn(&'s str) -> bool + Send + Sync),
    ) -> Result<usize, GithubClientError> {
        let comments = self.review_comments(org, repo, number).await?;
        let mut deleted = 0;
        for comment in comments.iter().filter(|c| matches(&c.body)) {
            match self.delete_review_comment(org, repo, comment.id).await {
                Ok(()) => {
                    debug!("Deleted review comment {}", comment.id);
                    deleted += 1;
                }
                Err(e) => warn!("Failed to delete review comment {}: {}", comment.id, e),
            }
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::testing::{Action, MockClient};

    #[test]
    fn changed_file_base_name() {
        assert_eq!(ChangedFile::new("OWNERS", "").base_name(), "OWNERS");
        assert_eq!(ChangedFile::new("pkg/api/OWNERS", "").base_name(), "OWNERS");
        assert!(ChangedFile::new("OWNERS_ALIASES", "").is_at_root());
        assert!(!ChangedFile::new("docs/OWNERS_ALIASES", "").is_at_root());
    }

    #[test]
    fn file_status_from_api_values() {
        let status: FileStatus = serde_json::from_str("\"removed\"").unwrap();
        assert_eq!(status, FileStatus::Removed);
        let status: FileStatus = serde_json::from_str("\"copied\"").unwrap();
        assert_eq!(status, FileStatus::Other);
        assert_eq!(FileStatus::Renamed.to_string(), "renamed");
    }

    #[test]
    fn draft_review_wire_format() {
        let review = DraftReview {
            commit_sha: Some("abc123".to_string()),
            body: "summary".to_string(),
            action: ReviewAction::Comment,
            comments: vec![DraftReviewComment {
                path: "OWNERS".to_string(),
                position: 4,
                body: "Cannot parse file".to_string(),
            }],
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["commit_id"], "abc123");
        assert_eq!(json["event"], "COMMENT");
        assert_eq!(json["comments"][0]["position"], 4);
    }

    #[test]
    fn draft_review_without_commit() {
        let review = DraftReview {
            commit_sha: None,
            body: String::new(),
            action: ReviewAction::default(),
            comments: Vec::new(),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert!(json.get("commit_id").is_none());
    }

    #[test]
    fn request_changes_wire_format() {
        let review = DraftReview {
            commit_sha: None,
            body: "summary".to_string(),
            action: ReviewAction::RequestChanges,
            comments: Vec::new(),
        };
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["event"], "REQUEST_CHANGES");
    }

    #[tokio::test]
    async fn prune_comments_deletes_matching_bodies() {
        let client = MockClient::new()
            .with_comment(1, "keep me")
            .with_comment(2, "drop me")
            .with_comment(3, "drop me too");

        let deleted = client
            .prune_comments("acme", "repo", 1, &|body: &str| body.starts_with("drop"))
            .await
            .unwrap();

        assert_eq!(deleted, 2);
        assert_eq!(
            client.actions(),
            vec![Action::DeleteComment(2), Action::DeleteComment(3)]
        );
    }

    #[tokio::test]
    async fn prune_comments_skips_failed_deletions() {
        let client = MockClient::new()
            .with_comment(1, "drop me")
            .with_comment(2, "drop me too")
            .failing_writes();

        let deleted = client
            .prune_comments("acme", "repo", 1, &|body: &str| body.starts_with("drop"))
            .await
            .unwrap();

        assert_eq!(deleted, 0);
        assert_eq!(client.actions().len(), 2);
    }

    #[test]
    fn github_client_error_display() {
        let err = GithubClientError::ApiError("test error".to_string());
        assert!(err.to_string().contains("test error"));
        let err = GithubClientError::NotFound("OWNERS".to_string());
        assert!(err.to_string().contains("OWNERS"));
    }
}
