//! Pull request event payload.
//!
//! Mirrors the subset of the GitHub `pull_request` webhook payload the
//! validator reads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The action that triggered a pull request event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PullRequestAction {
    Opened,
    Reopened,
    Synchronize,
    Edited,
    Closed,
    Labeled,
    Unlabeled,
    Assigned,
    ReviewRequested,
    /// Any action this crate does not distinguish.
    #[serde(other)]
    Other,
}

impl PullRequestAction {
    /// Returns true for actions that change the pull request's content.
    pub fn changes_content(&self) -> bool {
        matches!(
            self,
            PullRequestAction::Opened | PullRequestAction::Reopened | PullRequestAction::Synchronize
        )
    }
}

impl fmt::Display for PullRequestAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PullRequestAction::Opened => "opened",
            PullRequestAction::Reopened => "reopened",
            PullRequestAction::Synchronize => "synchronize",
            PullRequestAction::Edited => "edited",
            PullRequestAction::Closed => "closed",
            PullRequestAction::Labeled => "labeled",
            PullRequestAction::Unlabeled => "unlabeled",
            PullRequestAction::Assigned => "assigned",
            PullRequestAction::ReviewRequested => "review_requested",
            PullRequestAction::Other => "other",
        };
        f.write_str(name)
    }
}

/// A GitHub account reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub login: String,
}

/// A repository reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub full_name: String,
    pub owner: Account,
}

/// One side (head or base) of a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRef {
    #[serde(default)]
    pub sha: String,
    #[serde(rename = "ref", default)]
    pub ref_name: String,
}

/// A label attached to a pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
}

/// The pull request carried by an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub html_url: String,
    #[serde(default)]
    pub user: Account,
    #[serde(default)]
    pub head: GitRef,
    #[serde(default)]
    pub base: GitRef,
    #[serde(default)]
    pub labels: Vec<Label>,
}

impl PullRequest {
    /// Returns true if the pull request carries `label`.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.name == label)
    }
}

/// A pull request webhook event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PullRequestEvent {
    pub action: PullRequestAction,
    pub number: u64,
    #[serde(rename = "repository")]
    pub repo: Repository,
    pub pull_request: PullRequest,
}

impl PullRequestEvent {
    /// Returns the owning organization (or user) login.
    pub fn org(&self) -> &str {
        &self.repo.owner.login
    }

    /// Returns the repository name.
    pub fn repo_name(&self) -> &str {
        &self.repo.name
    }

    /// Returns the head commit, if the payload carries one.
    pub fn head_sha(&self) -> Option<&str> {
        Some(self.pull_request.head.sha.as_str()).filter(|sha| !sha.is_empty())
    }

    /// Returns the revision the pending changes are read from.
    pub fn head_ref(&self) -> &str {
        self.head_sha()
            .unwrap_or(self.pull_request.head.ref_name.as_str())
    }

    /// Returns the base branch the pull request targets.
    pub fn base_ref(&self) -> &str {
        &self.pull_request.base.ref_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "action": "synchronize",
        "number": 42,
        "repository": {
            "name": "test-infra",
            "full_name": "kubernetes/test-infra",
            "owner": { "login": "kubernetes" }
        },
        "pull_request": {
            "number": 42,
            "body": "Adds bob as approver",
            "html_url": "https://github.com/kubernetes/test-infra/pull/42",
            "user": { "login": "alice" },
            "head": { "sha": "deadbeef", "ref": "add-bob" },
            "base": { "sha": "cafebabe", "ref": "main" },
            "labels": [{ "name": "do-not-merge/invalid-owners-file" }],
            "draft": false
        },
        "sender": { "login": "alice" }
    }"#;

    #[test]
    fn deserializes_webhook_payload() {
        let event: PullRequestEvent = serde_json::from_str(PAYLOAD).unwrap();
        assert_eq!(event.action, PullRequestAction::Synchronize);
        assert_eq!(event.org(), "kubernetes");
        assert_eq!(event.repo_name(), "test-infra");
        assert_eq!(event.head_sha(), Some("deadbeef"));
        assert_eq!(event.base_ref(), "main");
        assert!(event.pull_request.has_label("do-not-merge/invalid-owners-file"));
        assert_eq!(event.pull_request.user.login, "alice");
    }

    #[test]
    fn unknown_action_is_other() {
        let action: PullRequestAction = serde_json::from_str("\"converted_to_draft\"").unwrap();
        assert_eq!(action, PullRequestAction::Other);
        assert!(!action.changes_content());
    }

    #[test]
    fn content_changing_actions() {
        assert!(PullRequestAction::Opened.changes_content());
        assert!(PullRequestAction::Reopened.changes_content());
        assert!(PullRequestAction::Synchronize.changes_content());
        assert!(!PullRequestAction::Edited.changes_content());
        assert!(!PullRequestAction::Closed.changes_content());
        assert_eq!(PullRequestAction::ReviewRequested.to_string(), "review_requested");
    }

    #[test]
    fn head_ref_falls_back_to_branch() {
        let mut event: PullRequestEvent = serde_json::from_str(PAYLOAD).unwrap();
        event.pull_request.head.sha.clear();
        assert_eq!(event.head_sha(), None);
        assert_eq!(event.head_ref(), "add-bob");
    }
}
