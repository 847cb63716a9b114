//! In-memory collaborators shared by the validation tests.

use super::github_client::{
    ChangedFile, DraftReview, GithubClientError, PullRequestClient, ReviewComment,
};
use super::membership::{RosterError, RosterSource};
use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A roster backed by a fixed member list.
pub struct StaticRoster {
    members: Option<BTreeSet<String>>,
    fetches: AtomicUsize,
}

impl StaticRoster {
    pub fn new<const N: usize>(members: [&str; N]) -> Self {
        Self {
            members: Some(members.iter().map(|m| m.to_string()).collect()),
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn unavailable() -> Self {
        Self {
            members: None,
            fetches: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RosterSource for StaticRoster {
    async fn fetch_members(&self, org: &str) -> Result<BTreeSet<String>, RosterError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.members.clone().ok_or_else(|| RosterError::Status {
            url: format!("https://roster.invalid/{}", org),
            status: 503,
        })
    }
}

/// A write performed against the mock client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddLabel(String),
    RemoveLabel(String),
    Review(DraftReview),
    DeleteComment(u64),
}

/// A pull request client serving canned data and recording writes.
#[derive(Default)]
pub struct MockClient {
    changes: Vec<ChangedFile>,
    files: HashMap<(String, String), Vec<u8>>,
    comments: Vec<ReviewComment>,
    fail_changes: bool,
    fail_writes: bool,
    actions: Mutex<Vec<Action>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a changed file and its content at `head`.
    pub fn with_change(mut self, change: ChangedFile, content: &str) -> Self {
        self.files
            .insert((change.path.clone(), "head".to_string()), content.as_bytes().to_vec());
        self.changes.push(change);
        self
    }

    /// Registers a file change without content (e.g. an unrelated file).
    pub fn with_change_only(mut self, change: ChangedFile) -> Self {
        self.changes.push(change);
        self
    }

    /// Registers a file content at an arbitrary revision.
    pub fn with_file(mut self, path: &str, git_ref: &str, content: &str) -> Self {
        self.files.insert(
            (path.to_string(), git_ref.to_string()),
            content.as_bytes().to_vec(),
        );
        self
    }

    pub fn with_comment(mut self, id: u64, body: &str) -> Self {
        self.comments.push(ReviewComment {
            id,
            body: body.to_string(),
        });
        self
    }

    pub fn failing_changes(mut self) -> Self {
        self.fail_changes = true;
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn actions(&self) -> Vec<Action> {
        self.actions.lock().unwrap().clone()
    }

    pub fn reviews(&self) -> Vec<DraftReview> {
        self.actions()
            .into_iter()
            .filter_map(|action| match action {
                Action::Review(review) => Some(review),
                _ => None,
            })
            .collect()
    }

    fn record(&self, action: Action) -> Result<(), GithubClientError> {
        self.actions.lock().unwrap().push(action);
        if self.fail_writes {
            return Err(GithubClientError::ApiError("write rejected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PullRequestClient for MockClient {
    async fn pull_request_changes(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<ChangedFile>, GithubClientError> {
        if self.fail_changes {
            return Err(GithubClientError::NetworkError("connection reset".to_string()));
        }
        Ok(self.changes.clone())
    }

    async fn file_contents(
        &self,
        _org: &str,
        _repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, GithubClientError> {
        Ok(self
            .files
            .get(&(path.to_string(), git_ref.to_string()))
            .cloned())
    }

    async fn add_label(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        self.record(Action::AddLabel(label.to_string()))
    }

    async fn remove_label(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        self.record(Action::RemoveLabel(label.to_string()))
    }

    async fn create_review(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
        review: &DraftReview,
    ) -> Result<(), GithubClientError> {
        self.record(Action::Review(review.clone()))
    }

    async fn review_comments(
        &self,
        _org: &str,
        _repo: &str,
        _number: u64,
    ) -> Result<Vec<ReviewComment>, GithubClientError> {
        Ok(self.comments.clone())
    }

    async fn delete_review_comment(
        &self,
        _org: &str,
        _repo: &str,
        comment_id: u64,
    ) -> Result<(), GithubClientError> {
        self.record(Action::DeleteComment(comment_id))
    }
}
