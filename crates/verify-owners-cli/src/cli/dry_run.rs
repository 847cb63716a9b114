//! Read-only client wrapper for `--dry-run`.
//!
//! Reads are forwarded to the wrapped client; labels, reviews and comment
//! deletions are only logged.

use async_trait::async_trait;
use tracing::info;
use verify_owners_core::validate::github_client::{
    ChangedFile, DraftReview, GithubClientError, PullRequestClient, ReviewComment,
};

/// A `PullRequestClient` that never writes.
pub struct DryRunClient<C> {
    inner: C,
}

impl<C: PullRequestClient> DryRunClient<C> {
    /// Wraps a client.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<C: PullRequestClient> PullRequestClient for DryRunClient<C> {
    async fn pull_request_changes(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>, GithubClientError> {
        self.inner.pull_request_changes(org, repo, number).await
    }

    async fn file_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, GithubClientError> {
        self.inner.file_contents(org, repo, path, git_ref).await
    }

    async fn add_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        info!("[dry-run] would add label '{}' to {}/{}#{}", label, org, repo, number);
        Ok(())
    }

    async fn remove_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        info!("[dry-run] would remove label '{}' from {}/{}#{}", label, org, repo, number);
        Ok(())
    }

    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        review: &DraftReview,
    ) -> Result<(), GithubClientError> {
        info!(
            "[dry-run] would post a review with {} inline comment(s) on {}/{}#{}",
            review.comments.len(),
            org,
            repo,
            number
        );
        for comment in &review.comments {
            info!("[dry-run]   {}@{}: {}", comment.path, comment.position, comment.body);
        }
        Ok(())
    }

    async fn review_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewComment>, GithubClientError> {
        self.inner.review_comments(org, repo, number).await
    }

    async fn delete_review_comment(
        &self,
        org: &str,
        repo: &str,
        comment_id: u64,
    ) -> Result<(), GithubClientError> {
        info!("[dry-run] would delete review comment {} in {}/{}", comment_id, org, repo);
        Ok(())
    }
}
