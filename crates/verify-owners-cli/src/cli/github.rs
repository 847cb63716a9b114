//! GitHub client implementation using octocrab.
//!
//! This module provides the octocrab-based implementation of the
//! `PullRequestClient` trait for use in the CLI.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};
use verify_owners_core::validate::github_client::{
    ChangedFile, DraftReview, FileStatus, GithubClientError, PullRequestClient, ReviewComment,
};

/// Page size used for paginated listings.
const PER_PAGE: u32 = 100;

/// A wrapper around `octocrab::Octocrab` that implements `PullRequestClient`.
///
/// This wrapper is necessary due to Rust's orphan rules, which prevent
/// implementing external traits on external types.
pub struct OctocrabClient(pub octocrab::Octocrab);

impl OctocrabClient {
    /// Creates a new OctocrabClient from an Octocrab instance.
    pub fn new(client: octocrab::Octocrab) -> Self {
        Self(client)
    }
}

impl std::ops::Deref for OctocrabClient {
    type Target = octocrab::Octocrab;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Extracts the HTTP status code from an octocrab error.
fn extract_status_code(error: &octocrab::Error) -> Option<StatusCode> {
    match error {
        octocrab::Error::GitHub { source, .. } => Some(source.status_code),
        _ => None,
    }
}

/// Maps an octocrab error onto the client error kinds.
fn map_error(error: octocrab::Error) -> GithubClientError {
    match extract_status_code(&error) {
        Some(StatusCode::NOT_FOUND) => GithubClientError::NotFound(error.to_string()),
        Some(_) => GithubClientError::ApiError(error.to_string()),
        None => GithubClientError::NetworkError(error.to_string()),
    }
}

#[derive(Serialize)]
struct PageParams {
    per_page: u32,
    page: u32,
}

#[derive(Serialize)]
struct RefParams<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
}

/// An entry of the pull request files listing.
#[derive(Deserialize)]
struct PullRequestFile {
    filename: String,
    #[serde(default)]
    status: FileStatus,
    #[serde(default)]
    patch: Option<String>,
}

impl From<PullRequestFile> for ChangedFile {
    fn from(file: PullRequestFile) -> Self {
        ChangedFile::new(file.filename, file.patch.unwrap_or_default()).with_status(file.status)
    }
}

/// A file returned by the contents API.
#[derive(Deserialize)]
struct FileContent {
    #[serde(default)]
    content: String,
    #[serde(default)]
    encoding: String,
}

impl FileContent {
    fn decode(self) -> Result<Vec<u8>, GithubClientError> {
        if self.encoding != "base64" {
            return Err(GithubClientError::Other(format!(
                "unsupported content encoding '{}'",
                self.encoding
            )));
        }
        let compact: String = self
            .content
            .chars()
            .filter(|c| !c.is_ascii_whitespace())
            .collect();
        STANDARD
            .decode(compact)
            .map_err(|e| GithubClientError::Other(format!("invalid base64 content: {}", e)))
    }
}

impl OctocrabClient {
    /// Fetches every page of a listing route.
    async fn paginate<T>(&self, route: &str) -> Result<Vec<T>, GithubClientError>
    where
        T: serde::de::DeserializeOwned,
    {
        let mut items = Vec::new();
        let mut page = 1;
        loop {
            let params = PageParams {
                per_page: PER_PAGE,
                page,
            };
            let batch: Vec<T> = self.0.get(route, Some(&params)).await.map_err(map_error)?;
            let len = batch.len();
            trace!("Fetched page {} of {} ({} item(s))", page, route, len);
            items.extend(batch);
            if len < PER_PAGE as usize {
                return Ok(items);
            }
            page += 1;
        }
    }
}

#[async_trait]
impl PullRequestClient for OctocrabClient {
    async fn pull_request_changes(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ChangedFile>, GithubClientError> {
        let route = format!("/repos/{}/{}/pulls/{}/files", org, repo, number);
        let files: Vec<PullRequestFile> = self.paginate(&route).await?;
        debug!("Pull request {}/{}#{} changes {} file(s)", org, repo, number, files.len());
        Ok(files.into_iter().map(ChangedFile::from).collect())
    }

    async fn file_contents(
        &self,
        org: &str,
        repo: &str,
        path: &str,
        git_ref: &str,
    ) -> Result<Option<Vec<u8>>, GithubClientError> {
        let route = format!("/repos/{}/{}/contents/{}", org, repo, path);
        let params = RefParams { git_ref };
        let response: Result<FileContent, octocrab::Error> =
            self.0.get(&route, Some(&params)).await;
        match response {
            Ok(file) => file.decode().map(Some),
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => {
                debug!("{} does not exist at {}", path, git_ref);
                Ok(None)
            }
            Err(e) => Err(map_error(e)),
        }
    }

    async fn add_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        self.0
            .issues(org, repo)
            .add_labels(number, &[label.to_string()])
            .await
            .map(drop)
            .map_err(map_error)
    }

    async fn remove_label(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        label: &str,
    ) -> Result<(), GithubClientError> {
        match self.0.issues(org, repo).remove_label(number, label).await {
            Ok(_) => Ok(()),
            // The label is already gone.
            Err(e) if extract_status_code(&e) == Some(StatusCode::NOT_FOUND) => Ok(()),
            Err(e) => Err(map_error(e)),
        }
    }

    async fn create_review(
        &self,
        org: &str,
        repo: &str,
        number: u64,
        review: &DraftReview,
    ) -> Result<(), GithubClientError> {
        let route = format!("/repos/{}/{}/pulls/{}/reviews", org, repo, number);
        let _created: serde_json::Value = self
            .0
            .post(route, Some(review))
            .await
            .map_err(map_error)?;
        Ok(())
    }

    async fn review_comments(
        &self,
        org: &str,
        repo: &str,
        number: u64,
    ) -> Result<Vec<ReviewComment>, GithubClientError> {
        let route = format!("/repos/{}/{}/pulls/{}/comments", org, repo, number);
        self.paginate(&route).await
    }

    async fn delete_review_comment(
        &self,
        org: &str,
        repo: &str,
        comment_id: u64,
    ) -> Result<(), GithubClientError> {
        let route = format!("/repos/{}/{}/pulls/comments/{}", org, repo, comment_id);
        let response = self
            .0
            ._delete(route, None::<&()>)
            .await
            .map_err(map_error)?;
        octocrab::map_github_error(response)
            .await
            .map(drop)
            .map_err(map_error)
    }
}
