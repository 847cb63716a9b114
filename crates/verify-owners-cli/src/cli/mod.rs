//! CLI module for the OWNERS verifier.
//!
//! This module provides command-line argument parsing using Clap with
//! environment variable support, so the binary can run unchanged inside a
//! GitHub Actions workflow triggered by `pull_request` events.

pub mod config;
pub mod dry_run;
pub mod github;
pub mod output;

use clap::Parser;
use std::path::PathBuf;

/// OWNERS file verifier - validates OWNERS changes in a pull request.
///
/// Reads a `pull_request` webhook payload, validates every changed OWNERS
/// and OWNERS_ALIASES file, then labels and reviews the pull request.
#[derive(Parser, Debug)]
#[command(name = "verify-owners")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Path to the pull request event payload (JSON).
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    pub event_path: PathBuf,

    /// Path to a YAML configuration file.
    #[arg(long, short = 'c', env = "VERIFY_OWNERS_CONFIG")]
    pub config: Option<PathBuf>,

    /// GitHub personal access token.
    #[arg(long, env = "GITHUB_ACCESS_TOKEN")]
    pub github_access_token: Option<String>,

    /// GitHub base URL for API requests (for GitHub Enterprise).
    #[arg(long, env = "GITHUB_BASE_URL", default_value = "https://api.github.com/")]
    pub github_base_url: String,

    /// GitHub App ID for authentication (alternative to access token).
    #[arg(long, env = "GITHUB_APP_ID")]
    pub github_app_id: Option<u64>,

    /// GitHub App Installation ID (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_INSTALLATION_ID")]
    pub github_app_installation_id: Option<u64>,

    /// GitHub App private key in PEM format (required when using App authentication).
    #[arg(long, env = "GITHUB_APP_PRIVATE_KEY")]
    pub github_app_private_key: Option<String>,

    /// Comma-separated list of labels OWNERS files may not declare.
    /// Overrides the configuration file.
    #[arg(long, env = "LABELS_BLACKLIST", value_delimiter = ',')]
    pub labels_blacklist: Option<Vec<String>>,

    /// Membership roster URL; `{org}` is replaced by the organization.
    #[arg(long, env = "ROSTER_URL")]
    pub roster_url: Option<String>,

    /// Validate without adding labels, posting reviews or deleting comments.
    #[arg(long)]
    pub dry_run: bool,

    /// Output the outcome as JSON instead of human-readable format.
    #[arg(long, short = 'j')]
    pub json: bool,

    /// Increase verbosity level (-v for info, -vv for debug, -vvv for trace).
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// Returns true if GitHub authentication is configured.
    pub fn has_github_auth(&self) -> bool {
        self.github_access_token.is_some() || self.has_github_app_auth()
    }

    /// Returns true if GitHub App authentication is configured.
    pub fn has_github_app_auth(&self) -> bool {
        self.github_app_id.is_some()
            && self.github_app_installation_id.is_some()
            && self.github_app_private_key.is_some()
    }
}
