//! Configuration handling for the CLI.
//!
//! This module loads the event payload and the YAML configuration file,
//! applies command-line overrides and handles GitHub authentication setup.

use crate::cli::Args;
use jsonwebtoken::EncodingKey;
use octocrab::Octocrab;
use octocrab::models::{AppId, InstallationId};
use std::path::{Path, PathBuf};
use thiserror::Error;
use verify_owners_core::validate::{PullRequestEvent, VerifyConfig};

/// Errors that can occur during configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Missing required configuration.
    #[error("missing required configuration: {0}")]
    MissingRequired(String),

    /// Invalid configuration value.
    #[error("invalid configuration: {0}")]
    Invalid(String),

    /// GitHub authentication error.
    #[error("GitHub authentication error: {0}")]
    GitHubAuth(String),

    /// Failed to read a file named on the command line.
    #[error("failed to read '{path}': {source}")]
    Read {
        /// The file path.
        path: PathBuf,
        /// The IO error.
        #[source]
        source: std::io::Error,
    },
}

/// Application exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Validation passed, or there was nothing to validate.
    Success = 0,
    /// Startup or run failed (wrong configuration or an unreachable service).
    StartupFailure = 1,
    /// Application terminated by signal (SIGINT/SIGTERM).
    Terminated = 2,
    /// Validation failed (violations were found).
    ValidationFailed = 3,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

/// Validated and processed configuration for running the verifier.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// The pull request event to validate.
    pub event: PullRequestEvent,
    /// Configuration for the verifier.
    pub verify_config: VerifyConfig,
    /// Whether writes are only logged.
    pub dry_run: bool,
    /// Whether to output JSON.
    pub json_output: bool,
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments.
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        if !args.dry_run && !args.has_github_auth() {
            return Err(ConfigError::MissingRequired(
                "GITHUB_ACCESS_TOKEN or GitHub App credentials are required unless --dry-run is set"
                    .to_string(),
            ));
        }

        let event = load_event(&args.event_path)?;

        let mut verify_config = match &args.config {
            Some(path) => load_verify_config(path)?,
            None => VerifyConfig::new(),
        };
        if let Some(labels) = &args.labels_blacklist {
            verify_config = verify_config.with_labels_blacklist(
                labels
                    .iter()
                    .map(|label| label.trim())
                    .filter(|label| !label.is_empty()),
            );
        }
        if let Some(url) = &args.roster_url {
            verify_config = verify_config.with_roster_url(url.clone());
        }
        if !verify_config.roster_url.contains("{org}") {
            return Err(ConfigError::Invalid(format!(
                "roster URL '{}' has no {{org}} placeholder",
                verify_config.roster_url
            )));
        }

        Ok(Self {
            event,
            verify_config,
            dry_run: args.dry_run,
            json_output: args.json,
        })
    }

    /// Determines the exit code based on whether violations were found.
    pub fn exit_code_for_outcome(&self, has_violations: bool) -> ExitCode {
        if has_violations {
            ExitCode::ValidationFailed
        } else {
            ExitCode::Success
        }
    }
}

/// Reads a `pull_request` event payload.
pub fn load_event(path: &Path) -> Result<PullRequestEvent, ConfigError> {
    let content = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&content).map_err(|e| {
        ConfigError::Invalid(format!(
            "'{}' is not a pull_request event: {}",
            path.display(),
            e
        ))
    })
}

/// Reads a YAML configuration file.
pub fn load_verify_config(path: &Path) -> Result<VerifyConfig, ConfigError> {
    let content = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    if content.iter().all(u8::is_ascii_whitespace) {
        return Ok(VerifyConfig::new());
    }
    serde_yaml::from_slice(&content)
        .map_err(|e| ConfigError::Invalid(format!("'{}': {}", path.display(), e)))
}

/// Creates an Octocrab client from CLI arguments.
///
/// Without credentials the client is anonymous, which is only accepted in
/// dry-run mode.
pub async fn create_octocrab(args: &Args) -> Result<Octocrab, ConfigError> {
    let base_url = if args.github_base_url != "https://api.github.com/" {
        Some(args.github_base_url.as_str())
    } else {
        None
    };

    if let (Some(app_id), Some(installation_id), Some(private_key)) = (
        args.github_app_id,
        args.github_app_installation_id,
        args.github_app_private_key.as_ref(),
    ) {
        // GitHub App authentication
        let key = EncodingKey::from_rsa_pem(private_key.as_bytes())
            .map_err(|e| ConfigError::GitHubAuth(format!("invalid private key: {}", e)))?;

        let mut app_builder = Octocrab::builder().app(AppId(app_id), key);
        if let Some(url) = base_url {
            app_builder = app_builder
                .base_uri(url)
                .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
        }
        let app_client = app_builder
            .build()
            .map_err(|e| ConfigError::GitHubAuth(format!("failed to create app client: {}", e)))?;

        return app_client
            .installation(InstallationId(installation_id))
            .map_err(|e| {
                ConfigError::GitHubAuth(format!("failed to get installation client: {}", e))
            });
    }

    let mut builder = Octocrab::builder();
    if let Some(url) = base_url {
        builder = builder
            .base_uri(url)
            .map_err(|e| ConfigError::GitHubAuth(format!("invalid base URL: {}", e)))?;
    }
    if let Some(token) = &args.github_access_token {
        builder = builder.personal_token(token.clone());
    }
    builder
        .build()
        .map_err(|e| ConfigError::GitHubAuth(format!("failed to build client: {}", e)))
}
