//! Pull request handler driving a validation run.
//!
//! One call to [`OwnersVerifier::handle_pull_request`] lists the changed
//! files, validates every OWNERS and OWNERS_ALIASES change, then either flags
//! the pull request with a label and a single review or clears a previous
//! flag.

use super::checks::{CheckRunner, DeclarationContext};
use super::config::VerifyConfig;
use super::error::{LocatedError, ValidationError, VerifyError};
use super::event::PullRequestEvent;
use super::github_client::{ChangedFile, FileStatus, GithubClientError, PullRequestClient};
use super::membership::{MembershipCache, RosterSource};
use super::outcome::{ValidationOutcome, is_signed};
use crate::diff::position_or_first;
use crate::parse::{AliasTable, ConfigSyntaxError, parse_aliases, parse_declaration};
use log::{debug, error, info, trace, warn};

/// The OWNERS-related files touched by a pull request.
#[derive(Debug, Default)]
struct RelevantChanges {
    owners_files: Vec<ChangedFile>,
    aliases_file: Option<ChangedFile>,
}

impl RelevantChanges {
    fn is_empty(&self) -> bool {
        self.owners_files.is_empty() && self.aliases_file.is_none()
    }
}

/// Validates OWNERS changes of pull requests.
pub struct OwnersVerifier<'a> {
    client: &'a dyn PullRequestClient,
    roster: &'a dyn RosterSource,
    config: VerifyConfig,
    checks: CheckRunner,
}

impl<'a> OwnersVerifier<'a> {
    /// Creates a verifier with the built-in checks.
    pub fn new(
        client: &'a dyn PullRequestClient,
        roster: &'a dyn RosterSource,
        config: VerifyConfig,
    ) -> Self {
        Self {
            client,
            roster,
            config,
            checks: CheckRunner::with_all_checks(),
        }
    }

    /// Replaces the declaration checks.
    pub fn with_checks(mut self, checks: CheckRunner) -> Self {
        self.checks = checks;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Validates a pull request event and applies the resulting decision.
    ///
    /// Returns `Ok(None)` when the event is not a content change or when no
    /// OWNERS-related file changed; nothing is written in that case.
    pub async fn handle_pull_request(
        &self,
        event: &PullRequestEvent,
    ) -> Result<Option<ValidationOutcome>, VerifyError> {
        if !event.action.changes_content() {
            debug!("Ignoring pull request action '{}'", event.action);
            return Ok(None);
        }

        let Some(outcome) = self.validate(event).await? else {
            info!(
                "No {} or {} changes in {}/{}#{}",
                self.config.owners_file,
                self.config.aliases_file,
                event.org(),
                event.repo_name(),
                event.number
            );
            return Ok(None);
        };

        self.apply(event, &outcome).await;
        Ok(Some(outcome))
    }

    /// Computes the outcome of a pull request without writing anything.
    ///
    /// Returns `Ok(None)` when no OWNERS-related file changed.
    pub async fn validate(
        &self,
        event: &PullRequestEvent,
    ) -> Result<Option<ValidationOutcome>, VerifyError> {
        let changes = self
            .client
            .pull_request_changes(event.org(), event.repo_name(), event.number)
            .await
            .map_err(VerifyError::ChangeListUnavailable)?;
        debug!("Pull request changes {} file(s)", changes.len());

        let relevant = self.relevant_changes(changes);
        if relevant.is_empty() {
            return Ok(None);
        }

        let mut outcome = ValidationOutcome::new();
        let mut membership = MembershipCache::new(self.roster, event.org());

        let pending_aliases = match &relevant.aliases_file {
            Some(change) => {
                let content = self.read_pending(event, change).await?;
                match parse_aliases(&content) {
                    Ok(table) => {
                        let users = table.all_users();
                        outcome
                            .non_members
                            .extend(membership.non_members(&users).await?);
                        Some(table)
                    }
                    Err(e) => {
                        warn!("Invalid {}: {}", change.path, e);
                        outcome.alias_error = Some(self.locate_syntax_error(change, e));
                        None
                    }
                }
            }
            None => None,
        };

        if relevant.owners_files.is_empty() {
            return Ok(Some(outcome));
        }

        let aliases = match pending_aliases {
            Some(table) => table,
            None => self.base_aliases(event).await?,
        };

        for change in &relevant.owners_files {
            let content = self.read_pending(event, change).await?;
            let declaration = match parse_declaration(&content) {
                Ok(declaration) => declaration,
                Err(e) => {
                    warn!("Invalid {}: {}", change.path, e);
                    outcome.file_errors.push(self.locate_syntax_error(change, e));
                    continue;
                }
            };

            let roles = declaration.effective_roles();
            let ctx = DeclarationContext::new(&change.path, &roles, &self.config);
            if let Some(error) = self.checks.first_violation(&ctx) {
                warn!("Invalid {}: {}", change.path, error);
                outcome
                    .file_errors
                    .push(LocatedError::new(&change.path, 1, error));
                continue;
            }

            let users = aliases.expand(roles.users());
            let non_members = membership.non_members(&users).await?;
            if !non_members.is_empty() {
                debug!(
                    "{} lists {} non-member(s)",
                    change.path,
                    non_members.len()
                );
            }
            outcome.non_members.extend(non_members);
        }

        info!(
            "Validated {} file(s): {} invalid, {} non-member(s)",
            relevant.owners_files.len() + usize::from(relevant.aliases_file.is_some()),
            outcome.file_errors.len() + usize::from(outcome.alias_error.is_some()),
            outcome.non_members.len()
        );
        Ok(Some(outcome))
    }

    fn relevant_changes(&self, changes: Vec<ChangedFile>) -> RelevantChanges {
        let mut relevant = RelevantChanges::default();
        for change in changes {
            if change.status == FileStatus::Removed {
                trace!("Skipping removed file {}", change.path);
                continue;
            }
            let name = change.base_name();
            if name == self.config.aliases_file {
                if change.is_at_root() {
                    relevant.aliases_file = Some(change);
                } else {
                    debug!("Ignoring {} outside the repository root", change.path);
                }
            } else if name == self.config.owners_file {
                relevant.owners_files.push(change);
            }
        }
        relevant
    }

    async fn read_pending(
        &self,
        event: &PullRequestEvent,
        change: &ChangedFile,
    ) -> Result<Vec<u8>, VerifyError> {
        let read_error = |source: GithubClientError| VerifyError::FileReadUnavailable {
            path: change.path.clone(),
            source,
        };
        self.client
            .file_contents(event.org(), event.repo_name(), &change.path, event.head_ref())
            .await
            .map_err(read_error)?
            .ok_or_else(|| read_error(GithubClientError::NotFound(change.path.clone())))
    }

    /// Reads the alias table of the base branch.
    ///
    /// A missing or invalid file yields an empty table.
    async fn base_aliases(&self, event: &PullRequestEvent) -> Result<AliasTable, VerifyError> {
        let path = &self.config.aliases_file;
        let content = self
            .client
            .file_contents(event.org(), event.repo_name(), path, event.base_ref())
            .await
            .map_err(|source| VerifyError::FileReadUnavailable {
                path: path.clone(),
                source,
            })?;

        let Some(content) = content else {
            debug!("No {} on {}", path, event.base_ref());
            return Ok(AliasTable::new());
        };
        match parse_aliases(&content) {
            Ok(table) => Ok(table),
            Err(e) => {
                warn!("Ignoring invalid {} on {}: {}", path, event.base_ref(), e);
                Ok(AliasTable::new())
            }
        }
    }

    fn locate_syntax_error(&self, change: &ChangedFile, e: ConfigSyntaxError) -> LocatedError {
        let position = position_or_first(&change.patch, e.line);
        LocatedError::new(
            &change.path,
            position,
            ValidationError::unparseable(e.message, e.line),
        )
    }

    /// Applies the label and review decision. Failures are only logged.
    async fn apply(&self, event: &PullRequestEvent, outcome: &ValidationOutcome) {
        let (org, repo, number) = (event.org(), event.repo_name(), event.number);
        let label = &self.config.invalid_label;
        let labeled = event.pull_request.has_label(label);

        if outcome.has_any_violation() {
            if !labeled {
                if let Err(e) = self.client.add_label(org, repo, number, label).await {
                    error!("Failed to add {} label: {}", label, e);
                }
            }
            let review = outcome.to_review(event, &self.config);
            match self.client.create_review(org, repo, number, &review).await {
                Ok(()) => info!(
                    "Posted review with {} inline comment(s)",
                    review.comments.len()
                ),
                Err(e) => error!("Failed to create review: {}", e),
            }
            return;
        }

        if labeled {
            if let Err(e) = self.client.remove_label(org, repo, number, label).await {
                error!("Failed to remove {} label: {}", label, e);
            }
        }
        match self.client.prune_comments(org, repo, number, &is_signed).await {
            Ok(deleted) => debug!("Pruned {} stale comment(s)", deleted),
            Err(e) => warn!("Failed to prune stale comments: {}", e),
        }
    }
}

impl std::fmt::Debug for OwnersVerifier<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OwnersVerifier")
            .field("config", &self.config)
            .field("checks", &self.checks)
            .field("client", &"<dyn PullRequestClient>")
            .field("roster", &"<dyn RosterSource>")
            .finish()
    }
}
