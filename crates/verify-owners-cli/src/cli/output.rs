//! Output formatting for the CLI.
//!
//! This module provides human-readable and JSON reports of a validation run.

use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use verify_owners_core::validate::{LocatedError, ValidationOutcome};

/// What the run did with the pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// The event did not touch any OWNERS-related file.
    Skipped,
    /// Every changed file is valid; any previous flag was cleared.
    Cleared,
    /// Violations were found; the pull request was labeled and reviewed.
    Flagged,
}

impl Decision {
    /// Derives the decision from an outcome.
    pub fn for_outcome(outcome: Option<&ValidationOutcome>) -> Self {
        match outcome {
            None => Decision::Skipped,
            Some(outcome) if outcome.has_any_violation() => Decision::Flagged,
            Some(_) => Decision::Cleared,
        }
    }
}

/// JSON report of a run.
#[derive(Debug, Serialize)]
pub struct JsonOutput {
    /// Repository in `owner/name` form.
    pub repository: String,
    /// Pull request number.
    pub pull_request: u64,
    /// The decision taken.
    pub decision: Decision,
    /// Whether writes were only logged.
    pub dry_run: bool,
    /// Invalid OWNERS files.
    pub file_errors: Vec<JsonIssue>,
    /// The invalid OWNERS_ALIASES file, if any.
    pub alias_error: Option<JsonIssue>,
    /// Listed users that are not organization members.
    pub non_members: Vec<String>,
}

impl JsonOutput {
    /// Builds the report.
    pub fn new(
        repository: impl Into<String>,
        pull_request: u64,
        outcome: Option<&ValidationOutcome>,
        dry_run: bool,
    ) -> Self {
        Self {
            repository: repository.into(),
            pull_request,
            decision: Decision::for_outcome(outcome),
            dry_run,
            file_errors: outcome
                .map(|o| o.file_errors.iter().map(JsonIssue::from).collect())
                .unwrap_or_default(),
            alias_error: outcome.and_then(|o| o.alias_error.as_ref().map(JsonIssue::from)),
            non_members: outcome
                .map(|o| o.non_members.iter().cloned().collect())
                .unwrap_or_default(),
        }
    }

    /// Writes the JSON output to a writer.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

/// A single issue in JSON format.
#[derive(Debug, Serialize)]
pub struct JsonIssue {
    /// The file the issue was found in.
    pub path: String,
    /// Position inside the file's diff.
    pub position: usize,
    /// Absolute line in the file, when known.
    pub line: Option<usize>,
    /// Human-readable message.
    pub message: String,
}

impl From<&LocatedError> for JsonIssue {
    fn from(located: &LocatedError) -> Self {
        Self {
            path: located.path.clone(),
            position: located.position,
            line: located.error.line(),
            message: located.error.to_string(),
        }
    }
}

/// Output formatter for human-readable console output.
pub struct HumanOutput<W: Write> {
    writer: W,
    use_colors: bool,
}

impl<W: Write> HumanOutput<W> {
    /// Creates a new human output formatter.
    pub fn new(writer: W, use_colors: bool) -> Self {
        Self { writer, use_colors }
    }

    /// Writes a section header.
    pub fn write_header(&mut self, title: &str) -> std::io::Result<()> {
        let header = format!("==> {}", title);
        if self.use_colors {
            writeln!(self.writer, "\n{}", header.cyan().bold())?;
        } else {
            writeln!(self.writer, "\n{}", header)?;
        }
        Ok(())
    }

    /// Writes a single located issue.
    pub fn write_issue(&mut self, located: &LocatedError) -> std::io::Result<()> {
        let location = format!("{} (position {})", located.path, located.position);
        if self.use_colors {
            writeln!(
                self.writer,
                "  {} {}: {}",
                "[ERROR]".red().bold(),
                location,
                located.error
            )?;
        } else {
            writeln!(self.writer, "  [ERROR] {}: {}", location, located.error)?;
        }
        Ok(())
    }

    /// Writes the non-member list.
    pub fn write_non_members<'a>(
        &mut self,
        users: impl IntoIterator<Item = &'a String>,
    ) -> std::io::Result<()> {
        for user in users {
            if self.use_colors {
                writeln!(self.writer, "  {} @{}", "[WARN]".yellow().bold(), user)?;
            } else {
                writeln!(self.writer, "  [WARN] @{}", user)?;
            }
        }
        Ok(())
    }

    /// Writes a full report of a run.
    pub fn write_outcome(
        &mut self,
        outcome: Option<&ValidationOutcome>,
        dry_run: bool,
    ) -> std::io::Result<()> {
        if let Some(outcome) = outcome {
            let located: Vec<&LocatedError> = outcome.located_errors().collect();
            if !located.is_empty() {
                self.write_header("invalid files")?;
                for issue in located {
                    self.write_issue(issue)?;
                }
            }
            if !outcome.non_members.is_empty() {
                self.write_header("non-members")?;
                self.write_non_members(&outcome.non_members)?;
            }
        }
        self.write_summary(Decision::for_outcome(outcome), outcome, dry_run)
    }

    /// Writes a summary line for the decision.
    pub fn write_summary(
        &mut self,
        decision: Decision,
        outcome: Option<&ValidationOutcome>,
        dry_run: bool,
    ) -> std::io::Result<()> {
        writeln!(self.writer)?;

        let suffix = if dry_run { " (dry run)" } else { "" };
        match decision {
            Decision::Skipped => {
                writeln!(self.writer, "No OWNERS changes to validate{}", suffix)?;
            }
            Decision::Cleared => {
                let message = format!("✓ OWNERS changes are valid{}", suffix);
                if self.use_colors {
                    writeln!(self.writer, "{}", message.green().bold())?;
                } else {
                    writeln!(self.writer, "{}", message)?;
                }
            }
            Decision::Flagged => {
                let (invalid, non_members) = outcome
                    .map(|o| (o.located_errors().count(), o.non_members.len()))
                    .unwrap_or_default();
                let message = format!(
                    "✗ Found {} invalid file(s) and {} non-member(s){}",
                    invalid, non_members, suffix
                );
                if self.use_colors {
                    writeln!(self.writer, "{}", message.red().bold())?;
                } else {
                    writeln!(self.writer, "{}", message)?;
                }
            }
        }
        Ok(())
    }

    /// Writes a startup error.
    pub fn write_error(&mut self, message: &str) -> std::io::Result<()> {
        if self.use_colors {
            writeln!(self.writer, "{} {}", "Error:".red().bold(), message)?;
        } else {
            writeln!(self.writer, "Error: {}", message)?;
        }
        Ok(())
    }
}
