//! Outcome of a validation run and the review built from it.

use super::config::VerifyConfig;
use super::error::LocatedError;
use super::event::PullRequestEvent;
use super::github_client::{DraftReview, DraftReviewComment, ReviewAction};
use serde::Serialize;
use std::collections::BTreeSet;

/// Hidden marker carried by every comment this plugin posts.
pub const COMMENT_SIGNATURE: &str = "<!-- verify-owners -->";

/// Appends the hidden signature to a comment body.
pub fn sign(body: &str) -> String {
    format!("{}\n\n{}", body, COMMENT_SIGNATURE)
}

/// Returns true if a comment body was posted by this plugin.
pub fn is_signed(body: &str) -> bool {
    body.contains(COMMENT_SIGNATURE)
}

/// Formats a bot reply addressed to the pull request author.
///
/// The pull request description is quoted inside a collapsed block, followed
/// by the `about` footer.
pub fn format_response(author: &str, reply: &str, pr_body: &str, pr_url: &str, about: &str) -> String {
    let quoted: Vec<String> = pr_body.split('\n').map(|line| format!(">{}", line)).collect();
    let reason = format!("In response to [this]({}):\n\n{}\n", pr_url, quoted.join("\n"));
    format!(
        "@{}: {}\n\n<details>\n\n{}\n\n{}\n</details>",
        author, reply, reason, about
    )
}

/// Everything a validation run found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// One error per invalid OWNERS file, in change-list order.
    pub file_errors: Vec<LocatedError>,
    /// The error of the alias definitions file, if it is invalid.
    pub alias_error: Option<LocatedError>,
    /// Listed users that are not organization members.
    pub non_members: BTreeSet<String>,
}

impl ValidationOutcome {
    /// Creates an empty outcome.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the run found anything to report.
    pub fn has_any_violation(&self) -> bool {
        !self.file_errors.is_empty() || self.alias_error.is_some() || !self.non_members.is_empty()
    }

    /// Returns every located error, alias file last.
    pub fn located_errors(&self) -> impl Iterator<Item = &LocatedError> {
        self.file_errors.iter().chain(self.alias_error.iter())
    }

    /// Builds the summary text listing the violations.
    pub fn summary(&self, org: &str, config: &VerifyConfig) -> String {
        let mut lines = vec![format!(
            "Adding the {} label because of the following errors:",
            config.invalid_label
        )];

        let invalid_files = self.file_errors.len();
        if invalid_files > 0 {
            let plural = if invalid_files == 1 { "" } else { "s" };
            lines.push(format!(
                "- {} invalid {} file{}",
                invalid_files, config.owners_file, plural
            ));
        }
        if self.alias_error.is_some() {
            lines.push(format!("- An invalid {} file", config.aliases_file));
        }
        if !self.non_members.is_empty() {
            lines.push(format!(
                "- The following users are not members of the {} GitHub org. Membership is mandatory for being listed in an {} file. Instructions for applying for membership can be found [here]({}).",
                org, config.owners_file, config.membership_docs_url
            ));
            lines.extend(self.non_members.iter().map(|user| format!("  - @{}", user)));
        }

        lines.join("\n")
    }

    /// Builds the single review posted for this outcome.
    pub fn to_review(&self, event: &PullRequestEvent, config: &VerifyConfig) -> DraftReview {
        let pr = &event.pull_request;
        let body = format_response(
            &pr.user.login,
            &self.summary(event.org(), config),
            pr.body.as_deref().unwrap_or_default(),
            &pr.html_url,
            &config.about_bot,
        );

        DraftReview {
            commit_sha: event.head_sha().map(str::to_string),
            body: sign(&body),
            action: ReviewAction::Comment,
            comments: self
                .located_errors()
                .map(|located| DraftReviewComment {
                    path: located.path.clone(),
                    position: located.position,
                    body: sign(&located.error.to_string()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validate::ValidationError;

    fn event() -> PullRequestEvent {
        serde_json::from_value(serde_json::json!({
            "action": "opened",
            "number": 7,
            "repository": { "name": "repo", "owner": { "login": "acme" } },
            "pull_request": {
                "number": 7,
                "body": "first line\nsecond line",
                "html_url": "https://github.com/acme/repo/pull/7",
                "user": { "login": "alice" },
                "head": { "sha": "abc123", "ref": "feature" },
                "base": { "sha": "def456", "ref": "main" }
            }
        }))
        .unwrap()
    }

    fn unparseable(path: &str, position: usize) -> LocatedError {
        LocatedError::new(path, position, ValidationError::unparseable("bad yaml", None))
    }

    #[test]
    fn signature_round_trip() {
        let body = sign("hello");
        assert!(body.starts_with("hello"));
        assert!(is_signed(&body));
        assert!(!is_signed("hello"));
    }

    #[test]
    fn format_response_quotes_description() {
        let response = format_response("bob", "reply", "a\nb", "https://pr", "about");
        assert!(response.starts_with("@bob: reply\n\n<details>"));
        assert!(response.contains("In response to [this](https://pr):\n\n>a\n>b\n"));
        assert!(response.ends_with("about\n</details>"));
    }

    #[test]
    fn empty_outcome_has_no_violation() {
        assert!(!ValidationOutcome::new().has_any_violation());
    }

    #[test]
    fn any_signal_is_a_violation() {
        let mut outcome = ValidationOutcome::new();
        outcome.non_members.insert("mallory".to_string());
        assert!(outcome.has_any_violation());

        let outcome = ValidationOutcome {
            alias_error: Some(unparseable("OWNERS_ALIASES", 1)),
            ..ValidationOutcome::default()
        };
        assert!(outcome.has_any_violation());
    }

    #[test]
    fn summary_lists_every_signal() {
        let outcome = ValidationOutcome {
            file_errors: vec![unparseable("OWNERS", 4), unparseable("pkg/OWNERS", 1)],
            alias_error: Some(unparseable("OWNERS_ALIASES", 2)),
            non_members: ["zed", "mallory"].iter().map(|s| s.to_string()).collect(),
        };
        let summary = outcome.summary("acme", &VerifyConfig::new());
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(
            lines[0],
            "Adding the do-not-merge/invalid-owners-file label because of the following errors:"
        );
        assert_eq!(lines[1], "- 2 invalid OWNERS files");
        assert_eq!(lines[2], "- An invalid OWNERS_ALIASES file");
        assert!(lines[3].contains("not members of the acme GitHub org"));
        assert_eq!(lines[4], "  - @mallory");
        assert_eq!(lines[5], "  - @zed");
    }

    #[test]
    fn summary_singular_file() {
        let outcome = ValidationOutcome {
            file_errors: vec![unparseable("OWNERS", 4)],
            ..ValidationOutcome::default()
        };
        let summary = outcome.summary("acme", &VerifyConfig::new());
        assert!(summary.ends_with("- 1 invalid OWNERS file"));
    }

    #[test]
    fn review_has_one_comment_per_located_error() {
        let outcome = ValidationOutcome {
            file_errors: vec![unparseable("OWNERS", 4)],
            alias_error: Some(unparseable("OWNERS_ALIASES", 2)),
            ..ValidationOutcome::default()
        };
        let review = outcome.to_review(&event(), &VerifyConfig::new());

        assert_eq!(review.commit_sha.as_deref(), Some("abc123"));
        assert_eq!(review.action, ReviewAction::Comment);
        assert!(review.body.starts_with("@alice: Adding the"));
        assert!(review.body.contains(">second line"));
        assert!(is_signed(&review.body));

        assert_eq!(review.comments.len(), 2);
        assert_eq!(review.comments[0].path, "OWNERS");
        assert_eq!(review.comments[0].position, 4);
        assert!(review.comments[0].body.starts_with("Cannot parse file: bad yaml."));
        assert!(is_signed(&review.comments[0].body));
        assert_eq!(review.comments[1].path, "OWNERS_ALIASES");
    }
}
