//! Validation of OWNERS changes in a pull request.
//!
//! [`OwnersVerifier`] drives a run: it lists the changed files through a
//! [`PullRequestClient`], parses every OWNERS and OWNERS_ALIASES change, runs
//! the declaration [`checks`], cross-references listed users against the
//! organization roster and finally labels and reviews the pull request.
//!
//! # Example
//!
//! ```rust,ignore
//! use verify_owners_core::validate::{HttpRoster, OwnersVerifier, VerifyConfig};
//!
//! let config = VerifyConfig::new().with_labels_blacklist(["priority/critical-urgent"]);
//! let roster = HttpRoster::new(&config.roster_url);
//! let verifier = OwnersVerifier::new(&client, &roster, config);
//!
//! if let Some(outcome) = verifier.handle_pull_request(&event).await? {
//!     println!("violations: {}", outcome.has_any_violation());
//! }
//! ```

pub mod checks;
mod config;
mod error;
mod event;
pub mod github_client;
mod handler;
pub mod membership;
mod outcome;

#[cfg(test)]
mod testing;

pub use config::{
    DEFAULT_ABOUT_BOT, DEFAULT_ALIASES_FILE, DEFAULT_INVALID_LABEL, DEFAULT_MEMBERSHIP_DOCS_URL,
    DEFAULT_OWNERS_FILE, DEFAULT_ROSTER_URL, VerifyConfig,
};
pub use error::{LocatedError, ValidationError, VerifyError};
pub use event::{Account, GitRef, Label, PullRequest, PullRequestAction, PullRequestEvent, Repository};
pub use github_client::{
    ChangedFile, DraftReview, DraftReviewComment, FileStatus, GithubClientError,
    PullRequestClient, ReviewAction, ReviewComment,
};
pub use handler::OwnersVerifier;
pub use membership::{HttpRoster, MembershipCache, RosterError, RosterSource, parse_roster};
pub use outcome::{COMMENT_SIGNATURE, ValidationOutcome, format_response, is_signed, sign};
