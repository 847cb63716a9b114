//! Blacklisted label check.
//!
//! An OWNERS file may not make its directory carry labels the repository
//! reserves for humans (for example priority labels).

use super::{Check, DeclarationContext};
use crate::validate::ValidationError;
use std::collections::BTreeSet;

/// Returns the declared labels that are blacklisted, sorted, or `None`.
pub fn blacklisted_labels(
    labels: &BTreeSet<String>,
    blacklist: &BTreeSet<String>,
) -> Option<Vec<String>> {
    let offending: Vec<String> = labels.intersection(blacklist).cloned().collect();
    if offending.is_empty() {
        None
    } else {
        Some(offending)
    }
}

/// A check that rejects declarations carrying blacklisted labels.
#[derive(Debug, Clone, Default)]
pub struct BlacklistCheck;

impl BlacklistCheck {
    /// Creates a new blacklist check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for BlacklistCheck {
    fn name(&self) -> &'static str {
        "blacklist"
    }

    fn run(&self, ctx: &DeclarationContext) -> Option<ValidationError> {
        blacklisted_labels(&ctx.roles.labels, &ctx.config.labels_blacklist)
            .map(ValidationError::blacklisted_labels)
    }
}
