//! Check trait and runner for parsed OWNERS declarations.
//!
//! Checks run in registration order and stop at the first violation, so a
//! file is reported with at most one error.

mod blacklist;
mod root_approvers;

pub use blacklist::{BlacklistCheck, blacklisted_labels};
pub use root_approvers::RootApproversCheck;

use crate::parse::RoleSet;
use crate::validate::ValidationError;
use crate::validate::config::VerifyConfig;
use log::{debug, trace};

/// Context provided to declaration checks.
#[derive(Debug)]
pub struct DeclarationContext<'a> {
    /// Path of the OWNERS file relative to the repository root.
    pub path: &'a str,
    /// The union of every role set the file declares.
    pub roles: &'a RoleSet,
    /// Configuration options.
    pub config: &'a VerifyConfig,
}

impl<'a> DeclarationContext<'a> {
    /// Creates a new check context.
    pub fn new(path: &'a str, roles: &'a RoleSet, config: &'a VerifyConfig) -> Self {
        Self {
            path,
            roles,
            config,
        }
    }

    /// Returns true if the file governs the repository root.
    pub fn is_root(&self) -> bool {
        !self.path.contains('/')
    }
}

/// A validation check over a parsed declaration.
pub trait Check: Send + Sync {
    /// Returns the name of this check.
    fn name(&self) -> &'static str;

    /// Runs the check and returns the violation, if any.
    fn run(&self, ctx: &DeclarationContext) -> Option<ValidationError>;
}

/// Runs declaration checks in order.
#[derive(Default)]
pub struct CheckRunner {
    checks: Vec<Box<dyn Check>>,
}

impl CheckRunner {
    /// Creates an empty check runner.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a check runner with all built-in checks.
    pub fn with_all_checks() -> Self {
        let mut runner = Self::new();
        runner.add_check(BlacklistCheck::new());
        runner.add_check(RootApproversCheck::new());
        runner
    }

    /// Adds a check.
    pub fn add_check<C: Check + 'static>(&mut self, check: C) {
        self.checks.push(Box::new(check));
    }

    /// Returns the number of registered checks.
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Returns true if no check is registered.
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Runs the checks in order and returns the first violation.
    pub fn first_violation(&self, ctx: &DeclarationContext) -> Option<ValidationError> {
        for check in &self.checks {
            trace!("Running check '{}' on {}", check.name(), ctx.path);
            if let Some(error) = check.run(ctx) {
                debug!("Check '{}' failed for {}: {}", check.name(), ctx.path, error);
                return Some(error);
            }
        }
        None
    }
}

impl std::fmt::Debug for CheckRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.checks.iter().map(|c| c.name()).collect();
        f.debug_struct("CheckRunner").field("checks", &names).finish()
    }
}
