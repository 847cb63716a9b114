//! Root approvers check.

use super::{Check, DeclarationContext};
use crate::validate::ValidationError;

/// A check that requires the repository root OWNERS file to list approvers.
///
/// Every other directory inherits approvers from its parents, so only the
/// root file is required to name someone.
#[derive(Debug, Clone, Default)]
pub struct RootApproversCheck;

impl RootApproversCheck {
    /// Creates a new root approvers check.
    pub fn new() -> Self {
        Self
    }
}

impl Check for RootApproversCheck {
    fn name(&self) -> &'static str {
        "root-approvers"
    }

    fn run(&self, ctx: &DeclarationContext) -> Option<ValidationError> {
        if ctx.is_root() && ctx.roles.approvers.is_empty() {
            Some(ValidationError::no_root_approvers(&ctx.config.owners_file))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::RoleSet;
    use crate::validate::config::VerifyConfig;

    fn run_check(path: &str, approvers: &[&str]) -> Option<ValidationError> {
        let roles = RoleSet {
            approvers: approvers.iter().map(|s| s.to_string()).collect(),
            reviewers: ["carol".to_string()].into_iter().collect(),
            ..RoleSet::default()
        };
        let config = VerifyConfig::new();
        let ctx = DeclarationContext::new(path, &roles, &config);
        RootApproversCheck::new().run(&ctx)
    }

    #[test]
    fn root_without_approvers_fails() {
        assert_eq!(
            run_check("OWNERS", &[]),
            Some(ValidationError::no_root_approvers("OWNERS"))
        );
    }

    #[test]
    fn root_with_approvers_passes() {
        assert_eq!(run_check("OWNERS", &["alice"]), None);
    }

    #[test]
    fn nested_without_approvers_passes() {
        assert_eq!(run_check("pkg/api/OWNERS", &[]), None);
    }

    #[test]
    fn uses_configured_file_name() {
        let roles = RoleSet::default();
        let config = VerifyConfig::new().with_file_names("OWNERS.yaml", "OWNERS_ALIASES");
        let ctx = DeclarationContext::new("OWNERS.yaml", &roles, &config);
        let error = RootApproversCheck::new().run(&ctx).unwrap();
        assert!(error.to_string().contains("OWNERS.yaml"));
    }
}
