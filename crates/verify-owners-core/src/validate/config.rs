//! Configuration for the OWNERS validator.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Default name of ownership declaration files.
pub const DEFAULT_OWNERS_FILE: &str = "OWNERS";
/// Default name of the alias definitions file.
pub const DEFAULT_ALIASES_FILE: &str = "OWNERS_ALIASES";
/// Default label applied to pull requests with invalid OWNERS changes.
pub const DEFAULT_INVALID_LABEL: &str = "do-not-merge/invalid-owners-file";
/// Default roster location; `{org}` is replaced by the organization name.
pub const DEFAULT_ROSTER_URL: &str =
    "https://raw.githubusercontent.com/kubernetes/org/master/config/{org}/org.yaml";
/// Default link explaining how to become an organization member.
pub const DEFAULT_MEMBERSHIP_DOCS_URL: &str =
    "https://git.k8s.io/community/community-membership.md#member";
/// Default footer appended to the bot's replies.
pub const DEFAULT_ABOUT_BOT: &str = "Instructions for interacting with me using PR comments are available [here](https://git.k8s.io/community/contributors/guide/pull-requests.md).  If you have questions or suggestions related to my behavior, please file an issue against the [kubernetes/test-infra](https://github.com/kubernetes/test-infra/issues/new?title=Prow%20issue:) repository.";

/// Configuration options for a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct VerifyConfig {
    /// File name of ownership declarations, matched against base names.
    pub owners_file: String,
    /// File name of the alias definitions at the repository root.
    pub aliases_file: String,
    /// Label added when a violation is found.
    pub invalid_label: String,
    /// Labels an OWNERS file may not declare.
    pub labels_blacklist: BTreeSet<String>,
    /// Roster URL template.
    pub roster_url: String,
    /// Membership instructions linked from the review.
    pub membership_docs_url: String,
    /// Footer of the review body.
    pub about_bot: String,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            owners_file: DEFAULT_OWNERS_FILE.to_string(),
            aliases_file: DEFAULT_ALIASES_FILE.to_string(),
            invalid_label: DEFAULT_INVALID_LABEL.to_string(),
            labels_blacklist: BTreeSet::new(),
            roster_url: DEFAULT_ROSTER_URL.to_string(),
            membership_docs_url: DEFAULT_MEMBERSHIP_DOCS_URL.to_string(),
            about_bot: DEFAULT_ABOUT_BOT.to_string(),
        }
    }
}

impl VerifyConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the blacklisted labels.
    pub fn with_labels_blacklist<I, S>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.labels_blacklist = labels.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the label added on violations.
    pub fn with_invalid_label(mut self, label: impl Into<String>) -> Self {
        self.invalid_label = label.into();
        self
    }

    /// Sets the roster URL template.
    pub fn with_roster_url(mut self, url: impl Into<String>) -> Self {
        self.roster_url = url.into();
        self
    }

    /// Sets the OWNERS and OWNERS_ALIASES file names.
    pub fn with_file_names(
        mut self,
        owners_file: impl Into<String>,
        aliases_file: impl Into<String>,
    ) -> Self {
        self.owners_file = owners_file.into();
        self.aliases_file = aliases_file.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = VerifyConfig::new();
        assert_eq!(config.owners_file, "OWNERS");
        assert_eq!(config.aliases_file, "OWNERS_ALIASES");
        assert_eq!(config.invalid_label, "do-not-merge/invalid-owners-file");
        assert!(config.labels_blacklist.is_empty());
        assert!(config.roster_url.contains("{org}"));
    }

    #[test]
    fn builder() {
        let config = VerifyConfig::new()
            .with_labels_blacklist(["priority/critical-urgent"])
            .with_invalid_label("invalid-owners")
            .with_file_names("MAINTAINERS", "MAINTAINERS_ALIASES");

        assert!(config.labels_blacklist.contains("priority/critical-urgent"));
        assert_eq!(config.invalid_label, "invalid-owners");
        assert_eq!(config.owners_file, "MAINTAINERS");
        assert_eq!(config.aliases_file, "MAINTAINERS_ALIASES");
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let config: VerifyConfig =
            serde_yaml::from_str("labels_blacklist:\n- priority/critical-urgent\n").unwrap();
        assert_eq!(config.labels_blacklist.len(), 1);
        assert_eq!(config.owners_file, "OWNERS");
    }
}
