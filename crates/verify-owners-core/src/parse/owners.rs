//! OWNERS declaration parser.
//!
//! An OWNERS file uses one of two schemas:
//!
//! - **Flat**: role lists at the top level of the document.
//! - **Filtered**: a `filters` mapping from path regular expressions to role lists.
//!
//! The flat schema is tried first. A flat parse that fails, or that succeeds
//! without declaring any role, falls through to the filtered schema, and only
//! the filtered schema's error is reported.

use super::error::ConfigSyntaxError;
use super::normalize_login;
use log::{debug, trace};
use regex::Regex;
use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Options shared by both schemas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DirOptions {
    /// Stops approval inheritance from parent directories.
    pub no_parent_owners: bool,
}

/// The role lists declared for a directory or a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct RoleSet {
    /// Users allowed to approve changes.
    #[serde(deserialize_with = "nullable_set")]
    pub approvers: BTreeSet<String>,
    /// Users suggested as reviewers.
    #[serde(deserialize_with = "nullable_set")]
    pub reviewers: BTreeSet<String>,
    /// Users whose review is mandatory.
    #[serde(deserialize_with = "nullable_set")]
    pub required_reviewers: BTreeSet<String>,
    /// Labels applied to matching changes.
    #[serde(deserialize_with = "nullable_set")]
    pub labels: BTreeSet<String>,
}

impl RoleSet {
    /// Returns true if no role and no label is declared.
    pub fn is_empty(&self) -> bool {
        self.approvers.is_empty()
            && self.reviewers.is_empty()
            && self.required_reviewers.is_empty()
            && self.labels.is_empty()
    }

    /// Returns every listed login: approvers, reviewers and required reviewers.
    pub fn users(&self) -> BTreeSet<String> {
        self.approvers
            .iter()
            .chain(&self.reviewers)
            .chain(&self.required_reviewers)
            .cloned()
            .collect()
    }

    /// Adds every entry of `other` to this set.
    pub fn merge(&mut self, other: &RoleSet) {
        self.approvers.extend(other.approvers.iter().cloned());
        self.reviewers.extend(other.reviewers.iter().cloned());
        self.required_reviewers
            .extend(other.required_reviewers.iter().cloned());
        self.labels.extend(other.labels.iter().cloned());
    }

    fn normalized(self) -> Self {
        Self {
            approvers: normalize_logins(self.approvers),
            reviewers: normalize_logins(self.reviewers),
            required_reviewers: normalize_logins(self.required_reviewers),
            labels: self.labels,
        }
    }
}

fn normalize_logins(logins: BTreeSet<String>) -> BTreeSet<String> {
    logins
        .iter()
        .map(|login| normalize_login(login))
        .filter(|login| !login.is_empty())
        .collect()
}

/// A declaration using the flat schema.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatDeclaration {
    /// Directory options.
    pub options: DirOptions,
    /// The declared roles.
    pub roles: RoleSet,
}

/// One entry of a filtered declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterRule {
    /// Regular expression matched against file paths.
    pub path_pattern: String,
    /// Roles applying to matching files.
    pub roles: RoleSet,
}

/// A declaration using the filtered schema, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilteredDeclaration {
    /// Directory options.
    pub options: DirOptions,
    /// The filters, in the order they appear in the file.
    pub filters: Vec<FilterRule>,
}

/// A successfully parsed OWNERS file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Declaration {
    /// Top-level role lists.
    Flat(FlatDeclaration),
    /// Per-path filters.
    Filtered(FilteredDeclaration),
}

impl Declaration {
    /// Returns the roles that apply when validating the file.
    ///
    /// For a filtered declaration this is the union of all filters.
    pub fn effective_roles(&self) -> RoleSet {
        match self {
            Declaration::Flat(flat) => flat.roles.clone(),
            Declaration::Filtered(filtered) => {
                let mut roles = RoleSet::default();
                for filter in &filtered.filters {
                    roles.merge(&filter.roles);
                }
                roles
            }
        }
    }

    /// Returns the directory options.
    pub fn options(&self) -> DirOptions {
        match self {
            Declaration::Flat(flat) => flat.options,
            Declaration::Filtered(filtered) => filtered.options,
        }
    }

    /// Returns true for the flat schema.
    pub fn is_flat(&self) -> bool {
        matches!(self, Declaration::Flat(_))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FlatDocument {
    options: DirOptions,
    #[serde(deserialize_with = "nullable_set")]
    approvers: BTreeSet<String>,
    #[serde(deserialize_with = "nullable_set")]
    reviewers: BTreeSet<String>,
    #[serde(deserialize_with = "nullable_set")]
    required_reviewers: BTreeSet<String>,
    #[serde(deserialize_with = "nullable_set")]
    labels: BTreeSet<String>,
}

impl FlatDocument {
    // Role lists are top-level fields rather than a flattened RoleSet, so
    // plain scalars such as all-digit logins still read as strings.
    fn into_parts(self) -> (DirOptions, RoleSet) {
        let roles = RoleSet {
            approvers: self.approvers,
            reviewers: self.reviewers,
            required_reviewers: self.required_reviewers,
            labels: self.labels,
        };
        (self.options, roles)
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FilteredDocument {
    options: DirOptions,
    #[serde(deserialize_with = "ordered_filters")]
    filters: Vec<FilterRule>,
}

/// Reads a role list, treating an explicit null as empty.
fn nullable_set<'de, D>(deserializer: D) -> Result<BTreeSet<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<BTreeSet<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reads the `filters` mapping without losing its order.
fn ordered_filters<'de, D>(deserializer: D) -> Result<Vec<FilterRule>, D::Error>
where
    D: Deserializer<'de>,
{
    struct FiltersVisitor;

    impl<'de> Visitor<'de> for FiltersVisitor {
        type Value = Vec<FilterRule>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a mapping from path patterns to role lists")
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_none<E>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut filters = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((path_pattern, roles)) = map.next_entry::<String, RoleSet>()? {
                filters.push(FilterRule {
                    path_pattern,
                    roles: roles.normalized(),
                });
            }
            Ok(filters)
        }
    }

    deserializer.deserialize_map(FiltersVisitor)
}

/// Returns true if the document holds nothing but blanks, comments and markers.
pub(crate) fn is_blank_document(content: &[u8]) -> bool {
    String::from_utf8_lossy(content).lines().all(|line| {
        let line = line.trim();
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// Parses an OWNERS file.
///
/// # Example
///
/// ```rust
/// use verify_owners_core::parse::{parse_declaration, Declaration};
///
/// let declaration = parse_declaration(b"approvers:\n- Alice\nreviewers:\n- bob\n").unwrap();
/// assert!(declaration.is_flat());
/// assert!(declaration.effective_roles().approvers.contains("alice"));
///
/// let filtered = parse_declaration(b"filters:\n  \".*\":\n    approvers:\n    - carol\n").unwrap();
/// assert!(matches!(filtered, Declaration::Filtered(_)));
/// ```
pub fn parse_declaration(content: &[u8]) -> Result<Declaration, ConfigSyntaxError> {
    if is_blank_document(content) {
        debug!("OWNERS document is blank, treating it as an empty filtered declaration");
        return Ok(Declaration::Filtered(FilteredDeclaration::default()));
    }

    match serde_yaml::from_slice::<FlatDocument>(content).map(FlatDocument::into_parts) {
        Ok((options, roles)) if !roles.is_empty() => {
            trace!("Parsed flat OWNERS declaration");
            return Ok(Declaration::Flat(FlatDeclaration {
                options,
                roles: roles.normalized(),
            }));
        }
        Ok(_) => debug!("Flat schema declared no roles, trying filtered schema"),
        Err(e) => debug!("Flat schema failed ({}), trying filtered schema", e),
    }

    let filtered: FilteredDocument =
        serde_yaml::from_slice(content).map_err(|e| ConfigSyntaxError::from_yaml(&e))?;

    for filter in &filtered.filters {
        if let Err(e) = Regex::new(&filter.path_pattern) {
            return Err(ConfigSyntaxError::without_line(format!(
                "invalid filter pattern '{}': {}",
                filter.path_pattern, e
            )));
        }
    }

    trace!(
        "Parsed filtered OWNERS declaration with {} filter(s)",
        filtered.filters.len()
    );
    Ok(Declaration::Filtered(FilteredDeclaration {
        options: filtered.options,
        filters: filtered.filters,
    }))
}
