//! OWNERS_ALIASES parsing and alias expansion.
//!
//! Aliases are expanded one level deep only. A member of an alias that is
//! itself an alias name is kept as a literal login.

use super::error::ConfigSyntaxError;
use super::normalize_login;
use super::owners::is_blank_document;
use log::{debug, trace};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AliasesDocument {
    aliases: Option<BTreeMap<String, Option<Vec<String>>>>,
}

/// A mapping from alias names to the logins they stand for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    aliases: BTreeMap<String, BTreeSet<String>>,
}

impl AliasTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) an alias. Names and members are normalized.
    pub fn insert<I, S>(&mut self, alias: &str, members: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let members = members
            .into_iter()
            .map(|member| normalize_login(member.as_ref()))
            .filter(|member| !member.is_empty())
            .collect();
        self.aliases.insert(normalize_login(alias), members);
    }

    /// Returns the members of an alias.
    pub fn get(&self, alias: &str) -> Option<&BTreeSet<String>> {
        self.aliases.get(&normalize_login(alias))
    }

    /// Returns true if `name` is a defined alias.
    pub fn is_alias(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the number of aliases.
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// Returns true if no alias is defined.
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Expands role-list entries into concrete logins.
    ///
    /// Entries that are not aliases are kept as they are; alias entries are
    /// replaced by their members and never appear in the result themselves.
    pub fn expand<I, S>(&self, entries: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut users = BTreeSet::new();
        for entry in entries {
            let entry = entry.as_ref();
            match self.get(entry) {
                Some(members) => {
                    trace!("Expanding alias {} into {} member(s)", entry, members.len());
                    users.extend(members.iter().cloned());
                }
                None => {
                    users.insert(normalize_login(entry));
                }
            }
        }
        users.remove("");
        users
    }

    /// Returns every login referenced by any alias.
    pub fn all_users(&self) -> BTreeSet<String> {
        self.aliases.values().flatten().cloned().collect()
    }
}

/// Parses an OWNERS_ALIASES file.
///
/// # Example
///
/// ```rust
/// use verify_owners_core::parse::parse_aliases;
///
/// let table = parse_aliases(b"aliases:\n  sig-docs:\n  - alice\n  - bob\n").unwrap();
/// let users = table.expand(["sig-docs", "carol"]);
/// assert_eq!(users.len(), 3);
/// assert!(!users.contains("sig-docs"));
/// ```
pub fn parse_aliases(content: &[u8]) -> Result<AliasTable, ConfigSyntaxError> {
    if is_blank_document(content) {
        debug!("OWNERS_ALIASES document is blank");
        return Ok(AliasTable::new());
    }

    let document: AliasesDocument =
        serde_yaml::from_slice(content).map_err(|e| ConfigSyntaxError::from_yaml(&e))?;

    let mut table = AliasTable::new();
    for (alias, members) in document.aliases.unwrap_or_default() {
        table.insert(&alias, members.unwrap_or_default());
    }
    debug!("Parsed {} alias(es)", table.len());
    Ok(table)
}
