//! Parsers for OWNERS and OWNERS_ALIASES files.
//!
//! # Example
//!
//! ```rust
//! use verify_owners_core::parse::{parse_aliases, parse_declaration};
//!
//! let aliases = parse_aliases(b"aliases:\n  approvers-team:\n  - alice\n").unwrap();
//! let declaration = parse_declaration(b"approvers:\n- approvers-team\n- bob\n").unwrap();
//!
//! let users = aliases.expand(&declaration.effective_roles().users());
//! assert!(users.contains("alice"));
//! assert!(users.contains("bob"));
//! ```

mod aliases;
mod error;
mod owners;

pub use aliases::{AliasTable, parse_aliases};
pub use error::{ConfigSyntaxError, extract_line_number};
pub use owners::{
    Declaration, DirOptions, FilterRule, FilteredDeclaration, FlatDeclaration, RoleSet,
    parse_declaration,
};

/// Normalizes a GitHub login: trims whitespace, drops a leading `@` and lower-cases it.
pub fn normalize_login(login: &str) -> String {
    login.trim().trim_start_matches('@').to_lowercase()
}
