//! OWNERS Verifier Core
//!
//! A library for validating pull requests that change Kubernetes-style
//! `OWNERS` and `OWNERS_ALIASES` files.
//!
//! # Features
//!
//! - **Diff mapping**: Translate file line numbers into review comment positions
//! - **Parser**: Read OWNERS files in the flat or the filtered schema, and alias tables
//! - **Checks**: Blacklisted labels and mandatory root approvers
//! - **Membership**: Verify listed users against the organization roster
//! - **Handler**: Label and review the pull request in a single decision
//!
//! # Quick Start
//!
//! ```rust
//! use verify_owners_core::diff::position_or_first;
//! use verify_owners_core::parse::parse_declaration;
//!
//! let content = b"approvers:\n- alice\nreviewers: [bob\n";
//! let patch = "@@ -0,0 +1,3 @@\n+approvers:\n+- alice\n+reviewers: [bob";
//!
//! match parse_declaration(content) {
//!     Ok(declaration) => println!("approvers: {:?}", declaration.effective_roles().approvers),
//!     Err(e) => {
//!         let position = position_or_first(patch, e.line);
//!         eprintln!("comment at position {}: Cannot parse file: {}.", position, e);
//!     }
//! }
//! ```
//!
//! # Modules
//!
//! - [`diff`]: Unified diff position mapping
//! - [`parse`]: Parsers for OWNERS and OWNERS_ALIASES files
//! - [`validate`]: Checks, membership roster and the pull request handler

pub mod diff;
pub mod parse;
pub mod validate;

// Re-export commonly used types at the crate root
pub use diff::{DiffPositions, position_or_first};
pub use parse::{AliasTable, ConfigSyntaxError, Declaration, parse_aliases, parse_declaration};
pub use validate::checks::{Check, CheckRunner, DeclarationContext};
pub use validate::{
    OwnersVerifier, PullRequestClient, PullRequestEvent, RosterSource, ValidationOutcome,
    VerifyConfig, VerifyError,
};
