//! Diff position mapping.
//!
//! Review comments are anchored to a *position* inside a file's unified diff
//! rather than to a line of the final file. Position 1 is the line right
//! below the first hunk header, and every following line of the patch
//! (including removed lines and later hunk headers) increments it.
//!
//! # Example
//!
//! ```rust
//! use verify_owners_core::diff::DiffPositions;
//!
//! let patch = "@@ -1,3 +1,4 @@\n approvers:\n - alice\n+- bob\n reviewers:";
//! let positions = DiffPositions::from_patch(patch).unwrap();
//!
//! // New-file line 3 ("- bob") is the third line of the patch body.
//! assert_eq!(positions.position(3), Some(3));
//! ```

mod hunk;

pub use hunk::{HunkHeader, parse_hunk_header};

use log::{trace, warn};
use std::collections::HashMap;
use thiserror::Error;

/// Marker git appends after a line lacking a trailing newline.
const NO_NEWLINE_MARKER: &str = "\\ No newline at end of file";

/// An error raised while walking a unified diff.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiffError {
    /// A line expected to open a hunk could not be parsed.
    #[error("patch line {index}: invalid hunk header '{text}'")]
    InvalidHunkHeader {
        /// Index of the line within the patch (0-based).
        index: usize,
        /// The offending text.
        text: String,
    },

    /// A hunk body line started with an unknown marker.
    #[error("patch line {index}: unexpected line prefix {prefix:?}")]
    BadPrefix {
        /// Index of the line within the patch (0-based).
        index: usize,
        /// The unexpected first character.
        prefix: char,
    },

    /// The patch ended before the hunk covered its announced ranges.
    #[error("patch ended inside the hunk opened at line {header_index}")]
    Truncated {
        /// Index of the hunk header that was left incomplete.
        header_index: usize,
    },
}

/// Lookup table from new-file line numbers to diff positions.
///
/// Only lines present in the patch as added or context lines are mapped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffPositions {
    positions: HashMap<usize, usize>,
}

impl DiffPositions {
    /// Builds the table by walking every hunk of `patch` once.
    ///
    /// An empty patch yields an empty table.
    pub fn from_patch(patch: &str) -> Result<Self, DiffError> {
        let lines: Vec<&str> = patch.lines().collect();
        let mut positions = HashMap::new();
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index];
            if line == NO_NEWLINE_MARKER {
                index += 1;
                continue;
            }

            let header_index = index;
            let (_, header) =
                parse_hunk_header(line).map_err(|_| DiffError::InvalidHunkHeader {
                    index,
                    text: line.to_string(),
                })?;
            trace!("Hunk at patch line {}: {:?}", index, header);

            let mut old_seen = 0;
            let mut new_seen = 0;
            while old_seen < header.old_len || new_seen < header.new_len {
                index += 1;
                let body = lines
                    .get(index)
                    .ok_or(DiffError::Truncated { header_index })?;
                match body.chars().next() {
                    // Some tools strip the single space of an empty context line.
                    Some(' ') | None => {
                        positions.insert(header.new_start + new_seen, index);
                        old_seen += 1;
                        new_seen += 1;
                    }
                    Some('+') => {
                        positions.insert(header.new_start + new_seen, index);
                        new_seen += 1;
                    }
                    Some('-') => old_seen += 1,
                    Some('\\') => {}
                    Some(prefix) => return Err(DiffError::BadPrefix { index, prefix }),
                }
            }
            index += 1;
        }

        Ok(Self { positions })
    }

    /// Returns the diff position of an absolute new-file line, if the patch shows it.
    pub fn position(&self, absolute_line: usize) -> Option<usize> {
        self.positions.get(&absolute_line).copied()
    }

    /// Returns the number of mapped lines.
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if no line is mapped.
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Resolves the review position for an error reported at `absolute_line`.
///
/// Falls back to position 1 when there is no line, when the line is not part
/// of the patch, or when the patch cannot be walked.
pub fn position_or_first(patch: &str, absolute_line: Option<usize>) -> usize {
    let Some(line) = absolute_line else {
        return 1;
    };
    match DiffPositions::from_patch(patch) {
        Ok(positions) => positions.position(line).unwrap_or(1),
        Err(e) => {
            warn!("Failed to compute diff positions: {}", e);
            1
        }
    }
}
