//! Hunk header parser for unified diffs.
//!
//! Parses lines of the form `@@ -12,7 +12,8 @@ optional section heading`.

use nom::{
    IResult, Parser,
    bytes::complete::tag,
    character::complete::{char, digit1},
    combinator::{map_res, opt, rest},
    sequence::preceded,
};

/// The line ranges announced by a hunk header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkHeader {
    /// First line of the hunk in the old file (1-based).
    pub old_start: usize,
    /// Number of old-file lines covered by the hunk.
    pub old_len: usize,
    /// First line of the hunk in the new file (1-based).
    pub new_start: usize,
    /// Number of new-file lines covered by the hunk.
    pub new_len: usize,
}

fn number(input: &str) -> IResult<&str, usize> {
    map_res(digit1, |digits: &str| digits.parse::<usize>()).parse(input)
}

/// Parses `start[,len]`. An omitted length means a single line.
fn range(input: &str) -> IResult<&str, (usize, usize)> {
    (number, opt(preceded(char(','), number)))
        .map(|(start, len)| (start, len.unwrap_or(1)))
        .parse(input)
}

/// Parses a complete hunk header line.
pub fn parse_hunk_header(input: &str) -> IResult<&str, HunkHeader> {
    (tag("@@ -"), range, tag(" +"), range, tag(" @@"), rest)
        .map(
            |(_, (old_start, old_len), _, (new_start, new_len), _, _)| HunkHeader {
                old_start,
                old_len,
                new_start,
                new_len,
            },
        )
        .parse(input)
}
