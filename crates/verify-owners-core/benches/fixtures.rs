//! Benchmark fixtures - generated at runtime.
//!
//! Fixtures are generated lazily on first access and cached for the
//! duration of the benchmark run. All generation is deterministic.

use std::fmt::Write;
use std::sync::LazyLock;

/// Fixture sizes as (name, number of entries).
const SIZES: [(&str, usize); 3] = [("small", 10), ("medium", 200), ("large", 5_000)];

/// A flat OWNERS file with `n` approvers, reviewers and labels.
fn flat_owners(n: usize) -> String {
    let mut out = String::from("options:\n  no_parent_owners: true\napprovers:\n");
    for i in 0..n {
        let _ = writeln!(out, "- approver-{}", i);
    }
    out.push_str("reviewers:\n");
    for i in 0..n {
        let _ = writeln!(out, "- reviewer-{}", i);
    }
    out.push_str("labels:\n");
    for i in 0..n.min(20) {
        let _ = writeln!(out, "- area/component-{}", i);
    }
    out
}

/// A filtered OWNERS file with `n` filters.
fn filtered_owners(n: usize) -> String {
    let mut out = String::from("filters:\n");
    for i in 0..n {
        let _ = writeln!(out, "  \"^pkg/module{}/.*\\\\.go$\":", i);
        let _ = writeln!(out, "    approvers:\n    - approver-{}", i);
        let _ = writeln!(out, "    reviewers:\n    - reviewer-{}\n    - sig-{}", i, i % 7);
    }
    out
}

/// An OWNERS_ALIASES file with `n` aliases of five members each.
fn aliases(n: usize) -> String {
    let mut out = String::from("aliases:\n");
    for i in 0..n {
        let _ = writeln!(out, "  sig-{}:", i);
        for j in 0..5 {
            let _ = writeln!(out, "  - member-{}-{}", i, j);
        }
    }
    out
}

/// A patch of `n` hunks, each mixing context, removed and added lines.
fn patch(n: usize) -> String {
    let mut out = String::new();
    for i in 0..n {
        let start = i * 10 + 1;
        let _ = writeln!(out, "@@ -{},4 +{},5 @@ approvers:", start, start);
        let _ = writeln!(out, " - approver-{}", i);
        let _ = writeln!(out, "-- old-approver-{}", i);
        let _ = writeln!(out, "+- new-approver-{}", i);
        let _ = writeln!(out, "+- extra-approver-{}", i);
        let _ = writeln!(out, " reviewers:");
        let _ = writeln!(out, " - reviewer-{}", i);
    }
    out
}

fn build(generator: fn(usize) -> String) -> Vec<(&'static str, String)> {
    SIZES.iter().map(|(name, n)| (*name, generator(*n))).collect()
}

static FLAT: LazyLock<Vec<(&'static str, String)>> = LazyLock::new(|| build(flat_owners));
static FILTERED: LazyLock<Vec<(&'static str, String)>> = LazyLock::new(|| build(filtered_owners));
static ALIASES: LazyLock<Vec<(&'static str, String)>> = LazyLock::new(|| build(aliases));
static PATCHES: LazyLock<Vec<(&'static str, String)>> = LazyLock::new(|| build(patch));

/// Flat OWNERS fixtures.
pub fn flat_fixtures() -> &'static [(&'static str, String)] {
    FLAT.as_slice()
}

/// Filtered OWNERS fixtures.
pub fn filtered_fixtures() -> &'static [(&'static str, String)] {
    FILTERED.as_slice()
}

/// OWNERS_ALIASES fixtures.
pub fn alias_fixtures() -> &'static [(&'static str, String)] {
    ALIASES.as_slice()
}

/// Patch fixtures.
pub fn patch_fixtures() -> &'static [(&'static str, String)] {
    PATCHES.as_slice()
}
