//! Parsing of Makefile-style dependency rules.

use cobble_common::UnitPath;

/// Parses dependency-rule text into a flat, ordered list of paths.
///
/// On every line the portion up to and including the first `:` (the rule's
/// target) is discarded, line-continuation backslashes are dropped, and the
/// rest is split on whitespace. Order and repetitions are preserved.
pub fn parse_rules(text: &str) -> Vec<UnitPath> {
    text.lines()
        .map(|line| line.split_once(':').map_or(line, |(_, rest)| rest))
        .map(|line| line.trim_end().strip_suffix('\\').unwrap_or(line))
        .flat_map(str::split_whitespace)
        .map(UnitPath::new)
        .collect()
}
