//! Parsing of sqlfluff's human-readable lint output.
//!
//! A diagnostic line carries a location marker followed by the rule code
//! and, usually, a description:
//!
//! ```text
//! == [/tmp/.tmpX1b2.sql] FAIL
//! L:   1 | P:   1 | LT05 | Line is too long (97 > 80). [layout.long_lines]
//! L:   3 | P:  12 | CP01 | Keywords must be consistently upper case.
//! All Finished 📜 🎉!
//! ```
//!
//! Everything else (file headers, summaries, warnings) is tool chatter and
//! is skipped.

use std::sync::LazyLock;

use compact_str::CompactString;
use regex::Regex;

use super::types::{DiagnosticEntry, DiagnosticVec};

/// Matches `L: <line> | P: <pos> | <CODE>` with an optional `| <description>`.
static DIAGNOSTIC_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*L:\s*(\d+)\s*\|\s*P:\s*(\d+)\s*\|\s*([^\s|]+)\s*(?:\|\s*(.*?))?\s*$")
        .expect("valid regex")
});

/// Parse lint output into diagnostics, keeping the tool's order.
pub fn parse_diagnostics(output: &str) -> DiagnosticVec {
    output.lines().filter_map(parse_line).collect()
}

/// Parse a single output line, `None` for anything that is not a diagnostic.
pub fn parse_line(line: &str) -> Option<DiagnosticEntry> {
    let cap = DIAGNOSTIC_REGEX.captures(line)?;
    let line_no = cap.get(1)?.as_str().parse().ok()?;
    let position = cap.get(2)?.as_str().parse().ok()?;
    let code = CompactString::from(cap.get(3)?.as_str());
    let description = cap
        .get(4)
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    Some(DiagnosticEntry {
        code,
        raw_line: line.trim().to_string(),
        line: line_no,
        position,
        description
    })
}
