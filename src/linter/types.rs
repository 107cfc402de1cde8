//! Type definitions for linter results.
//!
//! - [`DiagnosticEntry`] - One issue reported by the linter
//! - [`AnalysisResult`] - Everything a single linter run produced

use compact_str::CompactString;
use serde::Serialize;
use smallvec::SmallVec;

/// Diagnostics in tool output order (typically < 8 per query)
pub type DiagnosticVec = SmallVec<[DiagnosticEntry; 8]>;

/// A single issue reported by the linter's check run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiagnosticEntry {
    /// Rule code (e.g., "L016", "LT05")
    pub code:        CompactString,
    /// The tool's output line, verbatim
    pub raw_line:    String,
    /// One-based line in the submitted SQL
    pub line:        u32,
    /// One-based position within the line
    pub position:    u32,
    /// Tool-provided description, empty when absent
    pub description: String
}

/// Outcome of linting and fixing one query.
///
/// `invocation_failed` separates a tool that could not run from a clean
/// query: both have no diagnostics.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisResult {
    /// Issues in the order the tool reported them
    pub diagnostics:       DiagnosticVec,
    /// Staged SQL after the fix run
    pub corrected_sql:     String,
    /// The tool could not be run to completion
    pub invocation_failed: bool,
    /// What went wrong when `invocation_failed` is set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail:    Option<String>
}

impl AnalysisResult {
    pub fn completed(diagnostics: DiagnosticVec, corrected_sql: String) -> Self {
        Self {
            diagnostics,
            corrected_sql,
            invocation_failed: false,
            failure_detail: None
        }
    }

    pub fn failed(detail: impl Into<String>) -> Self {
        Self {
            diagnostics:       DiagnosticVec::new(),
            corrected_sql:     String::new(),
            invocation_failed: true,
            failure_detail:    Some(detail.into())
        }
    }

    /// True when the tool ran and reported nothing
    pub fn is_clean(&self) -> bool {
        !self.invocation_failed && self.diagnostics.is_empty()
    }
}
