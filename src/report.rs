//! Chat message rendering for analysis results.
//!
//! Messages use Slack `mrkdwn`: bold headings, one bullet per diagnostic and
//! fenced blocks for SQL and failure details.

use std::sync::Arc;

use crate::{
    catalog::Catalog,
    linter::{AnalysisResult, DiagnosticEntry}
};

/// Turns an [`AnalysisResult`] into the text delivered to the user.
#[derive(Debug, Clone)]
pub struct ReportFormatter {
    catalog:        Arc<Catalog>,
    show_clean_sql: bool
}

impl ReportFormatter {
    /// `show_clean_sql` controls whether a query without issues is echoed
    /// back after the success message.
    pub fn new(catalog: Arc<Catalog>, show_clean_sql: bool) -> Self {
        Self {
            catalog,
            show_clean_sql
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn format(&self, result: &AnalysisResult) -> String {
        let messages = &self.catalog.messages;

        if result.invocation_failed {
            let detail = result.failure_detail.as_deref().unwrap_or("unknown error");
            return format!("*{}*\n{}", messages.failure_header, code_block(detail));
        }

        if result.diagnostics.is_empty() {
            let mut output = messages.clean.clone();
            if self.show_clean_sql && !result.corrected_sql.trim().is_empty() {
                output.push('\n');
                output.push_str(&code_block(&result.corrected_sql));
            }
            return output;
        }

        let mut output = format!("*{}*\n", messages.issues_header);
        for entry in &result.diagnostics {
            output.push_str(&self.bullet(entry));
            output.push('\n');
        }
        output.push('\n');
        output.push_str(&format!("*{}*\n", messages.corrected_header));
        output.push_str(&code_block(&result.corrected_sql));
        output
    }

    fn bullet(&self, entry: &DiagnosticEntry) -> String {
        if self.catalog.contains(&entry.code) {
            format!(
                "• `{}` (L{}:{}) {}",
                entry.code,
                entry.line,
                entry.position,
                self.catalog.translate(entry)
            )
        } else {
            format!("• `{}`", self.catalog.translate(entry))
        }
    }
}

fn code_block(text: &str) -> String {
    format!("```\n{}\n```", text.trim_end())
}
