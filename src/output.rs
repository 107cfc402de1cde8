//! Terminal rendering for the `check` command.

use colored::Colorize;
use serde::Serialize;

use crate::{
    catalog::Catalog,
    cli::Dialect,
    linter::{AnalysisResult, DiagnosticEntry}
};

/// Output format for results
#[derive(Debug, Clone, Copy, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Yaml
}

/// Output options
#[derive(Debug, Clone)]
pub struct OutputOptions {
    pub format:         OutputFormat,
    pub colored:        bool,
    /// Print the corrected query when there are no diagnostics
    pub show_clean_sql: bool
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            format:         OutputFormat::Text,
            colored:        true,
            show_clean_sql: true
        }
    }
}

/// Check result for serialization
#[derive(Debug, Serialize)]
pub struct CheckReport<'a> {
    pub dialect:        &'static str,
    pub failed:         bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_detail: Option<&'a str>,
    pub diagnostics:    Vec<ReportedDiagnostic<'a>>,
    pub corrected_sql:  &'a str
}

/// Diagnostic with its translated message
#[derive(Debug, Serialize)]
pub struct ReportedDiagnostic<'a> {
    pub code:     &'a str,
    pub line:     u32,
    pub position: u32,
    pub message:  &'a str
}

impl<'a> CheckReport<'a> {
    pub fn new(result: &'a AnalysisResult, catalog: &'a Catalog, dialect: Dialect) -> Self {
        Self {
            dialect:        dialect.as_sqlfluff(),
            failed:         result.invocation_failed,
            failure_detail: result.failure_detail.as_deref(),
            diagnostics:    result
                .diagnostics
                .iter()
                .map(|entry| ReportedDiagnostic::new(entry, catalog))
                .collect(),
            corrected_sql:  &result.corrected_sql
        }
    }
}

impl<'a> ReportedDiagnostic<'a> {
    fn new(entry: &'a DiagnosticEntry, catalog: &'a Catalog) -> Self {
        Self {
            code:     &entry.code,
            line:     entry.line,
            position: entry.position,
            message:  catalog.translate(entry)
        }
    }
}

/// Format a check result based on output options
pub fn format_check_result(
    result: &AnalysisResult,
    catalog: &Catalog,
    dialect: Dialect,
    opts: &OutputOptions
) -> String {
    let report = CheckReport::new(result, catalog, dialect);
    match opts.format {
        OutputFormat::Json => serde_json::to_string_pretty(&report).unwrap_or_default(),
        OutputFormat::Yaml => serde_yaml::to_string(&report).unwrap_or_default(),
        OutputFormat::Text => format_text(&report, catalog, opts)
    }
}

fn format_text(report: &CheckReport<'_>, catalog: &Catalog, opts: &OutputOptions) -> String {
    let messages = &catalog.messages;
    let mut output = String::new();

    if report.failed {
        let header = paint(&messages.failure_header, opts, |s| s.red().bold().to_string());
        output.push_str(&format!("{}\n", header));
        output.push_str(report.failure_detail.unwrap_or("unknown error"));
        output.push('\n');
        return output;
    }

    if report.diagnostics.is_empty() {
        output.push_str(&paint(&messages.clean, opts, |s| s.green().bold().to_string()));
        output.push('\n');
        if !opts.show_clean_sql || report.corrected_sql.trim().is_empty() {
            return output;
        }
    } else {
        let header = paint(&messages.issues_header, opts, |s| s.bold().to_string());
        output.push_str(&format!("{}\n\n", header));
        for diagnostic in &report.diagnostics {
            let code = paint(diagnostic.code, opts, |s| s.yellow().to_string());
            let location = format!("L{}:{}", diagnostic.line, diagnostic.position);
            let location = paint(&location, opts, |s| s.dimmed().to_string());
            output.push_str(&format!("  {} {} {}\n", code, location, diagnostic.message));
        }
    }

    output.push('\n');
    let header = paint(&messages.corrected_header, opts, |s| s.cyan().bold().to_string());
    output.push_str(&format!("{}\n", header));
    output.push_str(report.corrected_sql.trim_end());
    output.push('\n');
    output
}

fn paint(text: &str, opts: &OutputOptions, style: impl Fn(&str) -> String) -> String {
    if opts.colored {
        style(text)
    } else {
        text.to_string()
    }
}
