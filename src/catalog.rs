//! Message catalogs: chat-facing strings and diagnostic translations.
//!
//! A catalog is plain data loaded once at startup and shared read-only
//! between all requests. Two catalogs ship with the binary (`en` and
//! `pt-BR`); a deployment can point `report.catalog` at its own file in
//! TOML, YAML or JSON:
//!
//! ```toml
//! locale = "en"
//!
//! [messages]
//! missing_query = "No SQL query found!"
//! clean = "No issues found in the query!"
//!
//! [codes]
//! L016 = "Line is too long: break the statement across several lines."
//! ```
//!
//! Missing `[messages]` keys fall back to the English defaults. Codes that
//! are not in `[codes]` are shown with the tool's own line.

use std::{fs, path::Path};

use compact_str::CompactString;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{
    config::ReportConfig,
    error::{AppResult, catalog_error, file_read_error},
    linter::DiagnosticEntry
};

const BUILTIN_EN: &str = include_str!("../catalogs/en.toml");
const BUILTIN_PT_BR: &str = include_str!("../catalogs/pt-BR.toml");

/// Chat-facing strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Messages {
    /// Synchronous reply when the command has no SQL
    pub missing_query:    String,
    /// Acknowledgment for an accepted query
    pub processing:       String,
    /// Acknowledgment when the worker limit is reached
    pub busy:             String,
    /// Result when the linter reports nothing
    pub clean:            String,
    /// Heading above the diagnostic bullets
    pub issues_header:    String,
    /// Heading above the corrected SQL block
    pub corrected_header: String,
    /// Heading above the failure detail
    pub failure_header:   String
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            missing_query:    String::from("No SQL query found!"),
            processing:       String::from("Reviewing your query..."),
            busy:             String::from("Too many queries in review. Please try again shortly."),
            clean:            String::from("No issues found in the query!"),
            issues_header:    String::from("Lint results:"),
            corrected_header: String::from("Corrected query:"),
            failure_header:   String::from("Could not analyze the query:")
        }
    }
}

/// Diagnostic code to message mapping plus chat strings for one locale.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub locale:   String,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub codes:    IndexMap<CompactString, String>
}

impl Catalog {
    /// Built-in catalog for `locale` (`en` or `pt-BR`, case-insensitive)
    pub fn builtin(locale: &str) -> AppResult<Self> {
        let source = match locale.to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => BUILTIN_EN,
            "pt" | "pt-br" => BUILTIN_PT_BR,
            other => return Err(catalog_error(format!("no built-in catalog for '{}'", other)))
        };
        Self::from_toml_str(source)
    }

    /// Load a catalog file, picking the format from its extension
    pub fn load(path: &Path) -> AppResult<Self> {
        let display = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|e| file_read_error(&display, e))?;
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        match extension.as_deref() {
            Some("toml") => Self::from_toml_str(&content),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| catalog_error(format!("invalid YAML in '{}': {}", display, e))),
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| catalog_error(format!("invalid JSON in '{}': {}", display, e))),
            _ => Err(catalog_error(format!(
                "unsupported catalog format for '{}' (expected .toml, .yaml or .json)",
                display
            )))
        }
    }

    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        toml::from_str(content).map_err(|e| catalog_error(format!("invalid TOML: {}", e)))
    }

    /// Catalog selected by the report configuration
    pub fn from_config(config: &ReportConfig) -> AppResult<Self> {
        match &config.catalog {
            Some(path) => Self::load(path),
            None => Self::builtin(&config.locale)
        }
    }

    /// Message for a diagnostic, or the tool's own line for unknown codes
    pub fn translate<'a>(&'a self, entry: &'a DiagnosticEntry) -> &'a str {
        self.codes
            .get(entry.code.as_str())
            .map(String::as_str)
            .unwrap_or(&entry.raw_line)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.codes.contains_key(code)
    }
}
