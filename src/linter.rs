//! sqlfluff invocation.
//!
//! Each analysis stages the query in its own temporary `.sql` file, runs
//! `sqlfluff lint` to collect diagnostics, then `sqlfluff fix --force` to
//! rewrite the file in place, and finally reads the file back as the
//! corrected query.
//!
//! ```text
//! ┌─────────┐   ┌──────────────┐   ┌────────────┐   ┌────────────┐
//! │  stage  │──▶│ lint (check) │──▶│ fix --force│──▶│  read back │
//! └─────────┘   └──────────────┘   └────────────┘   └────────────┘
//! ```
//!
//! The staging file is unique per call and removed when the call returns,
//! whichever way it returns, so concurrent analyses never see each other's
//! SQL.
//!
//! Failures to run the tool (missing binary, unexpected exit status,
//! timeout, staging I/O) never escape [`Analyzer::analyze`]: they come back
//! as an [`AnalysisResult`] with `invocation_failed` set.

mod parse;
mod types;

use std::{
    fmt,
    io,
    path::Path,
    process::{Output, Stdio},
    time::Duration
};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tokio::{process::Command, time::timeout};

pub use parse::{parse_diagnostics, parse_line};
pub use types::{AnalysisResult, DiagnosticEntry, DiagnosticVec};
use crate::{
    cli::Dialect,
    config::LinterConfig,
    error::{AppResult, config_error}
};

/// Something that can lint and fix a SQL query.
///
/// Implementations must not fail: problems running the underlying tool are
/// reported through [`AnalysisResult::failed`].
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn analyze(&self, sql: &str) -> AnalysisResult;
}

/// sqlfluff run mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Lint,
    Fix
}

impl Mode {
    fn args(self, dialect: Dialect) -> Vec<&'static str> {
        match self {
            Self::Lint => vec!["lint", "--dialect", dialect.as_sqlfluff()],
            Self::Fix => vec!["fix", "--dialect", dialect.as_sqlfluff(), "--force"]
        }
    }

    /// 0 means clean, 1 means violations were found (or left unfixed)
    fn accepts(self, code: i32) -> bool {
        matches!(code, 0 | 1)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lint => write!(f, "lint"),
            Self::Fix => write!(f, "fix")
        }
    }
}

/// Why a sqlfluff run could not complete
#[derive(Debug)]
enum InvocationError {
    Staging {
        action: &'static str,
        source: io::Error
    },
    Launch {
        program: String,
        source:  io::Error
    },
    Exit {
        mode:   Mode,
        code:   Option<i32>,
        output: String
    },
    Timeout {
        mode:  Mode,
        after: Duration
    }
}

impl fmt::Display for InvocationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Staging {
                action,
                source
            } => write!(f, "failed to {} staging file: {}", action, source),
            Self::Launch {
                program,
                source
            } => write!(f, "failed to launch '{}': {}", program, source),
            Self::Exit {
                mode,
                code: Some(code),
                output
            } => write!(f, "sqlfluff {} exited with status {}: {}", mode, code, output),
            Self::Exit {
                mode,
                code: None,
                output
            } => write!(f, "sqlfluff {} was terminated by a signal: {}", mode, output),
            Self::Timeout {
                mode,
                after
            } => write!(f, "sqlfluff {} timed out after {:?}", mode, after)
        }
    }
}

/// sqlfluff command-line wrapper.
#[derive(Debug, Clone)]
pub struct SqlFluff {
    program:      String,
    leading_args: Vec<String>,
    dialect:      Dialect,
    timeout:      Duration
}

impl SqlFluff {
    /// Create a wrapper around `command` (program plus leading arguments)
    pub fn new(command: &[String], dialect: Dialect, timeout: Duration) -> AppResult<Self> {
        let (program, leading_args) = command
            .split_first()
            .ok_or_else(|| config_error("linter command must name a program"))?;
        Ok(Self {
            program: program.clone(),
            leading_args: leading_args.to_vec(),
            dialect,
            timeout
        })
    }

    pub fn from_config(config: &LinterConfig) -> AppResult<Self> {
        Self::new(&config.command, config.dialect, config.timeout())
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    async fn run(&self, sql: &str) -> Result<AnalysisResult, InvocationError> {
        let staged = stage(sql).await?;
        let path = staged.path();

        let lint = self.invoke(Mode::Lint, path).await?;
        let diagnostics = parse_diagnostics(&String::from_utf8_lossy(&lint.stdout));

        self.invoke(Mode::Fix, path).await?;
        let corrected_sql = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| InvocationError::Staging {
                action: "read",
                source
            })?;

        Ok(AnalysisResult::completed(diagnostics, corrected_sql))
    }

    async fn invoke(&self, mode: Mode, path: &Path) -> Result<Output, InvocationError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.leading_args)
            .args(mode.args(self.dialect))
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        tracing::debug!(
            event = "linter.invoke",
            mode = %mode,
            program = %self.program,
            path = %path.display()
        );

        let child = cmd.spawn().map_err(|source| InvocationError::Launch {
            program: self.program.clone(),
            source
        })?;

        // Dropping the child on timeout kills it
        let output = match timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| InvocationError::Launch {
                program: self.program.clone(),
                source
            })?,
            Err(_) => {
                return Err(InvocationError::Timeout {
                    mode,
                    after: self.timeout
                });
            }
        };

        match output.status.code() {
            Some(code) if mode.accepts(code) => Ok(output),
            code => Err(InvocationError::Exit {
                mode,
                code,
                output: tool_message(&output)
            })
        }
    }
}

#[async_trait]
impl Analyzer for SqlFluff {
    async fn analyze(&self, sql: &str) -> AnalysisResult {
        match self.run(sql).await {
            Ok(result) => {
                tracing::debug!(
                    event = "linter.done",
                    diagnostics = result.diagnostics.len()
                );
                result
            }
            Err(err) => {
                tracing::warn!(event = "linter.failed", error = %err);
                AnalysisResult::failed(err.to_string())
            }
        }
    }
}

/// Write the query to a fresh uniquely named `.sql` file
async fn stage(sql: &str) -> Result<NamedTempFile, InvocationError> {
    let staged = tempfile::Builder::new()
        .prefix("sql-review-")
        .suffix(".sql")
        .tempfile()
        .map_err(|source| InvocationError::Staging {
            action: "create",
            source
        })?;
    tokio::fs::write(staged.path(), sql)
        .await
        .map_err(|source| InvocationError::Staging {
            action: "write",
            source
        })?;
    Ok(staged)
}

/// Most useful text the tool printed: stderr, else stdout
fn tool_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let text = if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout)
    } else {
        stderr
    };
    text.trim().to_string()
}
