//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicUsize, Ordering}
    },
    time::Duration
};

use async_trait::async_trait;
use sql_review_bot::{
    command::OutboundMessage,
    delivery::DeliveryChannel,
    error::{AppResult, delivery_error},
    linter::{AnalysisResult, Analyzer, DiagnosticEntry, DiagnosticVec}
};
use tempfile::TempDir;
use tokio::sync::{Notify, mpsc};

/// Delivery channel that hands every message to a test receiver
pub struct RecordingChannel {
    tx:   mpsc::UnboundedSender<OutboundMessage>,
    fail: bool
}

impl RecordingChannel {
    pub fn new() -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundMessage>) {
        Self::build(false)
    }

    /// Records the message, then reports a delivery failure
    pub fn failing() -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundMessage>) {
        Self::build(true)
    }

    fn build(fail: bool) -> (Arc<Self>, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Arc::new(Self {
                tx,
                fail
            }),
            rx
        )
    }
}

#[async_trait]
impl DeliveryChannel for RecordingChannel {
    async fn deliver(&self, message: &OutboundMessage) -> AppResult<()> {
        let _ = self.tx.send(message.clone());
        if self.fail {
            return Err(delivery_error("recording channel told to fail"));
        }
        Ok(())
    }
}

/// Analyzer returning a fixed result
pub struct StubAnalyzer {
    result: AnalysisResult,
    calls:  AtomicUsize
}

impl StubAnalyzer {
    pub fn new(result: AnalysisResult) -> Arc<Self> {
        Arc::new(Self {
            result,
            calls: AtomicUsize::new(0)
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for StubAnalyzer {
    async fn analyze(&self, _sql: &str) -> AnalysisResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

/// Analyzer that blocks until released, echoing the query back
pub struct GatedAnalyzer {
    pub gate: Notify,
    calls:    AtomicUsize
}

impl GatedAnalyzer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            gate:  Notify::new(),
            calls: AtomicUsize::new(0)
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Analyzer for GatedAnalyzer {
    async fn analyze(&self, sql: &str) -> AnalysisResult {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.gate.notified().await;
        AnalysisResult::completed(DiagnosticVec::new(), sql.to_string())
    }
}

/// Analyzer that panics
pub struct PanickingAnalyzer;

#[async_trait]
impl Analyzer for PanickingAnalyzer {
    async fn analyze(&self, _sql: &str) -> AnalysisResult {
        panic!("analyzer exploded");
    }
}

pub fn entry(code: &str, line: u32, description: &str) -> DiagnosticEntry {
    DiagnosticEntry {
        code:        code.into(),
        raw_line:    format!("L: {:>3} | P:   1 | {} | {}", line, code, description),
        line,
        position:    1,
        description: description.to_string()
    }
}

pub fn diagnostics(entries: Vec<DiagnosticEntry>) -> DiagnosticVec {
    entries.into_iter().collect()
}

pub async fn recv(rx: &mut mpsc::UnboundedReceiver<OutboundMessage>) -> OutboundMessage {
    tokio::time::timeout(Duration::from_secs(10), rx.recv())
        .await
        .expect("message delivered in time")
        .expect("channel open")
}

/// Shell script mimicking the parts of sqlfluff the bot relies on.
///
/// - `lint`: reports CP01 for lowercase `select`/`from`, ZZ99 for the word
///   `UNKNOWN`; exits 1 when anything was reported
/// - `fix`: upper-cases `select`/`from` in place after a short delay
/// - `explode` in the SQL makes lint fail with exit status 2
/// - `pg_sleep` in the SQL makes lint hang for five seconds
///
/// Every lint run appends the staged file path to `staged.log` next to the
/// script.
const FAKE_SQLFLUFF: &str = r#"#!/bin/sh
mode="$1"
for last in "$@"; do :; done
case "$mode" in
  lint)
    echo "$last" >> "$(dirname "$0")/staged.log"
    if grep -q "explode" "$last"; then
      echo "Traceback: parser crashed" >&2
      exit 2
    fi
    if grep -q "pg_sleep" "$last"; then
      sleep 5
    fi
    echo "== [$last] checking"
    status=0
    if grep -q -e "select" -e "from" "$last"; then
      echo "L:   1 | P:   1 | CP01 | Keywords must be consistently upper case."
      status=1
    fi
    if grep -q "UNKNOWN" "$last"; then
      echo "L:   1 | P:  10 | ZZ99 | Mystery rule."
      status=1
    fi
    echo "All Finished!"
    exit $status
    ;;
  fix)
    sleep 0.2
    fixed=$(sed -e 's/select/SELECT/g' -e 's/from/FROM/g' "$last")
    printf '%s' "$fixed" > "$last"
    exit 0
    ;;
  *)
    echo "unknown mode $mode" >&2
    exit 2
    ;;
esac
"#;

/// Fake sqlfluff on disk; the script lives as long as this value
pub struct FakeSqlFluff {
    dir:    TempDir,
    script: PathBuf
}

impl FakeSqlFluff {
    pub fn install() -> Self {
        let dir = TempDir::new().unwrap();
        let script = dir.path().join("sqlfluff.sh");
        std::fs::write(&script, FAKE_SQLFLUFF).unwrap();
        Self {
            dir,
            script
        }
    }

    /// Linter command running the script through `sh`
    pub fn command(&self) -> Vec<String> {
        vec!["sh".to_string(), self.script.display().to_string()]
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Staged files the script has been asked to lint so far
    pub fn staged_paths(&self) -> Vec<PathBuf> {
        std::fs::read_to_string(self.dir.path().join("staged.log"))
            .unwrap_or_default()
            .lines()
            .map(PathBuf::from)
            .collect()
    }
}
