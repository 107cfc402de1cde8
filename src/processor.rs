//! Background processing of one accepted command.
//!
//! The processor is the error boundary of the pipeline: whatever happens
//! while analyzing (tool failure, timeout, even a panic inside the
//! analyzer), exactly one message is delivered for every request.

use std::sync::Arc;

use crate::{
    command::{CommandRequest, OutboundMessage},
    delivery::DeliveryChannel,
    linter::{AnalysisResult, Analyzer},
    report::ReportFormatter
};

/// What happened to the single message of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    Failed
}

/// Runs analyze → format → deliver for one request.
pub struct CommandProcessor {
    analyzer:  Arc<dyn Analyzer>,
    formatter: ReportFormatter,
    channel:   Arc<dyn DeliveryChannel>
}

impl CommandProcessor {
    pub fn new(
        analyzer: Arc<dyn Analyzer>,
        formatter: ReportFormatter,
        channel: Arc<dyn DeliveryChannel>
    ) -> Self {
        Self {
            analyzer,
            formatter,
            channel
        }
    }

    pub fn formatter(&self) -> &ReportFormatter {
        &self.formatter
    }

    pub async fn process(&self, request: CommandRequest) -> DeliveryOutcome {
        let result = self.analyze(request.query()).await;
        let text = self.formatter.format(&result);
        let message = OutboundMessage {
            target: request.into_target(),
            text
        };

        match self.channel.deliver(&message).await {
            Ok(()) => {
                tracing::info!(
                    event = "command.delivered",
                    diagnostics = result.diagnostics.len(),
                    failed = result.invocation_failed
                );
                DeliveryOutcome::Delivered
            }
            Err(err) => {
                tracing::error!(
                    event = "command.delivery_failed",
                    error = %err,
                    target = ?message.target
                );
                DeliveryOutcome::Failed
            }
        }
    }

    /// Analyze on a separate task so a panic becomes a failure result
    async fn analyze(&self, query: &str) -> AnalysisResult {
        let analyzer = Arc::clone(&self.analyzer);
        let sql = query.to_string();
        match tokio::spawn(async move { analyzer.analyze(&sql).await }).await {
            Ok(result) => result,
            Err(err) => {
                tracing::error!(event = "command.analyzer_panicked", error = %err);
                AnalysisResult::failed(format!("analysis aborted: {}", err))
            }
        }
    }
}
