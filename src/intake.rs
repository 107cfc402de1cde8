//! Synchronous intake of slash commands.
//!
//! [`Intake::submit`] never waits on analysis. It validates the command,
//! admits it against the worker limit, spawns the [`CommandProcessor`] and
//! returns the acknowledgment straight away. The spawned task owns the
//! request and its worker permit; nothing keeps a handle to it.

use std::sync::Arc;

use tokio::sync::Semaphore;

use crate::{
    catalog::Messages,
    command::{CommandRequest, SlashCommand},
    processor::CommandProcessor
};

/// Immediate reply to a slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acknowledgment {
    /// Empty command; nothing was scheduled
    MissingQuery(String),
    /// Analysis scheduled; the result is delivered later
    Accepted(String),
    /// Worker limit reached; nothing was scheduled
    Busy(String)
}

impl Acknowledgment {
    pub fn text(&self) -> &str {
        match self {
            Self::MissingQuery(text) | Self::Accepted(text) | Self::Busy(text) => text
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Front door of the pipeline.
pub struct Intake {
    processor:     Arc<CommandProcessor>,
    permits:       Arc<Semaphore>,
    max_in_flight: usize,
    messages:      Messages
}

impl Intake {
    pub fn new(processor: Arc<CommandProcessor>, max_in_flight: usize) -> Self {
        let messages = processor.formatter().catalog().messages.clone();
        Self {
            processor,
            permits: Arc::new(Semaphore::new(max_in_flight)),
            max_in_flight,
            messages
        }
    }

    /// Number of commands currently being processed
    pub fn in_flight(&self) -> usize {
        self.max_in_flight - self.permits.available_permits()
    }

    /// Validate and schedule a command. Must be called within a tokio
    /// runtime.
    pub fn submit(&self, command: SlashCommand) -> Acknowledgment {
        let query = command.text.trim();
        if query.is_empty() {
            tracing::info!(event = "intake.missing_query");
            return Acknowledgment::MissingQuery(self.messages.missing_query.clone());
        }

        let Ok(permit) = Arc::clone(&self.permits).try_acquire_owned() else {
            tracing::warn!(
                event = "intake.busy",
                max_in_flight = self.max_in_flight
            );
            return Acknowledgment::Busy(self.messages.busy.clone());
        };

        let request = CommandRequest::new(query, command.target());
        tracing::info!(
            event = "intake.accepted",
            query_len = request.query().len(),
            channel = ?request.target().channel,
            callback = request.callback_url().is_some()
        );

        let processor = Arc::clone(&self.processor);
        tokio::spawn(async move {
            let _permit = permit;
            processor.process(request).await;
        });

        Acknowledgment::Accepted(self.messages.processing.clone())
    }
}
