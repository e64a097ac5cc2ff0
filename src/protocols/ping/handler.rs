//! Ping command handler.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, trace};

use super::parser;
use crate::clock::{Clock, SystemClock};
use crate::connector::CommandHandler;
use crate::error::{HandlerError, PayloadError};
use crate::message::{Command, CommandResponse, MessageId};
use crate::throughput::{BatchReport, ThroughputCounter};

/// Answers `ping=<token>` commands with `pong=<token>` and logs throughput
/// once per batch.
#[derive(Debug)]
pub struct PingResponder {
    counter: ThroughputCounter,
}

impl PingResponder {
    pub fn new(batch_size: u32, clock: Arc<dyn Clock>) -> Self {
        PingResponder {
            counter: ThroughputCounter::new(batch_size, clock),
        }
    }

    /// Responder timed by the system clock.
    pub fn with_system_clock(batch_size: u32) -> Self {
        Self::new(batch_size, Arc::new(SystemClock))
    }

    /// Build the pong for a ping without touching the throughput counter.
    ///
    /// The response gets a fresh message id, references the command's id, and
    /// carries the command's payload metadata with only the data replaced.
    pub fn handle(&self, command: &Command) -> Result<CommandResponse, PayloadError> {
        let token = parser::parse_ping(&command.payload.data)?;
        debug!(ping_id = %String::from_utf8_lossy(token), "Receive command with ping id");

        Ok(CommandResponse {
            message_id: MessageId::generate(),
            request_id: command.message_id.clone(),
            payload: command.payload.with_data(parser::pong(token)),
        })
    }

    /// Count the command, log on a batch boundary, then answer it.
    ///
    /// The command is counted even when its payload turns out to be malformed.
    pub fn on_command_received(&self, command: &Command) -> Result<CommandResponse, PayloadError> {
        trace!(command = %command.name, "Receive command");
        if let Some(report) = self.counter.record() {
            log_batch(&report);
        }
        self.handle(command)
    }

    pub fn counter(&self) -> &ThroughputCounter {
        &self.counter
    }
}

fn log_batch(report: &BatchReport) {
    let elapsed_ms = report.elapsed.num_milliseconds();
    info!(
        batch = report.batch,
        elapsed_ms,
        "Handled another {} in {} ms",
        report.commands,
        elapsed_ms
    );
}

#[async_trait]
impl CommandHandler for PingResponder {
    async fn on_command(&self, command: Command) -> Result<CommandResponse, HandlerError> {
        Ok(self.on_command_received(&command)?)
    }
}
