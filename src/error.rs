//! Error types shared across the responder, the bus and the benchmarks.

use thiserror::Error;

use crate::message::{CommandName, MessageId};

/// Longest payload preview carried in a [`PayloadError`].
const PREVIEW_LEN: usize = 32;

/// A payload did not have the shape a ping or pong must have.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PayloadError {
    /// The payload data does not start with the expected prefix.
    #[error("malformed payload: expected prefix {expected:?}, found {found:?}")]
    MissingPrefix {
        /// The prefix that was required (`ping=` or `pong=`).
        expected: &'static str,
        /// Lossy preview of the data that was received.
        found: String,
    },
}

impl PayloadError {
    pub(crate) fn missing_prefix(expected: &'static str, data: &[u8]) -> Self {
        let preview = &data[..data.len().min(PREVIEW_LEN)];
        PayloadError::MissingPrefix {
            expected,
            found: String::from_utf8_lossy(preview).into_owned(),
        }
    }
}

/// Failure reported by a command handler.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The command payload could not be interpreted.
    #[error(transparent)]
    Payload(#[from] PayloadError),
}

/// Failures surfaced by a command channel.
#[derive(Debug, Error)]
pub enum ConnectorError {
    /// Nothing is registered for the command name.
    #[error("no handler registered for command {0}")]
    NoHandler(CommandName),

    /// The channel was shut down.
    #[error("command channel is closed")]
    Closed,

    /// The handler returned an error for this command.
    #[error("handler failed for command {command_id}: {source}")]
    Handler {
        command_id: MessageId,
        #[source]
        source: HandlerError,
    },

    /// The handler task panicked or was cancelled.
    #[error("handler task failed: {0}")]
    HandlerPanicked(String),
}

/// Failures while running a benchmark.
#[derive(Debug, Error)]
pub enum BenchmarkError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Payload(#[from] PayloadError),

    /// A pong came back carrying a different token than the ping it answers.
    #[error("ping pong mismatch: expected {expected} but got {actual}")]
    Mismatch { expected: String, actual: String },

    /// `run` or `teardown` was called before `setup`.
    #[error("benchmark has not been set up")]
    NotSetUp,
}
