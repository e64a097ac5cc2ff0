//! Ping/pong benchmarks.
//!
//! Each benchmark stands up a [`LocalCommandBus`] with a [`PingResponder`]
//! registered on it, sends numbered pings and checks that every pong carries
//! the number it was sent with.
//!
//! - `PingPongBenchmark`: one command in flight at a time
//! - `ParallelPingPongBenchmark`: waves of up to `max_parallelism` commands

mod parallel;
mod ping_pong;
mod runner;

pub use parallel::ParallelPingPongBenchmark;
pub use ping_pong::PingPongBenchmark;
pub use runner::{BenchmarkReport, BenchmarkRunner};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

use crate::connector::{CommandChannel, LocalCommandBus, Registration};
use crate::error::BenchmarkError;
use crate::message::{Command, CommandName, CommandResponse, LoadFactor, MessageId, SerializedObject};
use crate::protocols::ping::{parser, PingResponder};
use crate::throughput::DEFAULT_BATCH_SIZE;

/// A benchmark driven by [`BenchmarkRunner`].
#[async_trait]
pub trait Benchmark: Send {
    fn name(&self) -> String;

    async fn setup(&mut self) -> Result<(), BenchmarkError>;

    /// Run the workload, returning the number of commands sent.
    async fn run(&mut self) -> Result<u64, BenchmarkError>;

    async fn teardown(&mut self) -> Result<(), BenchmarkError>;
}

/// How the responder is registered for a benchmark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerOptions {
    pub command_name: CommandName,
    pub load_factor: LoadFactor,
    pub batch_size: u32,
}

impl Default for HandlerOptions {
    fn default() -> Self {
        HandlerOptions {
            command_name: CommandName::new("ping"),
            load_factor: LoadFactor::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

/// A bus with a registered responder.
struct PingPongFixture {
    bus: LocalCommandBus,
    responder: Arc<PingResponder>,
    registration: Registration,
}

impl PingPongFixture {
    async fn start(options: &HandlerOptions) -> Result<Self, BenchmarkError> {
        let bus = LocalCommandBus::new();
        let responder = Arc::new(PingResponder::with_system_clock(options.batch_size));
        let registration = bus
            .register_command_handler(
                responder.clone(),
                options.load_factor,
                options.command_name.clone(),
            )
            .await?;

        Ok(PingPongFixture {
            bus,
            responder,
            registration,
        })
    }

    async fn stop(self) -> Result<(), BenchmarkError> {
        self.bus.unregister(self.registration).await?;
        self.bus.shutdown();
        info!(
            handled = self.responder.counter().handled(),
            batches = self.responder.counter().batches(),
            "Responder stopped"
        );
        Ok(())
    }

    /// Build the ping carrying `sequence` as its token.
    fn ping(&self, sequence: u64) -> Command {
        let token = sequence.to_string();
        Command::new(
            self.registration.command_name().clone(),
            SerializedObject::new("ping", "1", parser::ping(token.as_bytes())),
        )
    }

    fn bus(&self) -> &LocalCommandBus {
        &self.bus
    }
}

/// Check that `response` answers the ping numbered `sequence` with id `request_id`.
fn verify_response(
    sequence: u64,
    request_id: &MessageId,
    response: &CommandResponse,
) -> Result<(), BenchmarkError> {
    if &response.request_id != request_id {
        return Err(BenchmarkError::Mismatch {
            expected: request_id.to_string(),
            actual: response.request_id.to_string(),
        });
    }

    let token = parser::parse_pong(&response.payload.data)?;
    let expected = sequence.to_string();
    if token != expected.as_bytes() {
        return Err(BenchmarkError::Mismatch {
            expected,
            actual: String::from_utf8_lossy(token).into_owned(),
        });
    }
    Ok(())
}
