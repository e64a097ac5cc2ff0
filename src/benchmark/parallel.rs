//! Parallel ping/pong benchmark.

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::trace;

use super::{verify_response, Benchmark, HandlerOptions, PingPongFixture};
use crate::connector::CommandChannel;
use crate::error::{BenchmarkError, ConnectorError};

/// Sends pings in waves of at most `max_parallelism` concurrent commands.
///
/// A wave is fully answered and verified before the next one starts.
pub struct ParallelPingPongBenchmark {
    command_count: u64,
    max_parallelism: u32,
    options: HandlerOptions,
    fixture: Option<PingPongFixture>,
}

impl ParallelPingPongBenchmark {
    pub fn new(command_count: u64, max_parallelism: u32, options: HandlerOptions) -> Self {
        ParallelPingPongBenchmark {
            command_count,
            max_parallelism: max_parallelism.max(1),
            options,
            fixture: None,
        }
    }
}

#[async_trait]
impl Benchmark for ParallelPingPongBenchmark {
    fn name(&self) -> String {
        format!(
            "ParallelPingPongBenchmark(command_count={},max_parallelism={})",
            self.command_count, self.max_parallelism
        )
    }

    async fn setup(&mut self) -> Result<(), BenchmarkError> {
        self.fixture = Some(PingPongFixture::start(&self.options).await?);
        Ok(())
    }

    async fn run(&mut self) -> Result<u64, BenchmarkError> {
        let fixture = self.fixture.as_ref().ok_or(BenchmarkError::NotSetUp)?;

        let mut sent = 0;
        while sent < self.command_count {
            let wave = (self.command_count - sent).min(u64::from(self.max_parallelism));
            trace!(first = sent, size = wave, "Sending wave");

            let mut tasks = JoinSet::new();
            for sequence in sent..sent + wave {
                let bus = fixture.bus().clone();
                let command = fixture.ping(sequence);
                tasks.spawn(async move {
                    let request_id = command.message_id.clone();
                    let result = bus.send_command(command).await;
                    (sequence, request_id, result)
                });
            }

            while let Some(joined) = tasks.join_next().await {
                let (sequence, request_id, result) =
                    joined.map_err(|e| ConnectorError::HandlerPanicked(e.to_string()))?;
                verify_response(sequence, &request_id, &result?)?;
            }
            sent += wave;
        }
        Ok(sent)
    }

    async fn teardown(&mut self) -> Result<(), BenchmarkError> {
        self.fixture
            .take()
            .ok_or(BenchmarkError::NotSetUp)?
            .stop()
            .await
    }
}
