//! Sequential ping/pong benchmark.

use async_trait::async_trait;

use super::{verify_response, Benchmark, HandlerOptions, PingPongFixture};
use crate::connector::CommandChannel;
use crate::error::BenchmarkError;

/// Sends `command_count` pings, waiting for each pong before the next ping.
pub struct PingPongBenchmark {
    command_count: u64,
    options: HandlerOptions,
    fixture: Option<PingPongFixture>,
}

impl PingPongBenchmark {
    pub fn new(command_count: u64, options: HandlerOptions) -> Self {
        PingPongBenchmark {
            command_count,
            options,
            fixture: None,
        }
    }
}

#[async_trait]
impl Benchmark for PingPongBenchmark {
    fn name(&self) -> String {
        format!("PingPongBenchmark(command_count={})", self.command_count)
    }

    async fn setup(&mut self) -> Result<(), BenchmarkError> {
        self.fixture = Some(PingPongFixture::start(&self.options).await?);
        Ok(())
    }

    async fn run(&mut self) -> Result<u64, BenchmarkError> {
        let fixture = self.fixture.as_ref().ok_or(BenchmarkError::NotSetUp)?;

        for sequence in 0..self.command_count {
            let command = fixture.ping(sequence);
            let request_id = command.message_id.clone();
            let response = fixture.bus().send_command(command).await?;
            verify_response(sequence, &request_id, &response)?;
        }
        Ok(self.command_count)
    }

    async fn teardown(&mut self) -> Result<(), BenchmarkError> {
        self.fixture
            .take()
            .ok_or(BenchmarkError::NotSetUp)?
            .stop()
            .await
    }
}
