//! Benchmark runner.

use std::time::{Duration, Instant};
use tracing::{info_span, warn, Instrument};

use super::Benchmark;
use crate::error::BenchmarkError;

/// Outcome of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkReport {
    pub name: String,
    pub commands: u64,
    /// Time spent in `run`, excluding setup and teardown.
    pub elapsed: Duration,
}

impl BenchmarkReport {
    /// Commands per second.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.commands as f64 / secs
        } else {
            0.0
        }
    }
}

/// Runs a benchmark's phases inside tracing spans.
#[derive(Debug, Clone, Copy, Default)]
pub struct BenchmarkRunner;

impl BenchmarkRunner {
    pub fn new() -> Self {
        BenchmarkRunner
    }

    /// Set up, run and tear down `benchmark`.
    ///
    /// Teardown runs whenever setup succeeded, even if `run` failed; a `run`
    /// error takes precedence over a teardown error.
    pub async fn run(&self, benchmark: &mut dyn Benchmark) -> Result<BenchmarkReport, BenchmarkError> {
        let name = benchmark.name();
        let span = info_span!("benchmark", benchmark = %name);

        async {
            benchmark.setup().instrument(info_span!("setup")).await?;

            let started = Instant::now();
            let outcome = benchmark.run().instrument(info_span!("run")).await;
            let elapsed = started.elapsed();

            let teardown = benchmark
                .teardown()
                .instrument(info_span!("teardown"))
                .await;

            let commands = match (outcome, teardown) {
                (Ok(commands), Ok(())) => commands,
                (Ok(_), Err(e)) => return Err(e),
                (Err(e), Ok(())) => return Err(e),
                (Err(e), Err(teardown_err)) => {
                    warn!(error = %teardown_err, "Teardown failed after run error");
                    return Err(e);
                }
            };

            Ok::<_, BenchmarkError>(BenchmarkReport {
                name: name.clone(),
                commands,
                elapsed,
            })
        }
        .instrument(span)
        .await
    }
}
