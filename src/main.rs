//! pong-bench entry point.

use pong_bench::benchmark::{
    Benchmark, BenchmarkRunner, ParallelPingPongBenchmark, PingPongBenchmark,
};
use pong_bench::config::{BenchmarkMode, Config};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::load()?;

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!(
        command = %config.command_name,
        load_factor = config.load_factor,
        batch_size = config.batch_size,
        benchmarks = ?config.benchmarks,
        command_count = config.command_count,
        workers = ?config.workers,
        "Starting pong-bench"
    );

    let mut builder = tokio::runtime::Builder::new_multi_thread();
    if let Some(workers) = config.workers {
        builder.worker_threads(workers);
    }
    let runtime = builder.enable_all().build()?;

    runtime.block_on(run(config))
}

/// Run every configured benchmark in order, stopping at the first failure.
async fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let runner = BenchmarkRunner::new();

    for mode in &config.benchmarks {
        let mut benchmark: Box<dyn Benchmark> = match mode {
            BenchmarkMode::Sequential => Box::new(PingPongBenchmark::new(
                config.command_count,
                config.handler_options(),
            )),
            BenchmarkMode::Parallel => Box::new(ParallelPingPongBenchmark::new(
                config.command_count,
                config.max_parallelism,
                config.handler_options(),
            )),
        };

        let report = runner.run(benchmark.as_mut()).await?;
        info!(
            benchmark = %report.name,
            commands = report.commands,
            elapsed_ms = report.elapsed.as_millis() as u64,
            throughput = report.throughput().round() as u64,
            "Benchmark completed"
        );
    }

    Ok(())
}
