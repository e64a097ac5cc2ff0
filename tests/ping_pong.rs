use std::sync::Arc;

use chrono::{Duration, TimeZone, Utc};
use pong_bench::benchmark::{
    BenchmarkRunner, HandlerOptions, ParallelPingPongBenchmark, PingPongBenchmark,
};
use pong_bench::clock::ManualClock;
use pong_bench::connector::{CommandChannel, LocalCommandBus};
use pong_bench::error::{ConnectorError, HandlerError, PayloadError};
use pong_bench::message::{Command, CommandName, LoadFactor, SerializedObject};
use pong_bench::protocols::ping::{parser, PingResponder};
use tokio::task::JoinSet;

fn ping(token: &str) -> Command {
    Command::new(
        CommandName::new("ping"),
        SerializedObject::new("ping", "1", parser::ping(token.as_bytes())),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_pings_are_correlated() {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap(),
    ));
    let responder = Arc::new(PingResponder::new(100, clock.clone()));
    let bus = LocalCommandBus::new();
    bus.register_command_handler(responder.clone(), LoadFactor::new(100), CommandName::new("ping"))
        .await
        .unwrap();

    clock.advance(Duration::milliseconds(30));

    let mut tasks = JoinSet::new();
    for i in 0..300 {
        let bus = bus.clone();
        tasks.spawn(async move {
            let command = ping(&i.to_string());
            let response = bus.send_command(command.clone()).await.unwrap();
            (i, command, response)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        let (i, command, response) = joined.unwrap();
        assert_eq!(response.request_id, command.message_id);
        assert_ne!(response.message_id, command.message_id);
        assert_eq!(
            parser::parse_pong(&response.payload.data).unwrap(),
            i.to_string().as_bytes()
        );
        assert_eq!(response.payload.payload_type, "ping");
    }

    assert_eq!(responder.counter().handled(), 300);
    assert_eq!(responder.counter().batches(), 3);
    assert_eq!(responder.counter().cycle(), 0);

    bus.shutdown();
}

#[tokio::test]
async fn test_malformed_ping_is_reported_to_sender() {
    let responder = Arc::new(PingResponder::with_system_clock(100));
    let bus = LocalCommandBus::new();
    bus.register_command_handler(responder.clone(), LoadFactor::new(1), CommandName::new("ping"))
        .await
        .unwrap();

    let command = Command::new(
        CommandName::new("ping"),
        SerializedObject::new("ping", "1", "hello"),
    );
    match bus.send_command(command.clone()).await {
        Err(ConnectorError::Handler {
            command_id,
            source: HandlerError::Payload(PayloadError::MissingPrefix { found, .. }),
        }) => {
            assert_eq!(command_id, command.message_id);
            assert_eq!(found, "hello");
        }
        other => panic!("unexpected: {:?}", other),
    }

    // The failure was still counted.
    assert_eq!(responder.counter().handled(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_benchmarks_run_end_to_end() {
    let runner = BenchmarkRunner::new();
    let options = HandlerOptions {
        load_factor: LoadFactor::new(8),
        batch_size: 50,
        ..HandlerOptions::default()
    };

    let mut sequential = PingPongBenchmark::new(200, options.clone());
    let report = runner.run(&mut sequential).await.unwrap();
    assert_eq!(report.commands, 200);
    assert_eq!(report.name, "PingPongBenchmark(command_count=200)");

    let mut parallel = ParallelPingPongBenchmark::new(500, 25, options);
    let report = runner.run(&mut parallel).await.unwrap();
    assert_eq!(report.commands, 500);
    assert!(report.throughput() > 0.0);
}
