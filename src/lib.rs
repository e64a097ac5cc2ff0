//! pong-bench: a ping/pong command handler micro-benchmark
//!
//! A `PingResponder` is registered on a command channel for `ping` commands
//! and answers every `ping=<token>` payload with `pong=<token>`, logging the
//! time taken for each batch of 100 commands.
//!
//! Features:
//! - Channel-agnostic handler behind the `CommandHandler` trait
//! - In-process command bus with per-handler load factors
//! - Sequential and parallel ping/pong benchmarks with token verification
//! - Configuration via CLI arguments or TOML file

pub mod benchmark;
pub mod clock;
pub mod config;
pub mod connector;
pub mod error;
pub mod message;
pub mod protocols;
pub mod throughput;
