//! Command protocols.
//!
//! - `ping`: ping/pong responder used for latency and throughput benchmarks

pub mod ping;
