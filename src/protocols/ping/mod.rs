//! Ping command protocol.
//!
//! The payload of a ping command is `ping=<token>`; the handler answers with
//! `pong=<token>`, carrying the token through unchanged.
//!
//! ## Payload Format
//!
//! ```text
//! Command:  ping=42
//! Response: pong=42
//!
//! Command:  ping=
//! Response: pong=
//! ```
//!
//! Anything not starting with `ping=` is rejected as a malformed payload.
//! Tokens are raw bytes and need not be UTF-8.

pub mod handler;
pub mod parser;

pub use handler::PingResponder;
