//! Tick-driven TCP server.
//!
//! Nothing in this module owns a scheduler. The embedding application
//! calls [`Server::advance`] at whatever interval it likes, and every
//! accepted socket is multiplexed cooperatively with non-blocking reads
//! and writes inside that single step. Buffered state persists across
//! ticks, so a slow interval costs latency, never correctness.
//!
//! # Connection lifecycle
//!
//! ```text
//!   accept ──▶ OPEN ──(read chunks until one full frame)──▶ reply queued
//!                │                                             │
//!                │ peer closed / io error                      │ write buffer drained
//!                ▼                                             ▼
//!             CLOSED ◀───────────────────────────────────── CLOSED
//! ```
//!
//! One request, one reply, then teardown: clients open a fresh
//! connection per call.

pub mod connection;
pub mod listener;

pub use connection::Connection;
pub use listener::Server;

use crate::http::request::Request;

/// Produces the fully serialized reply bytes for one assembled request.
///
/// Injected into every [`Connection`]; the server core does not care
/// what the reply contains, only that it is bytes to flush before the
/// connection is torn down.
pub trait RequestHandler: Send + Sync {
    fn handle(&self, request: &Request) -> Vec<u8>;
}
