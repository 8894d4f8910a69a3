//! Data sources for realtime pressure readings.
//!
//! This module provides a trait-based abstraction for receiving readings
//! from various backends: the live HTTP API, a JSON file written by a
//! local logger, or an in-memory channel for tests and embedding. It also
//! holds the wire contract ([`wire`]) and the client for the remaining
//! read-only endpoints ([`api`]).

mod channel;
mod file;
mod http;
mod wire;

pub mod api;

pub use api::{ApiClient, ApiError, ApiHandle, ApiUpdate};
pub use channel::ChannelSource;
pub use file::FileSource;
pub use http::HttpSource;
pub use wire::{HourlyAverages, LogRecord, MinuteAverages, Reading, RealtimeReading};

use std::fmt::Debug;

/// Trait for receiving realtime readings from various sources.
///
/// All implementations are non-blocking: `poll()` returns whatever has
/// arrived since the last call, or `None`. Fetch and schema failures are
/// never surfaced as readings; prior values stand and the failure is
/// reported through `error()` and the log.
pub trait ReadingSource: Send + Debug {
    /// Poll for the latest reading.
    ///
    /// Returns `Some(reading)` if a new reading is available, `None`
    /// otherwise. Must not block.
    fn poll(&mut self) -> Option<Reading>;

    /// Human-readable description of the source, for the status bar.
    fn description(&self) -> &str;

    /// The error from the most recent failed poll, if any.
    fn error(&self) -> Option<String>;
}
