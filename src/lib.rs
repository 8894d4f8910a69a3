// Library crate: public API items may not be used by the binary
#![allow(unused)]

//! # presswatch
//!
//! A terminal dashboard and library for monitoring front/rear line
//! pressure sensors.
//!
//! This crate polls a small read-only HTTP API for realtime pressure
//! readings, classifies them against idle and low-pressure thresholds,
//! and displays rolling charts, hourly/minute averages, log views, and
//! date-range history in an interactive terminal UI.
//!
//! ## Architecture
//!
//! The crate is organized into five main modules:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! │  ┌─────────┐    ┌──────────┐    ┌─────────┐    ┌─────────┐ │
//! │  │  app    │───▶│   data   │───▶│   ui    │───▶│ Terminal│ │
//! │  │ (state) │    │(processing)   │(rendering)   │         │ │
//! │  └────┬────┘    └──────────┘    └─────────┘    └─────────┘ │
//! │       │                                                     │
//! │       ▼                                                     │
//! │  ┌─────────┐                                                │
//! │  │ source  │◀── HttpSource | FileSource | ChannelSource    │
//! │  │ (input) │                                                │
//! │  └─────────┘                                                │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`app`]**: Application state, view navigation, and user interaction logic
//! - **[`source`]**: Realtime input abstraction ([`ReadingSource`] trait) with
//!   implementations for HTTP polling, file polling, and channel-based input,
//!   plus the [`source::ApiHandle`] worker for averages, logs, and history
//! - **[`data`]**: Alarm classification, rolling chart series, snapshot
//!   persistence, and history range handling
//! - **[`config`]**: Layered settings (file, environment, CLI)
//! - **[`ui`]**: Terminal rendering using ratatui with light/dark themes
//!
//! ## Example: headless monitoring
//!
//! The alarm state machine and rolling series work without a terminal:
//!
//! ```no_run
//! use presswatch::data::{Monitor, Thresholds, AlarmState};
//! use presswatch::source::Reading;
//! use chrono::Utc;
//!
//! let mut monitor = Monitor::new(Thresholds::default());
//! let state = monitor.observe(&Reading {
//!     front: 0.151,
//!     rear: 0.158,
//!     timestamp: Utc::now(),
//! });
//! assert_eq!(state, AlarmState::Normal);
//! ```

pub mod app;
pub mod config;
pub mod data;
pub mod events;
pub mod source;
pub mod ui;

pub use app::{App, View};
pub use crate::config::Settings;
pub use data::{AlarmState, Monitor, RollingSeries, SnapshotStore, Thresholds};
pub use source::{ApiClient, ApiHandle, Reading, ReadingSource};
