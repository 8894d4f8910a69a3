//! Data models and processing for the pressure dashboard.
//!
//! This module owns the two stateful cores of the application and their
//! supporting types:
//!
//! - [`monitor`]: current readings and the derived alarm state
//!   ([`Monitor`], [`AlarmState`], [`Thresholds`])
//! - [`series`]: fixed-capacity rolling chart buffers ([`RollingSeries`],
//!   [`SeedPolicy`], [`LabelPolicy`])
//! - [`persist`]: the local state file the buffers round-trip through
//!   ([`SnapshotStore`], [`PersistedSnapshot`])
//! - [`history`]: date-range historical data, thinning, and CSV export
//! - [`duration`]: parsing and formatting of interval strings ("500ms", "5m")
//!
//! ## Data flow
//!
//! ```text
//! ReadingSource::poll()
//!        │
//!        ▼
//! Monitor::observe()  ──▶  AlarmState (overlay visibility)
//!        │
//!        ▼ (chart tick, latest reading)
//! RollingSeries::append()  ──▶  SnapshotStore::save()
//! ```

pub mod duration;
pub mod history;
pub mod monitor;
pub mod persist;
pub mod series;

pub use history::{DateRange, HistoryData, MAX_CHART_POINTS};
pub use monitor::{classify, AlarmDetail, AlarmState, Monitor, Thresholds};
pub use persist::{PersistedSnapshot, RestoreError, SnapshotStore};
pub use series::{LabelPolicy, RollingSeries, Sample, SeedPolicy, SeriesBuffer};
