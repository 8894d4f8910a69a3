//! Application state and interaction logic.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use chrono::{DateTime, Utc};

use crate::data::{DateRange, HistoryData, Monitor, RollingSeries, SnapshotStore};
use crate::source::{ApiHandle, ApiUpdate, HourlyAverages, LogRecord, MinuteAverages, Reading, ReadingSource};
use crate::ui::Theme;

/// The current view/tab in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Live value cards, averages, rolling charts, and alarm overlays.
    Dashboard,
    /// Date-range historical chart with CSV export.
    History,
    /// Live reading logs and the error log.
    Logs,
}

impl View {
    /// Cycle to the next view.
    pub fn next(self) -> Self {
        match self {
            View::Dashboard => View::History,
            View::History => View::Logs,
            View::Logs => View::Dashboard,
        }
    }

    /// Cycle to the previous view.
    pub fn prev(self) -> Self {
        match self {
            View::Dashboard => View::Logs,
            View::History => View::Dashboard,
            View::Logs => View::History,
        }
    }

    /// Returns the display label for this view.
    pub fn label(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::History => "History",
            View::Logs => "Logs",
        }
    }
}

/// Main application state.
pub struct App {
    pub running: bool,
    pub current_view: View,
    pub show_help: bool,

    // Monitoring core
    pub monitor: Monitor,
    pub series: RollingSeries,
    store: SnapshotStore,

    // Inputs
    source: Box<dyn ReadingSource>,
    api: Option<ApiHandle>,
    pub load_error: Option<String>,

    // Averages cards (zero-sentinel handled by the wire types)
    pub hourly: Option<HourlyAverages>,
    pub minute: Option<MinuteAverages>,

    // Log views
    pub log_entries: Vec<LogRecord>,
    pub error_entries: Vec<LogRecord>,
    /// Entries at or before this instant stay hidden after a local clear.
    error_cleared_at: Option<DateTime<Utc>>,

    // History view
    pub history_range: DateRange,
    pub history: Option<HistoryData>,
    pub history_pending: bool,
    pub history_error: Option<String>,

    // UI
    pub theme: Theme,
    status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(
        source: Box<dyn ReadingSource>,
        api: Option<ApiHandle>,
        monitor: Monitor,
        series: RollingSeries,
        store: SnapshotStore,
    ) -> Self {
        Self {
            running: true,
            current_view: View::Dashboard,
            show_help: false,
            monitor,
            series,
            store,
            source,
            api,
            load_error: None,
            hourly: None,
            minute: None,
            log_entries: Vec::new(),
            error_entries: Vec::new(),
            error_cleared_at: None,
            history_range: DateRange::last_day(),
            history: None,
            history_pending: false,
            history_error: None,
            theme: Theme::auto_detect(),
            status_message: None,
        }
    }

    /// Returns a description of the realtime source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }

    /// Set a temporary status message shown in the status bar.
    pub fn set_status_message(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    /// Get the current status message if it hasn't expired (3 seconds).
    pub fn get_status_message(&self) -> Option<&str> {
        if let Some((msg, time)) = &self.status_message {
            if time.elapsed() < std::time::Duration::from_secs(3) {
                return Some(msg);
            }
        }
        None
    }

    /// Poll tick: pull the latest reading into the monitor.
    ///
    /// A failed poll leaves the monitor untouched; the source's error is
    /// surfaced in the status bar but never as an overlay.
    pub fn poll_reading(&mut self) -> bool {
        match self.source.poll() {
            Some(reading) => {
                self.monitor.observe(&reading);
                self.load_error = None;
                true
            }
            None => {
                self.load_error = self.source.error();
                false
            }
        }
    }

    /// Chart tick: append the monitor's latest values and persist.
    ///
    /// Runs on its own cadence, so the appended reading may be up to one
    /// poll interval stale. Before the first successful poll a null
    /// sample keeps the window advancing.
    pub fn tick_chart(&mut self, now: DateTime<Utc>) {
        match self.latest_reading() {
            Some(reading) => self.series.append(&reading, now),
            None => self.series.append_gap(now),
        }

        if let Err(e) = self.store.save(&self.series.snapshot(now)) {
            tracing::warn!("chart state not saved: {e}");
        }
    }

    fn latest_reading(&self) -> Option<Reading> {
        Some(Reading {
            front: self.monitor.front()?,
            rear: self.monitor.rear()?,
            timestamp: self.monitor.last_reading_at()?,
        })
    }

    /// Drain background API results into the view state.
    pub fn drain_api_updates(&mut self) {
        let Some(api) = self.api.as_mut() else { return };
        for update in api.drain() {
            match update {
                ApiUpdate::Hourly(hourly) => self.hourly = Some(hourly),
                ApiUpdate::Minute(minute) => self.minute = Some(minute),
                ApiUpdate::Log(entries) => self.log_entries = entries,
                ApiUpdate::ErrorLog(entries) => {
                    self.error_entries = match self.error_cleared_at {
                        Some(cleared) => entries
                            .into_iter()
                            .filter(|e| e.timestamp > cleared)
                            .collect(),
                        None => entries,
                    };
                }
                ApiUpdate::History(range, entries) => {
                    if range == self.history_range {
                        self.history = Some(HistoryData::new(range, entries));
                        self.history_pending = false;
                        self.history_error = None;
                    }
                }
                ApiUpdate::HistoryFailed(range, message) => {
                    if range == self.history_range {
                        self.history_pending = false;
                        self.history_error = Some(message);
                    }
                }
            }
        }
    }

    /// Ask the worker for the current history range.
    pub fn request_history(&mut self) {
        if let Some(api) = &self.api {
            api.request_history(self.history_range);
            self.history_pending = true;
            self.history_error = None;
        }
    }

    /// Move the range's start date by `days` and refetch.
    pub fn shift_history_start(&mut self, days: i64) {
        self.history_range.shift_start(days);
        self.request_history();
    }

    /// Move the range's end date by `days` and refetch.
    pub fn shift_history_end(&mut self, days: i64) {
        self.history_range.shift_end(days);
        self.request_history();
    }

    /// Reset to the default yesterday-to-today range and refetch.
    pub fn reset_history_range(&mut self) {
        self.history_range = DateRange::last_day();
        self.request_history();
    }

    /// Export the loaded history range as CSV.
    ///
    /// With no explicit path the file lands in the working directory under
    /// the range-derived name.
    pub fn export_history(&mut self, path: Option<PathBuf>) -> Result<PathBuf> {
        let Some(ref history) = self.history else {
            anyhow::bail!("no history loaded to export");
        };
        let path = path.unwrap_or_else(|| PathBuf::from(history.csv_filename()));
        std::fs::write(&path, history.to_csv())?;
        Ok(path)
    }

    /// Clear the error log display. Local only; the server log is never
    /// touched, and refetches only show entries newer than the clear.
    pub fn clear_error_log(&mut self) {
        self.error_cleared_at = self
            .error_entries
            .iter()
            .map(|e| e.timestamp)
            .max()
            .or(Some(Utc::now()));
        self.error_entries.clear();
    }

    /// Dismiss whichever alarm overlay is currently visible.
    pub fn dismiss_alarm(&mut self) {
        self.monitor.dismiss_current();
    }

    /// Whether any alarm overlay is currently visible.
    pub fn alarm_overlay_visible(&self) -> bool {
        self.monitor.idle_visible() || self.monitor.low_visible()
    }

    /// Best-effort final state write at teardown.
    pub fn final_snapshot(&self) {
        self.store.save_on_teardown(&self.series.snapshot(Utc::now()));
    }

    /// Switch to the next view.
    pub fn next_view(&mut self) {
        self.set_view(self.current_view.next());
    }

    /// Switch to the previous view.
    pub fn prev_view(&mut self) {
        self.set_view(self.current_view.prev());
    }

    /// Switch to a specific view; entering History with nothing loaded
    /// kicks off the initial fetch.
    pub fn set_view(&mut self, view: View) {
        self.current_view = view;
        if view == View::History && self.history.is_none() && !self.history_pending {
            self.request_history();
        }
    }

    /// Toggle the help overlay.
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Signal the application to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{AlarmState, LabelPolicy, SeedPolicy, Thresholds};
    use crate::source::ChannelSource;
    use chrono::TimeZone;
    use std::time::Duration;
    use tempfile::TempDir;
    use tokio::sync::watch;

    fn test_app(dir: &TempDir) -> (watch::Sender<Option<Reading>>, App) {
        let (tx, source) = ChannelSource::create("test");
        let app = App::new(
            Box::new(source),
            None,
            Monitor::new(Thresholds::default()),
            RollingSeries::new(5, SeedPolicy::HistoryReplay, LabelPolicy::WallClock),
            SnapshotStore::new(dir.path().join("state.json"), Duration::from_secs(300)),
        );
        (tx, app)
    }

    fn reading(front: f64, rear: f64) -> Reading {
        Reading {
            front,
            rear,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_poll_updates_monitor() {
        let dir = TempDir::new().unwrap();
        let (tx, mut app) = test_app(&dir);

        tx.send(Some(reading(0.1, 0.2))).unwrap();
        assert!(app.poll_reading());
        assert_eq!(app.monitor.state(), AlarmState::LowPressure);

        // Nothing new: state stands
        assert!(!app.poll_reading());
        assert_eq!(app.monitor.state(), AlarmState::LowPressure);
    }

    #[test]
    fn test_tick_chart_appends_and_persists() {
        let dir = TempDir::new().unwrap();
        let (tx, mut app) = test_app(&dir);

        tx.send(Some(reading(0.2, 0.2))).unwrap();
        app.poll_reading();
        app.tick_chart(Utc::now());

        assert_eq!(app.series.front().len(), 1);
        assert!(dir.path().join("state.json").exists());
    }

    #[test]
    fn test_tick_before_first_reading_appends_gap() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);

        app.tick_chart(Utc::now());
        assert_eq!(app.series.front().len(), 1);
        assert_eq!(app.series.front().values()[0], None);
    }

    #[test]
    fn test_clear_error_log_is_local_and_sticky() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);

        let old = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        app.error_entries = vec![LogRecord {
            timestamp: old,
            front_pressure: Some(0.1),
            rear_pressure: Some(0.2),
        }];
        app.clear_error_log();
        assert!(app.error_entries.is_empty());

        // A refetch carrying only the old entry stays hidden
        app.error_cleared_at = Some(old);
        let refetched = vec![
            LogRecord {
                timestamp: old,
                front_pressure: Some(0.1),
                rear_pressure: Some(0.2),
            },
            LogRecord {
                timestamp: old + chrono::Duration::seconds(10),
                front_pressure: Some(0.11),
                rear_pressure: Some(0.2),
            },
        ];
        let kept: Vec<LogRecord> = refetched
            .into_iter()
            .filter(|e| e.timestamp > app.error_cleared_at.unwrap())
            .collect();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_view_cycle() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);

        assert_eq!(app.current_view, View::Dashboard);
        app.next_view();
        assert_eq!(app.current_view, View::History);
        app.next_view();
        assert_eq!(app.current_view, View::Logs);
        app.next_view();
        assert_eq!(app.current_view, View::Dashboard);
        app.prev_view();
        assert_eq!(app.current_view, View::Logs);
    }

    #[test]
    fn test_export_without_history_fails() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);
        assert!(app.export_history(None).is_err());
    }

    #[test]
    fn test_export_writes_csv() {
        let dir = TempDir::new().unwrap();
        let (_tx, mut app) = test_app(&dir);

        app.history = Some(HistoryData::new(
            app.history_range,
            vec![LogRecord {
                timestamp: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
                front_pressure: Some(0.2),
                rear_pressure: Some(0.21),
            }],
        ));

        let out = dir.path().join("export.csv");
        let written = app.export_history(Some(out.clone())).unwrap();
        assert_eq!(written, out);
        let content = std::fs::read_to_string(out).unwrap();
        assert!(content.starts_with("timestamp,front_pressure,rear_pressure\n"));
        assert!(content.lines().count() == 2);
    }
}
