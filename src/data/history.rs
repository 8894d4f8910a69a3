//! Date-range historical data for the History view.
//!
//! Holds the raw records fetched from `/api/history`, thins them to a
//! chartable point count, and formats the full (unthinned) range as
//! CSV for export.

use chrono::{Duration, Local, NaiveDate};

use crate::source::LogRecord;

/// Maximum number of points handed to the chart. Ranges longer than this
/// are thinned with a fixed stride so the plot stays readable.
pub const MAX_CHART_POINTS: usize = 600;

/// An inclusive start/end date pair for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Default range: yesterday through today.
    pub fn last_day() -> Self {
        let today = Local::now().date_naive();
        Self {
            start: today - Duration::days(1),
            end: today,
        }
    }

    /// Move the start date by `days`, clamped to not pass the end.
    pub fn shift_start(&mut self, days: i64) {
        let shifted = self.start + Duration::days(days);
        self.start = shifted.min(self.end);
    }

    /// Move the end date by `days`, clamped to not precede the start and
    /// not run into the future.
    pub fn shift_end(&mut self, days: i64) {
        let today = Local::now().date_naive();
        let shifted = self.end + Duration::days(days);
        self.end = shifted.max(self.start).min(today);
    }

    pub fn spans_multiple_days(&self) -> bool {
        self.start != self.end
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} .. {}", self.start, self.end)
    }
}

/// A fetched history range, kept in chronological order.
#[derive(Debug, Clone)]
pub struct HistoryData {
    pub range: DateRange,
    pub entries: Vec<LogRecord>,
}

impl HistoryData {
    pub fn new(range: DateRange, entries: Vec<LogRecord>) -> Self {
        Self { range, entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries thinned to at most `max_points` with a uniform stride.
    ///
    /// The stride keeps the first entry of each step, preserving
    /// chronological order; export always uses the unthinned entries.
    pub fn thinned(&self, max_points: usize) -> Vec<&LogRecord> {
        if self.entries.len() <= max_points {
            return self.entries.iter().collect();
        }
        let step = self.entries.len().div_ceil(max_points);
        self.entries.iter().step_by(step).collect()
    }

    /// Full range as CSV, one record per line.
    pub fn to_csv(&self) -> String {
        let mut csv = String::from("timestamp,front_pressure,rear_pressure\n");
        for entry in &self.entries {
            csv.push_str(&format!(
                "{},{},{}\n",
                entry.timestamp.to_rfc3339(),
                format_value(entry.front_pressure),
                format_value(entry.rear_pressure),
            ));
        }
        csv
    }

    /// Default export filename for this range.
    pub fn csv_filename(&self) -> String {
        format!(
            "pressure_history_{}_to_{}.csv",
            self.range.start, self.range.end
        )
    }
}

fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) => v.to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(secs: i64, front: f64) -> LogRecord {
        LogRecord {
            timestamp: Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap(),
            front_pressure: Some(front),
            rear_pressure: Some(front),
        }
    }

    fn range() -> DateRange {
        DateRange {
            start: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
        }
    }

    #[test]
    fn test_thinning_respects_budget_and_order() {
        let entries: Vec<LogRecord> = (0..2000).map(|i| record(i, i as f64)).collect();
        let data = HistoryData::new(range(), entries);

        let thinned = data.thinned(600);
        assert!(thinned.len() <= 600);
        assert!(thinned.len() > 400);

        // Still chronological
        for pair in thinned.windows(2) {
            assert!(pair[0].timestamp < pair[1].timestamp);
        }
    }

    #[test]
    fn test_short_ranges_not_thinned() {
        let entries: Vec<LogRecord> = (0..100).map(|i| record(i, 0.2)).collect();
        let data = HistoryData::new(range(), entries);
        assert_eq!(data.thinned(600).len(), 100);
    }

    #[test]
    fn test_csv_header_and_rows() {
        let mut entries = vec![record(0, 0.15)];
        entries.push(LogRecord {
            timestamp: Utc.timestamp_opt(1_700_000_001, 0).unwrap(),
            front_pressure: None,
            rear_pressure: Some(0.2),
        });
        let data = HistoryData::new(range(), entries);

        let csv = data.to_csv();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "timestamp,front_pressure,rear_pressure");
        assert!(lines[1].ends_with(",0.15,0.15"));
        // Null values export as empty fields
        assert!(lines[2].ends_with(",,0.2"));
    }

    #[test]
    fn test_csv_filename_includes_range() {
        let data = HistoryData::new(range(), vec![]);
        assert_eq!(
            data.csv_filename(),
            "pressure_history_2026-03-01_to_2026-03-02.csv"
        );
    }

    #[test]
    fn test_range_shifts_are_clamped() {
        let mut r = range();
        r.shift_start(30);
        assert_eq!(r.start, r.end);

        let mut r = range();
        r.shift_end(-30);
        assert_eq!(r.end, r.start);
    }
}
