//! Rolling time-series buffers backing the live charts.
//!
//! One fixed-capacity buffer per channel (front, rear). Appends are driven
//! by the chart tick, one sample per tick, with strict FIFO eviction once
//! the buffer is full. The full state round-trips through a
//! [`PersistedSnapshot`] so a restart within the staleness window resumes
//! the chart where it left off.

use std::collections::VecDeque;

use chrono::{DateTime, Local, Utc};

use super::persist::PersistedSnapshot;
use crate::source::Reading;

/// How the buffers are seeded when no usable snapshot exists.
///
/// The two policies differ when history is shorter than the capacity:
/// `FixedWindow` pads the head with null samples so the chart always spans
/// a full window, `HistoryReplay` starts with exactly what the history
/// contains and grows to capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SeedPolicy {
    #[default]
    FixedWindow,
    HistoryReplay,
}

/// Where appended samples get their time label from.
///
/// `WallClock` labels with the tick time; `ReadingTimestamp` labels with
/// the timestamp the reading itself carried. The two diverge under fetch
/// latency or jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LabelPolicy {
    #[default]
    WallClock,
    ReadingTimestamp,
}

/// One chart point. A `None` value still occupies a slot so the buffer
/// length stays fixed.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub label: String,
    pub value: Option<f64>,
}

impl Sample {
    pub fn blank() -> Self {
        Self {
            label: String::new(),
            value: None,
        }
    }
}

/// Fixed-capacity ordered buffer of samples, oldest first.
#[derive(Debug, Clone)]
pub struct SeriesBuffer {
    samples: VecDeque<Sample>,
    capacity: usize,
}

impl SeriesBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Append one sample, evicting the single oldest if over capacity.
    pub fn push(&mut self, sample: Sample) {
        self.samples.push_back(sample);
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter()
    }

    /// The plotted values in chronological order.
    pub fn values(&self) -> Vec<Option<f64>> {
        self.samples.iter().map(|s| s.value).collect()
    }

    pub fn labels(&self) -> Vec<String> {
        self.samples.iter().map(|s| s.label.clone()).collect()
    }
}

/// Format a timestamp as a chart label (local HH:MM:SS).
pub fn time_label(ts: DateTime<Utc>) -> String {
    ts.with_timezone(&Local).format("%H:%M:%S").to_string()
}

/// Rolling front/rear buffers with a shared label stream.
///
/// Both channels always advance together, so their lengths are equal at
/// all times and a single label vector describes both.
#[derive(Debug)]
pub struct RollingSeries {
    front: SeriesBuffer,
    rear: SeriesBuffer,
    capacity: usize,
    seed: SeedPolicy,
    labels: LabelPolicy,
}

impl RollingSeries {
    pub fn new(capacity: usize, seed: SeedPolicy, labels: LabelPolicy) -> Self {
        Self {
            front: SeriesBuffer::new(capacity),
            rear: SeriesBuffer::new(capacity),
            capacity,
            seed,
            labels,
        }
    }

    pub fn front(&self) -> &SeriesBuffer {
        &self.front
    }

    pub fn rear(&self) -> &SeriesBuffer {
        &self.rear
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Seed the buffers at startup.
    ///
    /// A restored snapshot wins verbatim over history. Otherwise the most
    /// recent `capacity` history entries are replayed with their own
    /// timestamps as labels; under [`SeedPolicy::FixedWindow`] a short
    /// history is padded to capacity with blank samples at the head.
    pub fn initialize(&mut self, restored: Option<PersistedSnapshot>, history: &[Reading]) {
        if let Some(snapshot) = restored {
            self.restore_from(snapshot);
            return;
        }

        if self.seed == SeedPolicy::FixedWindow {
            let pad = self.capacity.saturating_sub(history.len());
            for _ in 0..pad {
                self.front.push(Sample::blank());
                self.rear.push(Sample::blank());
            }
        }

        let skip = history.len().saturating_sub(self.capacity);
        for reading in &history[skip..] {
            let label = time_label(reading.timestamp);
            self.front.push(Sample {
                label: label.clone(),
                value: Some(reading.front),
            });
            self.rear.push(Sample {
                label,
                value: Some(reading.rear),
            });
        }
    }

    /// Append the latest reading on a chart tick.
    ///
    /// The label comes from `now` or from the reading's own timestamp
    /// depending on the configured [`LabelPolicy`].
    pub fn append(&mut self, reading: &Reading, now: DateTime<Utc>) {
        let label = match self.labels {
            LabelPolicy::WallClock => time_label(now),
            LabelPolicy::ReadingTimestamp => time_label(reading.timestamp),
        };
        self.front.push(Sample {
            label: label.clone(),
            value: Some(reading.front),
        });
        self.rear.push(Sample {
            label,
            value: Some(reading.rear),
        });
    }

    /// Append a null sample pair, used when a tick fires with no reading
    /// available yet. Keeps both channels advancing in lockstep.
    pub fn append_gap(&mut self, now: DateTime<Utc>) {
        let label = time_label(now);
        self.front.push(Sample {
            label: label.clone(),
            value: None,
        });
        self.rear.push(Sample {
            label,
            value: None,
        });
    }

    /// Serialize the full buffer state for the persistence slot.
    pub fn snapshot(&self, now: DateTime<Utc>) -> PersistedSnapshot {
        PersistedSnapshot {
            labels: self.front.labels(),
            front_values: self.front.values(),
            rear_values: self.rear.values(),
            saved_at: now,
        }
    }

    fn restore_from(&mut self, snapshot: PersistedSnapshot) {
        for ((label, front), rear) in snapshot
            .labels
            .into_iter()
            .zip(snapshot.front_values)
            .zip(snapshot.rear_values)
        {
            self.front.push(Sample {
                label: label.clone(),
                value: front,
            });
            self.rear.push(Sample {
                label,
                value: rear,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(front: f64, rear: f64, ts: DateTime<Utc>) -> Reading {
        Reading {
            front,
            rear,
            timestamp: ts,
        }
    }

    fn series(capacity: usize, seed: SeedPolicy) -> RollingSeries {
        RollingSeries::new(capacity, seed, LabelPolicy::WallClock)
    }

    #[test]
    fn test_push_evicts_single_oldest_at_capacity() {
        let mut buf = SeriesBuffer::new(30);
        for i in 0..35 {
            buf.push(Sample {
                label: format!("t{i}"),
                value: Some(i as f64),
            });
            assert!(buf.len() <= 30);
        }
        assert_eq!(buf.len(), 30);

        // The first five appends must have been evicted, oldest first
        let labels = buf.labels();
        for i in 0..5 {
            assert!(!labels.contains(&format!("t{i}")));
        }
        assert_eq!(labels[0], "t5");
        assert_eq!(labels[29], "t34");
    }

    #[test]
    fn test_append_keeps_channels_in_lockstep() {
        let mut s = series(3, SeedPolicy::HistoryReplay);
        let now = Utc::now();
        for i in 0..5 {
            s.append(&reading(0.1 + i as f64, 0.2 + i as f64, now), now);
        }
        assert_eq!(s.front().len(), 3);
        assert_eq!(s.rear().len(), 3);
        assert_eq!(s.front().values()[2], Some(4.1));
        assert_eq!(s.rear().values()[2], Some(4.2));
    }

    #[test]
    fn test_fixed_window_pads_short_history() {
        let mut s = series(30, SeedPolicy::FixedWindow);
        let now = Utc::now();
        let history: Vec<Reading> = (0..10).map(|_| reading(0.2, 0.2, now)).collect();
        s.initialize(None, &history);
        assert_eq!(s.front().len(), 30);
        // Head padded with nulls, tail holds the real values
        assert_eq!(s.front().values()[0], None);
        assert_eq!(s.front().values()[19], None);
        assert_eq!(s.front().values()[20], Some(0.2));
    }

    #[test]
    fn test_history_replay_keeps_exact_length() {
        let mut s = series(30, SeedPolicy::HistoryReplay);
        let now = Utc::now();
        let history: Vec<Reading> = (0..10).map(|_| reading(0.2, 0.2, now)).collect();
        s.initialize(None, &history);
        assert_eq!(s.front().len(), 10);
    }

    #[test]
    fn test_initialize_takes_trailing_capacity_entries() {
        let mut s = series(30, SeedPolicy::HistoryReplay);
        let now = Utc::now();
        let history: Vec<Reading> =
            (0..50).map(|i| reading(i as f64, i as f64, now)).collect();
        s.initialize(None, &history);
        assert_eq!(s.front().len(), 30);
        // The most recent 30 entries (20..50)
        assert_eq!(s.front().values()[0], Some(20.0));
        assert_eq!(s.front().values()[29], Some(49.0));
    }

    #[test]
    fn test_initialize_empty_fixed_window_is_all_blank() {
        let mut s = series(30, SeedPolicy::FixedWindow);
        s.initialize(None, &[]);
        assert_eq!(s.front().len(), 30);
        assert!(s.front().values().iter().all(|v| v.is_none()));
        assert!(s.front().labels().iter().all(|l| l.is_empty()));
    }

    #[test]
    fn test_restored_snapshot_wins_over_history() {
        let mut s = series(30, SeedPolicy::FixedWindow);
        let now = Utc::now();
        let snapshot = PersistedSnapshot {
            labels: vec!["a".into(), "b".into()],
            front_values: vec![Some(0.1), None],
            rear_values: vec![Some(0.3), Some(0.4)],
            saved_at: now,
        };
        let history = vec![reading(0.9, 0.9, now)];
        s.initialize(Some(snapshot), &history);
        assert_eq!(s.front().len(), 2);
        assert_eq!(s.front().labels(), vec!["a", "b"]);
        assert_eq!(s.front().values(), vec![Some(0.1), None]);
        assert_eq!(s.rear().values(), vec![Some(0.3), Some(0.4)]);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_buffers() {
        let mut s = series(5, SeedPolicy::HistoryReplay);
        let now = Utc::now();
        for i in 0..4 {
            s.append(&reading(i as f64, 10.0 + i as f64, now), now);
        }
        s.append_gap(now);

        let snap = s.snapshot(now);
        let mut restored = series(5, SeedPolicy::HistoryReplay);
        restored.initialize(Some(snap), &[]);

        assert_eq!(restored.front().labels(), s.front().labels());
        assert_eq!(restored.front().values(), s.front().values());
        assert_eq!(restored.rear().values(), s.rear().values());
    }

    #[test]
    fn test_label_policy_reading_timestamp() {
        let ts = "2026-03-01T00:00:05Z".parse::<DateTime<Utc>>().unwrap();
        let now = "2026-03-01T00:00:09Z".parse::<DateTime<Utc>>().unwrap();

        let mut wall = RollingSeries::new(5, SeedPolicy::HistoryReplay, LabelPolicy::WallClock);
        wall.append(&reading(0.2, 0.2, ts), now);
        let mut own =
            RollingSeries::new(5, SeedPolicy::HistoryReplay, LabelPolicy::ReadingTimestamp);
        own.append(&reading(0.2, 0.2, ts), now);

        assert_eq!(wall.front().labels()[0], time_label(now));
        assert_eq!(own.front().labels()[0], time_label(ts));
    }
}
