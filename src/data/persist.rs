//! Chart state persistence across restarts.
//!
//! The persistence slot is a single JSON file holding the full buffer state
//! plus a save timestamp. Restores are rejected when the file is missing,
//! unparsable, structurally inconsistent, or older than the staleness
//! window; all rejections fall back to the seed path rather than failing.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Serialized buffer state written to the state file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistedSnapshot {
    /// Time labels shared by both channels, oldest first.
    pub labels: Vec<String>,
    /// Front channel values; `null` entries are preserved gaps.
    pub front_values: Vec<Option<f64>>,
    /// Rear channel values.
    pub rear_values: Vec<Option<f64>>,
    /// When this snapshot was written.
    pub saved_at: DateTime<Utc>,
}

impl PersistedSnapshot {
    /// All three vectors must describe the same sample positions.
    pub fn is_consistent(&self) -> bool {
        self.labels.len() == self.front_values.len()
            && self.labels.len() == self.rear_values.len()
    }
}

/// Why a restore was rejected.
#[derive(Debug, Error)]
pub enum RestoreError {
    /// No snapshot has been written yet.
    #[error("no saved snapshot")]
    Missing,

    /// The state file exists but cannot be used.
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),

    /// The snapshot is older than the staleness window.
    #[error("snapshot is {age_secs}s old (window {window_secs}s)")]
    Stale { age_secs: i64, window_secs: u64 },
}

/// File-backed store for the persistence slot.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    stale_after: Duration,
}

impl SnapshotStore {
    pub fn new<P: AsRef<Path>>(path: P, stale_after: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            stale_after,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the snapshot, replacing any previous one.
    pub fn save(&self, snapshot: &PersistedSnapshot) -> anyhow::Result<()> {
        let json = serde_json::to_string(snapshot)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Best-effort save for process teardown. Failures are logged and
    /// swallowed so shutdown is never blocked.
    pub fn save_on_teardown(&self, snapshot: &PersistedSnapshot) {
        if let Err(e) = self.save(snapshot) {
            tracing::warn!(path = %self.path.display(), "teardown snapshot skipped: {e}");
        }
    }

    /// Read and validate the last snapshot.
    pub fn load(&self, now: DateTime<Utc>) -> Result<PersistedSnapshot, RestoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(RestoreError::Missing)
            }
            Err(e) => return Err(RestoreError::Corrupt(e.to_string())),
        };

        let snapshot: PersistedSnapshot =
            serde_json::from_str(&content).map_err(|e| RestoreError::Corrupt(e.to_string()))?;

        if !snapshot.is_consistent() {
            return Err(RestoreError::Corrupt(format!(
                "channel lengths differ: {} labels, {} front, {} rear",
                snapshot.labels.len(),
                snapshot.front_values.len(),
                snapshot.rear_values.len()
            )));
        }

        let age = now.signed_duration_since(snapshot.saved_at);
        if age.num_seconds() < 0 || age > chrono::Duration::from_std(self.stale_after).unwrap_or(chrono::Duration::MAX) {
            return Err(RestoreError::Stale {
                age_secs: age.num_seconds(),
                window_secs: self.stale_after.as_secs(),
            });
        }

        Ok(snapshot)
    }

    /// Like [`load`](Self::load) but collapses all failures into `None`
    /// after logging, for the startup seed path.
    pub fn try_restore(&self, now: DateTime<Utc>) -> Option<PersistedSnapshot> {
        match self.load(now) {
            Ok(snapshot) => Some(snapshot),
            Err(RestoreError::Missing) => None,
            Err(e) => {
                tracing::info!("snapshot not restored: {e}");
                None
            }
        }
    }
}
