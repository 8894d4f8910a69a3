//! Settings file and environment configuration.
//!
//! Everything here can also be set on the command line; precedence is
//! CLI flag > `PRESSWATCH_*` environment variable > settings file >
//! built-in default.

use std::path::Path;

use anyhow::{Context, Result};
use ::config::{Config, Environment, File};
use serde::Deserialize;

use crate::data::{LabelPolicy, SeedPolicy};

/// Settings loadable from a TOML file and the environment.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the sensor API.
    pub url: String,
    /// Realtime poll cadence.
    pub poll_interval: String,
    /// Chart append cadence.
    pub chart_interval: String,
    /// Idle threshold in MPa.
    pub idle_threshold: f64,
    /// Low-pressure threshold in MPa.
    pub low_threshold: f64,
    /// Rolling chart capacity in samples.
    pub capacity: usize,
    /// Buffer seeding policy: "fixed-window" or "history-replay".
    pub seed_policy: String,
    /// Sample label policy: "wall-clock" or "reading-timestamp".
    pub label_policy: String,
    /// Path of the chart state file.
    pub state_file: String,
    /// Snapshot staleness window.
    pub stale_after: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: "http://localhost:5300".to_string(),
            poll_interval: "500ms".to_string(),
            chart_interval: "1s".to_string(),
            idle_threshold: 0.029,
            low_threshold: 0.125,
            capacity: 30,
            seed_policy: "fixed-window".to_string(),
            label_policy: "wall-clock".to_string(),
            state_file: "presswatch-state.json".to_string(),
            stale_after: "5m".to_string(),
        }
    }
}

impl Settings {
    /// Load from an optional settings file plus `PRESSWATCH_*` overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let config = builder
            .add_source(Environment::with_prefix("PRESSWATCH"))
            .build()
            .context("failed to read settings")?;

        // Missing keys fall back to the defaults via #[serde(default)]
        let settings: Settings = config
            .try_deserialize()
            .context("failed to parse settings")?;
        Ok(settings)
    }

    pub fn seed_policy(&self) -> Result<SeedPolicy> {
        match self.seed_policy.as_str() {
            "fixed-window" => Ok(SeedPolicy::FixedWindow),
            "history-replay" => Ok(SeedPolicy::HistoryReplay),
            other => anyhow::bail!(
                "unknown seed policy '{other}' (expected fixed-window or history-replay)"
            ),
        }
    }

    pub fn label_policy(&self) -> Result<LabelPolicy> {
        match self.label_policy.as_str() {
            "wall-clock" => Ok(LabelPolicy::WallClock),
            "reading-timestamp" => Ok(LabelPolicy::ReadingTimestamp),
            other => anyhow::bail!(
                "unknown label policy '{other}' (expected wall-clock or reading-timestamp)"
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.capacity, 30);
        assert_eq!(settings.idle_threshold, 0.029);
        assert_eq!(settings.low_threshold, 0.125);
        assert_eq!(settings.seed_policy().unwrap(), SeedPolicy::FixedWindow);
        assert_eq!(settings.label_policy().unwrap(), LabelPolicy::WallClock);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let mut file = NamedTempFile::with_suffix(".toml").unwrap();
        writeln!(
            file,
            "capacity = 60\nseed_policy = \"history-replay\"\nurl = \"http://raspi02:5300\""
        )
        .unwrap();
        file.flush().unwrap();

        let settings = Settings::load(Some(file.path())).unwrap();
        assert_eq!(settings.capacity, 60);
        assert_eq!(settings.url, "http://raspi02:5300");
        assert_eq!(settings.seed_policy().unwrap(), SeedPolicy::HistoryReplay);
        // Untouched keys keep their defaults
        assert_eq!(settings.low_threshold, 0.125);
    }

    #[test]
    fn test_bad_policy_rejected() {
        let settings = Settings {
            seed_policy: "always".to_string(),
            ..Settings::default()
        };
        assert!(settings.seed_policy().is_err());
    }
}
