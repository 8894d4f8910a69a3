//! Wire types for the sensor API.
//!
//! These match the JSON shapes served by the pressure logger's read-only
//! endpoints. Deserialization failure of a required field is the schema
//! error the monitor treats as a skipped poll cycle.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A validated realtime reading, the monitor's input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub front: f64,
    pub rear: f64,
    pub timestamp: DateTime<Utc>,
}

/// `GET /api/realtime` payload.
///
/// `front_pressure` and `rear_pressure` are required; a payload missing
/// either fails deserialization and the poll cycle is skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeReading {
    pub front_pressure: f64,
    pub rear_pressure: f64,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl From<RealtimeReading> for Reading {
    fn from(wire: RealtimeReading) -> Self {
        Reading {
            front: wire.front_pressure,
            rear: wire.rear_pressure,
            timestamp: wire.timestamp,
        }
    }
}

/// `GET /api/average/hour` payload. `0.0` means "not yet available".
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HourlyAverages {
    pub front_average: f64,
    pub rear_average: f64,
}

impl HourlyAverages {
    pub fn front(&self) -> Option<f64> {
        available(self.front_average)
    }

    pub fn rear(&self) -> Option<f64> {
        available(self.rear_average)
    }
}

/// `GET /api/average/minute` payload, same zero-sentinel convention.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MinuteAverages {
    #[serde(rename = "front_averageM")]
    pub front_average: f64,
    #[serde(rename = "rear_averageM")]
    pub rear_average: f64,
}

impl MinuteAverages {
    pub fn front(&self) -> Option<f64> {
        available(self.front_average)
    }

    pub fn rear(&self) -> Option<f64> {
        available(self.rear_average)
    }
}

/// The averages endpoints report `0.0` until enough data has been logged;
/// that sentinel renders as a placeholder, never as a real zero.
fn available(value: f64) -> Option<f64> {
    if value == 0.0 {
        None
    } else {
        Some(value)
    }
}

/// One record from `/api/history`, `/api/log`, or `/api/error-log`.
///
/// Pressure fields may be `null` for gaps in the log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub front_pressure: Option<f64>,
    pub rear_pressure: Option<f64>,
}

/// The logger writes local naive ISO-8601 timestamps (`isoformat()` with
/// no offset); newer versions write RFC 3339. Accept both.
fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_timestamp(&s).ok_or_else(|| serde::de::Error::custom(format!("bad timestamp: {s}")))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_realtime_reading() {
        let json = r#"{
            "front_pressure": 0.182,
            "rear_pressure": 0.176,
            "timestamp": "2026-03-01T09:15:30.123456"
        }"#;

        let wire: RealtimeReading = serde_json::from_str(json).unwrap();
        let reading: Reading = wire.into();
        assert_eq!(reading.front, 0.182);
        assert_eq!(reading.rear, 0.176);
    }

    #[test]
    fn test_missing_pressure_field_is_schema_error() {
        let json = r#"{ "front_pressure": 0.182, "timestamp": "2026-03-01T09:15:30" }"#;
        assert!(serde_json::from_str::<RealtimeReading>(json).is_err());
    }

    #[test]
    fn test_rfc3339_timestamp_accepted() {
        let json = r#"{
            "front_pressure": 0.1,
            "rear_pressure": 0.2,
            "timestamp": "2026-03-01T09:15:30+09:00"
        }"#;
        let wire: RealtimeReading = serde_json::from_str(json).unwrap();
        assert_eq!(wire.timestamp.to_rfc3339(), "2026-03-01T00:15:30+00:00");
    }

    #[test]
    fn test_average_zero_is_unavailable() {
        let hourly = HourlyAverages {
            front_average: 0.0,
            rear_average: 0.151,
        };
        assert!(hourly.front().is_none());
        assert_eq!(hourly.rear(), Some(0.151));
    }

    #[test]
    fn test_minute_averages_field_names() {
        let json = r#"{ "front_averageM": 0.18, "rear_averageM": 0.0 }"#;
        let minute: MinuteAverages = serde_json::from_str(json).unwrap();
        assert_eq!(minute.front(), Some(0.18));
        assert!(minute.rear().is_none());
    }

    #[test]
    fn test_log_record_with_nulls() {
        let json = r#"{
            "timestamp": "2026-03-01T09:15:30",
            "front_pressure": null,
            "rear_pressure": 0.2
        }"#;
        let record: LogRecord = serde_json::from_str(json).unwrap();
        assert!(record.front_pressure.is_none());
        assert_eq!(record.rear_pressure, Some(0.2));
    }
}
