//! Client for the sensor API's read-only endpoints.
//!
//! [`ApiClient`] wraps reqwest for the individual endpoints. [`ApiHandle`]
//! is the UI-facing side of a background worker that refreshes averages
//! and logs on their own cadences and serves history-range requests on
//! demand, delivering everything through a channel the UI loop drains.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tokio::sync::mpsc;

use super::wire::{HourlyAverages, LogRecord, MinuteAverages, Reading, RealtimeReading};
use crate::data::DateRange;

/// Errors from the sensor API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection refused, DNS, TLS).
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The server answered with a non-success status.
    #[error("API returned status {0}")]
    Status(u16),

    /// Response body did not match the expected schema.
    #[error("schema error: {0}")]
    Schema(String),

    /// Request timed out.
    #[error("request timed out")]
    Timeout,
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_decode() {
            ApiError::Schema(err.to_string())
        } else {
            ApiError::Fetch(err.to_string())
        }
    }
}

/// HTTP client for the read-only sensor endpoints.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Build a client for the given base URL (e.g. `http://raspi02:5300`).
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }

        // Read the body first so a schema mismatch is reported as such
        // rather than as a transport failure
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| ApiError::Schema(e.to_string()))
    }

    /// `GET /api/realtime`: the latest reading.
    pub async fn realtime(&self) -> Result<Reading, ApiError> {
        let wire: RealtimeReading = self.get_json("/api/realtime", &[]).await?;
        Ok(wire.into())
    }

    /// `GET /api/history`: recent readings for seeding the live charts.
    pub async fn recent_history(&self) -> Result<Vec<LogRecord>, ApiError> {
        self.get_json("/api/history", &[]).await
    }

    /// `GET /api/history?start_date=..&end_date=..`: a date range,
    /// chronological.
    pub async fn history_range(&self, range: DateRange) -> Result<Vec<LogRecord>, ApiError> {
        // Single days use the short form the server also accepts
        let query = if range.spans_multiple_days() {
            vec![
                ("start_date", range.start.to_string()),
                ("end_date", range.end.to_string()),
            ]
        } else {
            vec![("date", range.start.to_string())]
        };
        self.get_json("/api/history", &query).await
    }

    /// `GET /api/average/hour`.
    pub async fn hourly_average(&self) -> Result<HourlyAverages, ApiError> {
        self.get_json("/api/average/hour", &[]).await
    }

    /// `GET /api/average/minute`.
    pub async fn minute_average(&self) -> Result<MinuteAverages, ApiError> {
        self.get_json("/api/average/minute", &[]).await
    }

    /// `GET /api/log`: the live reading log.
    pub async fn log(&self) -> Result<Vec<LogRecord>, ApiError> {
        self.get_json("/api/log", &[]).await
    }

    /// `GET /api/error-log`: server-recorded low-pressure events.
    pub async fn error_log(&self) -> Result<Vec<LogRecord>, ApiError> {
        self.get_json("/api/error-log", &[]).await
    }
}

/// Requests the UI can send to the background worker.
#[derive(Debug)]
enum ApiCommand {
    FetchHistory(DateRange),
}

/// Results the worker delivers back to the UI loop.
#[derive(Debug)]
pub enum ApiUpdate {
    Hourly(HourlyAverages),
    Minute(MinuteAverages),
    Log(Vec<LogRecord>),
    ErrorLog(Vec<LogRecord>),
    History(DateRange, Vec<LogRecord>),
    /// A history fetch failed; the view shows the message instead of data.
    HistoryFailed(DateRange, String),
}

/// UI-side handle to the background API worker.
///
/// `drain()` is non-blocking and called once per UI frame; commands are
/// fire-and-forget.
#[derive(Debug)]
pub struct ApiHandle {
    commands: mpsc::Sender<ApiCommand>,
    updates: mpsc::Receiver<ApiUpdate>,
    last_error: Arc<Mutex<Option<String>>>,
}

impl ApiHandle {
    /// Spawn the worker. Averages refresh every `averages_interval`,
    /// logs every `logs_interval`. Must be called inside a tokio runtime.
    pub fn spawn(api: ApiClient, averages_interval: Duration, logs_interval: Duration) -> Self {
        let (cmd_tx, mut cmd_rx) = mpsc::channel::<ApiCommand>(8);
        let (update_tx, update_rx) = mpsc::channel::<ApiUpdate>(32);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();

        tokio::spawn(async move {
            let mut averages = tokio::time::interval(averages_interval);
            let mut logs = tokio::time::interval(logs_interval);
            averages.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            logs.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = averages.tick() => {
                        match api.hourly_average().await {
                            Ok(hourly) => {
                                *error_handle.lock().unwrap() = None;
                                if update_tx.send(ApiUpdate::Hourly(hourly)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => {
                                tracing::warn!("hourly average fetch failed: {e}");
                                *error_handle.lock().unwrap() = Some(e.to_string());
                            }
                        }
                        match api.minute_average().await {
                            Ok(minute) => {
                                if update_tx.send(ApiUpdate::Minute(minute)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("minute average fetch failed: {e}"),
                        }
                    }
                    _ = logs.tick() => {
                        match api.log().await {
                            Ok(entries) => {
                                if update_tx.send(ApiUpdate::Log(entries)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("log fetch failed: {e}"),
                        }
                        match api.error_log().await {
                            Ok(entries) => {
                                if update_tx.send(ApiUpdate::ErrorLog(entries)).await.is_err() {
                                    break;
                                }
                            }
                            Err(e) => tracing::warn!("error-log fetch failed: {e}"),
                        }
                    }
                    cmd = cmd_rx.recv() => {
                        let Some(cmd) = cmd else { break };
                        match cmd {
                            ApiCommand::FetchHistory(range) => {
                                let update = match api.history_range(range).await {
                                    Ok(entries) => ApiUpdate::History(range, entries),
                                    Err(e) => {
                                        tracing::warn!("history fetch failed: {e}");
                                        ApiUpdate::HistoryFailed(range, e.to_string())
                                    }
                                };
                                if update_tx.send(update).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            }
        });

        Self {
            commands: cmd_tx,
            updates: update_rx,
            last_error,
        }
    }

    /// Request a history range fetch; the result arrives via `drain()`.
    pub fn request_history(&self, range: DateRange) {
        let _ = self.commands.try_send(ApiCommand::FetchHistory(range));
    }

    /// Collect everything the worker has delivered since the last frame.
    pub fn drain(&mut self) -> Vec<ApiUpdate> {
        let mut updates = Vec::new();
        while let Ok(update) = self.updates.try_recv() {
            updates.push(update);
        }
        updates
    }

    /// The most recent worker-side failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}
