//! HTTP data source.
//!
//! Spawns a background task that polls `GET /api/realtime` on a fixed
//! cadence and makes the readings available via `poll()`. Fetch and schema
//! failures are recorded and logged; the cadence never stops.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;

use super::api::ApiClient;
use super::{Reading, ReadingSource};

/// A data source that polls the realtime endpoint of the sensor API.
///
/// Must be created inside a tokio runtime. The background task owns the
/// HTTP client; the UI thread only ever drains a channel, so a slow or
/// dead server can never stall a frame.
#[derive(Debug)]
pub struct HttpSource {
    receiver: mpsc::Receiver<Reading>,
    description: String,
    last_error: Arc<Mutex<Option<String>>>,
}

impl HttpSource {
    /// Spawn the polling task against the given API client.
    pub fn spawn(api: ApiClient, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let last_error = Arc::new(Mutex::new(None));
        let error_handle = last_error.clone();
        let description = format!("http: {}", api.base_url());

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                match api.realtime().await {
                    Ok(reading) => {
                        *error_handle.lock().unwrap() = None;
                        if tx.send(reading).await.is_err() {
                            // Receiver dropped, shut the task down
                            break;
                        }
                    }
                    Err(e) => {
                        tracing::warn!("realtime poll failed: {e}");
                        *error_handle.lock().unwrap() = Some(e.to_string());
                    }
                }
            }
        });

        Self {
            receiver: rx,
            description,
            last_error,
        }
    }
}

impl ReadingSource for HttpSource {
    fn poll(&mut self) -> Option<Reading> {
        // Drain to the newest reading; intermediate ones are superseded
        let mut latest = None;
        while let Ok(reading) = self.receiver.try_recv() {
            latest = Some(reading);
        }
        latest
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.lock().unwrap().clone()
    }
}
