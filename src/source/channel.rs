//! Channel-based data source.
//!
//! Receives readings via a tokio watch channel. Used by tests and by
//! embedders that already have readings in hand (e.g. a simulator).

use tokio::sync::watch;

use super::{Reading, ReadingSource};

/// A data source fed by a watch channel.
///
/// The producer pushes readings through the sender; `poll()` observes only
/// the latest value, which matches the monitor's "latest reading wins"
/// semantics.
#[derive(Debug)]
pub struct ChannelSource {
    receiver: watch::Receiver<Option<Reading>>,
    description: String,
}

impl ChannelSource {
    pub fn new(receiver: watch::Receiver<Option<Reading>>, source_description: &str) -> Self {
        Self {
            receiver,
            description: format!("channel: {}", source_description),
        }
    }

    /// Create a connected (sender, source) pair.
    pub fn create(source_description: &str) -> (watch::Sender<Option<Reading>>, Self) {
        let (tx, rx) = watch::channel(None);
        let source = Self::new(rx, source_description);
        (tx, source)
    }
}

impl ReadingSource for ChannelSource {
    fn poll(&mut self) -> Option<Reading> {
        if self.receiver.has_changed().unwrap_or(false) {
            *self.receiver.borrow_and_update()
        } else {
            None
        }
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        None
    }
}
