//! Real-time pressure monitoring and alarm state computation.
//!
//! This module tracks the latest front/rear readings and derives a discrete
//! alarm state from configurable thresholds, with manual-dismiss memory for
//! the alarm overlays.

use chrono::{DateTime, Utc};

use crate::source::Reading;

/// Pressure thresholds for alarm state computation, in MPa.
///
/// `idle` must be strictly below `low`: readings at or below `idle` mean the
/// line is depressurized (machine off), readings between the two mean the
/// line is losing pressure while running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// At or below this the system is considered idle.
    pub idle: f64,
    /// Below this (but above idle) the system is in low-pressure alarm.
    pub low: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            idle: 0.029,
            low: 0.125,
        }
    }
}

impl Thresholds {
    /// Validate the configuration invariant `idle < low`.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.idle >= self.low {
            anyhow::bail!(
                "idle threshold ({}) must be below low threshold ({})",
                self.idle,
                self.low
            );
        }
        Ok(())
    }
}

/// Discrete alarm state derived from the latest reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmState {
    /// Both channels at or above the low threshold.
    Normal,
    /// At least one channel at or below the idle threshold.
    Idle,
    /// At least one channel below the low threshold, neither at idle.
    LowPressure,
}

impl AlarmState {
    /// Short label for display.
    pub fn label(&self) -> &'static str {
        match self {
            AlarmState::Normal => "NORMAL",
            AlarmState::Idle => "IDLE",
            AlarmState::LowPressure => "LOW",
        }
    }
}

/// Classify a pair of readings against the thresholds.
///
/// The three branches are mutually exclusive and evaluated in order:
/// normal wins over idle, idle wins over low-pressure. Boundaries are
/// inclusive on the normal side (`>= low`) and on the idle side (`<= idle`).
pub fn classify(front: f64, rear: f64, thresholds: &Thresholds) -> AlarmState {
    if front >= thresholds.low && rear >= thresholds.low {
        AlarmState::Normal
    } else if front <= thresholds.idle || rear <= thresholds.idle {
        AlarmState::Idle
    } else {
        AlarmState::LowPressure
    }
}

/// Values captured at the moment a low-pressure alarm was raised.
///
/// Shown in the alarm overlay so the operator sees what tripped it even if
/// the live values have since moved.
#[derive(Debug, Clone, Copy)]
pub struct AlarmDetail {
    pub raised_at: DateTime<Utc>,
    pub front: f64,
    pub rear: f64,
}

/// Tracks current pressure values and the derived alarm state.
///
/// The monitor owns the two dismissal flags: dismissing an overlay
/// suppresses its re-display until the next transition through
/// [`AlarmState::Normal`], which clears both flags.
#[derive(Debug)]
pub struct Monitor {
    thresholds: Thresholds,
    front: Option<f64>,
    rear: Option<f64>,
    last_reading_at: Option<DateTime<Utc>>,
    state: AlarmState,
    idle_dismissed: bool,
    low_dismissed: bool,
    alarm_detail: Option<AlarmDetail>,
}

impl Monitor {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            thresholds,
            front: None,
            rear: None,
            last_reading_at: None,
            state: AlarmState::Normal,
            idle_dismissed: false,
            low_dismissed: false,
            alarm_detail: None,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Latest front pressure, if any reading has been received.
    pub fn front(&self) -> Option<f64> {
        self.front
    }

    /// Latest rear pressure, if any reading has been received.
    pub fn rear(&self) -> Option<f64> {
        self.rear
    }

    /// Timestamp of the last successful reading.
    pub fn last_reading_at(&self) -> Option<DateTime<Utc>> {
        self.last_reading_at
    }

    pub fn state(&self) -> AlarmState {
        self.state
    }

    /// Detail captured when the current low-pressure alarm was raised.
    pub fn alarm_detail(&self) -> Option<&AlarmDetail> {
        self.alarm_detail.as_ref()
    }

    /// Ingest one successful reading and recompute the alarm state.
    ///
    /// A transition to Normal clears both dismissal flags. Failed polls
    /// never reach this method, so prior values and state are retained
    /// across fetch errors.
    pub fn observe(&mut self, reading: &Reading) -> AlarmState {
        self.front = Some(reading.front);
        self.rear = Some(reading.rear);
        self.last_reading_at = Some(reading.timestamp);

        let next = classify(reading.front, reading.rear, &self.thresholds);

        match next {
            AlarmState::Normal => {
                self.idle_dismissed = false;
                self.low_dismissed = false;
                self.alarm_detail = None;
            }
            AlarmState::LowPressure => {
                // Capture the trip values once per alarm episode
                if self.alarm_detail.is_none() {
                    self.alarm_detail = Some(AlarmDetail {
                        raised_at: Utc::now(),
                        front: reading.front,
                        rear: reading.rear,
                    });
                }
            }
            AlarmState::Idle => {}
        }

        self.state = next;
        next
    }

    /// Manually dismiss the overlay for the given state.
    ///
    /// No effect for [`AlarmState::Normal`]. The flag stays set until the
    /// next Normal transition; re-entering the same non-normal state does
    /// not re-show the overlay.
    pub fn dismiss(&mut self, state: AlarmState) {
        match state {
            AlarmState::Idle => self.idle_dismissed = true,
            AlarmState::LowPressure => self.low_dismissed = true,
            AlarmState::Normal => {}
        }
    }

    /// Dismiss whichever overlay is currently visible.
    pub fn dismiss_current(&mut self) {
        self.dismiss(self.state);
    }

    /// Whether the idle overlay should be shown.
    pub fn idle_visible(&self) -> bool {
        self.state == AlarmState::Idle && !self.idle_dismissed
    }

    /// Whether the low-pressure overlay should be shown.
    pub fn low_visible(&self) -> bool {
        self.state == AlarmState::LowPressure && !self.low_dismissed
    }

    #[cfg(test)]
    pub(crate) fn idle_dismissed(&self) -> bool {
        self.idle_dismissed
    }

    #[cfg(test)]
    pub(crate) fn low_dismissed(&self) -> bool {
        self.low_dismissed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reading(front: f64, rear: f64) -> Reading {
        Reading {
            front,
            rear,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_classify_normal_when_both_at_or_above_low() {
        let t = Thresholds::default();
        assert_eq!(classify(0.2, 0.2, &t), AlarmState::Normal);
        // Exactly at the low threshold counts as normal (inclusive >=)
        assert_eq!(classify(0.125, 0.125, &t), AlarmState::Normal);
        assert_eq!(classify(0.125, 0.3, &t), AlarmState::Normal);
    }

    #[test]
    fn test_classify_idle_boundary_inclusive() {
        let t = Thresholds::default();
        // Exactly at the idle threshold is idle, not low-pressure
        assert_eq!(classify(0.029, 0.2, &t), AlarmState::Idle);
        assert_eq!(classify(0.2, 0.029, &t), AlarmState::Idle);
        assert_eq!(classify(0.0, 0.0, &t), AlarmState::Idle);
        // Idle on one channel wins even with the other below low
        assert_eq!(classify(0.01, 0.05, &t), AlarmState::Idle);
    }

    #[test]
    fn test_classify_low_pressure_between_thresholds() {
        let t = Thresholds::default();
        // front between idle and low, rear normal
        assert_eq!(classify(0.100, 0.150, &t), AlarmState::LowPressure);
        assert_eq!(classify(0.2, 0.03, &t), AlarmState::LowPressure);
    }

    #[test]
    fn test_normal_clears_dismiss_flags() {
        let mut m = Monitor::new(Thresholds::default());
        m.observe(&reading(0.1, 0.2));
        assert_eq!(m.state(), AlarmState::LowPressure);
        m.dismiss(AlarmState::LowPressure);
        assert!(m.low_dismissed());

        m.observe(&reading(0.2, 0.2));
        assert_eq!(m.state(), AlarmState::Normal);
        assert!(!m.low_dismissed());
        assert!(!m.idle_dismissed());
    }

    #[test]
    fn test_dismiss_suppresses_redisplay_until_normal() {
        let mut m = Monitor::new(Thresholds::default());
        m.observe(&reading(0.1, 0.2));
        assert!(m.low_visible());

        m.dismiss(AlarmState::LowPressure);
        assert!(!m.low_visible());

        // Another low-pressure reading does not re-show the overlay
        m.observe(&reading(0.09, 0.2));
        assert!(!m.low_visible());

        // A normal reading resets the flag; the next low reading re-shows
        m.observe(&reading(0.2, 0.2));
        m.observe(&reading(0.1, 0.2));
        assert!(m.low_visible());
    }

    #[test]
    fn test_idle_dismiss_independent_of_low_dismiss() {
        let mut m = Monitor::new(Thresholds::default());
        m.observe(&reading(0.0, 0.0));
        assert!(m.idle_visible());
        m.dismiss(AlarmState::Idle);
        assert!(!m.idle_visible());

        // Moving to low-pressure still shows the low overlay
        m.observe(&reading(0.1, 0.2));
        assert!(m.low_visible());
    }

    #[test]
    fn test_alarm_detail_captured_once_per_episode() {
        let mut m = Monitor::new(Thresholds::default());
        m.observe(&reading(0.1, 0.2));
        let first = m.alarm_detail().unwrap().front;
        assert_eq!(first, 0.1);

        // Stays pinned to the trip values while the alarm persists
        m.observe(&reading(0.05, 0.2));
        assert_eq!(m.alarm_detail().unwrap().front, 0.1);

        // Cleared by normal, recaptured on the next episode
        m.observe(&reading(0.2, 0.2));
        assert!(m.alarm_detail().is_none());
        m.observe(&reading(0.08, 0.2));
        assert_eq!(m.alarm_detail().unwrap().front, 0.08);
    }

    #[test]
    fn test_failed_poll_retains_prior_values() {
        let mut m = Monitor::new(Thresholds::default());
        m.observe(&reading(0.2, 0.2));
        // A failed poll simply never calls observe()
        assert_eq!(m.front(), Some(0.2));
        assert_eq!(m.state(), AlarmState::Normal);
    }

    #[test]
    fn test_threshold_validation() {
        assert!(Thresholds::default().validate().is_ok());
        let bad = Thresholds {
            idle: 0.2,
            low: 0.1,
        };
        assert!(bad.validate().is_err());
    }
}
