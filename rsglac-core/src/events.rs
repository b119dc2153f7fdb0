//! Update notifications
//!
//! Components report each recomputation to an optional [`UpdateListener`] supplied at
//! construction. Nothing is reported for calls skipped by the update cadence.

use crate::timeseries::Time;
use log::info;
use std::fmt::Debug;
use std::sync::Mutex;
use std::time::Duration;

/// A completed component update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateEvent<'a> {
    pub component: &'a str,
    pub time: Time,
    /// Wall-clock time spent recomputing
    pub duration: Duration,
}

pub trait UpdateListener: Debug + Send + Sync {
    fn on_update(&self, event: &UpdateEvent<'_>);
}

/// Writes an info line for each update
#[derive(Debug, Default, Clone, Copy)]
pub struct LogListener;

impl UpdateListener for LogListener {
    fn on_update(&self, event: &UpdateEvent<'_>) {
        info!(
            "{} updated at t={} in {:.3} ms",
            event.component,
            event.time,
            event.duration.as_secs_f64() * 1.0e3
        );
    }
}

/// A recorded update
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateTiming {
    pub component: String,
    pub time: Time,
    pub duration: Duration,
}

/// Collects the duration of every update
#[derive(Debug, Default)]
pub struct TimingRecorder {
    timings: Mutex<Vec<UpdateTiming>>,
}

impl TimingRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timings(&self) -> Vec<UpdateTiming> {
        self.lock().clone()
    }

    /// Number of updates recorded for `component`
    pub fn count(&self, component: &str) -> usize {
        self.lock()
            .iter()
            .filter(|t| t.component == component)
            .count()
    }

    /// Total time spent updating `component`
    pub fn total(&self, component: &str) -> Duration {
        self.lock()
            .iter()
            .filter(|t| t.component == component)
            .map(|t| t.duration)
            .sum()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<UpdateTiming>> {
        // A panic while holding the lock cannot leave the list inconsistent
        self.timings.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl UpdateListener for TimingRecorder {
    fn on_update(&self, event: &UpdateEvent<'_>) {
        self.lock().push(UpdateTiming {
            component: event.component.to_string(),
            time: event.time,
            duration: event.duration,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorder_accumulates_per_component() {
        let recorder = TimingRecorder::new();
        for (component, ms) in [("climate", 2), ("smb", 5), ("climate", 3)] {
            recorder.on_update(&UpdateEvent {
                component,
                time: -1000.0,
                duration: Duration::from_millis(ms),
            });
        }
        assert_eq!(recorder.count("climate"), 2);
        assert_eq!(recorder.total("climate"), Duration::from_millis(5));
        assert_eq!(recorder.total("smb"), Duration::from_millis(5));
        assert_eq!(recorder.timings().len(), 3);
    }

    #[test]
    fn log_listener_does_not_require_a_logger() {
        LogListener.on_update(&UpdateEvent {
            component: "climate",
            time: 0.0,
            duration: Duration::ZERO,
        });
    }
}
