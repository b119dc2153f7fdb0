use crate::errors::{GlacError, GlacResult};
use crate::timeseries::Time;
use serde::{Deserialize, Serialize};

/// Periodic update gate of a component
///
/// A component recomputes its outputs when it has never been updated or when at least
/// `cadence` years have passed since the last update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UpdateSchedule {
    cadence: Time,
    last_update: Option<Time>,
}

impl UpdateSchedule {
    pub fn new(cadence: Time) -> GlacResult<Self> {
        if !cadence.is_finite() || cadence < 0.0 {
            return Err(GlacError::invalid_parameter(
                "update_cadence",
                cadence,
                "must be finite and non-negative",
            ));
        }
        Ok(Self {
            cadence,
            last_update: None,
        })
    }

    pub fn cadence(&self) -> Time {
        self.cadence
    }

    pub fn last_update(&self) -> Option<Time> {
        self.last_update
    }

    pub fn is_due(&self, t: Time) -> bool {
        match self.last_update {
            None => true,
            Some(last) => t - last >= self.cadence,
        }
    }

    /// Record an update at `t`
    pub fn mark(&mut self, t: Time) {
        self.last_update = Some(t);
    }

    /// Forget the last update so the next call recomputes
    pub fn reset(&mut self) {
        self.last_update = None;
    }
}

/// Result of a scheduled update
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Update<T> {
    /// Outputs were recomputed
    Updated(T),
    /// The cadence was not reached; the previous outputs still apply
    NoUpdate,
}

impl<T> Update<T> {
    pub fn is_updated(&self) -> bool {
        matches!(self, Update::Updated(_))
    }

    pub fn updated(self) -> Option<T> {
        match self {
            Update::Updated(value) => Some(value),
            Update::NoUpdate => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Update<U> {
        match self {
            Update::Updated(value) => Update::Updated(f(value)),
            Update::NoUpdate => Update::NoUpdate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_is_always_due() {
        let schedule = UpdateSchedule::new(100.0).unwrap();
        assert!(schedule.is_due(-20000.0));
        assert_eq!(schedule.last_update(), None);
    }

    #[test]
    fn cadence_gates_updates() {
        let mut schedule = UpdateSchedule::new(10.0).unwrap();
        schedule.mark(0.0);
        assert!(!schedule.is_due(0.0));
        assert!(!schedule.is_due(9.999));
        assert!(schedule.is_due(10.0));
        // Going back in time never triggers an update
        assert!(!schedule.is_due(-50.0));

        schedule.reset();
        assert!(schedule.is_due(-50.0));
    }

    #[test]
    fn zero_cadence_updates_every_call() {
        let mut schedule = UpdateSchedule::new(0.0).unwrap();
        schedule.mark(5.0);
        assert!(schedule.is_due(5.0));
    }

    #[test]
    fn invalid_cadence() {
        assert!(UpdateSchedule::new(-1.0).is_err());
        assert!(UpdateSchedule::new(f64::NAN).is_err());
    }

    #[test]
    fn update_helpers() {
        let update = Update::Updated(2);
        assert!(update.is_updated());
        assert_eq!(update.map(|v| v * 2).updated(), Some(4));
        assert_eq!(Update::<i32>::NoUpdate.updated(), None);
    }
}
