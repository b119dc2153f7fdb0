use crate::errors::{GlacError, GlacResult};
use crate::interpolate::interp_flat;
use ndarray::Array1;
use serde::{Deserialize, Serialize};

pub type FloatValue = f64;
/// Time in (calendar or offset) years
pub type Time = f64;

/// Strictly increasing sequence of times
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    values: Array1<Time>,
}

impl TimeAxis {
    /// Create a time axis from a sequence of values
    ///
    /// Fails if the axis is empty, contains non-finite values or is not strictly increasing.
    pub fn from_values(values: Array1<Time>) -> GlacResult<Self> {
        if values.is_empty() {
            return Err(GlacError::Error("time axis is empty".to_string()));
        }
        if values.iter().any(|t| !t.is_finite()) {
            return Err(GlacError::Error(
                "time axis contains non-finite values".to_string(),
            ));
        }
        if values
            .windows(2)
            .into_iter()
            .any(|pair| pair[1] <= pair[0])
        {
            return Err(GlacError::Error(
                "time axis must be strictly increasing".to_string(),
            ));
        }
        Ok(Self { values })
    }

    /// Regular axis from `start` to `end` (inclusive when it falls on a step)
    pub fn range(start: Time, end: Time, step: Time) -> GlacResult<Self> {
        if !step.is_finite() || step <= 0.0 {
            return Err(GlacError::invalid_parameter(
                "step",
                step,
                "must be positive",
            ));
        }
        if end < start {
            return Err(GlacError::Error(format!(
                "time axis end {end} is before start {start}"
            )));
        }
        let n = ((end - start) / step + 1e-9).floor() as usize + 1;
        let values = Array1::from_iter((0..n).map(|i| start + step * i as Time));
        Self::from_values(values)
    }

    pub fn values(&self) -> &Array1<Time> {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn first(&self) -> Time {
        self.values[0]
    }

    pub fn last(&self) -> Time {
        self.values[self.values.len() - 1]
    }

    pub fn iter(&self) -> impl Iterator<Item = Time> + '_ {
        self.values.iter().copied()
    }
}

/// A scalar timeseries interpolated linearly with flat extrapolation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timeseries {
    time_axis: TimeAxis,
    values: Array1<FloatValue>,
    unit: String,
}

impl Timeseries {
    pub fn new(values: Array1<FloatValue>, time_axis: TimeAxis, unit: String) -> GlacResult<Self> {
        if values.len() != time_axis.len() {
            return Err(GlacError::shape_mismatch(
                "timeseries values",
                &[time_axis.len()],
                &[values.len()],
            ));
        }
        Ok(Self {
            time_axis,
            values,
            unit,
        })
    }

    /// Build a timeseries from unordered `(time, value)` samples
    ///
    /// Samples with a non-finite time or value are dropped, the remainder is sorted by
    /// time and only the first sample of a duplicated time is kept.
    pub fn from_samples(
        samples: impl IntoIterator<Item = (Time, FloatValue)>,
        unit: &str,
    ) -> GlacResult<Self> {
        let mut samples: Vec<(Time, FloatValue)> = samples
            .into_iter()
            .filter(|(t, v)| t.is_finite() && v.is_finite())
            .collect();
        // Stable sort keeps the first of duplicated times in front
        samples.sort_by(|a, b| a.0.total_cmp(&b.0));
        samples.dedup_by(|later, earlier| later.0 == earlier.0);

        let (times, values): (Vec<Time>, Vec<FloatValue>) = samples.into_iter().unzip();
        Self::new(
            Array1::from(values),
            TimeAxis::from_values(Array1::from(times))?,
            unit.to_string(),
        )
    }

    pub fn time_axis(&self) -> &TimeAxis {
        &self.time_axis
    }

    pub fn values(&self) -> &Array1<FloatValue> {
        &self.values
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `time`, linearly interpolated and clamped to the end values outside the axis
    pub fn at_time(&self, time: Time) -> FloatValue {
        // Owned arrays are always contiguous
        match (self.time_axis.values().as_slice(), self.values.as_slice()) {
            (Some(xs), Some(ys)) => interp_flat(time, xs, ys).unwrap_or(FloatValue::NAN),
            _ => FloatValue::NAN,
        }
    }

    /// Time and value of the smallest sample (first occurrence wins)
    pub fn min(&self) -> (Time, FloatValue) {
        let mut best = 0;
        for (i, &v) in self.values.iter().enumerate() {
            if v < self.values[best] {
                best = i;
            }
        }
        (self.time_axis.values()[best], self.values[best])
    }

    /// Multiply every value by `factor`
    pub fn scaled(&self, factor: FloatValue) -> Self {
        Self {
            time_axis: self.time_axis.clone(),
            values: self.values.mapv(|v| v * factor),
            unit: self.unit.clone(),
        }
    }

    /// Add `shift` to every value
    pub fn shifted(&self, shift: FloatValue) -> Self {
        Self {
            time_axis: self.time_axis.clone(),
            values: self.values.mapv(|v| v + shift),
            unit: self.unit.clone(),
        }
    }

    /// Keep only samples with `start <= time <= end`
    pub fn window(&self, start: Time, end: Time) -> GlacResult<Self> {
        Self::from_samples(
            self.iter().filter(|(t, _)| *t >= start && *t <= end),
            &self.unit,
        )
    }

    /// Resample onto a regular axis with spacing `step` spanning the original axis
    pub fn resample(&self, step: Time) -> GlacResult<Self> {
        let axis = TimeAxis::range(self.time_axis.first(), self.time_axis.last(), step)?;
        let values = axis.values().mapv(|t| self.at_time(t));
        Self::new(values, axis, self.unit.clone())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Time, FloatValue)> + '_ {
        self.time_axis
            .values()
            .iter()
            .copied()
            .zip(self.values.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;
    use ndarray::array;

    #[test]
    fn axis_must_increase() {
        assert!(TimeAxis::from_values(array![0.0, 1.0, 1.0]).is_err());
        assert!(TimeAxis::from_values(array![2.0, 1.0]).is_err());
        assert!(TimeAxis::from_values(Array1::<Time>::zeros(0)).is_err());
        assert!(TimeAxis::from_values(array![0.0, f64::NAN]).is_err());
    }

    #[test]
    fn axis_range_includes_end() {
        let axis = TimeAxis::range(-10.0, 0.0, 2.5).unwrap();
        assert_eq!(axis.values(), array![-10.0, -7.5, -5.0, -2.5, 0.0]);
        assert_eq!(axis.first(), -10.0);
        assert_eq!(axis.last(), 0.0);
    }

    #[test]
    fn samples_are_sorted_and_deduplicated() {
        let ts = Timeseries::from_samples(
            vec![(0.0, 1.0), (-20.0, -3.0), (-10.0, 5.0), (-10.0, 7.0), (5.0, f64::NAN)],
            "K",
        )
        .unwrap();
        assert_eq!(ts.time_axis().values(), array![-20.0, -10.0, 0.0]);
        assert_eq!(ts.values(), array![-3.0, 5.0, 1.0]);
        assert_eq!(ts.unit(), "K");
    }

    #[test]
    fn no_valid_samples_is_an_error() {
        assert!(Timeseries::from_samples(vec![(f64::NAN, 1.0)], "K").is_err());
    }

    #[test]
    fn at_time_clamps() {
        let ts = Timeseries::from_samples(vec![(-100.0, -8.0), (0.0, 0.0)], "K").unwrap();
        assert_eq!(ts.at_time(-500.0), -8.0);
        assert_eq!(ts.at_time(500.0), 0.0);
        assert!(is_close!(ts.at_time(-25.0), -2.0));
    }

    #[test]
    fn minimum_prefers_first_occurrence() {
        let ts =
            Timeseries::from_samples(vec![(0.0, 0.0), (1.0, -2.0), (2.0, -2.0)], "K").unwrap();
        assert_eq!(ts.min(), (1.0, -2.0));
    }

    #[test]
    fn resample_to_yearly() {
        let ts = Timeseries::from_samples(vec![(-4.0, -4.0), (0.0, 0.0)], "K").unwrap();
        let yearly = ts.resample(1.0).unwrap();
        assert_eq!(yearly.time_axis().values(), array![-4.0, -3.0, -2.0, -1.0, 0.0]);
        assert_eq!(yearly.values(), array![-4.0, -3.0, -2.0, -1.0, 0.0]);
    }

    #[test]
    fn window_and_transforms() {
        let ts = Timeseries::from_samples(vec![(-2.0, 2.0), (-1.0, 4.0), (0.0, 6.0)], "K").unwrap();
        let w = ts.window(-1.5, 0.0).unwrap();
        assert_eq!(w.values(), array![4.0, 6.0]);
        assert_eq!(ts.scaled(0.5).values(), array![1.0, 2.0, 3.0]);
        assert_eq!(ts.shifted(-1.0).values(), array![1.0, 3.0, 5.0]);
    }

    #[test]
    fn serde_roundtrip_preserves_samples() {
        let ts = Timeseries::from_samples(vec![(-1.0, 2.0), (0.0, 3.0)], "K").unwrap();
        let text = serde_json::to_string(&ts).unwrap();
        let back: Timeseries = serde_json::from_str(&text).unwrap();
        assert_eq!(ts, back);
    }
}
