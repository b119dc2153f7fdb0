use crate::errors::{GlacError, GlacResult};
use crate::timeseries::{FloatValue, Time, Timeseries};
use serde::{Deserialize, Serialize};

/// Unit attached to proxy temperature anomalies
pub const DELTA_T_UNIT: &str = "K";

/// Paleo temperature anomaly record (e.g. an ice-core reconstruction)
///
/// Times are offsets in years relative to the present anchor of the record:
/// `0` is the present and negative values lie in the past.
/// Samples are kept sorted and unique in time; interpolation between them is linear and
/// values beyond either end are held at the end value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaleoTemperatureSeries {
    series: Timeseries,
}

impl PaleoTemperatureSeries {
    /// Build a record from `(offset, delta_t)` samples in any order
    ///
    /// Non-finite samples are discarded. Fails with [`GlacError::ProxyUnavailable`] if no
    /// usable sample remains.
    pub fn from_samples(samples: impl IntoIterator<Item = (Time, FloatValue)>) -> GlacResult<Self> {
        let series = Timeseries::from_samples(samples, DELTA_T_UNIT)
            .map_err(|e| GlacError::ProxyUnavailable(e.to_string()))?;
        Ok(Self { series })
    }

    pub fn from_timeseries(series: Timeseries) -> GlacResult<Self> {
        if series.is_empty() {
            return Err(GlacError::ProxyUnavailable("series is empty".to_string()));
        }
        Ok(Self { series })
    }

    pub fn timeseries(&self) -> &Timeseries {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Offset of the oldest sample
    pub fn oldest_offset(&self) -> Time {
        self.series.time_axis().first()
    }

    /// Offset of the most recent sample
    pub fn newest_offset(&self) -> Time {
        self.series.time_axis().last()
    }

    /// Temperature anomaly at `offset`, clamped to the end values outside the record
    pub fn delta_t_at_offset(&self, offset: Time) -> FloatValue {
        self.series.at_time(offset)
    }

    /// Offset and value of the coldest sample
    pub fn minimum(&self) -> (Time, FloatValue) {
        self.series.min()
    }

    /// Multiply the anomalies by `factor` (polar amplification adjustment)
    pub fn scaled(&self, factor: FloatValue) -> Self {
        Self {
            series: self.series.scaled(factor),
        }
    }

    /// Add a constant temperature shift to every anomaly
    pub fn shifted(&self, shift: FloatValue) -> Self {
        Self {
            series: self.series.shifted(shift),
        }
    }

    /// Drop samples older than `oldest_offset`
    pub fn truncate_older_than(&self, oldest_offset: Time) -> GlacResult<Self> {
        let series = self
            .series
            .window(oldest_offset, Time::INFINITY)
            .map_err(|_| {
                GlacError::ProxyUnavailable(format!(
                    "no samples remain after cutting the record at offset {oldest_offset}"
                ))
            })?;
        Ok(Self { series })
    }

    /// Drop samples more recent than `newest_offset`
    pub fn truncate_newer_than(&self, newest_offset: Time) -> GlacResult<Self> {
        let series = self
            .series
            .window(Time::NEG_INFINITY, newest_offset)
            .map_err(|_| {
                GlacError::ProxyUnavailable(format!(
                    "no samples remain after cutting the record at offset {newest_offset}"
                ))
            })?;
        Ok(Self { series })
    }

    /// Resample to a regular spacing (e.g. `1.0` for yearly resolution)
    pub fn resample(&self, step: Time) -> GlacResult<Self> {
        Ok(Self {
            series: self.series.resample(step)?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (Time, FloatValue)> + '_ {
        self.series.iter()
    }
}
