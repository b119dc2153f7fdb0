//! Glacial index derived from a paleo temperature record
//!
//! The glacial index places the climate at a given time between full-glacial
//! conditions (0, the coldest point of the record) and present-day conditions
//! (1, the value of the record at its present anchor):
//!
//! $$ G(t) = \frac{\Delta T(t) - \Delta T_{min}}{\Delta T_{ref} - \Delta T_{min}} $$
//!
//! The index is not bounded to `[0, 1]`: warmer-than-present samples give `G > 1`.

use super::series::PaleoTemperatureSeries;
use crate::errors::{GlacError, GlacResult};
use crate::timeseries::{FloatValue, Time};
use is_close::is_close;
use log::warn;
use serde::{Deserialize, Serialize};

/// Default calendar year of the present anchor (years "before present" count from 1950)
pub const DEFAULT_PRESENT_YEAR: Time = 1950.0;

/// Normalised glacial index over calendar time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlacialIndex {
    series: PaleoTemperatureSeries,
    /// Calendar year of offset zero in the record
    present_year: Time,
    /// Coldest anomaly of the record
    minimum: FloatValue,
    /// Offset of the coldest anomaly
    minimum_offset: Time,
    /// Anomaly at the present anchor
    reference: FloatValue,
}

impl GlacialIndex {
    /// Build the index from a record whose offsets are relative to `present_year`
    ///
    /// A record whose present value equals its minimum (e.g. a constant record) cannot be
    /// normalised; such an index reports present-day conditions (`G = 1`) everywhere.
    pub fn new(series: PaleoTemperatureSeries, present_year: Time) -> GlacResult<Self> {
        if !present_year.is_finite() {
            return Err(GlacError::invalid_parameter(
                "present_year",
                present_year,
                "must be finite",
            ));
        }
        let (minimum_offset, minimum) = series.minimum();
        let reference = series.delta_t_at_offset(0.0);

        if is_close!(reference, minimum) {
            warn!(
                "Proxy record has no range between its minimum ({minimum}) and present value ({reference}); glacial index fixed at 1"
            );
        }

        Ok(Self {
            series,
            present_year,
            minimum,
            minimum_offset,
            reference,
        })
    }

    pub fn series(&self) -> &PaleoTemperatureSeries {
        &self.series
    }

    pub fn present_year(&self) -> Time {
        self.present_year
    }

    /// Calendar year of the coldest sample (`G = 0`)
    pub fn minimum_year(&self) -> Time {
        self.minimum_offset + self.present_year
    }

    /// Calendar year of the oldest sample; the index is flat before it
    pub fn oldest_year(&self) -> Time {
        self.series.oldest_offset() + self.present_year
    }

    pub fn minimum_delta_t(&self) -> FloatValue {
        self.minimum
    }

    pub fn reference_delta_t(&self) -> FloatValue {
        self.reference
    }

    /// True when the record cannot be normalised and the index is fixed at 1
    pub fn is_degenerate(&self) -> bool {
        is_close!(self.reference, self.minimum)
    }

    /// Temperature anomaly at calendar time `t`
    pub fn delta_t_at(&self, t: Time) -> FloatValue {
        self.series.delta_t_at_offset(t - self.present_year)
    }

    /// Glacial index at calendar time `t`
    pub fn at(&self, t: Time) -> FloatValue {
        self.normalise(self.delta_t_at(t))
    }

    /// Glacial index at an offset relative to the present anchor
    pub fn at_offset(&self, offset: Time) -> FloatValue {
        self.normalise(self.series.delta_t_at_offset(offset))
    }

    fn normalise(&self, delta_t: FloatValue) -> FloatValue {
        if self.is_degenerate() {
            return 1.0;
        }
        (delta_t - self.minimum) / (self.reference - self.minimum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    fn record() -> PaleoTemperatureSeries {
        PaleoTemperatureSeries::from_samples(vec![
            (-40000.0, -5.0),
            (-21000.0, -9.0),
            (-10000.0, -3.0),
            (0.0, 0.5),
            (50.0, 0.7),
        ])
        .unwrap()
    }

    #[test]
    fn anchors_are_exact() {
        let index = GlacialIndex::new(record(), DEFAULT_PRESENT_YEAR).unwrap();
        assert_eq!(index.at(DEFAULT_PRESENT_YEAR), 1.0);
        assert_eq!(index.at(index.minimum_year()), 0.0);
        assert_eq!(index.minimum_year(), -21000.0 + DEFAULT_PRESENT_YEAR);
    }

    #[test]
    fn reference_is_interpolated_when_present_is_not_sampled() {
        let series =
            PaleoTemperatureSeries::from_samples(vec![(-100.0, -4.0), (100.0, 0.0)]).unwrap();
        let index = GlacialIndex::new(series, 1950.0).unwrap();
        assert!(is_close!(index.reference_delta_t(), -2.0));
        assert_eq!(index.at(1950.0), 1.0);
    }

    #[test]
    fn flat_before_oldest_sample() {
        let index = GlacialIndex::new(record(), DEFAULT_PRESENT_YEAR).unwrap();
        let oldest = index.oldest_year();
        for t in [oldest, oldest - 1.0, oldest - 1.0e5, -1.0e9] {
            assert_eq!(index.at(t), index.at(oldest));
        }
        assert!(is_close!(index.at(oldest), (-5.0 + 9.0) / (0.5 + 9.0)));
    }

    #[test]
    fn not_bounded_above_one() {
        let index = GlacialIndex::new(record(), DEFAULT_PRESENT_YEAR).unwrap();
        assert!(index.at(DEFAULT_PRESENT_YEAR + 50.0) > 1.0);
        assert_eq!(index.at(1.0e6), index.at(DEFAULT_PRESENT_YEAR + 50.0));
    }

    #[test]
    fn delta_t_follows_calendar_time() {
        let index = GlacialIndex::new(record(), DEFAULT_PRESENT_YEAR).unwrap();
        assert_eq!(index.delta_t_at(-21000.0 + DEFAULT_PRESENT_YEAR), -9.0);
        assert!(is_close!(index.delta_t_at(-15500.0 + DEFAULT_PRESENT_YEAR), -6.0));
        assert!(is_close!(index.at_offset(-15500.0), index.at(-13550.0)));
    }

    #[test]
    fn constant_record_is_present_day_everywhere() {
        let series =
            PaleoTemperatureSeries::from_samples(vec![(-1000.0, 0.0), (0.0, 0.0)]).unwrap();
        let index = GlacialIndex::new(series, DEFAULT_PRESENT_YEAR).unwrap();
        assert!(index.is_degenerate());
        assert_eq!(index.at(-5000.0), 1.0);
        assert_eq!(index.at(1950.0), 1.0);
        assert_eq!(index.delta_t_at(-5000.0), 0.0);
    }
}
