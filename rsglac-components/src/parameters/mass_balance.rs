//! Temperature-index mass balance parameters

use rsglac_core::errors::{GlacError, GlacResult};
use rsglac_core::grid::MONTHS;
use rsglac_core::standard_variables::PrecipitationUnit;
use rsglac_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Days per year used to express daily degree-day factors per year
pub const DAYS_PER_YEAR: FloatValue = 365.242198781;

/// Parameters for the positive-degree-day surface mass balance.
///
/// # Default Values
///
/// Melt factors are 3 mm w.e. / K / day for snow and 8 mm w.e. / K / day for ice,
/// converted to m w.e. / K / yr. The hydrological year starts on the 1st of October.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MassBalanceParameters {
    /// Years between mass balance updates.
    /// Default: 1.0
    pub update_cadence: Time,

    /// Temperature at or below which all precipitation is solid (degC).
    /// Default: 0.0
    pub snow_threshold: FloatValue,

    /// Temperature at or above which all precipitation is liquid (degC).
    /// Default: 2.0
    pub rain_threshold: FloatValue,

    /// Degree-day factor for snow (m w.e. / K / yr).
    /// Default: 0.003 * 365.242198781
    pub melt_factor_snow: FloatValue,

    /// Degree-day factor for ice (m w.e. / K / yr).
    /// Default: 0.008 * 365.242198781
    pub melt_factor_ice: FloatValue,

    /// Fraction of the year by which the accumulation/melt cycle is rotated, in [0, 1).
    /// Default: 0.75 (start in October)
    pub hydro_year_shift: FloatValue,

    /// Fraction of the ablation that refreezes, in [0, 1].
    /// Default: 0.6
    pub refreeze_factor: FloatValue,

    /// Ice density (kg / m^3).
    /// Default: 910.0
    pub ice_density: FloatValue,

    /// Water density (kg / m^3).
    /// Default: 1000.0
    pub water_density: FloatValue,

    /// Mass balance assigned to ice-free cells with a non-negative balance (m ice eq. / yr).
    /// Default: -10.0
    pub ice_free_sentinel: FloatValue,

    /// Unit of the incoming monthly precipitation.
    /// Default: [`PrecipitationUnit::MonthlyAmount`]
    pub precipitation_unit: PrecipitationUnit,
}

impl Default for MassBalanceParameters {
    fn default() -> Self {
        Self {
            update_cadence: 1.0,
            snow_threshold: 0.0,
            rain_threshold: 2.0,
            melt_factor_snow: 0.003 * DAYS_PER_YEAR,
            melt_factor_ice: 0.008 * DAYS_PER_YEAR,
            hydro_year_shift: 0.75,
            refreeze_factor: 0.6,
            ice_density: 910.0,
            water_density: 1000.0,
            ice_free_sentinel: -10.0,
            precipitation_unit: PrecipitationUnit::default(),
        }
    }
}

impl MassBalanceParameters {
    pub fn validate(&self) -> GlacResult<()> {
        if !self.update_cadence.is_finite() || self.update_cadence < 0.0 {
            return Err(GlacError::invalid_parameter(
                "update_cadence",
                self.update_cadence,
                "must be finite and non-negative",
            ));
        }
        if self.snow_threshold.partial_cmp(&self.rain_threshold) != Some(Ordering::Less) {
            return Err(GlacError::invalid_parameter(
                "snow_threshold",
                self.snow_threshold,
                "must be below rain_threshold",
            ));
        }
        for (name, value) in [
            ("melt_factor_snow", self.melt_factor_snow),
            ("melt_factor_ice", self.melt_factor_ice),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GlacError::invalid_parameter(
                    name,
                    value,
                    "must be finite and non-negative",
                ));
            }
        }
        if !(0.0..1.0).contains(&self.hydro_year_shift) {
            return Err(GlacError::invalid_parameter(
                "hydro_year_shift",
                self.hydro_year_shift,
                "must lie within [0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.refreeze_factor) {
            return Err(GlacError::invalid_parameter(
                "refreeze_factor",
                self.refreeze_factor,
                "must lie within [0, 1]",
            ));
        }
        for (name, value) in [
            ("ice_density", self.ice_density),
            ("water_density", self.water_density),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(GlacError::invalid_parameter(
                    name,
                    value,
                    "must be positive",
                ));
            }
        }
        if !self.ice_free_sentinel.is_finite() {
            return Err(GlacError::invalid_parameter(
                "ice_free_sentinel",
                self.ice_free_sentinel,
                "must be finite",
            ));
        }
        Ok(())
    }

    /// Calendar month (0 = January) processed at position `step` of the hydrological year
    pub fn hydrological_month(&self, step: usize) -> usize {
        let shift = (MONTHS as FloatValue * self.hydro_year_shift).floor() as usize;
        (step + shift) % MONTHS
    }

    /// Conversion from metres of water to metres of ice
    pub fn water_to_ice(&self) -> FloatValue {
        self.water_density / self.ice_density
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn test_default_parameters() {
        let params = MassBalanceParameters::default();
        assert!(is_close!(params.melt_factor_snow, 1.095726596343));
        assert!(is_close!(params.melt_factor_ice, 2.921937590248));
        assert!(is_close!(params.water_to_ice(), 1000.0 / 910.0));
        params.validate().unwrap();
    }

    #[test]
    fn test_hydrological_year_starts_in_october() {
        let params = MassBalanceParameters::default();
        let order: Vec<usize> = (0..MONTHS).map(|k| params.hydrological_month(k)).collect();
        assert_eq!(order, vec![9, 10, 11, 0, 1, 2, 3, 4, 5, 6, 7, 8]);

        let calendar = MassBalanceParameters {
            hydro_year_shift: 0.0,
            ..Default::default()
        };
        assert_eq!(calendar.hydrological_month(3), 3);
    }

    #[test]
    fn test_validation() {
        let invalid = [
            MassBalanceParameters {
                snow_threshold: 2.0,
                ..Default::default()
            },
            MassBalanceParameters {
                rain_threshold: FloatValue::NAN,
                ..Default::default()
            },
            MassBalanceParameters {
                ice_density: 0.0,
                ..Default::default()
            },
            MassBalanceParameters {
                refreeze_factor: 1.1,
                ..Default::default()
            },
            MassBalanceParameters {
                hydro_year_shift: 1.0,
                ..Default::default()
            },
            MassBalanceParameters {
                melt_factor_ice: -1.0,
                ..Default::default()
            },
        ];
        for params in invalid {
            assert!(matches!(
                params.validate(),
                Err(GlacError::InvalidParameter { .. })
            ));
        }

        let no_melt = MassBalanceParameters {
            melt_factor_snow: 0.0,
            melt_factor_ice: 0.0,
            ..Default::default()
        };
        no_melt.validate().unwrap();
    }
}
