//! Glacial-index climate reconstruction parameters

use rsglac_core::errors::{GlacError, GlacResult};
use rsglac_core::proxy::DEFAULT_PRESENT_YEAR;
use rsglac_core::standard_variables::PrecipitationUnit;
use rsglac_core::timeseries::{FloatValue, Time};
use serde::{Deserialize, Serialize};

/// How the monthly temperature and precipitation are reconstructed from the glacial index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemperatureMethod {
    /// Observed temperature plus the proxy anomaly; precipitation scaled towards the
    /// glacial-maximum adjustment
    #[default]
    ProxyDeltaT,
    /// Observed climate plus `(1 - G)` times a modelled glacial-maximum anomaly field
    GlacialAnomaly,
}

/// Parameters for the glacial-index climate reconstruction.
///
/// # Default Values
///
/// Defaults describe a mid-latitude glacier driven by a polar ice-core record with
/// present-day observations referenced to 1950.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClimateIndexParameters {
    /// Years between climate updates.
    /// Default: 1.0
    pub update_cadence: Time,

    /// Calendar year of offset zero in the proxy record.
    /// Default: 1950.0
    pub present_year: Time,

    /// Calendar year before which proxy samples are discarded.
    /// Default: none (the whole record is used)
    pub oldest_year: Option<Time>,

    /// Multiplier applied to the proxy anomalies, in (0, 1].
    /// Reduces a polar signal to the amplitude expected away from the poles.
    /// Default: 0.5
    pub polar_amplification_adjustment: FloatValue,

    /// Fraction of observed precipitation remaining at full glacial conditions (G = 0), in [0, 1].
    /// Default: 0.5
    pub lgm_precipitation_adjustment: FloatValue,

    /// Multiplier on the observed precipitation.
    /// Default: 1.0
    pub precipitation_scaling: FloatValue,

    /// Multiplier on the observed temperature, applied after `temperature_addition`.
    /// Default: 1.0
    pub temperature_scaling: FloatValue,

    /// Offset added to the observed temperature (degC).
    /// Default: 0.0
    pub temperature_addition: FloatValue,

    /// Temperature lapse rate (K / m).
    /// Default: -0.0065
    pub temperature_gradient: FloatValue,

    /// Reconstruction method.
    /// Default: [`TemperatureMethod::ProxyDeltaT`]
    pub temperature_method: TemperatureMethod,

    /// Unit of the observed precipitation and therefore of the reconstructed precipitation.
    /// Default: [`PrecipitationUnit::MonthlyAmount`]
    pub precipitation_unit: PrecipitationUnit,
}

impl Default for ClimateIndexParameters {
    fn default() -> Self {
        Self {
            update_cadence: 1.0,
            present_year: DEFAULT_PRESENT_YEAR,
            oldest_year: None,
            polar_amplification_adjustment: 0.5,
            lgm_precipitation_adjustment: 0.5,
            precipitation_scaling: 1.0,
            temperature_scaling: 1.0,
            temperature_addition: 0.0,
            temperature_gradient: -0.0065,
            temperature_method: TemperatureMethod::default(),
            precipitation_unit: PrecipitationUnit::default(),
        }
    }
}

impl ClimateIndexParameters {
    pub fn validate(&self) -> GlacResult<()> {
        if !self.update_cadence.is_finite() || self.update_cadence < 0.0 {
            return Err(GlacError::invalid_parameter(
                "update_cadence",
                self.update_cadence,
                "must be finite and non-negative",
            ));
        }
        if !self.present_year.is_finite() {
            return Err(GlacError::invalid_parameter(
                "present_year",
                self.present_year,
                "must be finite",
            ));
        }
        if let Some(oldest_year) = self.oldest_year {
            if oldest_year.is_nan() || oldest_year > self.present_year {
                return Err(GlacError::invalid_parameter(
                    "oldest_year",
                    oldest_year,
                    "must not be after present_year",
                ));
            }
        }
        let adjustment = self.polar_amplification_adjustment;
        if !(adjustment > 0.0 && adjustment <= 1.0) {
            return Err(GlacError::invalid_parameter(
                "polar_amplification_adjustment",
                adjustment,
                "must lie within (0, 1]",
            ));
        }
        if !(0.0..=1.0).contains(&self.lgm_precipitation_adjustment) {
            return Err(GlacError::invalid_parameter(
                "lgm_precipitation_adjustment",
                self.lgm_precipitation_adjustment,
                "must lie within [0, 1]",
            ));
        }
        for (name, value) in [
            ("precipitation_scaling", self.precipitation_scaling),
            ("temperature_scaling", self.temperature_scaling),
            ("temperature_addition", self.temperature_addition),
            ("temperature_gradient", self.temperature_gradient),
        ] {
            if !value.is_finite() {
                return Err(GlacError::invalid_parameter(name, value, "must be finite"));
            }
        }
        Ok(())
    }

    /// Proxy offset before which samples are discarded
    pub fn oldest_offset(&self) -> Option<Time> {
        self.oldest_year.map(|year| year - self.present_year)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_parameters() {
        let params = ClimateIndexParameters::default();
        assert_eq!(params.present_year, 1950.0);
        assert_eq!(params.temperature_gradient, -0.0065);
        assert_eq!(params.temperature_method, TemperatureMethod::ProxyDeltaT);
        params.validate().unwrap();
    }

    #[test]
    fn test_partial_deserialisation_uses_defaults() {
        let params: ClimateIndexParameters = serde_json::from_str(
            r#"{"polar_amplification_adjustment": 1.0, "temperature_method": "glacial_anomaly"}"#,
        )
        .unwrap();
        assert_eq!(params.polar_amplification_adjustment, 1.0);
        assert_eq!(params.temperature_method, TemperatureMethod::GlacialAnomaly);
        assert_eq!(params.lgm_precipitation_adjustment, 0.5);
    }

    #[test]
    fn test_validation() {
        let invalid = [
            ClimateIndexParameters {
                polar_amplification_adjustment: 0.0,
                ..Default::default()
            },
            ClimateIndexParameters {
                polar_amplification_adjustment: 1.5,
                ..Default::default()
            },
            ClimateIndexParameters {
                lgm_precipitation_adjustment: -0.1,
                ..Default::default()
            },
            ClimateIndexParameters {
                update_cadence: -1.0,
                ..Default::default()
            },
            ClimateIndexParameters {
                temperature_scaling: f64::INFINITY,
                ..Default::default()
            },
            ClimateIndexParameters {
                oldest_year: Some(2000.0),
                ..Default::default()
            },
        ];
        for params in invalid {
            assert!(matches!(
                params.validate(),
                Err(GlacError::InvalidParameter { .. })
            ));
        }
    }

    #[test]
    fn test_oldest_offset() {
        let params = ClimateIndexParameters {
            oldest_year: Some(-138_050.0),
            ..Default::default()
        };
        assert_eq!(params.oldest_offset(), Some(-140_000.0));
        assert_eq!(ClimateIndexParameters::default().oldest_offset(), None);
    }
}
