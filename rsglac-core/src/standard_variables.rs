//! Standard variable definitions
//!
//! Names and units of the fields exchanged between the climate reconstruction, the mass
//! balance and the host ice-sheet model. Components declare their inputs and outputs in
//! terms of these definitions so that couplings can be checked before a run starts.
//!
//! # Available Variables
//!
//! ## Climate forcing
//! - [`VAR_AIR_TEMPERATURE`] - monthly near-surface air temperature in degC
//! - [`VAR_PRECIPITATION`] - monthly precipitation, unit set by [`PrecipitationUnit`]
//! - [`VAR_MEAN_ANNUAL_TEMPERATURE`] - annual mean air temperature in degC
//! - [`VAR_MEAN_ANNUAL_PRECIPITATION`] - annual mean of the monthly precipitation
//!
//! ## Host model state
//! - [`VAR_SURFACE_ELEVATION`] - ice surface elevation in m
//! - [`VAR_ICE_MASK`] - ice presence (1 = ice, 0 = ice-free)
//!
//! ## Mass balance
//! - [`VAR_SURFACE_MASS_BALANCE`] - surface mass balance in m ice eq. / yr

use crate::component::GridType;
use serde::{Deserialize, Serialize};

/// Definition of a variable exchanged between components
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariableDefinition {
    pub name: &'static str,
    pub unit: &'static str,
    pub grid_type: GridType,
    pub description: &'static str,
}

pub const VAR_AIR_TEMPERATURE: VariableDefinition = VariableDefinition {
    name: "air_temp",
    unit: "degC",
    grid_type: GridType::Monthly,
    description: "Monthly mean near-surface air temperature",
};

pub const VAR_PRECIPITATION: VariableDefinition = VariableDefinition {
    name: "precipitation",
    unit: "kg m^-2 month^-1",
    grid_type: GridType::Monthly,
    description: "Monthly precipitation",
};

pub const VAR_MEAN_ANNUAL_TEMPERATURE: VariableDefinition = VariableDefinition {
    name: "mean_annual_temp",
    unit: "degC",
    grid_type: GridType::Spatial,
    description: "Mean of the monthly air temperature",
};

pub const VAR_MEAN_ANNUAL_PRECIPITATION: VariableDefinition = VariableDefinition {
    name: "mean_annual_precip",
    unit: "kg m^-2 month^-1",
    grid_type: GridType::Spatial,
    description: "Mean of the monthly precipitation",
};

pub const VAR_OBSERVED_ELEVATION: VariableDefinition = VariableDefinition {
    name: "elevation",
    unit: "m",
    grid_type: GridType::Spatial,
    description: "Elevation the observed climate refers to",
};

pub const VAR_SURFACE_ELEVATION: VariableDefinition = VariableDefinition {
    name: "usurf",
    unit: "m",
    grid_type: GridType::Spatial,
    description: "Ice surface elevation of the host model",
};

pub const VAR_ICE_MASK: VariableDefinition = VariableDefinition {
    name: "icemask",
    unit: "1",
    grid_type: GridType::Spatial,
    description: "Ice presence, values above 0.5 are ice covered",
};

pub const VAR_SURFACE_MASS_BALANCE: VariableDefinition = VariableDefinition {
    name: "smb",
    unit: "m ice eq. / yr",
    grid_type: GridType::Spatial,
    description: "Annual surface mass balance",
};

/// How precipitation fields are expressed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrecipitationUnit {
    /// Amount falling during each month (kg m^-2 per month)
    #[default]
    MonthlyAmount,
    /// Rate expressed per year (kg m^-2 per year) for each month
    AnnualRate,
}

impl PrecipitationUnit {
    pub fn unit(&self) -> &'static str {
        match self {
            PrecipitationUnit::MonthlyAmount => VAR_PRECIPITATION.unit,
            PrecipitationUnit::AnnualRate => "kg m^-2 yr^-1",
        }
    }

    /// Factor converting a value in this unit into an amount per month
    pub fn to_monthly_amount(&self) -> f64 {
        match self {
            PrecipitationUnit::MonthlyAmount => 1.0,
            PrecipitationUnit::AnnualRate => 1.0 / 12.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precipitation_units() {
        assert_eq!(PrecipitationUnit::default(), PrecipitationUnit::MonthlyAmount);
        assert_eq!(PrecipitationUnit::MonthlyAmount.unit(), VAR_PRECIPITATION.unit);
        assert_eq!(PrecipitationUnit::AnnualRate.unit(), "kg m^-2 yr^-1");
        assert_eq!(PrecipitationUnit::AnnualRate.to_monthly_amount() * 12.0, 1.0);

        let unit: PrecipitationUnit = serde_json::from_str("\"annual_rate\"").unwrap();
        assert_eq!(unit, PrecipitationUnit::AnnualRate);
    }

    #[test]
    fn monthly_and_spatial_variables() {
        assert_eq!(VAR_AIR_TEMPERATURE.grid_type, GridType::Monthly);
        assert_eq!(VAR_SURFACE_MASS_BALANCE.grid_type, GridType::Spatial);
    }
}
