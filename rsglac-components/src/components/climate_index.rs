//! Glacial-index climate reconstruction
//!
//! Reconstructs the monthly air temperature and precipitation at any time of a
//! paleo simulation from a present-day observed climate and a proxy temperature record.
//!
//! The proxy record defines the glacial index $G(t)$ (see [`GlacialIndex`]) and the
//! temperature anomaly $\Delta T(t)$. With the default [`TemperatureMethod::ProxyDeltaT`]:
//!
//! $$ T(t) = T_{obs} + \Delta T(t) + \gamma (z_s - z_{obs}) $$
//! $$ P(t) = P_{obs} \left(G(t) + a_{LGM} (1 - G(t))\right) $$
//!
//! Where:
//! - $\gamma$ is the temperature lapse rate
//! - $z_s$ is the current surface elevation and $z_{obs}$ the elevation of the observations
//! - $a_{LGM}$ is the fraction of precipitation remaining at full glacial conditions

use crate::parameters::{ClimateIndexParameters, TemperatureMethod};
use log::debug;
use ndarray::{Array2, Array3, ArrayView2};
use rsglac_core::component::{Component, RequirementDefinition};
use rsglac_core::errors::GlacResult;
use rsglac_core::events::{UpdateEvent, UpdateListener};
use rsglac_core::fields::FieldSet;
use rsglac_core::grid::{fit_to_grid, monthly_mean, to_monthly, GridShape};
use rsglac_core::proxy::{GlacialIndex, PaleoTemperatureSeries};
use rsglac_core::schedule::{Update, UpdateSchedule};
use rsglac_core::standard_variables::{
    VAR_AIR_TEMPERATURE, VAR_MEAN_ANNUAL_PRECIPITATION, VAR_MEAN_ANNUAL_TEMPERATURE,
    VAR_OBSERVED_ELEVATION, VAR_PRECIPITATION, VAR_SURFACE_ELEVATION,
};
use rsglac_core::timeseries::{FloatValue, Time};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Reconstructed climate at a point in time
#[derive(Debug, Clone, PartialEq)]
pub struct ClimateForcing {
    pub time: Time,
    pub glacial_index: FloatValue,
    /// Proxy anomaly after the polar amplification adjustment
    pub delta_t: FloatValue,
    /// `[12, ny, nx]`, degC
    pub air_temp: Array3<FloatValue>,
    /// `[12, ny, nx]`, in the configured precipitation unit
    pub precipitation: Array3<FloatValue>,
    pub mean_annual_temp: Array2<FloatValue>,
    pub mean_annual_precip: Array2<FloatValue>,
}

/// Glacial-index climate reconstruction
#[derive(Debug)]
pub struct ClimateIndexReconstructor {
    parameters: ClimateIndexParameters,
    grid: GridShape,
    /// Calibrated observed temperature
    temp_obs: Array3<FloatValue>,
    /// Calibrated observed precipitation
    prec_obs: Array3<FloatValue>,
    observed_elevation: Array2<FloatValue>,
    anomaly_temp: Array3<FloatValue>,
    anomaly_precip: Array3<FloatValue>,
    index: GlacialIndex,
    schedule: UpdateSchedule,
    forcing: Option<ClimateForcing>,
    listener: Option<Arc<dyn UpdateListener>>,
}

impl ClimateIndexReconstructor {
    pub const NAME: &'static str = "climate_index_reconstructor";

    /// Load the static inputs and build the glacial index
    ///
    /// `observed` must provide `air_temp` and `precipitation` as `[12, ny, nx]` and
    /// `elevation` as `[ny, nx]`. `anomaly` must provide `air_temp` and `precipitation`
    /// as `[ny', nx']`, `[1, ny', nx']` or `[12, ny', nx']`; they are cropped to the
    /// observed grid when the extents differ.
    pub fn new(
        parameters: ClimateIndexParameters,
        observed: &FieldSet,
        anomaly: &FieldSet,
        proxy: PaleoTemperatureSeries,
    ) -> GlacResult<Self> {
        parameters.validate()?;

        let observed_temp = observed.require_stack(VAR_AIR_TEMPERATURE.name)?;
        let observed_precip = observed.require_stack(VAR_PRECIPITATION.name)?;
        let observed_elevation = observed.require_grid(VAR_OBSERVED_ELEVATION.name)?;
        let grid = GridShape::of(&observed_elevation);
        grid.check_monthly(VAR_AIR_TEMPERATURE.name, &observed_temp)?;
        grid.check_monthly(VAR_PRECIPITATION.name, &observed_precip)?;

        let anomaly_temp = fit_to_grid(
            "anomaly air_temp",
            to_monthly(
                "anomaly air_temp",
                anomaly.require(VAR_AIR_TEMPERATURE.name)?,
            )?,
            grid,
        );
        let anomaly_precip = fit_to_grid(
            "anomaly precipitation",
            to_monthly(
                "anomaly precipitation",
                anomaly.require(VAR_PRECIPITATION.name)?,
            )?,
            grid,
        );

        let mut proxy = proxy.scaled(parameters.polar_amplification_adjustment);
        if let Some(offset) = parameters.oldest_offset() {
            proxy = proxy.truncate_older_than(offset)?;
        }
        let index = GlacialIndex::new(proxy, parameters.present_year)?;
        debug!(
            "Glacial index spans {} to present, minimum {} K in year {}",
            index.oldest_year(),
            index.minimum_delta_t(),
            index.minimum_year()
        );

        let temp_obs =
            (observed_temp + parameters.temperature_addition) * parameters.temperature_scaling;
        let prec_obs = observed_precip * parameters.precipitation_scaling;

        Ok(Self {
            schedule: UpdateSchedule::new(parameters.update_cadence)?,
            parameters,
            grid,
            temp_obs,
            prec_obs,
            observed_elevation,
            anomaly_temp,
            anomaly_precip,
            index,
            forcing: None,
            listener: None,
        })
    }

    /// Report every recomputation to `listener`
    pub fn with_listener(mut self, listener: Arc<dyn UpdateListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn parameters(&self) -> &ClimateIndexParameters {
        &self.parameters
    }

    pub fn grid(&self) -> GridShape {
        self.grid
    }

    pub fn glacial_index(&self) -> &GlacialIndex {
        &self.index
    }

    pub fn glacial_index_at(&self, t: Time) -> FloatValue {
        self.index.at(t)
    }

    pub fn delta_t_at(&self, t: Time) -> FloatValue {
        self.index.delta_t_at(t)
    }

    /// Most recent forcing, if any update has happened
    pub fn forcing(&self) -> Option<&ClimateForcing> {
        self.forcing.as_ref()
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    /// Precipitation multiplier at glacial index `g`
    pub fn precipitation_factor(&self, g: FloatValue) -> FloatValue {
        g + self.parameters.lgm_precipitation_adjustment * (1.0 - g)
    }

    /// Reconstruct the climate at `t` without touching the update schedule
    pub fn calculate_forcing(
        &self,
        t: Time,
        surface_elevation: ArrayView2<FloatValue>,
    ) -> GlacResult<ClimateForcing> {
        self.grid
            .check_grid(VAR_SURFACE_ELEVATION.name, &surface_elevation)?;

        let glacial_index = self.index.at(t);
        let delta_t = self.index.delta_t_at(t);

        let (mut air_temp, precipitation) = match self.parameters.temperature_method {
            TemperatureMethod::ProxyDeltaT => (
                &self.temp_obs + delta_t,
                &self.prec_obs * self.precipitation_factor(glacial_index),
            ),
            TemperatureMethod::GlacialAnomaly => {
                let weight = 1.0 - glacial_index;
                (
                    &self.temp_obs + &(&self.anomaly_temp * weight),
                    (&self.prec_obs + &(&self.anomaly_precip * weight)).mapv(|p| p.max(0.0)),
                )
            }
        };

        let lapse_correction =
            (&surface_elevation - &self.observed_elevation) * self.parameters.temperature_gradient;
        air_temp += &lapse_correction;

        Ok(ClimateForcing {
            time: t,
            glacial_index,
            delta_t,
            mean_annual_temp: monthly_mean(&air_temp),
            mean_annual_precip: monthly_mean(&precipitation),
            air_temp,
            precipitation,
        })
    }

    /// Recompute the forcing at `t` if the update cadence has been reached
    ///
    /// On [`Update::NoUpdate`] the previous forcing remains available through
    /// [`ClimateIndexReconstructor::forcing`]. A failed update leaves the component unchanged.
    pub fn update(
        &mut self,
        t: Time,
        surface_elevation: ArrayView2<FloatValue>,
    ) -> GlacResult<Update<&ClimateForcing>> {
        if !self.schedule.is_due(t) {
            debug!("Skipping climate update at t={t}");
            return Ok(Update::NoUpdate);
        }

        let start = Instant::now();
        let forcing = self.calculate_forcing(t, surface_elevation)?;
        Ok(Update::Updated(self.commit(forcing, start.elapsed())))
    }

    /// Store a forcing from [`ClimateIndexReconstructor::calculate_forcing`] as the
    /// result of an update at `forcing.time`
    pub fn commit(&mut self, forcing: ClimateForcing, duration: Duration) -> &ClimateForcing {
        self.schedule.mark(forcing.time);
        if let Some(listener) = &self.listener {
            listener.on_update(&UpdateEvent {
                component: Self::NAME,
                time: forcing.time,
                duration,
            });
        }
        self.forcing.insert(forcing)
    }
}

impl Component for ClimateIndexReconstructor {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        let precipitation_unit = self.parameters.precipitation_unit.unit();
        vec![
            RequirementDefinition::input(&VAR_SURFACE_ELEVATION),
            RequirementDefinition::output(&VAR_AIR_TEMPERATURE),
            RequirementDefinition::output(&VAR_PRECIPITATION).with_unit(precipitation_unit),
            RequirementDefinition::output(&VAR_MEAN_ANNUAL_TEMPERATURE),
            RequirementDefinition::output(&VAR_MEAN_ANNUAL_PRECIPITATION)
                .with_unit(precipitation_unit),
        ]
    }
}
