//! Coupled climate and mass balance driver
//!
//! Within one step the climate reconstruction must be updated before the mass balance,
//! as the mass balance consumes the reconstructed temperature and precipitation.
//! [`GlacierClimateModel`] enforces this order for a host that owns the time loop.

use crate::components::{ClimateIndexReconstructor, TemperatureIndexMassBalance};
use crate::config::SimulationConfig;
use log::{debug, info};
use ndarray::{Array2, ArrayView2};
use rsglac_core::component::{verify_inputs, Component, RequirementDefinition};
use rsglac_core::errors::{GlacError, GlacResult};
use rsglac_core::events::UpdateListener;
use rsglac_core::fields::FieldSet;
use rsglac_core::standard_variables::{VAR_ICE_MASK, VAR_SURFACE_ELEVATION};
use rsglac_core::timeseries::{FloatValue, Time, TimeAxis};
use std::sync::Arc;
use std::time::Instant;

/// Outcome of one coupled step
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutput {
    pub time: Time,
    pub climate_updated: bool,
    pub smb_updated: bool,
    /// Current surface mass balance (m ice eq. / yr)
    pub smb: Array2<FloatValue>,
}

/// Build a [`GlacierClimateModel`] from its two components
///
/// The builder checks that every mass balance input is produced by the climate
/// reconstruction or supplied by the host with the same unit and layout.
#[derive(Debug, Default)]
pub struct GlacierClimateModelBuilder {
    climate: Option<ClimateIndexReconstructor>,
    mass_balance: Option<TemperatureIndexMassBalance>,
    listener: Option<Arc<dyn UpdateListener>>,
}

impl GlacierClimateModelBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create both components from a configuration and the loaded gridded sources
    pub fn from_config(
        config: &SimulationConfig,
        observed: &FieldSet,
        anomaly: &FieldSet,
    ) -> GlacResult<Self> {
        let climate = ClimateIndexReconstructor::new(
            config.climate.clone(),
            observed,
            anomaly,
            config.load_proxy()?,
        )?;
        let mass_balance =
            TemperatureIndexMassBalance::from_parameters(config.mass_balance.clone())?;
        Ok(Self::new()
            .with_climate(climate)
            .with_mass_balance(mass_balance))
    }

    pub fn with_climate(mut self, climate: ClimateIndexReconstructor) -> Self {
        self.climate = Some(climate);
        self
    }

    pub fn with_mass_balance(mut self, mass_balance: TemperatureIndexMassBalance) -> Self {
        self.mass_balance = Some(mass_balance);
        self
    }

    /// Report the updates of both components to `listener`
    pub fn with_listener(mut self, listener: Arc<dyn UpdateListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Variables the host model supplies each step
    pub fn host_variables() -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::output(&VAR_SURFACE_ELEVATION),
            RequirementDefinition::output(&VAR_ICE_MASK),
        ]
    }

    pub fn build(self) -> GlacResult<GlacierClimateModel> {
        let mut climate = self
            .climate
            .ok_or_else(|| GlacError::Error("no climate component was provided".to_string()))?;
        let mut mass_balance = self.mass_balance.ok_or_else(|| {
            GlacError::Error("no mass balance component was provided".to_string())
        })?;

        let mut available = Self::host_variables();
        verify_inputs(&climate, &available)?;
        available.extend(climate.outputs());
        verify_inputs(&mass_balance, &available)?;

        if let Some(listener) = self.listener {
            climate = climate.with_listener(listener.clone());
            mass_balance = mass_balance.with_listener(listener);
        }
        info!(
            "Coupled {} ({}-year cadence) to {} ({}-year cadence)",
            climate.name(),
            climate.schedule().cadence(),
            mass_balance.name(),
            mass_balance.schedule().cadence()
        );

        Ok(GlacierClimateModel {
            climate,
            mass_balance,
        })
    }
}

/// Climate reconstruction and mass balance stepped together
#[derive(Debug)]
pub struct GlacierClimateModel {
    climate: ClimateIndexReconstructor,
    mass_balance: TemperatureIndexMassBalance,
}

impl GlacierClimateModel {
    pub fn climate(&self) -> &ClimateIndexReconstructor {
        &self.climate
    }

    pub fn mass_balance(&self) -> &TemperatureIndexMassBalance {
        &self.mass_balance
    }

    /// Update the climate and then the mass balance at `t`
    ///
    /// Both results are computed before either component is updated, so a failed step
    /// leaves the model unchanged.
    pub fn step(
        &mut self,
        t: Time,
        surface_elevation: ArrayView2<FloatValue>,
        ice_mask: Option<ArrayView2<FloatValue>>,
    ) -> GlacResult<StepOutput> {
        let start = Instant::now();
        let pending_forcing = if self.climate.schedule().is_due(t) {
            Some(self.climate.calculate_forcing(t, surface_elevation)?)
        } else {
            debug!("Skipping climate update at t={t}");
            None
        };
        let climate_duration = start.elapsed();

        let forcing = match &pending_forcing {
            Some(forcing) => forcing,
            None => self.climate.forcing().ok_or_else(|| {
                GlacError::Error("climate forcing has not been computed".to_string())
            })?,
        };

        let start = Instant::now();
        let pending_smb = if self.mass_balance.schedule().is_due(t) {
            Some(self.mass_balance.calculate_smb(
                forcing.air_temp.view(),
                forcing.precipitation.view(),
                surface_elevation,
                ice_mask,
            )?)
        } else {
            debug!("Skipping mass balance update at t={t}");
            None
        };
        let smb_duration = start.elapsed();

        let climate_updated = pending_forcing.is_some();
        if let Some(forcing) = pending_forcing {
            self.climate.commit(forcing, climate_duration);
        }
        let smb_updated = pending_smb.is_some();
        let smb = match pending_smb {
            Some(smb) => self.mass_balance.commit(t, smb, smb_duration).clone(),
            None => self
                .mass_balance
                .smb()
                .ok_or_else(|| GlacError::Error("mass balance has not been computed".to_string()))?
                .clone(),
        };

        Ok(StepOutput {
            time: t,
            climate_updated,
            smb_updated,
            smb,
        })
    }

    /// Step through `time_axis` with a fixed surface
    pub fn run(
        &mut self,
        time_axis: &TimeAxis,
        surface_elevation: ArrayView2<FloatValue>,
        ice_mask: Option<ArrayView2<FloatValue>>,
    ) -> GlacResult<Vec<StepOutput>> {
        time_axis
            .iter()
            .map(|t| self.step(t, surface_elevation, ice_mask))
            .collect()
    }
}
