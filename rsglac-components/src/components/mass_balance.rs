//! Temperature-index surface mass balance
//!
//! Accumulation is the solid fraction of the monthly precipitation: all of it at or below
//! the snow threshold, none at or above the rain threshold and a linear ramp in between.
//! Melt is driven by positive degree months $\max(T, 0) / 12$ multiplied by a degree-day
//! factor for snow while snow remains on the ground and for ice once it is gone.
//!
//! Months are processed in hydrological order with a snowpack that starts empty each
//! year. A fraction of the total melt refreezes, and the annual balance is converted to
//! metres of ice:
//!
//! $$ SMB = \frac{\rho_w}{\rho_i} \sum_k \left(a_k - (1 - r) m_k\right) $$

use crate::parameters::MassBalanceParameters;
use log::debug;
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis, Zip};
use rsglac_core::component::{Component, RequirementDefinition};
use rsglac_core::errors::{GlacError, GlacResult};
use rsglac_core::events::{UpdateEvent, UpdateListener};
use rsglac_core::grid::{GridShape, MONTHS};
use rsglac_core::schedule::UpdateSchedule;
use rsglac_core::standard_variables::{
    VAR_AIR_TEMPERATURE, VAR_ICE_MASK, VAR_PRECIPITATION, VAR_SURFACE_ELEVATION,
    VAR_SURFACE_MASS_BALANCE,
};
use rsglac_core::timeseries::{FloatValue, Time};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Positive-degree-day surface mass balance
#[derive(Debug)]
pub struct TemperatureIndexMassBalance {
    parameters: MassBalanceParameters,
    schedule: UpdateSchedule,
    smb: Option<Array2<FloatValue>>,
    listener: Option<Arc<dyn UpdateListener>>,
}

impl TemperatureIndexMassBalance {
    pub const NAME: &'static str = "temperature_index_mass_balance";

    pub fn from_parameters(parameters: MassBalanceParameters) -> GlacResult<Self> {
        parameters.validate()?;
        Ok(Self {
            schedule: UpdateSchedule::new(parameters.update_cadence)?,
            parameters,
            smb: None,
            listener: None,
        })
    }

    /// Report every recomputation to `listener`
    pub fn with_listener(mut self, listener: Arc<dyn UpdateListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn parameters(&self) -> &MassBalanceParameters {
        &self.parameters
    }

    pub fn schedule(&self) -> &UpdateSchedule {
        &self.schedule
    }

    /// Most recent mass balance (m ice eq. / yr), if any update has happened
    pub fn smb(&self) -> Option<&Array2<FloatValue>> {
        self.smb.as_ref()
    }

    /// Fraction of precipitation falling as snow at `temperature`
    pub fn solid_fraction(&self, temperature: FloatValue) -> FloatValue {
        let p = &self.parameters;
        if temperature <= p.snow_threshold {
            1.0
        } else if temperature >= p.rain_threshold {
            0.0
        } else {
            (p.rain_threshold - temperature) / (p.rain_threshold - p.snow_threshold)
        }
    }

    /// Melt (m w.e.) in a month with `pdd` positive degree years on a snowpack of `snow` m w.e.
    pub fn calculate_ablation(&self, snow: FloatValue, pdd: FloatValue) -> FloatValue {
        let p = &self.parameters;
        if snow == 0.0 {
            pdd * p.melt_factor_ice
        } else if pdd * p.melt_factor_snow < snow {
            pdd * p.melt_factor_snow
        } else {
            // The snowpack melts out and the remaining energy melts ice
            snow + (pdd - snow / p.melt_factor_snow) * p.melt_factor_ice
        }
    }

    /// Compute the annual mass balance without touching the update schedule
    pub fn calculate_smb(
        &self,
        air_temp: ArrayView3<FloatValue>,
        precipitation: ArrayView3<FloatValue>,
        surface_elevation: ArrayView2<FloatValue>,
        ice_mask: Option<ArrayView2<FloatValue>>,
    ) -> GlacResult<Array2<FloatValue>> {
        let grid = GridShape::of(&surface_elevation);
        grid.check_monthly(VAR_AIR_TEMPERATURE.name, &air_temp)?;
        grid.check_monthly(VAR_PRECIPITATION.name, &precipitation)?;
        if let Some(mask) = &ice_mask {
            grid.check_grid(VAR_ICE_MASK.name, mask)?;
        }

        let p = &self.parameters;
        // m w.e. per month
        let to_water = p.precipitation_unit.to_monthly_amount() / p.water_density;
        let accumulation: Array3<FloatValue> = Zip::from(&air_temp)
            .and(&precipitation)
            .map_collect(|&t, &pr| self.solid_fraction(t) * pr * to_water);
        // degC yr
        let pdd = air_temp.mapv(|t| t.max(0.0) / MONTHS as FloatValue);

        let mut snow = Array2::<FloatValue>::zeros((grid.ny, grid.nx));
        let mut ablation = Array2::<FloatValue>::zeros((grid.ny, grid.nx));
        for step in 0..MONTHS {
            let k = p.hydrological_month(step);
            Zip::from(&mut snow)
                .and(&mut ablation)
                .and(accumulation.index_axis(Axis(0), k))
                .and(pdd.index_axis(Axis(0), k))
                .for_each(|snow, ablation, &acc, &pdd| {
                    *snow += acc;
                    let melt = self.calculate_ablation(*snow, pdd);
                    *snow = (*snow - melt).max(0.0);
                    *ablation += melt;
                });
        }

        let mut smb = (accumulation.sum_axis(Axis(0)) - ablation * (1.0 - p.refreeze_factor))
            * p.water_to_ice();

        if let Some(mask) = ice_mask {
            let sentinel = p.ice_free_sentinel;
            Zip::from(&mut smb).and(mask).for_each(|smb, &mask| {
                if *smb >= 0.0 && mask <= 0.5 {
                    *smb = sentinel;
                }
            });
        }
        Ok(smb)
    }

    /// Recompute the mass balance at `t` if the update cadence has been reached
    ///
    /// Returns the current mass balance: the new one after a recomputation, otherwise the
    /// previous one unchanged. A failed update leaves the component unchanged.
    pub fn update(
        &mut self,
        t: Time,
        air_temp: ArrayView3<FloatValue>,
        precipitation: ArrayView3<FloatValue>,
        surface_elevation: ArrayView2<FloatValue>,
        ice_mask: Option<ArrayView2<FloatValue>>,
    ) -> GlacResult<&Array2<FloatValue>> {
        if self.schedule.is_due(t) {
            let start = Instant::now();
            let smb = self.calculate_smb(air_temp, precipitation, surface_elevation, ice_mask)?;
            return Ok(self.commit(t, smb, start.elapsed()));
        }

        debug!("Skipping mass balance update at t={t}");
        self.smb
            .as_ref()
            .ok_or_else(|| GlacError::Error("mass balance has not been computed".to_string()))
    }

    /// Store a mass balance from [`TemperatureIndexMassBalance::calculate_smb`] as the
    /// result of an update at `t`
    pub fn commit(
        &mut self,
        t: Time,
        smb: Array2<FloatValue>,
        duration: Duration,
    ) -> &Array2<FloatValue> {
        self.schedule.mark(t);
        if let Some(listener) = &self.listener {
            listener.on_update(&UpdateEvent {
                component: Self::NAME,
                time: t,
                duration,
            });
        }
        self.smb.insert(smb)
    }
}

impl Component for TemperatureIndexMassBalance {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn definitions(&self) -> Vec<RequirementDefinition> {
        vec![
            RequirementDefinition::input(&VAR_AIR_TEMPERATURE),
            RequirementDefinition::input(&VAR_PRECIPITATION)
                .with_unit(self.parameters.precipitation_unit.unit()),
            RequirementDefinition::input(&VAR_SURFACE_ELEVATION),
            RequirementDefinition::input(&VAR_ICE_MASK).into_optional(),
            RequirementDefinition::output(&VAR_SURFACE_MASS_BALANCE),
        ]
    }
}
