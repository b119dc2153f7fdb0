//! Simulation configuration
//!
//! A single TOML document configures both components and the proxy record:
//!
//! ```toml
//! [climate]
//! polar_amplification_adjustment = 0.5
//! oldest_year = -138050.0
//!
//! [mass_balance]
//! refreeze_factor = 0.6
//!
//! [proxy]
//! kind = "table"
//! path = "dT_epica.csv"
//! format = "csv"
//! ```
//!
//! Relative proxy paths in a file loaded with [`SimulationConfig::from_file`] are
//! resolved against the directory of that file.

use crate::parameters::{ClimateIndexParameters, MassBalanceParameters};
use log::info;
use rsglac_core::errors::{GlacError, GlacResult};
use rsglac_core::proxy::{
    combine_latitude_weighted, pole_distance, read_proxy_file, PaleoTemperatureSeries,
    ProxyTableFormat,
};
use rsglac_core::timeseries::FloatValue;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Named table layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProxyPreset {
    #[default]
    Csv,
    Pangaea,
    EpicaDomeC,
}

/// Layout of a proxy table, either a preset name or a full description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProxyFormat {
    Preset(ProxyPreset),
    Custom(ProxyTableFormat),
}

impl Default for ProxyFormat {
    fn default() -> Self {
        ProxyFormat::Preset(ProxyPreset::default())
    }
}

impl ProxyFormat {
    pub fn table_format(&self) -> ProxyTableFormat {
        match self {
            ProxyFormat::Preset(ProxyPreset::Csv) => ProxyTableFormat::csv(),
            ProxyFormat::Preset(ProxyPreset::Pangaea) => ProxyTableFormat::pangaea(),
            ProxyFormat::Preset(ProxyPreset::EpicaDomeC) => ProxyTableFormat::epica_dome_c(),
            ProxyFormat::Custom(format) => format.clone(),
        }
    }
}

/// A proxy record stored in a text table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProxyTable {
    pub path: PathBuf,
    #[serde(default)]
    pub format: ProxyFormat,
    /// Constant added to every anomaly (K)
    #[serde(default)]
    pub temperature_shift: FloatValue,
}

impl ProxyTable {
    pub fn load(&self) -> GlacResult<PaleoTemperatureSeries> {
        let series = read_proxy_file(&self.path, &self.format.table_format())?;
        info!(
            "Loaded {} proxy samples from {}",
            series.len(),
            self.path.display()
        );
        Ok(series.shifted(self.temperature_shift))
    }

    fn resolve_against(&mut self, base: &Path) {
        if self.path.is_relative() {
            self.path = base.join(&self.path);
        }
    }
}

/// Where the proxy temperature record comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProxySource {
    /// A single record
    Table(ProxyTable),
    /// Antarctic and Greenland records weighted by the latitude of the glacier
    ///
    /// The `polar_adjustment` is applied while combining, so unless it is 1 the climate
    /// parameter `polar_amplification_adjustment` must be set to 1 with this source.
    LatitudeComposite {
        antarctic: ProxyTable,
        greenland: ProxyTable,
        /// Latitude of the glacier (degrees north)
        latitude: FloatValue,
        polar_adjustment: FloatValue,
    },
}

impl ProxySource {
    pub fn load(&self) -> GlacResult<PaleoTemperatureSeries> {
        match self {
            ProxySource::Table(table) => table.load(),
            ProxySource::LatitudeComposite {
                antarctic,
                greenland,
                latitude,
                polar_adjustment,
            } => {
                let weight = pole_distance(*latitude)?;
                info!("Weighting the Greenland record by {weight:.6} at latitude {latitude}");
                combine_latitude_weighted(
                    &antarctic.load()?,
                    &greenland.load()?,
                    weight,
                    *polar_adjustment,
                )
            }
        }
    }

    fn resolve_against(&mut self, base: &Path) {
        match self {
            ProxySource::Table(table) => table.resolve_against(base),
            ProxySource::LatitudeComposite {
                antarctic,
                greenland,
                ..
            } => {
                antarctic.resolve_against(base);
                greenland.resolve_against(base);
            }
        }
    }
}

/// Configuration of a coupled climate and mass balance simulation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub climate: ClimateIndexParameters,
    pub mass_balance: MassBalanceParameters,
    pub proxy: Option<ProxySource>,
}

impl SimulationConfig {
    pub fn from_toml_str(text: &str) -> GlacResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| GlacError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> GlacResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| GlacError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let (Some(proxy), Some(base)) = (config.proxy.as_mut(), path.parent()) {
            proxy.resolve_against(base);
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> GlacResult<String> {
        toml::to_string(self).map_err(|e| GlacError::Config(e.to_string()))
    }

    pub fn validate(&self) -> GlacResult<()> {
        self.climate.validate()?;
        self.mass_balance.validate()?;
        if let Some(ProxySource::LatitudeComposite {
            polar_adjustment,
            ..
        }) = &self.proxy
        {
            let climate_adjustment = self.climate.polar_amplification_adjustment;
            if *polar_adjustment != 1.0 && climate_adjustment != 1.0 {
                return Err(GlacError::Config(format!(
                    "latitude composite already applies polar_adjustment = {polar_adjustment}, \
                     so climate.polar_amplification_adjustment must be 1 (got {climate_adjustment})"
                )));
            }
        }
        Ok(())
    }

    /// Load the configured proxy record
    pub fn load_proxy(&self) -> GlacResult<PaleoTemperatureSeries> {
        self.proxy
            .as_ref()
            .ok_or_else(|| GlacError::Config("no [proxy] source configured".to_string()))?
            .load()
    }
}
