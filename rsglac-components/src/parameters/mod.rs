//! Component parameters
//!
//! Each parameter struct deserialises with `#[serde(default)]`, so a configuration file
//! only needs to name the values that differ from the documented defaults.

mod climate_index;
mod mass_balance;

pub use climate_index::{ClimateIndexParameters, TemperatureMethod};
pub use mass_balance::MassBalanceParameters;
