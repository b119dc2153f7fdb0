mod climate_index;
mod mass_balance;

pub use climate_index::{ClimateForcing, ClimateIndexReconstructor};
pub use mass_balance::TemperatureIndexMassBalance;
