pub mod component;
pub mod events;
pub mod fields;
pub mod grid;
pub mod interpolate;
pub mod proxy;
pub mod schedule;
pub mod standard_variables;
pub mod timeseries;

pub mod errors;
