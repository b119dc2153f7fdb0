//! Glacier climate components
//!
//! This crate provides the two components used to force a glacier model through a glacial cycle:
//! - [`components::ClimateIndexReconstructor`]: monthly temperature and precipitation
//!   reconstructed from present-day fields, a glacial anomaly and an ice-core proxy record
//! - [`components::TemperatureIndexMassBalance`]: positive-degree-day surface mass balance
//!
//! # Parameters
//!
//! Each component has an associated parameters struct in the `parameters` module.
//! [`config::SimulationConfig`] bundles both with the proxy source in one TOML document
//! and [`coupled::GlacierClimateModel`] steps the components in order.

pub mod components;
pub mod config;
pub mod coupled;
pub mod parameters;
