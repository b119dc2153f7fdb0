//! Paleoclimate forcing for glacier models
//!
//! Re-exports the member crates and, with the `python` feature, the `_lib` extension module.

pub use rsglac_components;
pub use rsglac_core;

#[cfg(feature = "python")]
mod python;
