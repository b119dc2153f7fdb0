//! Paleo temperature proxies and the glacial index derived from them

pub mod composite;
mod glacial_index;
pub mod readers;
mod series;

pub use composite::{combine_latitude_weighted, pole_distance};
pub use glacial_index::{GlacialIndex, DEFAULT_PRESENT_YEAR};
pub use readers::{parse_proxy_table, read_proxy_file, ProxyTableFormat};
pub use series::{PaleoTemperatureSeries, DELTA_T_UNIT};
