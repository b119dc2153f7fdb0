use std::collections::HashMap;
use std::sync::Arc;

use numpy::{IntoPyArray, PyArray2, PyReadonlyArray2, PyReadonlyArray3, PyReadonlyArrayDyn};
use pyo3::exceptions::{PyIOError, PyKeyError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use serde::de::DeserializeOwned;

use rsglac_components::components::{
    ClimateForcing, ClimateIndexReconstructor, TemperatureIndexMassBalance,
};
use rsglac_components::config::{ProxyFormat, ProxyPreset};
use rsglac_core::component::Component;
use rsglac_core::errors::GlacError;
use rsglac_core::events::LogListener;
use rsglac_core::fields::FieldSet;
use rsglac_core::proxy::{read_proxy_file, PaleoTemperatureSeries};
use rsglac_core::timeseries::{FloatValue, Time};

fn to_py_err(error: GlacError) -> PyErr {
    match error {
        GlacError::MissingVariable(_) => PyKeyError::new_err(error.to_string()),
        GlacError::Io { .. } => PyIOError::new_err(error.to_string()),
        _ => PyValueError::new_err(error.to_string()),
    }
}

/// Parameters from a dict, or the defaults when none are given
fn parameters_from<T: DeserializeOwned + Default>(
    parameters: Option<Bound<'_, PyAny>>,
) -> PyResult<T> {
    match parameters {
        Some(parameters) => pythonize::depythonize_bound(parameters)
            .map_err(|e| PyValueError::new_err(format!("{}", e))),
        None => Ok(T::default()),
    }
}

fn field_set(fields: HashMap<String, PyReadonlyArrayDyn<'_, FloatValue>>) -> FieldSet {
    let mut set = FieldSet::new();
    for (name, data) in fields {
        set.insert(&name, data.as_array().to_owned());
    }
    set
}

fn forcing_dict<'py>(py: Python<'py>, forcing: &ClimateForcing) -> PyResult<Bound<'py, PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("time", forcing.time)?;
    dict.set_item("glacial_index", forcing.glacial_index)?;
    dict.set_item("delta_t", forcing.delta_t)?;
    dict.set_item("air_temp", forcing.air_temp.clone().into_pyarray_bound(py))?;
    dict.set_item(
        "precipitation",
        forcing.precipitation.clone().into_pyarray_bound(py),
    )?;
    dict.set_item(
        "mean_annual_temp",
        forcing.mean_annual_temp.clone().into_pyarray_bound(py),
    )?;
    dict.set_item(
        "mean_annual_precip",
        forcing.mean_annual_precip.clone().into_pyarray_bound(py),
    )?;
    Ok(dict)
}

/// Proxy temperature anomalies indexed by years relative to present
#[derive(Debug, Clone)]
#[pyclass]
#[pyo3(name = "PaleoTemperatureSeries")]
pub struct PyPaleoTemperatureSeries(pub PaleoTemperatureSeries);

#[pymethods]
impl PyPaleoTemperatureSeries {
    #[new]
    fn new(offsets: Vec<Time>, delta_t: Vec<FloatValue>) -> PyResult<Self> {
        if offsets.len() != delta_t.len() {
            return Err(PyValueError::new_err(
                "offsets and delta_t must have the same length",
            ));
        }
        PaleoTemperatureSeries::from_samples(offsets.into_iter().zip(delta_t))
            .map(Self)
            .map_err(to_py_err)
    }

    fn delta_t_at_offset(&self, offset: Time) -> FloatValue {
        self.0.delta_t_at_offset(offset)
    }

    fn shifted(&self, shift: FloatValue) -> Self {
        Self(self.0.shifted(shift))
    }

    fn samples(&self) -> Vec<(Time, FloatValue)> {
        self.0.iter().collect()
    }

    fn __len__(&self) -> usize {
        self.0.len()
    }
}

/// Read a proxy table using one of the named layouts ("csv", "pangaea" or "epica_dome_c")
#[pyfunction]
#[pyo3(signature = (path, format = "csv"))]
fn load_proxy_series(path: &str, format: &str) -> PyResult<PyPaleoTemperatureSeries> {
    let preset = match format {
        "csv" => ProxyPreset::Csv,
        "pangaea" => ProxyPreset::Pangaea,
        "epica_dome_c" => ProxyPreset::EpicaDomeC,
        other => {
            return Err(PyValueError::new_err(format!(
                "unknown proxy table format '{other}'"
            )))
        }
    };
    read_proxy_file(path, &ProxyFormat::Preset(preset).table_format())
        .map(PyPaleoTemperatureSeries)
        .map_err(to_py_err)
}

/// Glacial-index climate reconstruction
#[derive(Debug)]
#[pyclass]
#[pyo3(name = "ClimateIndexReconstructor")]
pub struct PyClimateIndexReconstructor(ClimateIndexReconstructor);

#[pymethods]
impl PyClimateIndexReconstructor {
    #[new]
    #[pyo3(signature = (observed, anomaly, proxy, parameters = None))]
    fn new(
        observed: HashMap<String, PyReadonlyArrayDyn<'_, FloatValue>>,
        anomaly: HashMap<String, PyReadonlyArrayDyn<'_, FloatValue>>,
        proxy: PyPaleoTemperatureSeries,
        parameters: Option<Bound<'_, PyAny>>,
    ) -> PyResult<Self> {
        let component = ClimateIndexReconstructor::new(
            parameters_from(parameters)?,
            &field_set(observed),
            &field_set(anomaly),
            proxy.0,
        )
        .map_err(to_py_err)?;
        Ok(Self(component.with_listener(Arc::new(LogListener))))
    }

    fn glacial_index_at(&self, t: Time) -> FloatValue {
        self.0.glacial_index_at(t)
    }

    fn delta_t_at(&self, t: Time) -> FloatValue {
        self.0.delta_t_at(t)
    }

    fn input_names(&self) -> Vec<String> {
        self.0.inputs().into_iter().map(|d| d.variable_name).collect()
    }

    fn output_names(&self) -> Vec<String> {
        self.0.outputs().into_iter().map(|d| d.variable_name).collect()
    }

    /// Reconstruct the climate at `t` without touching the update schedule
    fn calculate_forcing<'py>(
        &self,
        py: Python<'py>,
        t: Time,
        surface_elevation: PyReadonlyArray2<'py, FloatValue>,
    ) -> PyResult<Bound<'py, PyDict>> {
        let forcing = self
            .0
            .calculate_forcing(t, surface_elevation.as_array())
            .map_err(to_py_err)?;
        forcing_dict(py, &forcing)
    }

    /// Returns the new forcing, or None when the update cadence has not been reached
    fn update<'py>(
        &mut self,
        py: Python<'py>,
        t: Time,
        surface_elevation: PyReadonlyArray2<'py, FloatValue>,
    ) -> PyResult<Option<Bound<'py, PyDict>>> {
        let update = self
            .0
            .update(t, surface_elevation.as_array())
            .map_err(to_py_err)?;
        update.updated().map(|f| forcing_dict(py, f)).transpose()
    }
}

/// Positive-degree-day surface mass balance
#[derive(Debug)]
#[pyclass]
#[pyo3(name = "TemperatureIndexMassBalance")]
pub struct PyTemperatureIndexMassBalance(TemperatureIndexMassBalance);

#[pymethods]
impl PyTemperatureIndexMassBalance {
    #[new]
    #[pyo3(signature = (parameters = None))]
    fn new(parameters: Option<Bound<'_, PyAny>>) -> PyResult<Self> {
        let component = TemperatureIndexMassBalance::from_parameters(parameters_from(parameters)?)
            .map_err(to_py_err)?;
        Ok(Self(component.with_listener(Arc::new(LogListener))))
    }

    fn input_names(&self) -> Vec<String> {
        self.0.inputs().into_iter().map(|d| d.variable_name).collect()
    }

    #[pyo3(signature = (air_temp, precipitation, surface_elevation, ice_mask = None))]
    fn calculate_smb<'py>(
        &self,
        py: Python<'py>,
        air_temp: PyReadonlyArray3<'py, FloatValue>,
        precipitation: PyReadonlyArray3<'py, FloatValue>,
        surface_elevation: PyReadonlyArray2<'py, FloatValue>,
        ice_mask: Option<PyReadonlyArray2<'py, FloatValue>>,
    ) -> PyResult<Bound<'py, PyArray2<FloatValue>>> {
        let smb = self
            .0
            .calculate_smb(
                air_temp.as_array(),
                precipitation.as_array(),
                surface_elevation.as_array(),
                ice_mask.as_ref().map(|m| m.as_array()),
            )
            .map_err(to_py_err)?;
        Ok(smb.into_pyarray_bound(py))
    }

    /// Returns the current mass balance, recomputed when the update cadence has been reached
    #[pyo3(signature = (t, air_temp, precipitation, surface_elevation, ice_mask = None))]
    fn update<'py>(
        &mut self,
        py: Python<'py>,
        t: Time,
        air_temp: PyReadonlyArray3<'py, FloatValue>,
        precipitation: PyReadonlyArray3<'py, FloatValue>,
        surface_elevation: PyReadonlyArray2<'py, FloatValue>,
        ice_mask: Option<PyReadonlyArray2<'py, FloatValue>>,
    ) -> PyResult<Bound<'py, PyArray2<FloatValue>>> {
        let smb = self
            .0
            .update(
                t,
                air_temp.as_array(),
                precipitation.as_array(),
                surface_elevation.as_array(),
                ice_mask.as_ref().map(|m| m.as_array()),
            )
            .map_err(to_py_err)?;
        Ok(smb.clone().into_pyarray_bound(py))
    }
}

#[pymodule]
#[pyo3(name = "_lib")]
fn rsglac(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add("__version__", env!("CARGO_PKG_VERSION"))?;
    m.add_class::<PyPaleoTemperatureSeries>()?;
    m.add_class::<PyClimateIndexReconstructor>()?;
    m.add_class::<PyTemperatureIndexMassBalance>()?;
    m.add_function(wrap_pyfunction!(load_proxy_series, m)?)?;
    Ok(())
}
