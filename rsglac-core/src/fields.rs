use crate::errors::{GlacError, GlacResult};
use crate::timeseries::FloatValue;
use ndarray::{Array, Array2, Array3, ArrayD, Axis, Dimension, Ix2, Ix3};
use serde::{Deserialize, Serialize};

/// A named gridded variable
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldItem {
    pub name: String,
    pub data: ArrayD<FloatValue>,
}

/// A collection of gridded variables loaded from a single source
///
/// Stands in for an opened dataset: the readers that clip and reproject rasters hand
/// over their arrays here, and the components pull the variables they need by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSet {
    fields: Vec<FieldItem>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`FieldSet::insert`]
    pub fn with_field<D: Dimension>(mut self, name: &str, data: Array<FloatValue, D>) -> Self {
        self.insert(name, data);
        self
    }

    /// Add a variable, replacing any existing variable with the same name
    pub fn insert<D: Dimension>(&mut self, name: &str, data: Array<FloatValue, D>) {
        let data = data.into_dyn();
        match self.fields.iter_mut().find(|item| item.name == name) {
            Some(item) => item.data = data,
            None => self.fields.push(FieldItem {
                name: name.to_string(),
                data,
            }),
        }
    }

    pub fn get(&self, name: &str) -> Option<&ArrayD<FloatValue>> {
        self.fields
            .iter()
            .find(|item| item.name == name)
            .map(|item| &item.data)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|item| item.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fetch a variable, dropping leading singleton axes
    ///
    /// Rasters are often stored with a band or time axis of length one in front of the
    /// spatial axes; these are removed while more than two axes remain.
    pub fn require(&self, name: &str) -> GlacResult<ArrayD<FloatValue>> {
        let mut data = self
            .get(name)
            .ok_or_else(|| GlacError::MissingVariable(name.to_string()))?
            .clone();
        while data.ndim() > 2 && data.shape()[0] == 1 {
            data = data.index_axis_move(Axis(0), 0);
        }
        Ok(data)
    }

    /// Fetch a `[ny, nx]` variable
    pub fn require_grid(&self, name: &str) -> GlacResult<Array2<FloatValue>> {
        let data = self.require(name)?;
        let shape = data.shape().to_vec();
        data.into_dimensionality::<Ix2>()
            .map_err(|_| GlacError::dimension_mismatch(name, 2, &shape))
    }

    /// Fetch a `[months, ny, nx]` variable
    pub fn require_stack(&self, name: &str) -> GlacResult<Array3<FloatValue>> {
        let data = self.require(name)?;
        let shape = data.shape().to_vec();
        data.into_dimensionality::<Ix3>()
            .map_err(|_| GlacError::dimension_mismatch(name, 3, &shape))
    }
}
