//! Shape helpers for monthly gridded climate fields
//!
//! Monthly fields are stored as `[month, y, x]` arrays with twelve months.
//! Static fields (elevation, ice mask, mass balance) are `[y, x]`.

use crate::errors::{GlacError, GlacResult};
use crate::timeseries::FloatValue;
use log::warn;
use ndarray::{s, Array2, Array3, ArrayBase, ArrayD, Axis, Data, Ix2, Ix3};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of months in a climate year
pub const MONTHS: usize = 12;

/// Spatial extent of a grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridShape {
    pub ny: usize,
    pub nx: usize,
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.ny, self.nx)
    }
}

impl GridShape {
    pub fn new(ny: usize, nx: usize) -> Self {
        Self { ny, nx }
    }

    pub fn of<S: Data<Elem = FloatValue>>(field: &ArrayBase<S, Ix2>) -> Self {
        let (ny, nx) = field.dim();
        Self { ny, nx }
    }

    pub fn monthly(&self) -> [usize; 3] {
        [MONTHS, self.ny, self.nx]
    }

    pub fn len(&self) -> usize {
        self.ny * self.nx
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail unless `field` is `[ny, nx]`
    pub fn check_grid<S: Data<Elem = FloatValue>>(
        &self,
        name: &str,
        field: &ArrayBase<S, Ix2>,
    ) -> GlacResult<()> {
        if field.shape() != [self.ny, self.nx] {
            return Err(GlacError::shape_mismatch(
                name,
                &[self.ny, self.nx],
                field.shape(),
            ));
        }
        Ok(())
    }

    /// Fail unless `field` is `[12, ny, nx]`
    pub fn check_monthly<S: Data<Elem = FloatValue>>(
        &self,
        name: &str,
        field: &ArrayBase<S, Ix3>,
    ) -> GlacResult<()> {
        if field.shape() != self.monthly() {
            return Err(GlacError::shape_mismatch(name, &self.monthly(), field.shape()));
        }
        Ok(())
    }
}

/// Normalise a field to twelve months
///
/// A `[y, x]` field or a single-month `[1, y, x]` field is repeated for every month;
/// a twelve-month field is kept as is.
pub fn to_monthly(name: &str, field: ArrayD<FloatValue>) -> GlacResult<Array3<FloatValue>> {
    let shape = field.shape().to_vec();
    match shape.as_slice() {
        [ny, nx] => {
            let grid = field
                .into_dimensionality::<Ix2>()
                .map_err(|_| GlacError::dimension_mismatch(name, 2, &shape))?;
            Ok(repeat_months(&grid, *ny, *nx))
        }
        [1, ny, nx] => {
            let grid = field.index_axis_move(Axis(0), 0);
            let grid = grid
                .into_dimensionality::<Ix2>()
                .map_err(|_| GlacError::dimension_mismatch(name, 2, &shape))?;
            Ok(repeat_months(&grid, *ny, *nx))
        }
        [MONTHS, _, _] => field
            .into_dimensionality::<Ix3>()
            .map_err(|_| GlacError::dimension_mismatch(name, 3, &shape)),
        _ => Err(GlacError::ShapeMismatch {
            variable: name.to_string(),
            expected: "[12, ny, nx], [1, ny, nx] or [ny, nx]".to_string(),
            found: shape,
        }),
    }
}

fn repeat_months(grid: &Array2<FloatValue>, ny: usize, nx: usize) -> Array3<FloatValue> {
    Array3::from_shape_fn((MONTHS, ny, nx), |(_, j, i)| grid[[j, i]])
}

/// Place a monthly field on `grid`
///
/// Rows and columns beyond the grid are cropped. Cells of the grid the field does not
/// cover are zero. Both cases are logged as warnings since the field is then only an
/// approximation of the intended data.
pub fn fit_to_grid(name: &str, field: Array3<FloatValue>, grid: GridShape) -> Array3<FloatValue> {
    let (months, ny, nx) = field.dim();
    if (ny, nx) == (grid.ny, grid.nx) {
        return field;
    }

    let (cy, cx) = (ny.min(grid.ny), nx.min(grid.nx));
    if ny > grid.ny || nx > grid.nx {
        warn!("Cropping {name} from {ny}x{nx} to the shared {cy}x{cx} window of the {grid} grid");
    }
    if ny < grid.ny || nx < grid.nx {
        warn!(
            "{name} only covers {cy}x{cx} of the {grid} grid; the remaining cells are set to zero"
        );
    }

    let mut fitted = Array3::zeros((months, grid.ny, grid.nx));
    fitted
        .slice_mut(s![.., ..cy, ..cx])
        .assign(&field.slice(s![.., ..cy, ..cx]));
    fitted
}

/// Mean over the month axis
pub fn monthly_mean<S: Data<Elem = FloatValue>>(field: &ArrayBase<S, Ix3>) -> Array2<FloatValue> {
    let months = field.len_of(Axis(0)) as FloatValue;
    field.sum_axis(Axis(0)) / months
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{array, Array};

    #[test]
    fn single_grids_are_repeated_for_every_month() {
        let grid = array![[1.0, 2.0], [3.0, 4.0]];
        let monthly = to_monthly("anomaly", grid.clone().into_dyn()).unwrap();
        assert_eq!(monthly.dim(), (12, 2, 2));
        for month in monthly.axis_iter(Axis(0)) {
            assert_eq!(month, grid);
        }

        let single = grid.clone().insert_axis(Axis(0)).into_dyn();
        assert_eq!(to_monthly("anomaly", single).unwrap(), monthly);
    }

    #[test]
    fn unsupported_month_counts_are_rejected() {
        let field = Array::<f64, _>::zeros((4, 2, 2)).into_dyn();
        assert!(matches!(
            to_monthly("anomaly", field),
            Err(GlacError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn larger_fields_are_cropped() {
        let field = Array3::from_shape_fn((12, 4, 3), |(m, j, i)| (m * 100 + j * 10 + i) as f64);
        let fitted = fit_to_grid("anomaly", field, GridShape::new(2, 3));
        assert_eq!(fitted.dim(), (12, 2, 3));
        assert_eq!(fitted[[5, 1, 2]], 512.0);
    }

    #[test]
    fn smaller_fields_are_zero_filled() {
        let field = Array3::from_elem((12, 1, 2), 3.0);
        let fitted = fit_to_grid("anomaly", field, GridShape::new(2, 3));
        assert_eq!(fitted.dim(), (12, 2, 3));
        assert_eq!(fitted[[0, 0, 1]], 3.0);
        assert_eq!(fitted[[0, 0, 2]], 0.0);
        assert_eq!(fitted[[0, 1, 0]], 0.0);
    }

    #[test]
    fn shape_checks() {
        let grid = GridShape::new(2, 3);
        assert!(grid.check_grid("elevation", &Array2::zeros((2, 3))).is_ok());
        assert!(grid.check_grid("elevation", &Array2::zeros((3, 2))).is_err());
        assert!(grid
            .check_monthly("air_temp", &Array3::zeros((12, 2, 3)))
            .is_ok());
        assert!(grid
            .check_monthly("air_temp", &Array3::zeros((11, 2, 3)))
            .is_err());
        assert_eq!(grid.to_string(), "2x3");
    }

    #[test]
    fn mean_over_months() {
        let field = Array3::from_shape_fn((12, 1, 1), |(m, _, _)| m as f64);
        assert_eq!(monthly_mean(&field), array![[5.5]]);
    }
}
