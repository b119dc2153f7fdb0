//! Interpolation kernels
//!
//! Out-of-range queries never fail: values beyond the first or last sample take the
//! value of the nearest endpoint (flat extrapolation). This replaces the raising
//! behaviour of range-checked interpolators, so a simulation can always be stepped
//! past the end of a forcing record.

use num::Float;

/// Linear blend between `v0` and `v1`
#[inline]
pub fn lerp<T: Float>(v0: T, v1: T, fac: T) -> T {
    v0 + (v1 - v0) * fac
}

/// Linear interpolation of `(xs, ys)` at `x` with flat extrapolation.
///
/// `xs` must be sorted in strictly increasing order.
/// Returns `None` if there are no samples or `xs` and `ys` disagree in length.
/// A query exactly on a sample returns that sample's value unchanged.
pub fn interp_flat<T: Float>(x: T, xs: &[T], ys: &[T]) -> Option<T> {
    let n = xs.len();
    if n == 0 || n != ys.len() {
        return None;
    }
    if x <= xs[0] {
        return Some(ys[0]);
    }
    if x >= xs[n - 1] {
        return Some(ys[n - 1]);
    }
    // NaN fails both comparisons above
    if x.is_nan() {
        return Some(T::nan());
    }

    let upper = xs.partition_point(|&v| v <= x);
    let lower = upper - 1;
    if xs[lower] == x {
        return Some(ys[lower]);
    }
    let fac = (x - xs[lower]) / (xs[upper] - xs[lower]);
    Some(lerp(ys[lower], ys[upper], fac))
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn interior_points_are_linear() {
        let xs = [0.0, 10.0, 20.0];
        let ys = [0.0, 5.0, -5.0];
        assert!(is_close!(interp_flat(5.0, &xs, &ys).unwrap(), 2.5));
        assert!(is_close!(interp_flat(15.0, &xs, &ys).unwrap(), 0.0));
    }

    #[test]
    fn nodes_are_exact() {
        let xs = [0.0, 0.3, 0.7];
        let ys = [0.1, 0.2, 0.3];
        assert_eq!(interp_flat(0.3, &xs, &ys), Some(0.2));
        assert_eq!(interp_flat(0.7, &xs, &ys), Some(0.3));
    }

    #[test]
    fn extrapolation_is_flat() {
        let xs = [-100.0, 0.0];
        let ys = [-8.0, 0.0];
        assert_eq!(interp_flat(-1.0e6, &xs, &ys), Some(-8.0));
        assert_eq!(interp_flat(1.0e6, &xs, &ys), Some(0.0));
    }

    #[test]
    fn single_sample_is_constant() {
        assert_eq!(interp_flat(42.0, &[1.0], &[3.0]), Some(3.0));
    }

    #[test]
    fn empty_or_ragged_input() {
        let empty: [f64; 0] = [];
        assert_eq!(interp_flat(0.0, &empty, &empty), None);
        assert_eq!(interp_flat(0.0, &[0.0, 1.0], &[1.0]), None);
    }
}
