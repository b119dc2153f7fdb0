//! Latitude-weighted combination of polar ice-core records
//!
//! A Greenland record is short compared to the Antarctic composites. Where both cover a
//! time they are blended with a weight given by the normalised pole distance of the
//! glacier, and the result is reduced by the polar amplification adjustment. Before the
//! start of the Greenland record only the adjusted Antarctic record is used.

use super::series::PaleoTemperatureSeries;
use crate::errors::{GlacError, GlacResult};
use crate::timeseries::FloatValue;

/// Normalised distance from the South Pole
///
/// `0` at the South Pole, `0.5` at the equator and `1` at the North Pole.
pub fn pole_distance(latitude: FloatValue) -> GlacResult<FloatValue> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(GlacError::invalid_parameter(
            "latitude",
            latitude,
            "must lie within [-90, 90] degrees",
        ));
    }
    Ok((latitude + 90.0) / 180.0)
}

/// Combine an Antarctic and a Greenland record on the Antarctic sample times
///
/// On the Greenland record's coverage the result is
/// `(antarctic * (1 - greenland_weight) + greenland * greenland_weight) * polar_adjustment`,
/// elsewhere `antarctic * polar_adjustment`.
pub fn combine_latitude_weighted(
    antarctic: &PaleoTemperatureSeries,
    greenland: &PaleoTemperatureSeries,
    greenland_weight: FloatValue,
    polar_adjustment: FloatValue,
) -> GlacResult<PaleoTemperatureSeries> {
    if !(0.0..=1.0).contains(&greenland_weight) {
        return Err(GlacError::invalid_parameter(
            "greenland_weight",
            greenland_weight,
            "must lie within [0, 1]",
        ));
    }
    if !(polar_adjustment > 0.0 && polar_adjustment <= 1.0) {
        return Err(GlacError::invalid_parameter(
            "polar_adjustment",
            polar_adjustment,
            "must lie within (0, 1]",
        ));
    }

    let (start, end) = (greenland.oldest_offset(), greenland.newest_offset());
    let samples = antarctic.iter().map(|(offset, a)| {
        let combined = if offset >= start && offset <= end {
            let g = greenland.delta_t_at_offset(offset);
            a * (1.0 - greenland_weight) + g * greenland_weight
        } else {
            a
        };
        (offset, combined * polar_adjustment)
    });
    PaleoTemperatureSeries::from_samples(samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use is_close::is_close;

    #[test]
    fn pole_distance_bounds() {
        assert_eq!(pole_distance(-90.0).unwrap(), 0.0);
        assert_eq!(pole_distance(0.0).unwrap(), 0.5);
        assert_eq!(pole_distance(90.0).unwrap(), 1.0);
        assert!(is_close!(pole_distance(46.5).unwrap(), 136.5 / 180.0));
        assert!(pole_distance(91.0).is_err());
        assert!(pole_distance(f64::NAN).is_err());
    }

    #[test]
    fn greenland_only_blends_where_it_has_data() {
        let antarctic = PaleoTemperatureSeries::from_samples(vec![
            (-300.0, -8.0),
            (-200.0, -6.0),
            (-100.0, -4.0),
            (0.0, 0.0),
        ])
        .unwrap();
        let greenland =
            PaleoTemperatureSeries::from_samples(vec![(-150.0, -10.0), (0.0, 2.0)]).unwrap();

        let combined = combine_latitude_weighted(&antarctic, &greenland, 0.75, 0.5).unwrap();
        let values: Vec<_> = combined.iter().collect();
        assert_eq!(values.len(), 4);
        // Outside the Greenland coverage
        assert_eq!(values[0], (-300.0, -4.0));
        assert_eq!(values[1], (-200.0, -3.0));
        // Greenland interpolated at -100 is -10 + 12 * 50 / 150 = -6
        assert!(is_close!(values[2].1, (-4.0 * 0.25 + -6.0 * 0.75) * 0.5));
        assert!(is_close!(values[3].1, (0.0 * 0.25 + 2.0 * 0.75) * 0.5));
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let core = PaleoTemperatureSeries::from_samples(vec![(0.0, 0.0)]).unwrap();
        assert!(combine_latitude_weighted(&core, &core, 1.5, 0.5).is_err());
        assert!(combine_latitude_weighted(&core, &core, 0.5, 0.0).is_err());
    }
}
