use crate::error::DrillError;

/// Fraction of the data range added around it (split evenly above/below).
pub const Y_PADDING: f64 = 0.05;

/// Y-axis bounds covering every value of every series, centred on the data
/// and padded by [`Y_PADDING`].
///
/// Non-finite values are ignored. A constant series still yields `min < max`.
pub fn axis_limits(series: &[&[f64]]) -> Result<(f64, f64), DrillError> {
    if series.iter().all(|s| s.is_empty()) {
        return Err(DrillError::invalid(
            "axis limits need at least one non-empty series",
        ));
    }

    let (min, max) = series
        .iter()
        .flat_map(|s| s.iter())
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if min > max {
        return Err(DrillError::invalid("axis limits need at least one finite value"));
    }

    let centre = (max + min) / 2.0;
    let range = max - min;
    let half_range = if range > 0.0 {
        (1.0 + Y_PADDING) * range / 2.0
    } else {
        Y_PADDING * centre.abs().max(1.0)
    };
    Ok((centre - half_range, centre + half_range))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_five_percent_around_centre() {
        let (lo, hi) = axis_limits(&[&[0.0, 10.0]]).unwrap();
        assert!((lo - -0.25).abs() < 1e-12);
        assert!((hi - 10.25).abs() < 1e-12);
    }

    #[test]
    fn covers_all_series() {
        let a = [1.0, 2.0, 3.0];
        let b = [-4.0, 0.5];
        let c = [7.5];
        let (lo, hi) = axis_limits(&[&a, &b, &c]).unwrap();
        for v in a.iter().chain(&b).chain(&c) {
            assert!(lo < *v && *v < hi, "{v} not inside ({lo}, {hi})");
        }
    }

    #[test]
    fn constant_series_is_not_degenerate() {
        let (lo, hi) = axis_limits(&[&[3.0, 3.0, 3.0]]).unwrap();
        assert!(lo < 3.0 && 3.0 < hi);

        let (lo, hi) = axis_limits(&[&[0.0]]).unwrap();
        assert!(lo < 0.0 && 0.0 < hi);
    }

    #[test]
    fn ignores_nan() {
        let (lo, hi) = axis_limits(&[&[f64::NAN, 1.0, 2.0]]).unwrap();
        assert!(lo < 1.0 && hi > 2.0);
    }

    #[test]
    fn rejects_empty_input() {
        assert!(matches!(axis_limits(&[]), Err(DrillError::InvalidInput(_))));
        assert!(matches!(axis_limits(&[&[]]), Err(DrillError::InvalidInput(_))));
        assert!(matches!(
            axis_limits(&[&[f64::NAN]]),
            Err(DrillError::InvalidInput(_))
        ));
    }
}
