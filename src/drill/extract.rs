use ndarray::{ArrayD, Axis};

use super::MIN_DRILL_NDIM;
use crate::error::DrillError;
use crate::viewer::dims::SliceState;

/// The axis drilled through for a given set of displayed axes: the one just
/// before the displayed block.
///
/// The displayed axes must be exactly the trailing axes of the image (in any
/// order) and at least one axis must precede them; any other layout has no
/// well-defined drill axis and is refused.
pub fn drilled_axis(ndim: usize, displayed: &[usize]) -> Result<usize, DrillError> {
    let mut sorted = displayed.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let trailing = ndim.checked_sub(displayed.len()).map(|first| first..ndim);
    let is_trailing = sorted.len() == displayed.len()
        && trailing.is_some_and(|block| sorted.iter().copied().eq(block));
    if displayed.is_empty() || !is_trailing {
        return Err(DrillError::UnsupportedAxisLayout {
            displayed: displayed.to_vec(),
            ndim,
        });
    }

    match sorted[0] {
        0 => Err(DrillError::invalid(format!(
            "all {ndim} axes are displayed, there is no axis to drill through"
        ))),
        first => Ok(first - 1),
    }
}

/// Values along the drilled axis at a clicked point.
///
/// `coords` holds one coordinate per displayed axis, in `slice.displayed`
/// order. Axes before the drilled one are fixed at `slice.current_step`.
/// The result has one value per index of the drilled axis.
pub fn drill_values(
    data: &ArrayD<f64>,
    coords: &[f64],
    slice: &SliceState,
) -> Result<Vec<f64>, DrillError> {
    let ndim = data.ndim();
    if ndim < MIN_DRILL_NDIM {
        return Err(DrillError::invalid(format!(
            "Image must have >={MIN_DRILL_NDIM} dimensions."
        )));
    }
    if coords.len() != slice.displayed.len() {
        return Err(DrillError::invalid(format!(
            "expected {} coordinates, got {}",
            slice.displayed.len(),
            coords.len()
        )));
    }

    let drilled = drilled_axis(ndim, &slice.displayed)?;
    let shape = data.shape();

    let mut index = vec![0usize; ndim];
    for axis in 0..drilled {
        let step = slice.current_step.get(axis).copied().ok_or_else(|| {
            DrillError::invalid(format!("no slice index for axis {axis}"))
        })?;
        index[axis] = checked_index(step as f64, axis, shape[axis])?;
    }
    for (&axis, &coord) in slice.displayed.iter().zip(coords) {
        index[axis] = checked_index(coord, axis, shape[axis])?;
    }

    // Collapse from the last axis down so the remaining axis numbers stay
    // valid; what is left is the drilled axis.
    let mut view = data.view();
    for axis in (0..ndim).rev().filter(|&a| a != drilled) {
        view = view.index_axis_move(Axis(axis), index[axis]);
    }
    Ok(view.iter().copied().collect())
}

/// Truncate toward zero and bounds-check.
fn checked_index(coord: f64, axis: usize, extent: usize) -> Result<usize, DrillError> {
    let truncated = coord.trunc();
    if !truncated.is_finite() || truncated < 0.0 || truncated >= extent as f64 {
        return Err(DrillError::OutOfBounds {
            axis,
            coord,
            extent,
        });
    }
    Ok(truncated as usize)
}
