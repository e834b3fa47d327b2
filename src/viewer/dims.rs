use crate::error::DrillError;

// ---------------------------------------------------------------------------
// Viewer dimensions: which axes are shown, where the others are sliced
// ---------------------------------------------------------------------------

/// Slicing state of the viewer.
///
/// `order` is a permutation of the axes; the last `ndisplay` entries of it
/// are rendered, every other axis is fixed at its `current_step`. The canvas
/// draws planes, so `ndisplay` stays at 2.
#[derive(Debug, Clone, PartialEq)]
pub struct Dims {
    order: Vec<usize>,
    ndisplay: usize,
    range: Vec<usize>,
    current_step: Vec<usize>,
}

/// The part of [`Dims`] a single layer needs: displayed axes and slice
/// indices, both expressed in the layer's own axis numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SliceState {
    pub displayed: Vec<usize>,
    pub current_step: Vec<usize>,
}

impl Default for Dims {
    fn default() -> Self {
        Self {
            order: vec![0, 1],
            ndisplay: 2,
            range: vec![1, 1],
            current_step: vec![0, 0],
        }
    }
}

impl Dims {
    pub fn ndim(&self) -> usize {
        self.order.len()
    }

    pub fn order(&self) -> &[usize] {
        &self.order
    }

    pub fn range(&self) -> &[usize] {
        &self.range
    }

    pub fn current_step(&self) -> &[usize] {
        &self.current_step
    }

    /// Axes currently rendered, in display order (rows, columns[, depth]).
    pub fn displayed(&self) -> &[usize] {
        &self.order[self.order.len() - self.ndisplay..]
    }

    /// Axes that are sliced to a single index, in `order` order.
    pub fn not_displayed(&self) -> &[usize] {
        &self.order[..self.order.len() - self.ndisplay]
    }

    /// Set the slice index of `axis`, clamped to the axis extent.
    pub fn set_current_step(&mut self, axis: usize, step: usize) {
        let extent = self.range.get(axis).copied();
        if let (Some(slot), Some(extent)) = (self.current_step.get_mut(axis), extent) {
            *slot = step.min(extent.saturating_sub(1));
        }
    }

    /// Rotate the axis order by one, bringing the last axis to the front.
    pub fn roll(&mut self) {
        self.order.rotate_right(1);
    }

    /// Swap the last two displayed axes.
    pub fn transpose(&mut self) {
        let n = self.order.len();
        self.order.swap(n - 1, n - 2);
    }

    /// Adopt new per-axis extents after the layer set changed.
    ///
    /// Axis order and slice positions survive as long as the number of
    /// dimensions does not change.
    pub fn reset_for_extents(&mut self, extents: &[usize]) {
        let ndim = extents.len().max(2);
        let mut range: Vec<usize> = vec![1; ndim - extents.len()];
        range.extend(extents.iter().map(|&e| e.max(1)));

        if ndim != self.ndim() {
            self.order = (0..ndim).collect();
            self.current_step = vec![0; ndim];
            self.ndisplay = self.ndisplay.min(ndim);
        }
        self.range = range;
        for axis in 0..ndim {
            self.set_current_step(axis, self.current_step[axis]);
        }
    }

    /// Project the viewer's state onto a layer with `layer_ndim` axes.
    ///
    /// Layers with fewer axes than the viewer are aligned to its trailing
    /// axes. Fails when a displayed axis does not exist in the layer.
    pub fn for_layer(&self, layer_ndim: usize) -> Result<SliceState, DrillError> {
        let ndim = self.ndim();
        if layer_ndim > ndim {
            return Err(DrillError::invalid(format!(
                "layer has {layer_ndim} dimensions but the viewer only {ndim}"
            )));
        }
        let offset = ndim - layer_ndim;
        let displayed: Vec<usize> = self
            .displayed()
            .iter()
            .map(|&axis| axis.checked_sub(offset))
            .collect::<Option<_>>()
            .ok_or_else(|| DrillError::UnsupportedAxisLayout {
                displayed: self.displayed().to_vec(),
                ndim: layer_ndim,
            })?;
        Ok(SliceState {
            displayed,
            current_step: self.current_step[offset..].to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dims_for(extents: &[usize]) -> Dims {
        let mut dims = Dims::default();
        dims.reset_for_extents(extents);
        dims
    }

    #[test]
    fn trailing_axes_are_displayed_by_default() {
        let dims = dims_for(&[5, 10, 4, 4]);
        assert_eq!(dims.displayed(), &[2, 3]);
        assert_eq!(dims.not_displayed(), &[0, 1]);
    }

    #[test]
    fn steps_are_clamped_to_extent() {
        let mut dims = dims_for(&[5, 10, 4, 4]);
        dims.set_current_step(0, 99);
        assert_eq!(dims.current_step()[0], 4);
    }

    #[test]
    fn steps_survive_same_ndim_reset() {
        let mut dims = dims_for(&[5, 10, 4, 4]);
        dims.set_current_step(1, 7);
        dims.reset_for_extents(&[5, 6, 4, 4]);
        assert_eq!(dims.current_step()[1], 5);
    }

    #[test]
    fn roll_moves_last_axis_to_front() {
        let mut dims = dims_for(&[3, 4, 5]);
        dims.roll();
        assert_eq!(dims.order(), &[2, 0, 1]);
        assert_eq!(dims.displayed(), &[0, 1]);
    }

    #[test]
    fn layer_projection_aligns_trailing_axes() {
        let mut dims = dims_for(&[5, 10, 4, 4]);
        dims.set_current_step(0, 2);
        dims.set_current_step(1, 6);
        let slice = dims.for_layer(3).expect("3-D layer fits");
        assert_eq!(slice.displayed, vec![1, 2]);
        assert_eq!(slice.current_step, vec![6, 0, 0]);
    }

    #[test]
    fn layer_projection_rejects_missing_displayed_axis() {
        let mut dims = dims_for(&[5, 10, 4, 4]);
        // Two rolls bring the two leading axes into view.
        dims.roll();
        dims.roll();
        assert_eq!(dims.displayed(), &[0, 1]);
        assert!(matches!(
            dims.for_layer(3),
            Err(DrillError::UnsupportedAxisLayout { .. })
        ));
    }

    #[test]
    fn transpose_swaps_displayed_axes_only() {
        let mut dims = dims_for(&[5, 10, 4, 4]);
        dims.transpose();
        assert_eq!(dims.order(), &[0, 1, 3, 2]);
        assert_eq!(dims.displayed(), &[3, 2]);
        assert_eq!(dims.not_displayed(), &[0, 1]);
    }
}
