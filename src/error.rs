use crate::viewer::layers::LayerId;

// ---------------------------------------------------------------------------
// Drilling errors
// ---------------------------------------------------------------------------

/// Everything that can go wrong while starting a session or drilling a point.
///
/// None of these are fatal: the command that triggered them is refused and
/// the message is shown in the status line.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DrillError {
    /// Bad user input or a violated precondition (too few dimensions,
    /// empty data, no layer selected, ...).
    #[error("{0}")]
    InvalidInput(String),

    /// The displayed axes are not the trailing block of the image's axes,
    /// so there is no well-defined axis to drill along.
    #[error("displayed axes {displayed:?} are not the trailing axes of a {ndim}-D image")]
    UnsupportedAxisLayout { displayed: Vec<usize>, ndim: usize },

    #[error("coordinate {coord} is outside axis {axis} (extent {extent})")]
    OutOfBounds { axis: usize, coord: f64, extent: usize },

    /// A new line cannot share the x-coordinates already on the plot.
    #[error("line has {got} values but the plot's x-axis has {expected}")]
    LengthMismatch { expected: usize, got: usize },

    #[error("layer {0} not found")]
    LayerNotFound(LayerId),
}

impl DrillError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        DrillError::InvalidInput(msg.into())
    }
}
