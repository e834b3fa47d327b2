use std::fmt;

use ndarray::{ArrayD, ArrayView2, Axis, Ix2};

use super::dims::SliceState;
use super::points::PointsLayer;
use crate::error::DrillError;

// ---------------------------------------------------------------------------
// Layer identifiers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Image layer
// ---------------------------------------------------------------------------

/// An N-dimensional numeric image with a display name. Read-only once added.
#[derive(Debug, Clone)]
pub struct ImageLayer {
    pub name: String,
    data: ArrayD<f64>,
    /// Value range mapped to black..white when rendering.
    pub contrast_limits: (f64, f64),
}

impl ImageLayer {
    pub fn new(name: impl Into<String>, data: ArrayD<f64>) -> Self {
        let contrast_limits = contrast_limits(&data);
        Self {
            name: name.into(),
            data,
            contrast_limits,
        }
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn ndim(&self) -> usize {
        self.data.ndim()
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// The 2-D plane currently on screen: rows along `displayed[0]`,
    /// columns along `displayed[1]`, every other axis at its slice index.
    pub fn slice_2d(&self, slice: &SliceState) -> Result<ArrayView2<'_, f64>, DrillError> {
        let [row_axis, col_axis] = match slice.displayed.as_slice() {
            &[r, c] => [r, c],
            other => {
                return Err(DrillError::invalid(format!(
                    "can only render two displayed axes, got {other:?}"
                )))
            }
        };
        let ndim = self.ndim();
        if row_axis >= ndim || col_axis >= ndim || row_axis == col_axis {
            return Err(DrillError::UnsupportedAxisLayout {
                displayed: slice.displayed.clone(),
                ndim,
            });
        }

        let mut view = self.data.view();
        for axis in (0..ndim).rev() {
            if axis == row_axis || axis == col_axis {
                continue;
            }
            let extent = self.data.len_of(Axis(axis));
            let step = slice.current_step.get(axis).copied().unwrap_or(0);
            if step >= extent {
                return Err(DrillError::OutOfBounds {
                    axis,
                    coord: step as f64,
                    extent,
                });
            }
            view = view.index_axis_move(Axis(axis), step);
        }

        let plane = view
            .into_dimensionality::<Ix2>()
            .map_err(|e| DrillError::invalid(format!("slicing {}: {e}", self.name)))?;
        Ok(if row_axis > col_axis {
            plane.reversed_axes()
        } else {
            plane
        })
    }
}

fn contrast_limits(data: &ArrayD<f64>) -> (f64, f64) {
    let (lo, hi) = data
        .iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        (0.0, 1.0)
    } else if lo == hi {
        (lo, lo + 1.0)
    } else {
        (lo, hi)
    }
}

// ---------------------------------------------------------------------------
// Layer list
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Layer {
    Image(ImageLayer),
    Points(PointsLayer),
}

impl Layer {
    pub fn name(&self) -> &str {
        match self {
            Layer::Image(image) => &image.name,
            Layer::Points(points) => &points.name,
        }
    }
}

/// Ordered collection of layers. The most recently added layer becomes the
/// active one.
#[derive(Debug, Default)]
pub struct LayerList {
    layers: Vec<(LayerId, Layer)>,
    next_id: u64,
    active: Option<LayerId>,
}

impl LayerList {
    pub fn add(&mut self, layer: Layer) -> LayerId {
        let id = LayerId(self.next_id);
        self.next_id += 1;
        log::info!("Added layer {id} '{}'", layer.name());
        self.layers.push((id, layer));
        self.active = Some(id);
        id
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    pub fn get(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|(lid, _)| *lid == id).map(|(_, l)| l)
    }

    pub fn iter(&self) -> impl Iterator<Item = (LayerId, &Layer)> {
        self.layers.iter().map(|(id, layer)| (*id, layer))
    }

    pub fn image(&self, id: LayerId) -> Result<&ImageLayer, DrillError> {
        match self.get(id) {
            Some(Layer::Image(image)) => Ok(image),
            _ => Err(DrillError::LayerNotFound(id)),
        }
    }

    pub fn points(&self, id: LayerId) -> Result<&PointsLayer, DrillError> {
        match self.get(id) {
            Some(Layer::Points(points)) => Ok(points),
            _ => Err(DrillError::LayerNotFound(id)),
        }
    }

    pub fn points_mut(&mut self, id: LayerId) -> Result<&mut PointsLayer, DrillError> {
        match self.layers.iter_mut().find(|(lid, _)| *lid == id) {
            Some((_, Layer::Points(points))) => Ok(points),
            _ => Err(DrillError::LayerNotFound(id)),
        }
    }

    /// Image layers in insertion order, for the layer picker.
    pub fn images(&self) -> impl Iterator<Item = (LayerId, &ImageLayer)> {
        self.layers.iter().filter_map(|(id, layer)| match layer {
            Layer::Image(image) => Some((*id, image)),
            Layer::Points(_) => None,
        })
    }

    pub fn active(&self) -> Option<LayerId> {
        self.active
    }

    pub fn set_active(&mut self, id: LayerId) {
        if self.get(id).is_some() {
            self.active = Some(id);
        }
    }
}
