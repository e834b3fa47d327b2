/// Host model: the layers, slicing state and point annotations the drilling
/// widget works against.
///
/// ```text
///   ImageLayer ──┐
///                ├──▶ LayerList ──▶ Dims (extents, displayed axes, steps)
///   PointsLayer ─┘        │
///        │                ▼
///        └── EventEmitter ──▶ Subscription (owned by the drill session)
/// ```

pub mod dims;
pub mod events;
pub mod layers;
pub mod points;

use dims::Dims;
use layers::{ImageLayer, Layer, LayerId, LayerList};
use points::PointsLayer;

#[derive(Debug, Default)]
pub struct Viewer {
    pub layers: LayerList,
    pub dims: Dims,
}

impl Viewer {
    pub fn add_image(&mut self, image: ImageLayer) -> LayerId {
        let id = self.layers.add(Layer::Image(image));
        self.refresh_dims();
        id
    }

    /// Create an empty points layer spanning all current viewer axes.
    pub fn add_points(&mut self, name: impl Into<String>) -> LayerId {
        let ndim = self.dims.ndim();
        self.layers.add(Layer::Points(PointsLayer::new(name, ndim)))
    }

    /// Recompute the viewer's extents from its image layers (trailing-axis
    /// alignment, largest extent wins).
    fn refresh_dims(&mut self) {
        let ndim = self
            .layers
            .images()
            .map(|(_, image)| image.ndim())
            .max()
            .unwrap_or(2);
        let mut extents = vec![1usize; ndim];
        for (_, image) in self.layers.images() {
            let offset = ndim - image.ndim();
            for (axis, &extent) in image.shape().iter().enumerate() {
                extents[offset + axis] = extents[offset + axis].max(extent);
            }
        }
        self.dims.reset_for_extents(&extents);
    }
}
