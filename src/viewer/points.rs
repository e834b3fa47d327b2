use std::fmt;

use eframe::egui::Color32;

use super::events::{DataAction, DataEvent, EventEmitter, Subscription};

// ---------------------------------------------------------------------------
// Point-annotation layer
// ---------------------------------------------------------------------------

/// Stable identifier of a point within its layer. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PointId(pub u64);

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How clicks on the canvas are interpreted for this layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointsMode {
    Select,
    Add,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub id: PointId,
    /// One coordinate per layer axis (data space, not screen space).
    pub coords: Vec<f64>,
    pub face_color: Color32,
}

/// A layer of user-placed points that reports every data change through its
/// [`EventEmitter`].
#[derive(Debug)]
pub struct PointsLayer {
    pub name: String,
    ndim: usize,
    points: Vec<Point>,
    next_id: u64,
    /// Face colour given to the next point added.
    pub current_face_color: Color32,
    pub mode: PointsMode,
    events: EventEmitter,
}

impl PointsLayer {
    pub fn new(name: impl Into<String>, ndim: usize) -> Self {
        Self {
            name: name.into(),
            ndim,
            points: Vec::new(),
            next_id: 0,
            current_face_color: Color32::WHITE,
            mode: PointsMode::Select,
            events: EventEmitter::default(),
        }
    }

    pub fn ndim(&self) -> usize {
        self.ndim
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[cfg(test)]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn get(&self, id: PointId) -> Option<&Point> {
        self.points.iter().find(|p| p.id == id)
    }

    pub fn subscribe(&mut self) -> Subscription {
        self.events.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.events.subscriber_count()
    }

    /// Append a point. Coordinates missing for leading axes are padded with
    /// zeros; extra leading coordinates are dropped.
    pub fn add(&mut self, coords: Vec<f64>) -> PointId {
        let coords = fit_to_ndim(coords, self.ndim);
        let id = PointId(self.next_id);
        self.next_id += 1;
        self.points.push(Point {
            id,
            coords,
            face_color: self.current_face_color,
        });
        self.emit(DataAction::Added, vec![id]);
        id
    }

    pub fn remove(&mut self, id: PointId) -> bool {
        let before = self.points.len();
        self.points.retain(|p| p.id != id);
        let removed = self.points.len() != before;
        if removed {
            self.emit(DataAction::Removed, vec![id]);
        }
        removed
    }

    /// Move an existing point (drag in select mode).
    pub fn set_coords(&mut self, id: PointId, coords: Vec<f64>) -> bool {
        let ndim = self.ndim;
        let Some(point) = self.points.iter_mut().find(|p| p.id == id) else {
            return false;
        };
        point.coords = fit_to_ndim(coords, ndim);
        self.emit(DataAction::Changed, vec![id]);
        true
    }

    /// Recolour a point. Colours are display state, so no event is emitted.
    pub fn set_face_color(&mut self, id: PointId, color: Color32) -> bool {
        match self.points.iter_mut().find(|p| p.id == id) {
            Some(point) => {
                point.face_color = color;
                true
            }
            None => false,
        }
    }

    /// Points whose coordinates on every axis in `fixed` (axis, step) round
    /// to that step, i.e. the points lying in the currently shown slice.
    pub fn points_in_slice<'a>(
        &'a self,
        fixed: &'a [(usize, usize)],
    ) -> impl Iterator<Item = &'a Point> + 'a {
        self.points.iter().filter(move |p| {
            fixed.iter().all(|&(axis, step)| {
                p.coords
                    .get(axis)
                    .is_some_and(|c| c.round() as i64 == step as i64)
            })
        })
    }

    fn emit(&mut self, action: DataAction, points: Vec<PointId>) {
        let value = self.points.iter().map(|p| p.coords.clone()).collect();
        self.events.emit(DataEvent {
            action,
            points,
            value,
        });
    }
}

fn fit_to_ndim(mut coords: Vec<f64>, ndim: usize) -> Vec<f64> {
    if coords.len() > ndim {
        coords.drain(..coords.len() - ndim);
    } else if coords.len() < ndim {
        let mut padded = vec![0.0; ndim - coords.len()];
        padded.extend(coords);
        coords = padded;
    }
    coords
}
