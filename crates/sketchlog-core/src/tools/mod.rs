//! Interaction modes and freehand path building.

use crate::shapes::{Path, SerializableColor, ShapeId};
use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Minimum per-axis motion, in logical units, before a new sample is kept.
pub const MIN_MOTION: f64 = 2.5;

/// What pointer input does on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Pointer sequences draw freehand strokes.
    #[default]
    Draw,
    /// Pointer-down asks the host to place a text shape.
    Text,
    /// Shapes are manipulated on the surface itself.
    Select,
}

impl InteractionMode {
    pub fn is_draw(self) -> bool {
        self == InteractionMode::Draw
    }
}

/// Accumulates the samples of one in-progress stroke.
///
/// A builder only exists between [`PathBuilder::begin`] and
/// [`PathBuilder::finish`], so extending or finishing a stroke that was never
/// begun cannot be expressed.
#[derive(Debug, Clone)]
pub struct PathBuilder {
    id: ShapeId,
    color: SerializableColor,
    width: f64,
    points: Vec<Point>,
    threshold: f64,
}

impl PathBuilder {
    /// Start a stroke at `origin` with a fresh id.
    pub fn begin(origin: Point, color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            color,
            width,
            points: vec![origin],
            threshold: MIN_MOTION,
        }
    }

    /// Use a different minimum-motion threshold.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn last_point(&self) -> Point {
        // begin() always seeds the origin
        self.points.last().copied().unwrap_or(Point::ZERO)
    }

    /// Append a sample. Jitter smaller than the threshold on both axes is
    /// dropped; returns whether the point was kept.
    pub fn extend(&mut self, point: Point) -> bool {
        let last = self.last_point();
        if (point.x - last.x).abs() < self.threshold && (point.y - last.y).abs() < self.threshold {
            return false;
        }
        self.points.push(point);
        true
    }

    /// Freeze the samples into a [`Path`].
    pub fn finish(self) -> Path {
        Path::from_points(self.id, self.color, self.width, self.points)
    }
}
