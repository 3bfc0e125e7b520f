//! Freehand stroke payload.

use super::{SerializableColor, ShapeId};
use crate::error::TransformError;
use crate::geometry::{self, point_string};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// A straight segment between two consecutive stroke samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    #[serde(with = "point_string")]
    pub start: Point,
    #[serde(with = "point_string")]
    pub stop: Point,
}

/// A finished freehand stroke.
///
/// Points are logical units relative to the surface's top-left corner in the
/// capture frame. They are never rewritten; dispatch produces scaled copies.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "PathWire", into = "PathWire")]
pub struct Path {
    id: ShapeId,
    color: SerializableColor,
    width: f64,
    points: Vec<Point>,
    segments: Vec<Segment>,
}

impl Path {
    /// Create a path from already sampled points.
    pub fn from_points(
        id: ShapeId,
        color: SerializableColor,
        width: f64,
        points: Vec<Point>,
    ) -> Self {
        let segments = points
            .windows(2)
            .map(|w| Segment {
                start: w[0],
                stop: w[1],
            })
            .collect();
        Self {
            id,
            color,
            width,
            points,
            segments,
        }
    }

    pub fn id(&self) -> ShapeId {
        self.id
    }

    pub fn color(&self) -> SerializableColor {
        self.color
    }

    /// Stroke width in logical units.
    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Consecutive point pairs, one fewer than there are points.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Points scaled onto a surface of `current` size.
    pub fn device_points(
        &self,
        capture: Size,
        current: Size,
        screen_scale: f64,
    ) -> Result<Vec<Point>, TransformError> {
        self.points
            .iter()
            .map(|&p| geometry::to_device(p, capture, current, screen_scale))
            .collect()
    }
}

/// On-the-wire form. Segments are emitted for consumers that want them but
/// always re-derived from the points when reading.
#[derive(Serialize, Deserialize)]
struct PathWire {
    id: ShapeId,
    color: SerializableColor,
    width: f64,
    #[serde(with = "point_string::vec")]
    data: Vec<Point>,
    #[serde(default, skip_deserializing)]
    line: Vec<Segment>,
}

impl From<PathWire> for Path {
    fn from(wire: PathWire) -> Self {
        Path::from_points(wire.id, wire.color, wire.width, wire.data)
    }
}

impl From<Path> for PathWire {
    fn from(path: Path) -> Self {
        PathWire {
            id: path.id,
            color: path.color,
            width: path.width,
            data: path.points,
            line: path.segments,
        }
    }
}
