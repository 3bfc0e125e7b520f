//! Positioned text shape payload.

use super::{SerializableColor, ShapeId};
use crate::error::TransformError;
use crate::geometry::{self, point_string, size_object};
use kurbo::{Point, Size, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A text label placed on the composition.
///
/// `pos_center` is expressed in the `screensize` capture frame. The two must
/// always be read and written together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextShape {
    pub id: ShapeId,
    pub text: String,
    #[serde(with = "point_string")]
    pub pos_center: Point,
    /// Top-left of the laid-out box, known once the surface has reported
    /// the shape's dimensions.
    #[serde(
        default,
        with = "point_string::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub pos: Option<Point>,
    #[serde(with = "size_object")]
    pub screensize: Size,
    pub scale: f64,
    pub rotate: f64,
    /// Font size in logical units.
    #[serde(rename = "size", default = "default_font_size")]
    pub font_size: f64,
    /// `None` renders with the session's current stroke color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SerializableColor>,
}

fn default_font_size() -> f64 {
    TextShape::DEFAULT_FONT_SIZE
}

impl TextShape {
    pub const DEFAULT_FONT_SIZE: f64 = 20.0;
    pub const DEFAULT_SCALE: f64 = 0.8;

    /// Create a text shape centred on `pos_center` within `screensize`.
    pub fn new(text: impl Into<String>, pos_center: Point, screensize: Size) -> Self {
        Self {
            id: Uuid::new_v4(),
            text: text.into(),
            pos_center: geometry::round_point(pos_center),
            pos: None,
            screensize,
            scale: Self::DEFAULT_SCALE,
            rotate: 0.0,
            font_size: Self::DEFAULT_FONT_SIZE,
            color: None,
        }
    }

    pub fn with_color(mut self, color: SerializableColor) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = size;
        self
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    /// Center of the shape on a surface of `current` size.
    pub fn device_center(&self, current: Size, screen_scale: f64) -> Result<Point, TransformError> {
        geometry::to_device(self.pos_center, self.screensize, current, screen_scale)
    }

    /// Store a transform reported by the surface.
    ///
    /// `center` and `size` are device pixels; `ratio` converts them into the
    /// shape's own capture frame.
    pub fn apply_transform(&mut self, scale: f64, rotate: f64, center: Point, size: Size, ratio: Vec2) {
        self.scale = scale;
        self.rotate = rotate;
        self.pos_center = Point::new(center.x * ratio.x, center.y * ratio.y);
        self.pos = Some(Point::new(
            (center.x - size.width / 2.0) * ratio.x,
            (center.y - size.height / 2.0) * ratio.y,
        ));
    }
}
