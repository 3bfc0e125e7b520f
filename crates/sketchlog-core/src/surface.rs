//! Boundary with the rendering surface.
//!
//! Commands flow out fire-and-forget; the surface reports back through a
//! small set of events. Both directions are plain data so they can cross a
//! thread or process boundary as JSON.

use crate::error::{SurfaceError, TransformError};
use crate::geometry::{self, SurfaceFrame, point_string};
use crate::operation::{Operation, OperationKind};
use crate::shapes::{SerializableColor, ShapeId};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Kinds of shape the surface can place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShapeType {
    Text,
    Image,
}

/// Encoded image format for [`SurfaceCommand::Save`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageType {
    #[default]
    Png,
    Jpg,
}

/// Options forwarded to the surface when saving the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveOptions {
    pub image_type: ImageType,
    pub folder: String,
    pub filename: String,
    pub transparent: bool,
    pub include_image: bool,
    pub include_text: bool,
    pub crop_to_image_size: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            image_type: ImageType::Png,
            folder: String::new(),
            filename: String::from("sketch"),
            transparent: false,
            include_image: true,
            include_text: true,
            crop_to_image_size: false,
        }
    }
}

/// Host-requested shape placed directly on the surface (not logged).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeConfig {
    pub shape_type: ShapeType,
    #[serde(default)]
    pub font_type: Option<String>,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub asset: Option<String>,
}

/// Selection border style for shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum BorderStyle {
    #[default]
    Dashed,
    Solid,
}

/// Commands sent to the rendering surface. Coordinates are device pixels,
/// colors are packed `0xAARRGGBB`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum SurfaceCommand {
    NewPath {
        id: ShapeId,
        color: u32,
        width: f64,
    },
    AddPoint {
        x: f64,
        y: f64,
        is_move: bool,
    },
    EndPath,
    AddPath {
        id: ShapeId,
        color: u32,
        width: f64,
        #[serde(with = "point_string::vec")]
        points: Vec<Point>,
    },
    DeletePath {
        id: ShapeId,
    },
    Clear,
    AddShape {
        shape_type: ShapeType,
        font_type: Option<String>,
        font_size: f64,
        text: Option<String>,
        asset: Option<String>,
        user_id: Option<String>,
        shape_id: Option<ShapeId>,
        #[serde(default, with = "point_string::option")]
        center: Option<Point>,
        scale: Option<f64>,
        rotate: Option<f64>,
        color: Option<u32>,
    },
    DeleteShape {
        id: ShapeId,
    },
    DeleteSelectedShape,
    UnselectShape,
    IncreaseShapeFontSize,
    DecreaseShapeFontSize,
    ChangeShapeText {
        text: String,
    },
    /// Styling for shapes the surface manages itself.
    ConfigureShapes {
        border_color: u32,
        border_style: BorderStyle,
        border_width: f64,
        color: u32,
        stroke_width: f64,
    },
    Save(SaveOptions),
}

impl SurfaceCommand {
    /// Command placing `operation` on a surface described by `frame`.
    ///
    /// `fallback_color` is used for text shapes without a color of their own.
    pub fn add_operation(
        operation: &Operation,
        frame: &SurfaceFrame,
        fallback_color: SerializableColor,
    ) -> Result<Self, TransformError> {
        match &operation.kind {
            OperationKind::Draw { path, size } => Ok(SurfaceCommand::AddPath {
                id: path.id(),
                color: path.color().to_argb(),
                width: path.width() * frame.screen_scale,
                points: path.device_points(*size, frame.size, frame.screen_scale)?,
            }),
            OperationKind::Text(shape) => Ok(SurfaceCommand::AddShape {
                shape_type: ShapeType::Text,
                font_type: None,
                font_size: shape.font_size,
                text: Some(shape.text.clone()),
                asset: None,
                user_id: operation.user_id.clone(),
                shape_id: Some(shape.id),
                center: Some(shape.device_center(frame.size, frame.screen_scale)?),
                scale: Some(shape.scale),
                rotate: Some(shape.rotate),
                color: Some(shape.color.unwrap_or(fallback_color).to_argb()),
            }),
        }
    }

    /// Command taking `operation` off the surface.
    pub fn remove_operation(operation: &Operation) -> Self {
        match &operation.kind {
            OperationKind::Draw { path, .. } => SurfaceCommand::DeletePath { id: path.id() },
            OperationKind::Text(shape) => SurfaceCommand::DeleteShape { id: shape.id },
        }
    }

    /// A host-requested shape that does not go through the log.
    pub fn add_shape(config: &ShapeConfig) -> Self {
        SurfaceCommand::AddShape {
            shape_type: config.shape_type,
            font_type: config.font_type.clone(),
            font_size: config.font_size.unwrap_or(0.0),
            text: config.text.clone(),
            asset: config.asset.clone(),
            user_id: None,
            shape_id: None,
            center: None,
            scale: None,
            rotate: None,
            color: None,
        }
    }

    /// Live stroke sample, already in logical units.
    pub fn add_point(logical: Point, screen_scale: f64, is_move: bool) -> Self {
        let logical = geometry::round_point(logical);
        let device = Point::new(logical.x * screen_scale, logical.y * screen_scale);
        SurfaceCommand::AddPoint {
            x: device.x,
            y: device.y,
            is_move,
        }
    }
}

/// Events reported by the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SurfaceEvent {
    /// Number of paths currently on the surface.
    PathsUpdated { count: u64 },
    SaveCompleted {
        success: bool,
        path: Option<String>,
    },
    SelectionChanged {
        selected: bool,
        text: Option<String>,
    },
    /// A shape was moved, scaled or rotated on the surface. Geometry is in
    /// device pixels.
    ShapeTransformUpdated {
        shape_id: ShapeId,
        scale: f64,
        rotate: f64,
        center: Point,
        size: Size,
    },
}

/// Events as emitted by legacy surfaces, distinguished only by which fields
/// are present. Convert with [`SurfaceEvent::from`].
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RawSurfaceEvent {
    #[serde(rename_all = "camelCase")]
    PathsUpdate { paths_update: u64 },
    #[serde(rename_all = "camelCase")]
    ShapeUpdated {
        #[allow(dead_code)]
        is_shape_updated: bool,
        shape_id: ShapeId,
        shape_scale: f64,
        shape_rotate: f64,
        shape_center_x: f64,
        shape_center_y: f64,
        shape_width: f64,
        shape_height: f64,
    },
    #[serde(rename_all = "camelCase")]
    Selection {
        is_shape_selected: bool,
        #[serde(default)]
        shape_text: Option<String>,
    },
    Saved {
        success: bool,
        #[serde(default)]
        path: Option<String>,
    },
}

impl From<RawSurfaceEvent> for SurfaceEvent {
    fn from(raw: RawSurfaceEvent) -> Self {
        match raw {
            RawSurfaceEvent::PathsUpdate { paths_update } => {
                SurfaceEvent::PathsUpdated { count: paths_update }
            }
            RawSurfaceEvent::Saved { success, path } => SurfaceEvent::SaveCompleted { success, path },
            RawSurfaceEvent::Selection {
                is_shape_selected,
                shape_text,
            } => SurfaceEvent::SelectionChanged {
                selected: is_shape_selected,
                text: shape_text,
            },
            RawSurfaceEvent::ShapeUpdated {
                shape_id,
                shape_scale,
                shape_rotate,
                shape_center_x,
                shape_center_y,
                shape_width,
                shape_height,
                ..
            } => SurfaceEvent::ShapeTransformUpdated {
                shape_id,
                scale: shape_scale,
                rotate: shape_rotate,
                center: Point::new(shape_center_x, shape_center_y),
                size: Size::new(shape_width, shape_height),
            },
        }
    }
}

impl SurfaceEvent {
    /// Decode a legacy field-discriminated JSON payload.
    pub fn from_legacy_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<RawSurfaceEvent>(json).map(Into::into)
    }
}

/// A rendering surface accepting commands.
pub trait Surface {
    /// Send one command. Delivery is fire-and-forget: `Ok` means the surface
    /// accepted it, not that it has been drawn.
    fn dispatch(&mut self, command: SurfaceCommand) -> Result<(), SurfaceError>;
}

impl<S: Surface + ?Sized> Surface for Box<S> {
    fn dispatch(&mut self, command: SurfaceCommand) -> Result<(), SurfaceError> {
        (**self).dispatch(command)
    }
}

/// In-memory surface that records every accepted command.
///
/// Useful for tests and for inspecting replays.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    commands: Vec<SurfaceCommand>,
    unmounted: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that refuses commands until [`RecordingSurface::mount`].
    pub fn unmounted() -> Self {
        Self {
            commands: Vec::new(),
            unmounted: true,
        }
    }

    pub fn mount(&mut self) {
        self.unmounted = false;
    }

    pub fn commands(&self) -> &[SurfaceCommand] {
        &self.commands
    }

    /// Take the recorded commands, leaving the log empty.
    pub fn drain(&mut self) -> Vec<SurfaceCommand> {
        std::mem::take(&mut self.commands)
    }
}

impl Surface for RecordingSurface {
    fn dispatch(&mut self, command: SurfaceCommand) -> Result<(), SurfaceError> {
        if self.unmounted {
            return Err(SurfaceError::NotMounted);
        }
        self.commands.push(command);
        Ok(())
    }
}
