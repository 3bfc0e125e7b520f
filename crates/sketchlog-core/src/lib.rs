//! Sketchlog Core Library
//!
//! Operation log and surface reconciliation for a freehand sketch editor.
//! Strokes and text labels are recorded as operations against the surface
//! size they were captured on, replayed onto a surface of any size, and kept
//! in sync with transforms the surface applies on its own.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod history;
pub mod host;
pub mod input;
pub mod operation;
pub mod reconcile;
pub mod session;
pub mod shapes;
pub mod surface;
pub mod tools;

pub use config::{SessionConfig, ShapeConfiguration, TextDefaults};
pub use error::{ConfigError, SessionError, SessionResult, SurfaceError, TransformError};
pub use geometry::{SurfaceFrame, to_device, to_logical};
pub use gesture::{GestureController, GestureEffect};
pub use history::OperationLog;
pub use host::{HostEvent, HostListener, RecordingHost};
pub use input::PointerEvent;
pub use operation::{Operation, OperationId, OperationKind};
pub use reconcile::{Reconciled, SurfaceReconciler};
pub use session::EditorSession;
pub use shapes::{Path, SerializableColor, ShapeId, TextShape};
pub use surface::{
    RawSurfaceEvent, RecordingSurface, SaveOptions, ShapeConfig, Surface, SurfaceCommand,
    SurfaceEvent,
};
pub use tools::{InteractionMode, PathBuilder};
