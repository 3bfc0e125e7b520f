//! Operations: the atomic unit of history.

use crate::geometry::size_object;
use crate::shapes::{Path, ShapeId, TextShape};
use kurbo::Size;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(target_arch = "wasm32")]
use web_time::{SystemTime, UNIX_EPOCH};
#[cfg(not(target_arch = "wasm32"))]
use std::time::{SystemTime, UNIX_EPOCH};

/// Unique identifier for operations.
pub type OperationId = Uuid;

/// Milliseconds since the Unix epoch, used for log ordering only.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// What an operation adds to the composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OperationKind {
    /// A freehand stroke together with its capture frame.
    Draw {
        path: Path,
        #[serde(with = "size_object")]
        size: Size,
    },
    /// A text label.
    Text(TextShape),
}

/// One undoable unit of authored content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    pub id: OperationId,
    /// Authoring actor, if known.
    #[serde(default)]
    pub user_id: Option<String>,
    pub timestamp: u64,
    #[serde(rename = "data")]
    pub kind: OperationKind,
}

impl Operation {
    /// Create an operation stamped with a fresh id and the current time.
    pub fn new(kind: OperationKind, user_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            timestamp: now_millis(),
            kind,
        }
    }

    pub fn draw(path: Path, size: Size, user_id: Option<String>) -> Self {
        Self::new(OperationKind::Draw { path, size }, user_id)
    }

    pub fn text(shape: TextShape, user_id: Option<String>) -> Self {
        Self::new(OperationKind::Text(shape), user_id)
    }

    /// Override the timestamp (replayed or remote operations).
    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Id of the path or shape this operation places on the surface.
    pub fn shape_id(&self) -> ShapeId {
        match &self.kind {
            OperationKind::Draw { path, .. } => path.id(),
            OperationKind::Text(shape) => shape.id,
        }
    }

    /// Surface size in effect when the operation was captured.
    pub fn capture_frame(&self) -> Size {
        match &self.kind {
            OperationKind::Draw { size, .. } => *size,
            OperationKind::Text(shape) => shape.screensize,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self.kind, OperationKind::Draw { .. })
    }

    pub fn as_text(&self) -> Option<&TextShape> {
        match &self.kind {
            OperationKind::Text(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextShape> {
        match &mut self.kind {
            OperationKind::Text(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn is_authored_by(&self, user: Option<&str>) -> bool {
        self.user_id.as_deref() == user
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::SerializableColor;
    use kurbo::Point;

    fn draw_op() -> Operation {
        let path = Path::from_points(
            Uuid::new_v4(),
            SerializableColor::black(),
            3.0,
            vec![Point::new(1.0, 2.0), Point::new(5.0, 6.0)],
        );
        Operation::draw(path, Size::new(300.0, 500.0), Some("alice".to_string()))
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(draw_op().id, draw_op().id);
    }

    #[test]
    fn test_shape_id_and_frame() {
        let op = draw_op();
        let OperationKind::Draw { path, .. } = &op.kind else {
            panic!("expected draw");
        };
        assert_eq!(op.shape_id(), path.id());
        assert_eq!(op.capture_frame(), Size::new(300.0, 500.0));
        assert!(op.is_draw());
        assert!(op.as_text().is_none());

        let text = TextShape::new("t", Point::new(3.0, 4.0), Size::new(10.0, 20.0));
        let shape_id = text.id;
        let op = Operation::text(text, None);
        assert_eq!(op.shape_id(), shape_id);
        assert_eq!(op.capture_frame(), Size::new(10.0, 20.0));
    }

    #[test]
    fn test_authorship() {
        let op = draw_op();
        assert!(op.is_authored_by(Some("alice")));
        assert!(!op.is_authored_by(Some("bob")));
        assert!(!op.is_authored_by(None));
    }

    #[test]
    fn test_wire_format() {
        let op = draw_op().with_timestamp(42);
        let value = serde_json::to_value(&op).unwrap();
        assert_eq!(value["userId"], "alice");
        assert_eq!(value["timestamp"], 42);
        assert_eq!(value["data"]["type"], "draw");
        assert_eq!(value["data"]["size"]["height"], 500.0);
        assert_eq!(value["data"]["path"]["data"][1], "5,6");

        let back: Operation = serde_json::from_value(value).unwrap();
        assert_eq!(back, op);
    }

    #[test]
    fn test_text_wire_format() {
        let json = r##"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "userId": null,
            "timestamp": 7,
            "data": {
                "type": "text",
                "id": "936da01f-9abd-4d9d-80c7-02af85c822a8",
                "text": "note",
                "posCenter": "12.5,40",
                "screensize": { "width": 300, "height": 500 },
                "scale": 0.8,
                "rotate": 0.0,
                "size": 20,
                "color": "#4a4a4a"
            }
        }"##;
        let op: Operation = serde_json::from_str(json).unwrap();
        let text = op.as_text().unwrap();
        assert_eq!(text.text, "note");
        assert_eq!(text.pos_center, Point::new(12.5, 40.0));
        assert_eq!(op.timestamp, 7);
        assert!(op.user_id.is_none());
    }
}
