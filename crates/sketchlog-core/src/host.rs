//! Callbacks into the host view layer.

use crate::operation::Operation;
use crate::shapes::Path;
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// Receives everything the session reports to its host.
///
/// All methods default to doing nothing.
pub trait HostListener {
    /// The log changed. `changed` is the operation that was appended,
    /// undone, redone, updated or deleted; `active` is the full active list
    /// afterwards.
    fn operations_changed(&mut self, _changed: &Operation, _active: &[Operation]) {}

    /// The log was cleared.
    fn operations_cleared(&mut self) {}

    /// A pointer-down in a placement mode asks the host to insert a shape at
    /// `point` (logical units) on a surface of `size`.
    fn placement_requested(&mut self, _point: Point, _size: Size) {}

    fn paths_changed(&mut self, _count: u64) {}

    fn save_completed(&mut self, _success: bool, _path: Option<&str>) {}

    fn selection_changed(&mut self, _selected: bool, _text: Option<&str>) {}

    fn stroke_started(&mut self, _point: Point) {}

    fn stroke_changed(&mut self, _point: Point) {}

    fn stroke_ended(&mut self, _path: &Path, _size: Size) {}
}

/// A listener that ignores everything.
impl HostListener for () {}

/// One recorded host callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "host", rename_all = "snake_case")]
pub enum HostEvent {
    OperationsChanged {
        changed: Operation,
        active_ids: Vec<uuid::Uuid>,
    },
    OperationsCleared,
    PlacementRequested {
        point: Point,
        size: Size,
    },
    PathsChanged {
        count: u64,
    },
    SaveCompleted {
        success: bool,
        path: Option<String>,
    },
    SelectionChanged {
        selected: bool,
        text: Option<String>,
    },
    StrokeStarted {
        point: Point,
    },
    StrokeChanged {
        point: Point,
    },
    StrokeEnded {
        path: Path,
        size: Size,
    },
}

/// In-memory listener that records every callback in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingHost {
    events: Vec<HostEvent>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[HostEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<HostEvent> {
        std::mem::take(&mut self.events)
    }

    /// How many log-change notifications were received.
    pub fn change_count(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, HostEvent::OperationsChanged { .. }))
            .count()
    }
}

impl HostListener for RecordingHost {
    fn operations_changed(&mut self, changed: &Operation, active: &[Operation]) {
        self.events.push(HostEvent::OperationsChanged {
            changed: changed.clone(),
            active_ids: active.iter().map(|o| o.id).collect(),
        });
    }

    fn operations_cleared(&mut self) {
        self.events.push(HostEvent::OperationsCleared);
    }

    fn placement_requested(&mut self, point: Point, size: Size) {
        self.events.push(HostEvent::PlacementRequested { point, size });
    }

    fn paths_changed(&mut self, count: u64) {
        self.events.push(HostEvent::PathsChanged { count });
    }

    fn save_completed(&mut self, success: bool, path: Option<&str>) {
        self.events.push(HostEvent::SaveCompleted {
            success,
            path: path.map(str::to_string),
        });
    }

    fn selection_changed(&mut self, selected: bool, text: Option<&str>) {
        self.events.push(HostEvent::SelectionChanged {
            selected,
            text: text.map(str::to_string),
        });
    }

    fn stroke_started(&mut self, point: Point) {
        self.events.push(HostEvent::StrokeStarted { point });
    }

    fn stroke_changed(&mut self, point: Point) {
        self.events.push(HostEvent::StrokeChanged { point });
    }

    fn stroke_ended(&mut self, path: &Path, size: Size) {
        self.events.push(HostEvent::StrokeEnded {
            path: path.clone(),
            size,
        });
    }
}
