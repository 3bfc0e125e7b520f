//! Folds surface events back into the operation log.

use crate::geometry::SurfaceFrame;
use crate::history::OperationLog;
use crate::operation::OperationId;
use crate::surface::SurfaceEvent;

/// What a reconciled event amounts to for the host.
#[derive(Debug, Clone, PartialEq)]
pub enum Reconciled {
    PathsChanged(u64),
    SaveCompleted { success: bool, path: Option<String> },
    SelectionChanged { selected: bool, text: Option<String> },
    /// The operation with this id had its text shape transform updated.
    ShapeUpdated(OperationId),
    /// The event was discarded.
    Dropped,
}

/// Tracks surface-side state the gesture layer needs and applies shape
/// transforms to the log.
#[derive(Debug, Clone, Default)]
pub struct SurfaceReconciler {
    has_selection: bool,
}

impl SurfaceReconciler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the surface currently reports a selected shape.
    pub fn has_selection(&self) -> bool {
        self.has_selection
    }

    pub fn reconcile(
        &mut self,
        event: SurfaceEvent,
        log: &mut OperationLog,
        frame: &SurfaceFrame,
    ) -> Reconciled {
        match event {
            SurfaceEvent::PathsUpdated { count } => Reconciled::PathsChanged(count),
            SurfaceEvent::SaveCompleted { success, path } => {
                Reconciled::SaveCompleted { success, path }
            }
            SurfaceEvent::SelectionChanged { selected, text } => {
                self.has_selection = selected;
                Reconciled::SelectionChanged { selected, text }
            }
            SurfaceEvent::ShapeTransformUpdated {
                shape_id,
                scale,
                rotate,
                center,
                size,
            } => {
                let Some(operation) = log.find_by_shape(shape_id) else {
                    log::debug!("Dropping transform for unknown shape {shape_id}");
                    return Reconciled::Dropped;
                };
                let Some(shape) = operation.as_text() else {
                    log::debug!("Dropping transform for non-text shape {shape_id}");
                    return Reconciled::Dropped;
                };
                let ratio = match frame.ratio(shape.screensize) {
                    Ok(ratio) => ratio,
                    Err(e) => {
                        log::warn!("Dropping transform for shape {shape_id}: {e}");
                        return Reconciled::Dropped;
                    }
                };

                let id = operation.id;
                log.update(id, |operation| {
                    if let Some(shape) = operation.as_text_mut() {
                        shape.apply_transform(scale, rotate, center, size, ratio);
                    }
                });
                Reconciled::ShapeUpdated(id)
            }
        }
    }
}
