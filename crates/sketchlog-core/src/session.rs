//! The editing session: one owned object tying log, gestures and surface
//! together for a single editor instance.

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult, SurfaceError, TransformError};
use crate::geometry::{SurfaceFrame, is_degenerate};
use crate::gesture::{GestureContext, GestureController, GestureEffect};
use crate::history::OperationLog;
use crate::host::HostListener;
use crate::input::PointerEvent;
use crate::operation::{Operation, OperationId};
use crate::reconcile::{Reconciled, SurfaceReconciler};
use crate::shapes::{SerializableColor, TextShape};
use crate::surface::{SaveOptions, ShapeConfig, Surface, SurfaceCommand, SurfaceEvent};
use crate::tools::InteractionMode;
use kurbo::{Point, Size};
use std::collections::HashSet;

/// An editor instance.
///
/// The session is the only thing that mutates its [`OperationLog`]; every
/// mutation is mirrored to the surface and reported to the host listener.
pub struct EditorSession<S: Surface, H: HostListener = ()> {
    config: SessionConfig,
    log: OperationLog,
    gesture: GestureController,
    reconciler: SurfaceReconciler,
    surface: S,
    host: H,
    surface_size: Size,
    initialized: bool,
    /// Operations waiting for a usable surface, in append order.
    pending: Vec<OperationId>,
    /// The surface refused part of the stroke in progress as not mounted.
    stroke_refused: bool,
}

impl<S: Surface, H: HostListener> EditorSession<S, H> {
    pub fn new(config: SessionConfig, surface: S, host: H) -> Self {
        Self {
            config,
            log: OperationLog::new(),
            gesture: GestureController::new(),
            reconciler: SurfaceReconciler::new(),
            surface,
            host,
            surface_size: Size::ZERO,
            initialized: false,
            pending: Vec::new(),
            stroke_refused: false,
        }
    }

    /// Create a session preloaded with existing operations. They are drawn
    /// once the surface reports its size; the host is not notified.
    pub fn with_operations(
        config: SessionConfig,
        surface: S,
        host: H,
        operations: impl IntoIterator<Item = Operation>,
    ) -> Self {
        let mut session = Self::new(config, surface, host);
        for operation in operations {
            let id = operation.id;
            if session.log.append(operation) {
                session.pending.push(id);
            }
        }
        session
    }

    // --- Accessors ---

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn log(&self) -> &OperationLog {
        &self.log
    }

    /// Applied operations, in application order.
    pub fn active_operations(&self) -> &[Operation] {
        self.log.active()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn surface_size(&self) -> Size {
        self.surface_size
    }

    pub fn frame(&self) -> SurfaceFrame {
        SurfaceFrame::new(self.surface_size, self.config.screen_scale)
    }

    pub fn is_drawing(&self) -> bool {
        self.gesture.is_drawing()
    }

    pub fn has_selection(&self) -> bool {
        self.reconciler.has_selection()
    }

    /// Ids queued until the surface can take them.
    pub fn pending(&self) -> &[OperationId] {
        &self.pending
    }

    // --- Log operations ---

    /// Append an operation and draw it. Returns false if the id is already
    /// active.
    pub fn append_operation(&mut self, operation: Operation) -> bool {
        let id = operation.id;
        if !self.log.append(operation) {
            log::debug!("Operation {id} already applied");
            return false;
        }
        self.notify_changed(id);
        self.dispatch_or_queue(id);
        true
    }

    /// Log a text shape at `point` on a surface of `size`, using the
    /// configured text defaults. Usually called in answer to
    /// [`HostListener::placement_requested`].
    ///
    /// `size` becomes the shape's capture frame, so a zero size is refused
    /// with [`TransformError::ZeroCaptureFrame`] and nothing is logged.
    pub fn insert_text(
        &mut self,
        text: impl Into<String>,
        point: Point,
        size: Size,
    ) -> SessionResult<OperationId> {
        if is_degenerate(size) {
            return Err(TransformError::ZeroCaptureFrame.into());
        }
        let defaults = &self.config.text;
        let mut shape = TextShape::new(text, point, size)
            .with_font_size(defaults.font_size)
            .with_scale(defaults.scale)
            .with_color(defaults.color);
        shape.rotate = defaults.rotate;

        let operation = Operation::text(shape, self.config.user.clone());
        let id = operation.id;
        self.append_operation(operation);
        Ok(id)
    }

    /// Undo the most recent operation by timestamp.
    pub fn undo(&mut self) -> Option<OperationId> {
        let operation = self.log.undo()?.clone();
        log::debug!("Undo {}", operation.id);
        self.pending.retain(|id| *id != operation.id);
        self.send_removal(&operation);
        self.host.operations_changed(&operation, self.log.active());
        Some(operation.id)
    }

    /// Re-apply the most recently undone operation.
    pub fn redo(&mut self) -> Option<OperationId> {
        let id = self.log.redo()?.id;
        log::debug!("Redo {id}");
        self.notify_changed(id);
        self.dispatch_or_queue(id);
        Some(id)
    }

    /// Delete an active operation outright. It does not go on the undo stack.
    pub fn delete_operation(&mut self, id: OperationId) -> Option<Operation> {
        let operation = self.log.remove(id)?;
        self.pending.retain(|p| *p != id);
        self.send_removal(&operation);
        self.host.operations_changed(&operation, self.log.active());
        Some(operation)
    }

    /// Delete the session user's most recent stroke.
    pub fn undo_own_stroke(&mut self) -> Option<OperationId> {
        let id = self.log.last_stroke_by(self.config.user.as_deref())?.id;
        self.delete_operation(id).map(|operation| operation.id)
    }

    /// Drop every operation, queued dispatch and in-progress stroke, and
    /// wipe the surface.
    pub fn clear(&mut self) {
        self.gesture.cancel();
        self.stroke_refused = false;
        self.log.clear();
        self.pending.clear();
        let _ = self.send(SurfaceCommand::Clear);
        self.host.operations_cleared();
    }

    /// Wipe the surface and draw every active operation again, e.g. after
    /// the surface was resized.
    pub fn redraw(&mut self) {
        if !self.frame().is_ready() {
            log::debug!("Surface not ready, redraw deferred");
            let ids = self.log.active().iter().map(|o| o.id);
            self.pending.extend(ids);
            return;
        }
        self.pending.clear();
        if self.send(SurfaceCommand::Clear).is_err() {
            self.pending = self.log.active().iter().map(|o| o.id).collect();
            return;
        }
        let ids: Vec<_> = self.log.active().iter().map(|o| o.id).collect();
        for id in ids {
            self.dispatch_operation(id);
        }
    }

    // --- Input ---

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        let ctx = GestureContext {
            config: &self.config,
            surface_size: self.surface_size,
            has_selection: self.reconciler.has_selection(),
        };
        let effects = self.gesture.handle(event, ctx);
        self.apply_effects(effects);
    }

    /// Abandon the stroke in progress.
    pub fn cancel_stroke(&mut self) {
        let effects = self.gesture.cancel();
        self.apply_effects(effects);
    }

    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        let frame = self.frame();
        match self.reconciler.reconcile(event, &mut self.log, &frame) {
            Reconciled::PathsChanged(count) => self.host.paths_changed(count),
            Reconciled::SaveCompleted { success, path } => {
                self.host.save_completed(success, path.as_deref())
            }
            Reconciled::SelectionChanged { selected, text } => {
                self.host.selection_changed(selected, text.as_deref())
            }
            Reconciled::ShapeUpdated(id) => self.notify_changed(id),
            Reconciled::Dropped => {}
        }
    }

    /// The surface was laid out at `size` logical units.
    pub fn on_layout(&mut self, size: Size) {
        if size != self.surface_size {
            log::debug!("Surface laid out at {}x{}", size.width, size.height);
        }
        self.surface_size = size;
        if is_degenerate(size) {
            return;
        }
        if !self.initialized {
            self.initialized = true;
            self.configure_shapes();
        }
        self.flush();
    }

    /// The surface can accept commands again after refusing them.
    pub fn surface_mounted(&mut self) {
        self.flush();
    }

    // --- Direct surface commands ---

    /// Place a host-configured shape directly on the surface. It is not
    /// logged.
    pub fn add_shape(&mut self, config: &ShapeConfig) -> SessionResult<()> {
        self.send(SurfaceCommand::add_shape(config))
    }

    pub fn delete_selected_shape(&mut self) -> SessionResult<()> {
        self.send(SurfaceCommand::DeleteSelectedShape)
    }

    pub fn unselect_shape(&mut self) -> SessionResult<()> {
        self.send(SurfaceCommand::UnselectShape)
    }

    pub fn increase_selected_font_size(&mut self) -> SessionResult<()> {
        self.send(SurfaceCommand::IncreaseShapeFontSize)
    }

    pub fn decrease_selected_font_size(&mut self) -> SessionResult<()> {
        self.send(SurfaceCommand::DecreaseShapeFontSize)
    }

    pub fn change_selected_text(&mut self, text: impl Into<String>) -> SessionResult<()> {
        self.send(SurfaceCommand::ChangeShapeText { text: text.into() })
    }

    /// Ask the surface to save the composition. Completion arrives as a
    /// [`SurfaceEvent::SaveCompleted`].
    pub fn save(&mut self, options: SaveOptions) -> SessionResult<()> {
        log::info!("Saving sketch as {:?}", options.filename);
        self.send(SurfaceCommand::Save(options))
    }

    // --- Settings ---

    pub fn set_mode(&mut self, mode: InteractionMode) {
        if mode != self.config.mode && self.gesture.is_drawing() {
            self.cancel_stroke();
        }
        self.config.mode = mode;
    }

    pub fn set_stroke_color(&mut self, color: SerializableColor) {
        self.config.stroke_color = color;
        if self.initialized {
            self.configure_shapes();
        }
    }

    pub fn set_stroke_width(&mut self, width: f64) {
        self.config.stroke_width = width;
        if self.initialized {
            self.configure_shapes();
        }
    }

    pub fn set_touch_enabled(&mut self, enabled: bool) {
        self.config.touch_enabled = enabled;
    }

    // --- Internals ---

    fn apply_effects(&mut self, effects: Vec<GestureEffect>) {
        for effect in effects {
            match effect {
                GestureEffect::Command(command) => {
                    if matches!(command, SurfaceCommand::NewPath { .. }) {
                        self.stroke_refused = false;
                    }
                    if let Err(SessionError::Surface(SurfaceError::NotMounted)) = self.send(command) {
                        self.stroke_refused = true;
                    }
                }
                GestureEffect::StrokeStarted(point) => self.host.stroke_started(point),
                GestureEffect::StrokeChanged(point) => self.host.stroke_changed(point),
                GestureEffect::StrokeEnded { path, size } => self.host.stroke_ended(&path, size),
                GestureEffect::PlacementRequested { point, size } => {
                    self.host.placement_requested(point, size)
                }
                GestureEffect::Completed(operation) => {
                    // Already drawn live; log it without dispatching again
                    // unless the surface missed part of it.
                    let id = operation.id;
                    if self.log.append(operation) {
                        self.notify_changed(id);
                        if std::mem::take(&mut self.stroke_refused) {
                            log::debug!("Stroke {id} was not drawn live, queueing");
                            self.pending.push(id);
                        }
                    }
                }
            }
        }
    }

    fn notify_changed(&mut self, id: OperationId) {
        if let Some(operation) = self.log.get(id) {
            self.host.operations_changed(operation, self.log.active());
        }
    }

    fn dispatch_or_queue(&mut self, id: OperationId) {
        if self.frame().is_ready() {
            self.dispatch_operation(id);
        } else {
            log::debug!("Surface not laid out, queueing {id}");
            self.pending.push(id);
        }
    }

    /// Send one active operation to the surface. Requeues it if the surface
    /// is not mounted.
    fn dispatch_operation(&mut self, id: OperationId) {
        let frame = self.frame();
        let Some(operation) = self.log.get(id) else {
            return;
        };
        let command = match SurfaceCommand::add_operation(operation, &frame, self.config.stroke_color) {
            Ok(command) => command,
            Err(e) => {
                log::error!("Not drawing operation {id}: {e}");
                return;
            }
        };
        if let Err(SurfaceError::NotMounted) = self.surface.dispatch(command) {
            log::debug!("Surface not mounted, queueing {id}");
            self.pending.push(id);
        }
    }

    /// Dispatch everything queued, each id at most once, skipping ids that
    /// are no longer active.
    fn flush(&mut self) {
        if self.pending.is_empty() || !self.frame().is_ready() {
            return;
        }
        let mut seen = HashSet::new();
        let queued: Vec<_> = std::mem::take(&mut self.pending)
            .into_iter()
            .filter(|id| seen.insert(*id))
            .collect();
        log::debug!("Flushing {} queued operations", queued.len());
        for id in queued {
            if self.log.contains(id) {
                self.dispatch_operation(id);
            }
        }
    }

    fn send_removal(&mut self, operation: &Operation) {
        let _ = self.send(SurfaceCommand::remove_operation(operation));
    }

    fn configure_shapes(&mut self) {
        let shape = &self.config.shape;
        let command = SurfaceCommand::ConfigureShapes {
            border_color: shape.border_color.to_argb(),
            border_style: shape.border_style,
            border_width: shape.border_stroke_width,
            color: self.config.stroke_color.to_argb(),
            stroke_width: self.config.stroke_width,
        };
        let _ = self.send(command);
    }

    /// Send a command, logging failures.
    fn send(&mut self, command: SurfaceCommand) -> SessionResult<()> {
        self.surface.dispatch(command).map_err(|e| {
            match &e {
                SurfaceError::NotMounted => log::warn!("Surface not mounted, command dropped"),
                SurfaceError::Rejected(reason) => log::warn!("Surface rejected command: {reason}"),
            }
            e.into()
        })
    }
}
