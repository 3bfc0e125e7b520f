//! Pointer gestures: live stroke capture and placement requests.

use crate::config::SessionConfig;
use crate::geometry::{self, is_degenerate};
use crate::input::PointerEvent;
use crate::operation::Operation;
use crate::shapes::Path;
use crate::surface::SurfaceCommand;
use crate::tools::PathBuilder;
use kurbo::{Point, Size, Vec2};

/// What the controller needs to know about the session for one event.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub config: &'a SessionConfig,
    /// Current logical surface size.
    pub surface_size: Size,
    /// Whether the surface has a shape selected.
    pub has_selection: bool,
}

/// Output of a pointer event, in the order it must be applied.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureEffect {
    Command(SurfaceCommand),
    StrokeStarted(Point),
    StrokeChanged(Point),
    StrokeEnded { path: Path, size: Size },
    /// A finished stroke ready for the log. It is already on the surface.
    Completed(Operation),
    PlacementRequested { point: Point, size: Size },
}

#[derive(Debug, Clone, Default)]
enum GestureState {
    #[default]
    Idle,
    Drawing {
        builder: PathBuilder,
        /// Page position of the pointer-down.
        start: Point,
        /// Page position of the surface's origin.
        offset: Vec2,
    },
}

/// Turns pointer sequences into surface commands and operations.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: GestureState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, GestureState::Drawing { .. })
    }

    /// Points captured so far by the stroke in progress.
    pub fn current_points(&self) -> &[Point] {
        match &self.state {
            GestureState::Drawing { builder, .. } => builder.points(),
            GestureState::Idle => &[],
        }
    }

    pub fn handle(&mut self, event: PointerEvent, ctx: GestureContext<'_>) -> Vec<GestureEffect> {
        if !ctx.config.touch_enabled {
            return Vec::new();
        }
        match event {
            PointerEvent::Down {
                page,
                location,
                touches,
            } => self.pointer_down(page, location, touches, ctx),
            PointerEvent::Move { page } => self.pointer_move(page, ctx),
            PointerEvent::Up { .. } => self.pointer_up(ctx),
            PointerEvent::Cancel => self.cancel(),
        }
    }

    /// Abandon the stroke in progress without logging it.
    pub fn cancel(&mut self) -> Vec<GestureEffect> {
        match std::mem::take(&mut self.state) {
            GestureState::Drawing { builder, .. } => {
                log::debug!("Stroke {} cancelled", builder.id());
                vec![GestureEffect::Command(SurfaceCommand::EndPath)]
            }
            GestureState::Idle => Vec::new(),
        }
    }

    fn pointer_down(
        &mut self,
        page: Point,
        location: Point,
        touches: usize,
        ctx: GestureContext<'_>,
    ) -> Vec<GestureEffect> {
        if touches > 1 {
            log::debug!("Ignoring multi-touch pointer down ({touches} touches)");
            return Vec::new();
        }
        if self.is_drawing() {
            log::warn!("Pointer down while a stroke is in progress, ignoring");
            return Vec::new();
        }

        let offset = page - location;
        let origin = geometry::round_point(page - offset);
        let config = ctx.config;

        if !config.mode.is_draw() {
            if ctx.has_selection {
                return Vec::new();
            }
            return vec![GestureEffect::PlacementRequested {
                point: origin,
                size: ctx.surface_size,
            }];
        }

        if is_degenerate(ctx.surface_size) {
            log::warn!("Surface has no size yet, ignoring stroke");
            return Vec::new();
        }

        let builder = PathBuilder::begin(origin, config.stroke_color, config.stroke_width)
            .with_threshold(config.motion_threshold);
        let effects = vec![
            GestureEffect::Command(SurfaceCommand::NewPath {
                id: builder.id(),
                color: builder.color().to_argb(),
                width: builder.width() * config.screen_scale,
            }),
            GestureEffect::Command(SurfaceCommand::add_point(origin, config.screen_scale, false)),
            GestureEffect::StrokeStarted(origin),
        ];
        self.state = GestureState::Drawing {
            builder,
            start: page,
            offset,
        };
        effects
    }

    fn pointer_move(&mut self, page: Point, ctx: GestureContext<'_>) -> Vec<GestureEffect> {
        let GestureState::Drawing {
            builder,
            start,
            offset,
        } = &mut self.state
        else {
            return Vec::new();
        };

        let zoom = ctx.config.scale;
        let logical = geometry::round_point(*start + (page - *start) / zoom - *offset);
        if !builder.extend(logical) {
            return Vec::new();
        }
        vec![
            GestureEffect::Command(SurfaceCommand::add_point(logical, ctx.config.screen_scale, true)),
            GestureEffect::StrokeChanged(logical),
        ]
    }

    fn pointer_up(&mut self, ctx: GestureContext<'_>) -> Vec<GestureEffect> {
        let GestureState::Drawing { builder, .. } = std::mem::take(&mut self.state) else {
            return Vec::new();
        };

        let path = builder.finish();
        let size = ctx.surface_size;
        log::debug!("Stroke {} finished with {} points", path.id(), path.len());
        let operation = Operation::draw(path.clone(), size, ctx.config.user.clone());
        vec![
            GestureEffect::Completed(operation),
            GestureEffect::Command(SurfaceCommand::EndPath),
            GestureEffect::StrokeEnded { path, size },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::OperationKind;
    use crate::tools::InteractionMode;

    const SIZE: Size = Size::new(300.0, 500.0);

    fn ctx(config: &SessionConfig) -> GestureContext<'_> {
        GestureContext {
            config,
            surface_size: SIZE,
            has_selection: false,
        }
    }

    fn down(x: f64, y: f64) -> PointerEvent {
        // Surface sits at (10, 20) on the page.
        PointerEvent::down(Point::new(x + 10.0, y + 20.0), Vec2::new(10.0, 20.0))
    }

    fn mv(x: f64, y: f64) -> PointerEvent {
        PointerEvent::Move {
            page: Point::new(x + 10.0, y + 20.0),
        }
    }

    fn up() -> PointerEvent {
        PointerEvent::Up { page: Point::ZERO }
    }

    #[test]
    fn test_stroke_lifecycle() {
        let config = SessionConfig::default().with_user("ana").with_screen_scale(2.0);
        let mut gesture = GestureController::new();

        let effects = gesture.handle(down(50.0, 60.0), ctx(&config));
        assert!(gesture.is_drawing());
        assert_eq!(effects.len(), 3);
        let GestureEffect::Command(SurfaceCommand::NewPath { width, color, .. }) = &effects[0] else {
            panic!("expected new_path, got {:?}", effects[0]);
        };
        assert_eq!(*width, 6.0);
        assert_eq!(*color, 0xFF00_0000);
        assert_eq!(
            effects[1],
            GestureEffect::Command(SurfaceCommand::AddPoint {
                x: 100.0,
                y: 120.0,
                is_move: false
            })
        );
        assert_eq!(effects[2], GestureEffect::StrokeStarted(Point::new(50.0, 60.0)));

        let effects = gesture.handle(mv(70.0, 60.0), ctx(&config));
        assert_eq!(
            effects,
            vec![
                GestureEffect::Command(SurfaceCommand::AddPoint {
                    x: 140.0,
                    y: 120.0,
                    is_move: true
                }),
                GestureEffect::StrokeChanged(Point::new(70.0, 60.0)),
            ]
        );

        assert_eq!(gesture.current_points().len(), 2);

        let effects = gesture.handle(up(), ctx(&config));
        assert!(!gesture.is_drawing());
        assert!(gesture.current_points().is_empty());
        let GestureEffect::Completed(op) = &effects[0] else {
            panic!("expected completed operation");
        };
        assert_eq!(op.user_id.as_deref(), Some("ana"));
        let OperationKind::Draw { path, size } = &op.kind else {
            panic!("expected draw");
        };
        assert_eq!(*size, SIZE);
        assert_eq!(path.points(), &[Point::new(50.0, 60.0), Point::new(70.0, 60.0)]);
        assert_eq!(effects[1], GestureEffect::Command(SurfaceCommand::EndPath));
        assert!(matches!(effects[2], GestureEffect::StrokeEnded { size, .. } if size == SIZE));
    }

    #[test]
    fn test_jitter_leaves_origin_only() {
        let config = SessionConfig::default();
        let mut gesture = GestureController::new();
        gesture.handle(down(50.0, 60.0), ctx(&config));
        assert!(gesture.handle(mv(51.0, 61.0), ctx(&config)).is_empty());

        let effects = gesture.handle(up(), ctx(&config));
        let GestureEffect::Completed(op) = &effects[0] else {
            panic!("expected completed operation");
        };
        let OperationKind::Draw { path, .. } = &op.kind else {
            panic!("expected draw");
        };
        assert_eq!(path.points(), &[Point::new(50.0, 60.0)]);
    }

    #[test]
    fn test_zoom_divides_motion() {
        let config = SessionConfig {
            scale: 2.0,
            ..SessionConfig::default()
        };
        let mut gesture = GestureController::new();
        gesture.handle(down(50.0, 60.0), ctx(&config));
        let effects = gesture.handle(mv(70.0, 80.0), ctx(&config));
        assert_eq!(effects[1], GestureEffect::StrokeChanged(Point::new(60.0, 70.0)));
    }

    #[test]
    fn test_multi_touch_rejected() {
        let config = SessionConfig::default();
        let mut gesture = GestureController::new();
        let effects = gesture.handle(
            PointerEvent::Down {
                page: Point::new(5.0, 5.0),
                location: Point::new(5.0, 5.0),
                touches: 2,
            },
            ctx(&config),
        );
        assert!(effects.is_empty());
        assert!(!gesture.is_drawing());
    }

    #[test]
    fn test_touch_disabled() {
        let config = SessionConfig {
            touch_enabled: false,
            ..SessionConfig::default()
        };
        let mut gesture = GestureController::new();
        assert!(gesture.handle(down(1.0, 1.0), ctx(&config)).is_empty());
        assert!(!gesture.is_drawing());
    }

    #[test]
    fn test_text_mode_requests_placement() {
        let config = SessionConfig::default().with_mode(InteractionMode::Text);
        let mut gesture = GestureController::new();
        let effects = gesture.handle(down(40.0, 30.0), ctx(&config));
        assert_eq!(
            effects,
            vec![GestureEffect::PlacementRequested {
                point: Point::new(40.0, 30.0),
                size: SIZE
            }]
        );
        assert!(!gesture.is_drawing());

        let selected = GestureContext {
            has_selection: true,
            ..ctx(&config)
        };
        assert!(gesture.handle(down(40.0, 30.0), selected).is_empty());
    }

    #[test]
    fn test_zero_size_surface_ignores_stroke() {
        let config = SessionConfig::default();
        let mut gesture = GestureController::new();
        let no_size = GestureContext {
            surface_size: Size::ZERO,
            ..ctx(&config)
        };
        assert!(gesture.handle(down(1.0, 1.0), no_size).is_empty());
        assert!(!gesture.is_drawing());
    }

    #[test]
    fn test_cancel() {
        let config = SessionConfig::default();
        let mut gesture = GestureController::new();
        assert!(gesture.cancel().is_empty());
        gesture.handle(down(1.0, 1.0), ctx(&config));
        assert_eq!(gesture.cancel(), vec![GestureEffect::Command(SurfaceCommand::EndPath)]);
        assert!(!gesture.is_drawing());
        assert!(gesture.handle(up(), ctx(&config)).is_empty());
    }

    #[test]
    fn test_move_without_down_ignored() {
        let config = SessionConfig::default();
        let mut gesture = GestureController::new();
        assert!(gesture.handle(mv(100.0, 100.0), ctx(&config)).is_empty());
    }
}
