//! Pointer events delivered by the host.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// One step of a pointer sequence.
///
/// `page` is the pointer position in host page coordinates. On `Down`,
/// `location` is the same position relative to the surface, which fixes the
/// surface's page offset for the rest of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PointerEvent {
    Down {
        page: Point,
        location: Point,
        /// Number of simultaneous touches.
        #[serde(default = "one")]
        touches: usize,
    },
    Move {
        page: Point,
    },
    Up {
        page: Point,
    },
    /// The host took the pointer away (e.g. a system gesture).
    Cancel,
}

fn one() -> usize {
    1
}

impl PointerEvent {
    /// Single-touch pointer down at a page position, with the surface at
    /// `surface_offset` on the page.
    pub fn down(page: Point, surface_offset: Vec2) -> Self {
        PointerEvent::Down {
            page,
            location: page - surface_offset,
            touches: 1,
        }
    }

    pub fn page(&self) -> Option<Point> {
        match self {
            PointerEvent::Down { page, .. }
            | PointerEvent::Move { page }
            | PointerEvent::Up { page } => Some(*page),
            PointerEvent::Cancel => None,
        }
    }
}
