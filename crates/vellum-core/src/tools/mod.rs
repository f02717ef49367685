//! Interactive gesture tools: drag, rotate and scale.
//!
//! Each tool is a small state machine owning one pointer gesture. `begin`
//! captures everything it needs from the current state, `update` computes
//! preview geometry without touching the editor, and `finish` commits the
//! final geometry through the editor as a single history entry.

mod drag;
mod rotate;
mod scale;

pub use drag::DragTool;
pub use rotate::RotateTool;
pub use scale::ScaleTool;

use kurbo::Vec2;

/// Minimum pointer travel, in screen pixels, before a drag takes effect.
/// Keeps plain clicks from producing zero-distance history entries.
pub const DRAG_THRESHOLD_PX: f64 = 0.5;

/// Smallest allowed element width/height after a scale gesture.
pub const MIN_ELEMENT_SIZE: f64 = 10.0;

/// Font size bounds applied when corner-scaling text.
pub const MIN_FONT_SIZE: f64 = 8.0;
pub const MAX_FONT_SIZE: f64 = 72.0;

/// Keyboard modifier state accompanying pointer events.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Self::NONE
        }
    }
}

/// The eight resize handles around a selection box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScaleHandle {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
}

impl ScaleHandle {
    /// Outward direction of the handle in the element's local axes.
    ///
    /// Each component is -1, 0 or 1; the opposite corner/edge (the gesture
    /// anchor) lies at the negated direction.
    pub fn dir(&self) -> Vec2 {
        match self {
            ScaleHandle::TopLeft => Vec2::new(-1.0, -1.0),
            ScaleHandle::Top => Vec2::new(0.0, -1.0),
            ScaleHandle::TopRight => Vec2::new(1.0, -1.0),
            ScaleHandle::Right => Vec2::new(1.0, 0.0),
            ScaleHandle::BottomRight => Vec2::new(1.0, 1.0),
            ScaleHandle::Bottom => Vec2::new(0.0, 1.0),
            ScaleHandle::BottomLeft => Vec2::new(-1.0, 1.0),
            ScaleHandle::Left => Vec2::new(-1.0, 0.0),
        }
    }

    /// Corner handles scale both axes (and drive text font scaling).
    pub fn is_corner(&self) -> bool {
        let d = self.dir();
        d.x != 0.0 && d.y != 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_directions_are_unit_components() {
        let handles = [
            ScaleHandle::TopLeft,
            ScaleHandle::Top,
            ScaleHandle::TopRight,
            ScaleHandle::Right,
            ScaleHandle::BottomRight,
            ScaleHandle::Bottom,
            ScaleHandle::BottomLeft,
            ScaleHandle::Left,
        ];
        for handle in handles {
            let d = handle.dir();
            assert!(d.x.abs() <= 1.0 && d.y.abs() <= 1.0);
            assert!(d.x != 0.0 || d.y != 0.0);
        }
    }

    #[test]
    fn test_corner_classification() {
        assert!(ScaleHandle::TopLeft.is_corner());
        assert!(ScaleHandle::BottomRight.is_corner());
        assert!(!ScaleHandle::Top.is_corner());
        assert!(!ScaleHandle::Left.is_corner());
    }
}
