//! Viewport state and scene/screen coordinate conversion.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Minimum allowed zoom factor.
pub const MIN_SCALE: f64 = 0.1;
/// Maximum allowed zoom factor.
pub const MAX_SCALE: f64 = 5.0;

/// The camera: scene-space top-left offset plus a zoom factor.
///
/// Converts between scene coordinates (where elements live, zoom-independent)
/// and screen coordinates (pixels within the visible viewport).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    /// Scene-space x of the viewport's top-left corner.
    pub x: f64,
    /// Scene-space y of the viewport's top-left corner.
    pub y: f64,
    /// Zoom factor, kept within `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            scale: 1.0,
        }
    }
}

impl ViewportState {
    /// Create a viewport, clamping the scale into the valid range.
    pub fn new(x: f64, y: f64, scale: f64) -> Self {
        Self {
            x,
            y,
            scale: scale.clamp(MIN_SCALE, MAX_SCALE),
        }
    }

    /// Convert a scene-space point to screen pixels.
    pub fn scene_to_screen(&self, p: Point) -> Point {
        Point::new((p.x - self.x) * self.scale, (p.y - self.y) * self.scale)
    }

    /// Convert a screen-pixel point to scene space.
    ///
    /// The scale is guaranteed non-zero by the range invariant.
    pub fn screen_to_scene(&self, p: Point) -> Point {
        Point::new(self.x + p.x / self.scale, self.y + p.y / self.scale)
    }

    /// Pan by a scene-space delta.
    pub fn pan(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    /// Zoom by `delta_scale`, keeping the scene point `anchor` at the same
    /// screen position.
    ///
    /// Rejects (no-op, returns `false`) a zero delta or a resulting scale
    /// outside the valid range; continuous wheel gestures expect silent
    /// rejection at the limits rather than an error.
    pub fn zoom_at(&mut self, anchor: Point, delta_scale: f64) -> bool {
        if delta_scale == 0.0 {
            return false;
        }
        let new_scale = self.scale + delta_scale;
        if !(MIN_SCALE..=MAX_SCALE).contains(&new_scale) {
            return false;
        }

        // screen = (anchor - origin) * scale must hold across the change:
        // origin' = anchor - (anchor - origin) * scale / scale'.
        self.x = anchor.x - (anchor.x - self.x) * self.scale / new_scale;
        self.y = anchor.y - (anchor.y - self.y) * self.scale / new_scale;
        self.scale = new_scale;
        true
    }

    /// Reset to the default camera (`{0, 0, 1}`).
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
