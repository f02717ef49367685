//! Scene-space geometry: element transforms and rotation math.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Placement of an element in scene space.
///
/// `x`/`y` is the element's top-left corner; `rotation` is in degrees and
/// applies about the element's geometric center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub x: f64,
    pub y: f64,
    #[serde(default = "default_scale")]
    pub scale_x: f64,
    #[serde(default = "default_scale")]
    pub scale_y: f64,
    #[serde(default)]
    pub rotation: f64,
}

fn default_scale() -> f64 {
    1.0
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Transform {
    /// Create a transform at the given top-left position.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x,
            y,
            scale_x: 1.0,
            scale_y: 1.0,
            rotation: 0.0,
        }
    }

    /// Top-left corner as a point.
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Geometric center for an element of the given size.
    pub fn center(&self, size: Size) -> Point {
        Point::new(self.x + size.width / 2.0, self.y + size.height / 2.0)
    }

    /// Move the top-left corner by a scene-space delta.
    pub fn translated(&self, delta: Vec2) -> Self {
        Self {
            x: self.x + delta.x,
            y: self.y + delta.y,
            ..*self
        }
    }
}

/// Rotate a local offset vector by `degrees`, projecting it into scene axes.
pub fn rotate_vec(v: Vec2, degrees: f64) -> Vec2 {
    let radians = degrees.to_radians();
    let (sin, cos) = radians.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Normalize an angle in degrees to `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let wrapped = degrees % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Shortest signed angular difference in degrees, wrapped to `[-180, 180]`.
///
/// Keeps rotation gestures continuous across the 0/360 boundary.
pub fn shortest_delta_degrees(degrees: f64) -> f64 {
    let wrapped = normalize_degrees(degrees);
    if wrapped > 180.0 { wrapped - 360.0 } else { wrapped }
}

/// Angle in degrees from `center` to `point`, normalized to `[0, 360)`.
pub fn angle_degrees(center: Point, point: Point) -> f64 {
    let angle = (point.y - center.y).atan2(point.x - center.x).to_degrees();
    normalize_degrees(angle)
}

/// Axis-aligned bounding box for an element placed by `transform` with `size`.
///
/// Rotation is deliberately ignored; marquee selection and group scaling work
/// on unrotated boxes.
pub fn aabb(transform: &Transform, size: Size) -> Rect {
    Rect::new(
        transform.x,
        transform.y,
        transform.x + size.width,
        transform.y + size.height,
    )
}

/// Axis-aligned rectangle intersection via separating-axis rejection.
pub fn rects_intersect(a: Rect, b: Rect) -> bool {
    !(a.x1 < b.x0 || b.x1 < a.x0 || a.y1 < b.y0 || b.y1 < a.y0)
}
