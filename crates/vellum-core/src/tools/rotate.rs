//! Rotate gesture: spin an element about its center, following the pointer.

use crate::editor::{CanvasEditor, EditorError};
use crate::element::{ElementId, TransformPatch};
use crate::geometry::{angle_degrees, normalize_degrees, shortest_delta_degrees};
use crate::state::CanvasRuntimeState;
use kurbo::Point;

/// An in-progress rotate gesture.
///
/// Rotation accumulates per-move shortest angular deltas rather than
/// recomputing from the start angle, so a gesture stays continuous when the
/// pointer sweeps through the 0/360 boundary or laps the element.
#[derive(Debug)]
pub struct RotateTool {
    id: ElementId,
    center: Point,
    last_angle: f64,
    current: f64,
}

impl RotateTool {
    /// Start rotating `id` from a scene-space pointer position. Returns
    /// `None` for unknown, locked, or sizeless (group) elements.
    pub fn begin(
        state: &CanvasRuntimeState,
        id: &ElementId,
        scene_point: Point,
    ) -> Option<RotateTool> {
        let element = state.document.get(id)?;
        if element.locked() {
            return None;
        }
        let size = element.size()?;
        let center = element.transform().center(size);
        Some(RotateTool {
            id: id.clone(),
            center,
            last_angle: angle_degrees(center, scene_point),
            current: element.transform().rotation,
        })
    }

    /// Advance the gesture; returns the preview rotation in degrees
    /// (unwrapped, so a long sweep can exceed 360).
    pub fn update(&mut self, scene_point: Point) -> f64 {
        let angle = angle_degrees(self.center, scene_point);
        self.current += shortest_delta_degrees(angle - self.last_angle);
        self.last_angle = angle;
        self.current
    }

    /// Commit the rotation, normalized to `[0, 360)`.
    pub fn finish(
        mut self,
        editor: &mut CanvasEditor,
        scene_point: Point,
    ) -> Result<f64, EditorError> {
        let rotation = normalize_degrees(self.update(scene_point));
        editor.transform_element(&self.id, TransformPatch::rotation(rotation))?;
        Ok(rotation)
    }
}
