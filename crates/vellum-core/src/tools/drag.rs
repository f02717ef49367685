//! Drag gesture: translate the target (or the whole selection) in scene
//! space, driven by screen-space pointer deltas.

use super::DRAG_THRESHOLD_PX;
use crate::editor::{CanvasEditor, EditorError};
use crate::element::{ElementId, TransformPatch};
use crate::state::CanvasRuntimeState;
use kurbo::Point;
use std::collections::HashSet;

#[derive(Debug, Clone)]
struct Participant {
    id: ElementId,
    start: Point,
}

/// An in-progress drag gesture.
///
/// Captures the starting geometry of every participant at `begin`; updates
/// are pure functions of the pointer position, so dropping the tool cancels
/// the gesture with no state to roll back.
#[derive(Debug)]
pub struct DragTool {
    start_screen: Point,
    scale: f64,
    participants: Vec<Participant>,
    active: bool,
}

impl DragTool {
    /// Start a drag on `target` at a screen-space pointer position.
    ///
    /// If the target is part of the selection the whole selection moves as a
    /// unit; otherwise only the target. Locked elements never participate;
    /// group participants carry their descendants along. Returns `None` when
    /// nothing draggable is under the pointer.
    pub fn begin(
        state: &CanvasRuntimeState,
        target: &ElementId,
        screen_point: Point,
    ) -> Option<DragTool> {
        let element = state.document.get(target)?;
        if element.locked() {
            return None;
        }

        let top_level: Vec<ElementId> = if state.selection.selected_ids.contains(target) {
            state.selection.selected_ids.clone()
        } else {
            vec![target.clone()]
        };

        let mut seen: HashSet<ElementId> = HashSet::new();
        let mut participants = Vec::new();
        for id in &top_level {
            let Some(element) = state.document.get(id) else {
                continue;
            };
            if element.locked() {
                continue;
            }
            for member in state.document.subtree_ids(id) {
                if !seen.insert(member.clone()) {
                    continue;
                }
                if let Some(element) = state.document.get(&member) {
                    participants.push(Participant {
                        id: member,
                        start: element.transform().position(),
                    });
                }
            }
        }
        if participants.is_empty() {
            return None;
        }

        Some(DragTool {
            start_screen: screen_point,
            scale: state.viewport.scale,
            participants,
            active: false,
        })
    }

    fn positions_at(&mut self, screen_point: Point) -> Vec<(ElementId, Point)> {
        let delta_screen = screen_point - self.start_screen;
        if !self.active && delta_screen.hypot() < DRAG_THRESHOLD_PX {
            return Vec::new();
        }
        self.active = true;
        // Screen pixels to scene units.
        let delta = delta_screen / self.scale;
        self.participants
            .iter()
            .map(|p| (p.id.clone(), p.start + delta))
            .collect()
    }

    /// Preview positions for the current pointer location. Empty until the
    /// pointer has travelled past the drag threshold.
    pub fn update(&mut self, screen_point: Point) -> Vec<(ElementId, Point)> {
        self.positions_at(screen_point)
    }

    /// Commit the drag as a single history entry. Returns `Ok(false)` when
    /// the threshold was never crossed (a plain click).
    pub fn finish(
        mut self,
        editor: &mut CanvasEditor,
        screen_point: Point,
    ) -> Result<bool, EditorError> {
        let positions = self.positions_at(screen_point);
        if positions.is_empty() {
            return Ok(false);
        }
        let patches: Vec<(ElementId, TransformPatch)> = positions
            .into_iter()
            .map(|(id, pos)| (id, TransformPatch::position(pos.x, pos.y)))
            .collect();
        editor.transform_elements(&patches)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{AddOptions, CanvasEditor};
    use crate::element::{ElementPatch, ShapeKind};
    use crate::id::SequentialIds;
    use crate::viewport::ViewportState;
    use pretty_assertions::assert_eq;

    fn editor() -> CanvasEditor {
        CanvasEditor::with_ids(Box::new(SequentialIds::new()))
    }

    fn rect_at(ed: &mut CanvasEditor, x: f64, y: f64) -> ElementId {
        ed.add_shape(
            ShapeKind::Rect,
            AddOptions {
                position: Some(Point::new(x, y)),
                ..Default::default()
            },
        )
    }

    #[test]
    fn test_click_without_travel_commits_nothing() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 0.0, 0.0);

        let tool = DragTool::begin(ed.state(), &id, Point::new(10.0, 10.0)).unwrap();
        let moved = tool
            .finish(&mut ed, Point::new(10.2, 10.2))
            .unwrap();

        assert!(!moved);
        let t = *ed.document().get(&id).unwrap().transform();
        assert!((t.x).abs() < f64::EPSILON);
        assert!((t.y).abs() < f64::EPSILON);
        // No history entry beyond the add itself.
        assert!(ed.undo());
        assert!(ed.document().is_empty());
    }

    #[test]
    fn test_drag_translates_by_scene_delta() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 100.0, 100.0);

        let mut tool = DragTool::begin(ed.state(), &id, Point::new(0.0, 0.0)).unwrap();
        let preview = tool.update(Point::new(30.0, 40.0));
        assert_eq!(preview.len(), 1);
        assert_eq!(preview[0].1, Point::new(130.0, 140.0));

        assert!(tool.finish(&mut ed, Point::new(30.0, 40.0)).unwrap());
        let t = *ed.document().get(&id).unwrap().transform();
        assert!((t.x - 130.0).abs() < f64::EPSILON);
        assert!((t.y - 140.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_delta_divided_by_zoom() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 0.0, 0.0);
        ed.set_viewport(ViewportState::new(0.0, 0.0, 2.0));

        let tool = DragTool::begin(ed.state(), &id, Point::ZERO).unwrap();
        tool.finish(&mut ed, Point::new(100.0, 0.0)).unwrap();

        // 100 screen pixels at 2x zoom is 50 scene units.
        let t = *ed.document().get(&id).unwrap().transform();
        assert!((t.x - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_selected_target_drags_whole_selection() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 200.0, 0.0);
        ed.set_selection(vec![a.clone(), b.clone()]);

        let tool = DragTool::begin(ed.state(), &a, Point::ZERO).unwrap();
        tool.finish(&mut ed, Point::new(10.0, 10.0)).unwrap();

        assert!((ed.document().get(&a).unwrap().transform().x - 10.0).abs() < f64::EPSILON);
        assert!((ed.document().get(&b).unwrap().transform().x - 210.0).abs() < f64::EPSILON);

        // One gesture, one undo step for both elements.
        assert!(ed.undo());
        assert!((ed.document().get(&a).unwrap().transform().x).abs() < f64::EPSILON);
        assert!((ed.document().get(&b).unwrap().transform().x - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unselected_target_drags_alone() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 200.0, 0.0);
        ed.set_selection(vec![a.clone()]);

        let tool = DragTool::begin(ed.state(), &b, Point::ZERO).unwrap();
        tool.finish(&mut ed, Point::new(10.0, 0.0)).unwrap();

        assert!((ed.document().get(&a).unwrap().transform().x).abs() < f64::EPSILON);
        assert!((ed.document().get(&b).unwrap().transform().x - 210.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_locked_elements_do_not_move() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 200.0, 0.0);
        ed.update_element(
            &b,
            ElementPatch {
                locked: Some(true),
                ..Default::default()
            },
        );
        ed.set_selection(vec![a.clone(), b.clone()]);

        // Locked target: no drag at all.
        assert!(DragTool::begin(ed.state(), &b, Point::ZERO).is_none());

        // Locked selection member is skipped.
        let tool = DragTool::begin(ed.state(), &a, Point::ZERO).unwrap();
        tool.finish(&mut ed, Point::new(10.0, 0.0)).unwrap();
        assert!((ed.document().get(&a).unwrap().transform().x - 10.0).abs() < f64::EPSILON);
        assert!((ed.document().get(&b).unwrap().transform().x - 200.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_group_drag_carries_children() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 50.0, 50.0);
        ed.set_selection(vec![a.clone(), b.clone()]);
        let gid = ed.group_selection().unwrap();

        let tool = DragTool::begin(ed.state(), &gid, Point::ZERO).unwrap();
        tool.finish(&mut ed, Point::new(25.0, 25.0)).unwrap();

        assert!((ed.document().get(&a).unwrap().transform().x - 25.0).abs() < f64::EPSILON);
        assert!((ed.document().get(&b).unwrap().transform().x - 75.0).abs() < f64::EPSILON);
    }
}
