//! Scale gesture: resize via the eight selection handles, keeping the
//! opposite corner or edge fixed in scene space.

use super::{MAX_FONT_SIZE, MIN_ELEMENT_SIZE, MIN_FONT_SIZE, Modifiers, ScaleHandle};
use crate::editor::{CanvasEditor, EditorError};
use crate::element::{Element, ElementId, ScalePatch};
use crate::geometry::{self, rotate_vec};
use crate::state::CanvasRuntimeState;
use kurbo::{Point, Rect, Size, Vec2};

/// Single-element scale: pointer deltas are projected into the element's
/// local (rotated) axes, and the anchor is the scene-space position of the
/// opposite corner/edge, which stays fixed for any rotation.
#[derive(Debug)]
struct SingleScale {
    id: ElementId,
    handle: ScaleHandle,
    start_point: Point,
    theta: f64,
    size0: Size,
    anchor: Point,
    font0: Option<f64>,
}

#[derive(Debug)]
struct Member {
    id: ElementId,
    center0: Point,
    size0: Size,
    font0: Option<f64>,
}

/// Multi-selection scale: the union AABB is scaled about its opposite
/// corner/edge and every member's center and size follow the per-axis
/// factors. Member rotations are untouched.
#[derive(Debug)]
struct GroupScale {
    handle: ScaleHandle,
    start_point: Point,
    bounds0: Rect,
    anchor: Point,
    members: Vec<Member>,
    min_w0: f64,
    min_h0: f64,
}

#[derive(Debug)]
enum Mode {
    Single(SingleScale),
    Group(GroupScale),
}

/// An in-progress scale gesture over the current selection.
#[derive(Debug)]
pub struct ScaleTool {
    mode: Mode,
}

impl ScaleTool {
    /// Start scaling the selection by `handle` from a scene-space pointer
    /// position. One sized element scales individually (honoring its
    /// rotation); two or more scale as a group about the union bounds.
    /// Returns `None` when the selection holds nothing scalable.
    pub fn begin(
        state: &CanvasRuntimeState,
        handle: ScaleHandle,
        scene_point: Point,
    ) -> Option<ScaleTool> {
        let scalable: Vec<&Element> = state
            .selection
            .selected_ids
            .iter()
            .filter_map(|id| state.document.get(id))
            .filter(|e| !e.locked() && e.size().is_some())
            .collect();

        let mode = match scalable.as_slice() {
            [] => return None,
            [element] => {
                let size0 = element.size()?;
                let transform = element.transform();
                let theta = transform.rotation;
                let dir = handle.dir();
                let center0 = transform.center(size0);
                let anchor = center0
                    + rotate_vec(
                        Vec2::new(-dir.x * size0.width / 2.0, -dir.y * size0.height / 2.0),
                        theta,
                    );
                Mode::Single(SingleScale {
                    id: element.id().clone(),
                    handle,
                    start_point: scene_point,
                    theta,
                    size0,
                    anchor,
                    font0: font_size_of(element),
                })
            }
            many => {
                let mut bounds0: Option<Rect> = None;
                let mut members = Vec::with_capacity(many.len());
                let mut min_w0 = f64::INFINITY;
                let mut min_h0 = f64::INFINITY;
                for element in many {
                    let size0 = element.size()?;
                    let aabb = geometry::aabb(element.transform(), size0);
                    bounds0 = Some(match bounds0 {
                        Some(b) => b.union(aabb),
                        None => aabb,
                    });
                    min_w0 = min_w0.min(size0.width);
                    min_h0 = min_h0.min(size0.height);
                    members.push(Member {
                        id: element.id().clone(),
                        center0: element.transform().center(size0),
                        size0,
                        font0: font_size_of(element),
                    });
                }
                let bounds0 = bounds0?;
                // Zero-extent union bounds leave no axis to derive factors
                // from; refuse the gesture.
                if bounds0.width() <= 0.0 || bounds0.height() <= 0.0 {
                    return None;
                }
                let dir = handle.dir();
                let anchor = Point::new(
                    match dir.x.partial_cmp(&0.0) {
                        Some(std::cmp::Ordering::Greater) => bounds0.x0,
                        Some(std::cmp::Ordering::Less) => bounds0.x1,
                        _ => bounds0.center().x,
                    },
                    match dir.y.partial_cmp(&0.0) {
                        Some(std::cmp::Ordering::Greater) => bounds0.y0,
                        Some(std::cmp::Ordering::Less) => bounds0.y1,
                        _ => bounds0.center().y,
                    },
                );
                Mode::Group(GroupScale {
                    handle,
                    start_point: scene_point,
                    bounds0,
                    anchor,
                    members,
                    min_w0,
                    min_h0,
                })
            }
        };
        Some(ScaleTool { mode })
    }

    /// Preview geometry for the current pointer location.
    pub fn update(&self, scene_point: Point, modifiers: Modifiers) -> Vec<(ElementId, ScalePatch)> {
        match &self.mode {
            Mode::Single(single) => vec![single.patch_at(scene_point, modifiers)],
            Mode::Group(group) => group.patches_at(scene_point, modifiers),
        }
    }

    /// Commit the scale as a single history entry.
    pub fn finish(
        self,
        editor: &mut CanvasEditor,
        scene_point: Point,
        modifiers: Modifiers,
    ) -> Result<(), EditorError> {
        let patches = self.update(scene_point, modifiers);
        editor.apply_scales(&patches)
    }
}

fn font_size_of(element: &Element) -> Option<f64> {
    match element {
        Element::Text(text) => Some(text.font_size),
        Element::Shape(_) | Element::Image(_) | Element::Group(_) => None,
    }
}

impl SingleScale {
    fn patch_at(&self, scene_point: Point, modifiers: Modifiers) -> (ElementId, ScalePatch) {
        let dir = self.handle.dir();
        // Pointer travel, projected into the element's local axes so the
        // gesture tracks the handle regardless of rotation.
        let local = rotate_vec(scene_point - self.start_point, -self.theta);

        let mut new_w = if dir.x != 0.0 {
            (self.size0.width + dir.x * local.x).max(MIN_ELEMENT_SIZE)
        } else {
            self.size0.width
        };
        let mut new_h = if dir.y != 0.0 {
            (self.size0.height + dir.y * local.y).max(MIN_ELEMENT_SIZE)
        } else {
            self.size0.height
        };

        // Text keeps its aspect on corner handles; shift forces it anywhere.
        let lock_aspect = modifiers.shift || (self.font0.is_some() && self.handle.is_corner());
        if lock_aspect {
            let rw = new_w / self.size0.width;
            let rh = new_h / self.size0.height;
            let ratio = if (rw - 1.0).abs() >= (rh - 1.0).abs() {
                rw
            } else {
                rh
            };
            new_w = (self.size0.width * ratio).max(MIN_ELEMENT_SIZE);
            new_h = (self.size0.height * ratio).max(MIN_ELEMENT_SIZE);
        }

        // The anchor stays fixed: the new center sits at the rotated
        // half-extent offset from it.
        let new_center = self.anchor
            + rotate_vec(
                Vec2::new(dir.x * new_w / 2.0, dir.y * new_h / 2.0),
                self.theta,
            );
        let position = Point::new(new_center.x - new_w / 2.0, new_center.y - new_h / 2.0);

        let font_size = if self.handle.is_corner() {
            self.font0
                .map(|f0| (f0 * new_w / self.size0.width).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
        } else {
            None
        };

        (
            self.id.clone(),
            ScalePatch {
                position,
                size: Size::new(new_w, new_h),
                font_size,
            },
        )
    }
}

impl GroupScale {
    fn patches_at(&self, scene_point: Point, modifiers: Modifiers) -> Vec<(ElementId, ScalePatch)> {
        let dir = self.handle.dir();
        let d = scene_point - self.start_point;

        let mut fx = if dir.x != 0.0 {
            (self.bounds0.width() + dir.x * d.x) / self.bounds0.width()
        } else {
            1.0
        };
        let mut fy = if dir.y != 0.0 {
            (self.bounds0.height() + dir.y * d.y) / self.bounds0.height()
        } else {
            1.0
        };
        if modifiers.shift {
            let dominant = if (fx - 1.0).abs() >= (fy - 1.0).abs() {
                fx
            } else {
                fy
            };
            fx = dominant;
            fy = dominant;
        }
        // Floor the factors only against shrinking: a member already below
        // the minimum must not force an upscale on an untouched axis.
        fx = fx.max((MIN_ELEMENT_SIZE / self.min_w0).min(1.0));
        fy = fy.max((MIN_ELEMENT_SIZE / self.min_h0).min(1.0));

        self.members
            .iter()
            .map(|member| {
                let new_center = Point::new(
                    self.anchor.x + (member.center0.x - self.anchor.x) * fx,
                    self.anchor.y + (member.center0.y - self.anchor.y) * fy,
                );
                let size = Size::new(member.size0.width * fx, member.size0.height * fy);
                let position = Point::new(
                    new_center.x - size.width / 2.0,
                    new_center.y - size.height / 2.0,
                );
                let font_size = if self.handle.is_corner() {
                    member
                        .font0
                        .map(|f0| (f0 * fx).clamp(MIN_FONT_SIZE, MAX_FONT_SIZE))
                } else {
                    None
                };
                (
                    member.id.clone(),
                    ScalePatch {
                        position,
                        size,
                        font_size,
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::{AddOptions, CanvasEditor};
    use crate::element::{ElementPatch, ShapeKind, TransformPatch};
    use crate::id::SequentialIds;

    const EPS: f64 = 1e-9;

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
    fn test_bottom_right_grows_from_top_left_anchor() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 100.0, 100.0);
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(200.0, 200.0))
            .unwrap();
        tool.finish(&mut ed, Point::new(250.0, 250.0), Modifiers::NONE)
            .unwrap();

        let element = ed.document().get(&id).unwrap();
        let t = element.transform();
        assert!((t.x - 100.0).abs() < EPS);
        assert!((t.y - 100.0).abs() < EPS);
        assert_eq!(element.size().unwrap(), Size::new(150.0, 150.0));
    }

    #[test]
    fn test_edge_handle_scales_one_axis() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 0.0, 0.0);
        ed.set_selection(vec![id.clone()]);

        let tool =
            ScaleTool::begin(ed.state(), ScaleHandle::Right, Point::new(100.0, 50.0)).unwrap();
        tool.finish(&mut ed, Point::new(150.0, 70.0), Modifiers::NONE)
            .unwrap();

        let element = ed.document().get(&id).unwrap();
        assert_eq!(element.size().unwrap(), Size::new(150.0, 100.0));
        // Left edge (the anchor) did not move; vertical travel is ignored.
        assert!((element.transform().x).abs() < EPS);
        assert!((element.transform().y).abs() < EPS);
    }

    #[test]
    fn test_anchor_stays_fixed_under_rotation() {
        for step in 0..12 {
            let theta = step as f64 * 30.0;
            let mut ed = editor();
            let id = rect_at(&mut ed, 100.0, 100.0);
            ed.transform_element(
                &id,
                TransformPatch {
                    rotation: Some(theta),
                    ..Default::default()
                },
            )
            .unwrap();
            ed.set_selection(vec![id.clone()]);

            let dir = ScaleHandle::BottomRight.dir();
            let before = ed.document().get(&id).unwrap();
            let size0 = before.size().unwrap();
            let anchor = before.transform().center(size0)
                + rotate_vec(
                    Vec2::new(-dir.x * size0.width / 2.0, -dir.y * size0.height / 2.0),
                    theta,
                );

            let tool =
                ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(0.0, 0.0))
                    .unwrap();
            tool.finish(&mut ed, Point::new(37.0, -12.0), Modifiers::NONE)
                .unwrap();

            let after = ed.document().get(&id).unwrap();
            let size1 = after.size().unwrap();
            let anchor_after = after.transform().center(size1)
                + rotate_vec(
                    Vec2::new(-dir.x * size1.width / 2.0, -dir.y * size1.height / 2.0),
                    theta,
                );
            assert!(
                (anchor_after.x - anchor.x).abs() < 1e-9
                    && (anchor_after.y - anchor.y).abs() < 1e-9,
                "anchor drifted at rotation {theta}"
            );
            // Rotation is untouched by the scale.
            assert!((after.transform().rotation - theta).abs() < EPS);
        }
    }

    #[test]
    fn test_rotated_scale_follows_local_axes() {
        // At 90 degrees the bottom-right handle points along scene (-x, +y);
        // a pointer move of scene (-50, +50) is local (+50, +50) and must
        // enlarge the element along its own edges.
        let mut ed = editor();
        let id = rect_at(&mut ed, 100.0, 100.0);
        ed.transform_element(
            &id,
            TransformPatch {
                rotation: Some(90.0),
                ..Default::default()
            },
        )
        .unwrap();
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(100.0, 200.0))
            .unwrap();
        tool.finish(&mut ed, Point::new(50.0, 250.0), Modifiers::NONE)
            .unwrap();

        let element = ed.document().get(&id).unwrap();
        assert_eq!(element.size().unwrap(), Size::new(150.0, 150.0));
        // New top-left keeps the rotated anchor (scene (200,100)) fixed.
        assert!((element.transform().x - 50.0).abs() < 1e-9);
        assert!((element.transform().y - 100.0).abs() < 1e-9);
        assert!((element.transform().rotation - 90.0).abs() < EPS);
    }

    #[test]
    fn test_minimum_size_clamp() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 0.0, 0.0);
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(100.0, 100.0))
            .unwrap();
        // Drag far past the anchor.
        tool.finish(&mut ed, Point::new(-500.0, -500.0), Modifiers::NONE)
            .unwrap();

        assert_eq!(
            ed.document().get(&id).unwrap().size().unwrap(),
            Size::new(MIN_ELEMENT_SIZE, MIN_ELEMENT_SIZE)
        );
    }

    #[test]
    fn test_shift_locks_aspect_on_rect() {
        let mut ed = editor();
        let id = rect_at(&mut ed, 0.0, 0.0);
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(100.0, 100.0))
            .unwrap();
        // Dominant axis is x (+100); y (+10) follows.
        tool.finish(&mut ed, Point::new(200.0, 110.0), Modifiers::shift())
            .unwrap();

        assert_eq!(
            ed.document().get(&id).unwrap().size().unwrap(),
            Size::new(200.0, 200.0)
        );
    }

    #[test]
    fn test_text_corner_scale_adjusts_font() {
        let mut ed = editor();
        // Default text: 100x32 box, 16pt font.
        let id = ed.add_text(AddOptions {
            position: Some(Point::ZERO),
            ..Default::default()
        });
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(100.0, 32.0))
            .unwrap();
        // Width doubles; text corners lock aspect, font follows the width.
        tool.finish(&mut ed, Point::new(200.0, 32.0), Modifiers::NONE)
            .unwrap();

        let element = ed.document().get(&id).unwrap();
        assert_eq!(element.size().unwrap(), Size::new(200.0, 64.0));
        if let Element::Text(text) = element {
            assert!((text.font_size - 32.0).abs() < EPS);
        } else {
            panic!("expected text");
        }
    }

    #[test]
    fn test_text_font_clamps_at_bounds() {
        let mut ed = editor();
        let id = ed.add_text(AddOptions {
            position: Some(Point::ZERO),
            ..Default::default()
        });
        ed.set_selection(vec![id.clone()]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(100.0, 32.0))
            .unwrap();
        // 10x width would be 160pt; clamped to 72.
        tool.finish(&mut ed, Point::new(1000.0, 32.0), Modifiers::NONE)
            .unwrap();

        if let Element::Text(text) = ed.document().get(&id).unwrap() {
            assert!((text.font_size - MAX_FONT_SIZE).abs() < EPS);
        } else {
            panic!("expected text");
        }
    }

    #[test]
    fn test_text_edge_scale_leaves_font_alone() {
        let mut ed = editor();
        let id = ed.add_text(AddOptions {
            position: Some(Point::ZERO),
            ..Default::default()
        });
        ed.set_selection(vec![id.clone()]);

        let tool =
            ScaleTool::begin(ed.state(), ScaleHandle::Right, Point::new(100.0, 16.0)).unwrap();
        tool.finish(&mut ed, Point::new(300.0, 16.0), Modifiers::NONE)
            .unwrap();

        if let Element::Text(text) = ed.document().get(&id).unwrap() {
            assert!((text.font_size - 16.0).abs() < EPS);
            assert!((text.size.width - 300.0).abs() < EPS);
        } else {
            panic!("expected text");
        }
    }

    #[test]
    fn test_group_scale_keeps_relative_layout() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 200.0, 0.0);
        // Give b a rotation to verify it survives.
        ed.transform_element(
            &b,
            TransformPatch {
                rotation: Some(45.0),
                ..Default::default()
            },
        )
        .unwrap();
        ed.set_selection(vec![a.clone(), b.clone()]);

        // Union bounds [0,300]x[0,100]; BR drag doubling both axes.
        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(300.0, 100.0))
            .unwrap();
        tool.finish(&mut ed, Point::new(600.0, 200.0), Modifiers::NONE)
            .unwrap();

        let ea = ed.document().get(&a).unwrap();
        let eb = ed.document().get(&b).unwrap();
        assert_eq!(ea.size().unwrap(), Size::new(200.0, 200.0));
        assert_eq!(eb.size().unwrap(), Size::new(200.0, 200.0));
        // Centers scale about the top-left anchor (0,0): (50,50)->(100,100),
        // (250,50)->(500,100).
        assert!((ea.transform().x - 0.0).abs() < EPS);
        assert!((ea.transform().y - 0.0).abs() < EPS);
        assert!((eb.transform().x - 400.0).abs() < EPS);
        assert!((eb.transform().y - 0.0).abs() < EPS);
        assert!((eb.transform().rotation - 45.0).abs() < EPS);

        // One gesture, one undo step.
        assert!(ed.undo());
        assert_eq!(ed.document().get(&a).unwrap().size().unwrap(), Size::new(100.0, 100.0));
    }

    #[test]
    fn test_group_edge_handle_leaves_other_axis_alone() {
        let mut ed = editor();
        // One member already narrower than the minimum size.
        let a = ed.add_shape(
            ShapeKind::Rect,
            AddOptions {
                position: Some(Point::ZERO),
                size: Some(Size::new(5.0, 100.0)),
                ..Default::default()
            },
        );
        let b = rect_at(&mut ed, 100.0, 0.0);
        ed.set_selection(vec![a.clone(), b.clone()]);

        // Bottom handle, zero pointer travel: nothing may move or resize —
        // in particular the sub-minimum width must not be forced upward.
        let tool =
            ScaleTool::begin(ed.state(), ScaleHandle::Bottom, Point::new(100.0, 100.0)).unwrap();
        tool.finish(&mut ed, Point::new(100.0, 100.0), Modifiers::NONE)
            .unwrap();

        let ea = ed.document().get(&a).unwrap();
        let eb = ed.document().get(&b).unwrap();
        assert_eq!(ea.size().unwrap(), Size::new(5.0, 100.0));
        assert_eq!(eb.size().unwrap(), Size::new(100.0, 100.0));
        assert!((ea.transform().x).abs() < EPS);
        assert!((eb.transform().x - 100.0).abs() < EPS);

        // A vertical grow scales heights only; widths stay put.
        let tool =
            ScaleTool::begin(ed.state(), ScaleHandle::Bottom, Point::new(100.0, 100.0)).unwrap();
        tool.finish(&mut ed, Point::new(100.0, 150.0), Modifiers::NONE)
            .unwrap();

        let ea = ed.document().get(&a).unwrap();
        let eb = ed.document().get(&b).unwrap();
        assert_eq!(ea.size().unwrap(), Size::new(5.0, 150.0));
        assert_eq!(eb.size().unwrap(), Size::new(100.0, 150.0));
        assert!((ea.transform().x).abs() < EPS);
        assert!((eb.transform().x - 100.0).abs() < EPS);
    }

    #[test]
    fn test_group_begin_rejects_degenerate_bounds() {
        let mut ed = editor();
        let a = ed.add_shape(
            ShapeKind::Rect,
            AddOptions {
                position: Some(Point::ZERO),
                size: Some(Size::new(100.0, 0.0)),
                ..Default::default()
            },
        );
        let b = ed.add_shape(
            ShapeKind::Rect,
            AddOptions {
                position: Some(Point::new(200.0, 0.0)),
                size: Some(Size::new(100.0, 0.0)),
                ..Default::default()
            },
        );
        ed.set_selection(vec![a, b]);

        // Union bounds have zero height: no factor can be derived.
        assert!(ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::ZERO).is_none());
    }

    #[test]
    fn test_group_scale_member_minimum() {
        let mut ed = editor();
        let a = rect_at(&mut ed, 0.0, 0.0);
        let b = rect_at(&mut ed, 200.0, 0.0);
        ed.set_selection(vec![a.clone(), b]);

        let tool = ScaleTool::begin(ed.state(), ScaleHandle::BottomRight, Point::new(300.0, 100.0))
            .unwrap();
        // Collapse attempt: factors clamp so the smallest member stays >= 10.
        tool.finish(&mut ed, Point::new(-1000.0, -1000.0), Modifiers::NONE)
            .unwrap();

        let size = ed.document().get(&a).unwrap().size().unwrap();
        assert!(size.width >= MIN_ELEMENT_SIZE - EPS);
        assert!(size.height >= MIN_ELEMENT_SIZE - EPS);
    }

    #[test]
    fn test_begin_rejects_unscalable_selection() {
        let mut ed = editor();
        assert!(ScaleTool::begin(ed.state(), ScaleHandle::Top, Point::ZERO).is_none());

        let id = rect_at(&mut ed, 0.0, 0.0);
        ed.update_element(
            &id,
            ElementPatch {
                locked: Some(true),
                ..Default::default()
            },
        );
        ed.set_selection(vec![id]);
        assert!(ScaleTool::begin(ed.state(), ScaleHandle::Top, Point::ZERO).is_none());
    }
}
