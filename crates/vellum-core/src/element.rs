//! Element definitions for the canvas document.

use crate::geometry::{self, Transform};
use kurbo::{Point, Rect, Size};
use serde::{Deserialize, Serialize};

/// Unique identifier for elements. Opaque, globally unique within a document;
/// handed out by the ID service (see [`crate::id`]).
pub type ElementId = String;

/// Default width/height for newly created shapes, images and text boxes.
pub const DEFAULT_ELEMENT_SIZE: f64 = 100.0;
/// Default font size for new text elements.
pub const DEFAULT_FONT_SIZE: f64 = 16.0;
/// Default content for new text elements.
pub const DEFAULT_TEXT_CONTENT: &str = "Text";

/// Serializable color representation (RGBA8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    /// Default fill for new shapes (light gray).
    pub fn default_fill() -> Self {
        Self::new(224, 224, 224, 255)
    }
}

/// Fill and stroke properties shared by shape and text elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementStyle {
    /// Fill color (None = no fill).
    pub fill: Option<Rgba>,
    /// Stroke color.
    pub stroke: Rgba,
    /// Stroke width in scene units.
    pub stroke_width: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: Some(Rgba::default_fill()),
            stroke: Rgba::black(),
            stroke_width: 1.0,
        }
    }
}

/// Geometric shape variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    #[default]
    Rect,
    Circle,
    Triangle,
}

/// A geometric shape (rectangle, circle or triangle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeElement {
    pub id: ElementId,
    pub kind: ShapeKind,
    pub transform: Transform,
    pub size: Size,
    pub style: ElementStyle,
    pub visible: bool,
    pub locked: bool,
    pub parent_id: Option<ElementId>,
    pub z_index: u32,
    pub opacity: f64,
}

/// A text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextElement {
    pub id: ElementId,
    pub transform: Transform,
    pub size: Size,
    pub content: String,
    pub font_size: f64,
    pub style: ElementStyle,
    pub visible: bool,
    pub locked: bool,
    pub parent_id: Option<ElementId>,
    pub z_index: u32,
    pub opacity: f64,
}

/// An image element referencing external pixel data by source URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageElement {
    pub id: ElementId,
    pub transform: Transform,
    pub size: Size,
    /// Source URL or data URI; the engine treats it as opaque.
    pub src: String,
    /// Intrinsic pixel size of the source.
    pub natural_size: Size,
    pub visible: bool,
    pub locked: bool,
    pub parent_id: Option<ElementId>,
    pub z_index: u32,
    pub opacity: f64,
}

/// A group of elements. Carries no size of its own; its extent is derived
/// from its children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupElement {
    pub id: ElementId,
    pub transform: Transform,
    /// Child element ids, back to front.
    pub children_ids: Vec<ElementId>,
    pub visible: bool,
    pub locked: bool,
    pub parent_id: Option<ElementId>,
    pub z_index: u32,
    pub opacity: f64,
}

/// Tagged union over all element variants.
///
/// Matched exhaustively everywhere it is consumed, so adding a variant is a
/// compile-checked change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Element {
    Shape(ShapeElement),
    Text(TextElement),
    Image(ImageElement),
    Group(GroupElement),
}

impl ShapeElement {
    pub fn new(id: ElementId, kind: ShapeKind, position: Point) -> Self {
        Self {
            id,
            kind,
            transform: Transform::new(position.x, position.y),
            size: Size::new(DEFAULT_ELEMENT_SIZE, DEFAULT_ELEMENT_SIZE),
            style: ElementStyle::default(),
            visible: true,
            locked: false,
            parent_id: None,
            z_index: 0,
            opacity: 1.0,
        }
    }
}

impl TextElement {
    pub fn new(id: ElementId, position: Point) -> Self {
        Self {
            id,
            transform: Transform::new(position.x, position.y),
            size: Size::new(DEFAULT_ELEMENT_SIZE, DEFAULT_FONT_SIZE * 2.0),
            content: DEFAULT_TEXT_CONTENT.to_string(),
            font_size: DEFAULT_FONT_SIZE,
            style: ElementStyle {
                fill: Some(Rgba::black()),
                stroke: Rgba::black(),
                stroke_width: 0.0,
            },
            visible: true,
            locked: false,
            parent_id: None,
            z_index: 0,
            opacity: 1.0,
        }
    }
}

impl ImageElement {
    pub fn new(id: ElementId, src: String, natural_size: Size, position: Point) -> Self {
        Self {
            id,
            transform: Transform::new(position.x, position.y),
            size: Size::new(DEFAULT_ELEMENT_SIZE, DEFAULT_ELEMENT_SIZE),
            src,
            natural_size,
            visible: true,
            locked: false,
            parent_id: None,
            z_index: 0,
            opacity: 1.0,
        }
    }
}

impl GroupElement {
    pub fn new(id: ElementId, children_ids: Vec<ElementId>) -> Self {
        Self {
            id,
            transform: Transform::default(),
            children_ids,
            visible: true,
            locked: false,
            parent_id: None,
            z_index: 0,
            opacity: 1.0,
        }
    }
}

impl Element {
    pub fn id(&self) -> &ElementId {
        match self {
            Element::Shape(e) => &e.id,
            Element::Text(e) => &e.id,
            Element::Image(e) => &e.id,
            Element::Group(e) => &e.id,
        }
    }

    /// Replace the element's id. Used when pasting or duplicating so copies
    /// get fresh identities.
    pub fn set_id(&mut self, id: ElementId) {
        match self {
            Element::Shape(e) => e.id = id,
            Element::Text(e) => e.id = id,
            Element::Image(e) => e.id = id,
            Element::Group(e) => e.id = id,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            Element::Shape(e) => &e.transform,
            Element::Text(e) => &e.transform,
            Element::Image(e) => &e.transform,
            Element::Group(e) => &e.transform,
        }
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        match self {
            Element::Shape(e) => &mut e.transform,
            Element::Text(e) => &mut e.transform,
            Element::Image(e) => &mut e.transform,
            Element::Group(e) => &mut e.transform,
        }
    }

    /// The element's size, if it has one. Groups derive their extent from
    /// their children and expose no size.
    pub fn size(&self) -> Option<Size> {
        match self {
            Element::Shape(e) => Some(e.size),
            Element::Text(e) => Some(e.size),
            Element::Image(e) => Some(e.size),
            Element::Group(_) => None,
        }
    }

    pub fn set_size(&mut self, size: Size) {
        match self {
            Element::Shape(e) => e.size = size,
            Element::Text(e) => e.size = size,
            Element::Image(e) => e.size = size,
            Element::Group(_) => {}
        }
    }

    pub fn visible(&self) -> bool {
        match self {
            Element::Shape(e) => e.visible,
            Element::Text(e) => e.visible,
            Element::Image(e) => e.visible,
            Element::Group(e) => e.visible,
        }
    }

    pub fn locked(&self) -> bool {
        match self {
            Element::Shape(e) => e.locked,
            Element::Text(e) => e.locked,
            Element::Image(e) => e.locked,
            Element::Group(e) => e.locked,
        }
    }

    pub fn opacity(&self) -> f64 {
        match self {
            Element::Shape(e) => e.opacity,
            Element::Text(e) => e.opacity,
            Element::Image(e) => e.opacity,
            Element::Group(e) => e.opacity,
        }
    }

    pub fn parent_id(&self) -> Option<&ElementId> {
        match self {
            Element::Shape(e) => e.parent_id.as_ref(),
            Element::Text(e) => e.parent_id.as_ref(),
            Element::Image(e) => e.parent_id.as_ref(),
            Element::Group(e) => e.parent_id.as_ref(),
        }
    }

    pub fn set_parent_id(&mut self, parent: Option<ElementId>) {
        match self {
            Element::Shape(e) => e.parent_id = parent,
            Element::Text(e) => e.parent_id = parent,
            Element::Image(e) => e.parent_id = parent,
            Element::Group(e) => e.parent_id = parent,
        }
    }

    pub fn z_index(&self) -> u32 {
        match self {
            Element::Shape(e) => e.z_index,
            Element::Text(e) => e.z_index,
            Element::Image(e) => e.z_index,
            Element::Group(e) => e.z_index,
        }
    }

    pub fn set_z_index(&mut self, z: u32) {
        match self {
            Element::Shape(e) => e.z_index = z,
            Element::Text(e) => e.z_index = z,
            Element::Image(e) => e.z_index = z,
            Element::Group(e) => e.z_index = z,
        }
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Element::Group(_))
    }

    pub fn as_group(&self) -> Option<&GroupElement> {
        match self {
            Element::Group(g) => Some(g),
            _ => None,
        }
    }

    pub fn as_group_mut(&mut self) -> Option<&mut GroupElement> {
        match self {
            Element::Group(g) => Some(g),
            _ => None,
        }
    }

    /// Axis-aligned bounding box (ignoring rotation) for sized elements.
    pub fn aabb(&self) -> Option<Rect> {
        self.size().map(|size| geometry::aabb(self.transform(), size))
    }

    /// Test this element's AABB against a selection rectangle.
    pub fn intersects_rect(&self, rect: Rect) -> bool {
        self.aabb()
            .is_some_and(|bounds| geometry::rects_intersect(bounds, rect))
    }
}

/// Partial update for non-transform element fields.
///
/// Fields that do not apply to the target variant are silently ignored,
/// mirroring a shallow merge.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub visible: Option<bool>,
    pub locked: Option<bool>,
    /// Clamped into `[0, 1]` on apply.
    pub opacity: Option<f64>,
    pub fill: Option<Option<Rgba>>,
    pub stroke: Option<Rgba>,
    pub stroke_width: Option<f64>,
    pub size: Option<Size>,
    pub content: Option<String>,
    pub font_size: Option<f64>,
    pub src: Option<String>,
}

impl ElementPatch {
    /// Merge this patch into an element, replacing only the present fields.
    pub fn apply(&self, element: &mut Element) {
        if let Some(visible) = self.visible {
            match element {
                Element::Shape(e) => e.visible = visible,
                Element::Text(e) => e.visible = visible,
                Element::Image(e) => e.visible = visible,
                Element::Group(e) => e.visible = visible,
            }
        }
        if let Some(locked) = self.locked {
            match element {
                Element::Shape(e) => e.locked = locked,
                Element::Text(e) => e.locked = locked,
                Element::Image(e) => e.locked = locked,
                Element::Group(e) => e.locked = locked,
            }
        }
        if let Some(opacity) = self.opacity {
            let opacity = opacity.clamp(0.0, 1.0);
            match element {
                Element::Shape(e) => e.opacity = opacity,
                Element::Text(e) => e.opacity = opacity,
                Element::Image(e) => e.opacity = opacity,
                Element::Group(e) => e.opacity = opacity,
            }
        }
        if let Some(size) = self.size {
            element.set_size(size);
        }
        match element {
            Element::Shape(e) => {
                if let Some(fill) = self.fill {
                    e.style.fill = fill;
                }
                if let Some(stroke) = self.stroke {
                    e.style.stroke = stroke;
                }
                if let Some(width) = self.stroke_width {
                    e.style.stroke_width = width;
                }
            }
            Element::Text(e) => {
                if let Some(fill) = self.fill {
                    e.style.fill = fill;
                }
                if let Some(stroke) = self.stroke {
                    e.style.stroke = stroke;
                }
                if let Some(width) = self.stroke_width {
                    e.style.stroke_width = width;
                }
                if let Some(content) = &self.content {
                    e.content = content.clone();
                }
                if let Some(font_size) = self.font_size {
                    e.font_size = font_size;
                }
            }
            Element::Image(e) => {
                if let Some(src) = &self.src {
                    e.src = src.clone();
                }
            }
            Element::Group(_) => {}
        }
    }
}

/// Partial update for an element's transform.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransformPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub scale_x: Option<f64>,
    pub scale_y: Option<f64>,
    pub rotation: Option<f64>,
}

impl TransformPatch {
    pub fn position(x: f64, y: f64) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            ..Self::default()
        }
    }

    pub fn rotation(rotation: f64) -> Self {
        Self {
            rotation: Some(rotation),
            ..Self::default()
        }
    }

    pub fn apply(&self, transform: &mut Transform) {
        if let Some(x) = self.x {
            transform.x = x;
        }
        if let Some(y) = self.y {
            transform.y = y;
        }
        if let Some(scale_x) = self.scale_x {
            transform.scale_x = scale_x;
        }
        if let Some(scale_y) = self.scale_y {
            transform.scale_y = scale_y;
        }
        if let Some(rotation) = self.rotation {
            transform.rotation = rotation;
        }
    }
}

/// Atomic position+size update produced by a scale gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalePatch {
    /// New top-left position, derived so the gesture anchor stays fixed.
    pub position: Point,
    pub size: Size,
    /// New font size for corner-scaled text elements.
    pub font_size: Option<f64>,
}
