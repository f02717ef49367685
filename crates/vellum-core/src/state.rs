//! Runtime state composites: selection, clipboard, and the full editor state.

use crate::document::{CanvasDocument, InvariantError, now_millis};
use crate::element::{Element, ElementId};
use crate::viewport::ViewportState;
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};

/// An in-progress marquee drag, in scene coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MarqueeSelection {
    pub start_point: Point,
    pub end_point: Point,
}

impl MarqueeSelection {
    pub fn new(start: Point) -> Self {
        Self {
            start_point: start,
            end_point: start,
        }
    }

    /// Axis-aligned rectangle spanned by the two corners.
    pub fn rect(&self) -> Rect {
        Rect::new(
            self.start_point.x.min(self.end_point.x),
            self.start_point.y.min(self.end_point.y),
            self.start_point.x.max(self.end_point.x),
            self.start_point.y.max(self.end_point.y),
        )
    }
}

/// Which elements are selected, hovered, or being marquee-selected.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionState {
    pub selected_ids: Vec<ElementId>,
    pub hovered_id: Option<ElementId>,
    pub marquee: Option<MarqueeSelection>,
}

/// Detached copies of elements captured by a copy operation.
///
/// Clipboard elements are never live references into the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clipboard {
    pub elements: Vec<Element>,
    pub copied_at: u64,
}

impl Clipboard {
    pub fn new(elements: Vec<Element>) -> Self {
        Self {
            elements,
            copied_at: now_millis(),
        }
    }
}

/// The single source of truth for an editor instance.
///
/// Replaced wholesale (never mutated in place) on every committed change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasRuntimeState {
    pub document: CanvasDocument,
    pub viewport: ViewportState,
    pub selection: SelectionState,
    pub clipboard: Option<Clipboard>,
}

impl CanvasRuntimeState {
    pub fn new(document: CanvasDocument) -> Self {
        Self {
            document,
            viewport: ViewportState::default(),
            selection: SelectionState::default(),
            clipboard: None,
        }
    }

    /// Check document invariants plus the selection/deletion coupling:
    /// selected ids must reference live elements.
    pub fn validate(&self) -> Result<(), InvariantError> {
        self.document.validate()?;
        for id in &self.selection.selected_ids {
            if !self.document.contains(id) {
                return Err(InvariantError::DanglingRootId(id.clone()));
            }
        }
        Ok(())
    }

    /// Project the persistable subset of this state.
    pub fn persisted(&self) -> PersistedState {
        PersistedState {
            document: self.document.clone(),
            viewport: Some(self.viewport),
        }
    }
}

/// What gets written to and read from the persistence gateway.
///
/// Selection and clipboard are never persisted; an omitted viewport means the
/// engine default (`{0, 0, 1}`) on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedState {
    pub document: CanvasDocument,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportState>,
}
