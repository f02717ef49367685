//! The mutation API: the only writer of runtime canvas state.
//!
//! Every operation computes a fresh [`CanvasRuntimeState`] (the previous one
//! is never mutated in place), decides history and persistence eligibility,
//! swaps the state, and synchronously notifies subscribers in registration
//! order. Operations either fully apply or are refused before any state is
//! replaced.

use crate::document::{CanvasDocument, InvariantError};
use crate::element::{
    Element, ElementId, ElementPatch, ElementStyle, GroupElement, ImageElement, ScalePatch,
    ShapeElement, ShapeKind, TextElement, TransformPatch,
};
use crate::history::History;
use crate::id::{IdProvider, UuidIds};
use crate::state::{CanvasRuntimeState, Clipboard, MarqueeSelection};
use crate::storage::{self, PersistenceGateway, StorageError, StorageResult};
use crate::viewport::ViewportState;
use kurbo::{Point, Size, Vec2};
use std::collections::HashMap;
use thiserror::Error;

/// Marquee rectangles below this size (either dimension, scene units) are
/// treated as accidental clicks and select nothing.
pub const MIN_MARQUEE_SIZE: f64 = 5.0;

/// Base offset applied to repeated pastes without a pointer position.
pub const DEFAULT_PASTE_OFFSET: Vec2 = Vec2::new(20.0, 20.0);

/// Editor operation errors.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    #[error("invalid document: {0}")]
    InvalidDocument(#[from] InvariantError),
}

/// Handle for removing a change listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&CanvasRuntimeState)>;

/// History/persistence eligibility of a committed state change.
#[derive(Debug, Clone, Copy)]
struct Commit {
    historyable: bool,
    persist: bool,
}

impl Commit {
    /// Document mutations: undoable and persisted.
    const DOCUMENT: Commit = Commit {
        historyable: true,
        persist: true,
    };
    /// View changes (pan/zoom/selection/marquee/clipboard): neither recorded
    /// nor persisted, so undo history is not flooded with view state.
    const VIEW: Commit = Commit {
        historyable: false,
        persist: false,
    };
}

/// Optional placement overrides for add-operations.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    pub position: Option<Point>,
    pub size: Option<Size>,
    pub style: Option<ElementStyle>,
}

/// The editor service: owns the runtime state, the history stacks, the id
/// source and the optional persistence gateway.
pub struct CanvasEditor {
    state: CanvasRuntimeState,
    history: History,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
    ids: Box<dyn IdProvider>,
    gateway: Option<Box<dyn PersistenceGateway>>,
    paste_count: u32,
    restoring: bool,
}

impl Default for CanvasEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl CanvasEditor {
    /// Create an editor with a fresh empty document and UUID ids.
    pub fn new() -> Self {
        Self::with_ids(Box::new(UuidIds))
    }

    /// Create an editor with an injected id provider.
    pub fn with_ids(mut ids: Box<dyn IdProvider>) -> Self {
        let document = CanvasDocument::new(ids.generate_next_id());
        Self {
            state: CanvasRuntimeState::new(document),
            history: History::new(),
            listeners: Vec::new(),
            next_subscription: 0,
            ids,
            gateway: None,
            paste_count: 0,
            restoring: false,
        }
    }

    /// Attach a persistence gateway. Saves are fire-and-forget; failures are
    /// logged and never roll back in-memory state.
    pub fn with_gateway(mut self, gateway: Box<dyn PersistenceGateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Current state, read-only. All writes go through the operations below.
    pub fn state(&self) -> &CanvasRuntimeState {
        &self.state
    }

    pub fn document(&self) -> &CanvasDocument {
        &self.state.document
    }

    pub fn viewport(&self) -> ViewportState {
        self.state.viewport
    }

    pub fn selected_ids(&self) -> &[ElementId] {
        &self.state.selection.selected_ids
    }

    // ----- subscriptions -----

    /// Register a change listener. It is invoked once immediately with the
    /// current state and again after every committed mutation.
    pub fn subscribe<F>(&mut self, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&CanvasRuntimeState) + 'static,
    {
        listener(&self.state);
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    fn notify(&mut self) {
        // Listeners only see &state, so reentrant mutation is impossible;
        // moving them out sidesteps the simultaneous borrow.
        let mut listeners = std::mem::take(&mut self.listeners);
        for (_, listener) in listeners.iter_mut() {
            listener(&self.state);
        }
        self.listeners = listeners;
    }

    fn persist(&mut self) {
        if let Some(gateway) = &self.gateway {
            let snapshot = self.state.persisted();
            if let Err(err) = storage::drive(gateway.save_state(&snapshot.document.id, &snapshot)) {
                log::warn!("persistence failed for {}: {err}", snapshot.document.id);
            }
        }
    }

    /// Swap in a fully-computed next state.
    fn commit(&mut self, next: CanvasRuntimeState, opts: Commit) {
        if opts.historyable && !self.restoring {
            self.history.record(self.state.clone());
        }
        self.state = next;
        if opts.persist {
            self.persist();
        }
        self.notify();
    }

    // ----- add operations -----

    /// Scene position for a new element when the caller gave none: the
    /// viewport origin offset by half the element size.
    fn default_spawn_position(&self, size: Size) -> Point {
        Point::new(
            self.state.viewport.x + size.width / 2.0,
            self.state.viewport.y + size.height / 2.0,
        )
    }

    fn insert_new(&mut self, element: Element) -> ElementId {
        let id = element.id().clone();
        let mut next = self.state.clone();
        next.document.insert(element);
        next.selection.selected_ids = vec![id.clone()];
        next.selection.marquee = None;
        self.commit(next, Commit::DOCUMENT);
        id
    }

    /// Create a default-styled shape, select it, and return its id.
    pub fn add_shape(&mut self, kind: ShapeKind, opts: AddOptions) -> ElementId {
        let id = self.ids.generate_next_id();
        let size = opts
            .size
            .unwrap_or_else(|| Size::new(crate::element::DEFAULT_ELEMENT_SIZE, crate::element::DEFAULT_ELEMENT_SIZE));
        let position = opts
            .position
            .unwrap_or_else(|| self.default_spawn_position(size));
        let mut shape = ShapeElement::new(id, kind, position);
        shape.size = size;
        if let Some(style) = opts.style {
            shape.style = style;
        }
        self.insert_new(Element::Shape(shape))
    }

    /// Create a text element, select it, and return its id.
    pub fn add_text(&mut self, opts: AddOptions) -> ElementId {
        let id = self.ids.generate_next_id();
        let mut text = TextElement::new(id, Point::ZERO);
        if let Some(size) = opts.size {
            text.size = size;
        }
        let position = opts
            .position
            .unwrap_or_else(|| self.default_spawn_position(text.size));
        text.transform.x = position.x;
        text.transform.y = position.y;
        if let Some(style) = opts.style {
            text.style = style;
        }
        self.insert_new(Element::Text(text))
    }

    /// Create an image element, select it, and return its id.
    pub fn add_image(&mut self, src: String, natural_size: Size, opts: AddOptions) -> ElementId {
        let id = self.ids.generate_next_id();
        let mut image = ImageElement::new(id, src, natural_size, Point::ZERO);
        if let Some(size) = opts.size {
            image.size = size;
        }
        let position = opts
            .position
            .unwrap_or_else(|| self.default_spawn_position(image.size));
        image.transform.x = position.x;
        image.transform.y = position.y;
        self.insert_new(Element::Image(image))
    }

    // ----- update operations -----

    /// Merge a patch into an element's non-transform fields.
    ///
    /// Soft-fails on an unknown id: logs a warning and returns without
    /// mutating. Callers cannot distinguish this from an empty patch.
    pub fn update_element(&mut self, id: &ElementId, patch: ElementPatch) {
        if !self.state.document.contains(id) {
            log::warn!("update_element: unknown element {id}, ignoring");
            return;
        }
        let mut next = self.state.clone();
        if let Some(element) = next.document.get_mut(id) {
            patch.apply(element);
        }
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
    }

    /// Merge a patch into an element's transform only. Hard-fails on an
    /// unknown id; tool-layer callers validate existence up front.
    pub fn transform_element(
        &mut self,
        id: &ElementId,
        patch: TransformPatch,
    ) -> Result<(), EditorError> {
        if !self.state.document.contains(id) {
            return Err(EditorError::ElementNotFound(id.clone()));
        }
        let mut next = self.state.clone();
        if let Some(element) = next.document.get_mut(id) {
            patch.apply(element.transform_mut());
        }
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
        Ok(())
    }

    /// Apply transform patches to several elements as one history entry.
    ///
    /// Used by gesture tools committing a multi-element drag. Hard-fails
    /// without touching anything if any id is unknown.
    pub fn transform_elements(
        &mut self,
        patches: &[(ElementId, TransformPatch)],
    ) -> Result<(), EditorError> {
        if patches.is_empty() {
            return Ok(());
        }
        for (id, _) in patches {
            if !self.state.document.contains(id) {
                return Err(EditorError::ElementNotFound(id.clone()));
            }
        }
        let mut next = self.state.clone();
        for (id, patch) in patches {
            if let Some(element) = next.document.get_mut(id) {
                patch.apply(element.transform_mut());
            }
        }
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
        Ok(())
    }

    /// Atomic position + size (+ font size) write from a scale gesture, so a
    /// single element scale is a single history entry.
    pub fn apply_scale(&mut self, id: &ElementId, patch: ScalePatch) -> Result<(), EditorError> {
        if !self.state.document.contains(id) {
            return Err(EditorError::ElementNotFound(id.clone()));
        }
        let mut next = self.state.clone();
        if let Some(element) = next.document.get_mut(id) {
            let transform = element.transform_mut();
            transform.x = patch.position.x;
            transform.y = patch.position.y;
            element.set_size(patch.size);
            if let (Element::Text(text), Some(font_size)) = (element, patch.font_size) {
                text.font_size = font_size;
            }
        }
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
        Ok(())
    }

    /// Apply scale patches to several elements as one history entry.
    pub fn apply_scales(&mut self, patches: &[(ElementId, ScalePatch)]) -> Result<(), EditorError> {
        if patches.is_empty() {
            return Ok(());
        }
        for (id, _) in patches {
            if !self.state.document.contains(id) {
                return Err(EditorError::ElementNotFound(id.clone()));
            }
        }
        let mut next = self.state.clone();
        for (id, patch) in patches {
            if let Some(element) = next.document.get_mut(id) {
                let transform = element.transform_mut();
                transform.x = patch.position.x;
                transform.y = patch.position.y;
                element.set_size(patch.size);
                if let (Element::Text(text), Some(font_size)) = (element, patch.font_size) {
                    text.font_size = font_size;
                }
            }
        }
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
        Ok(())
    }

    // ----- delete operations -----

    /// Delete an element (and, for groups, its descendants). The element
    /// leaves `elements`, `root_element_ids` and `selected_ids` in one step.
    pub fn delete_element(&mut self, id: &ElementId) -> Result<(), EditorError> {
        if !self.state.document.contains(id) {
            return Err(EditorError::ElementNotFound(id.clone()));
        }
        let mut next = self.state.clone();
        let removed = next.document.remove_subtree(id);
        Self::prune_selection(&mut next, &removed);
        self.commit(next, Commit::DOCUMENT);
        Ok(())
    }

    /// Delete every selected element. No-op on an empty selection.
    pub fn delete_selection(&mut self) {
        if self.state.selection.selected_ids.is_empty() {
            return;
        }
        let mut next = self.state.clone();
        let targets = next.selection.selected_ids.clone();
        let mut removed = Vec::new();
        for id in &targets {
            removed.extend(next.document.remove_subtree(id));
        }
        Self::prune_selection(&mut next, &removed);
        self.commit(next, Commit::DOCUMENT);
    }

    fn prune_selection(state: &mut CanvasRuntimeState, removed: &[ElementId]) {
        state
            .selection
            .selected_ids
            .retain(|id| !removed.contains(id));
        if let Some(hovered) = &state.selection.hovered_id
            && removed.contains(hovered)
        {
            state.selection.hovered_id = None;
        }
    }

    // ----- selection operations (view-only: no history, no persistence) -----

    /// Replace the selection. Unknown ids are dropped.
    pub fn set_selection(&mut self, ids: Vec<ElementId>) {
        let mut next = self.state.clone();
        next.selection.selected_ids = ids
            .into_iter()
            .filter(|id| next.document.contains(id))
            .collect();
        self.commit(next, Commit::VIEW);
    }

    /// Add an element to the selection (no-op if unknown or present).
    pub fn add_to_selection(&mut self, id: &ElementId) {
        if !self.state.document.contains(id) || self.state.selection.selected_ids.contains(id) {
            return;
        }
        let mut next = self.state.clone();
        next.selection.selected_ids.push(id.clone());
        self.commit(next, Commit::VIEW);
    }

    /// Toggle an element's membership in the selection.
    pub fn toggle_selection(&mut self, id: &ElementId) {
        if !self.state.document.contains(id) {
            return;
        }
        let mut next = self.state.clone();
        if next.selection.selected_ids.contains(id) {
            next.selection.selected_ids.retain(|sid| sid != id);
        } else {
            next.selection.selected_ids.push(id.clone());
        }
        self.commit(next, Commit::VIEW);
    }

    /// Clear selection, hover and any in-progress marquee.
    pub fn reset_selection(&mut self) {
        let mut next = self.state.clone();
        next.selection = Default::default();
        self.commit(next, Commit::VIEW);
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        let mut next = self.state.clone();
        next.selection.hovered_id = id.filter(|id| next.document.contains(id));
        self.commit(next, Commit::VIEW);
    }

    // ----- viewport operations (view-only) -----

    pub fn set_viewport(&mut self, viewport: ViewportState) {
        let mut next = self.state.clone();
        next.viewport = ViewportState::new(viewport.x, viewport.y, viewport.scale);
        self.commit(next, Commit::VIEW);
    }

    /// Pan by a scene-space delta.
    pub fn move_viewport(&mut self, delta: Vec2) {
        let mut next = self.state.clone();
        next.viewport.pan(delta);
        self.commit(next, Commit::VIEW);
    }

    pub fn reset_viewport(&mut self) {
        let mut next = self.state.clone();
        next.viewport.reset();
        self.commit(next, Commit::VIEW);
    }

    /// Zoom keeping the scene point `anchor` fixed on screen. Silently no-ops
    /// on a zero delta or an out-of-range resulting scale.
    pub fn zoom_at(&mut self, anchor: Point, delta_scale: f64) -> bool {
        let mut next = self.state.clone();
        if !next.viewport.zoom_at(anchor, delta_scale) {
            return false;
        }
        self.commit(next, Commit::VIEW);
        true
    }

    // ----- clipboard -----

    /// Snapshot the selected elements (and group descendants) into the
    /// clipboard as detached copies with fresh ids, and reset the paste
    /// offset counter. Not persisted, not historyable.
    pub fn copy_selection(&mut self) {
        if self.state.selection.selected_ids.is_empty() {
            return;
        }
        // Top-level selected ids in z-order first, then descendants, so the
        // clipboard's first element is the backmost selected root.
        let mut ordered: Vec<ElementId> = Vec::new();
        for id in &self.state.document.root_element_ids {
            if self.state.selection.selected_ids.contains(id) {
                ordered.extend(self.state.document.subtree_ids(id));
            }
        }

        let mut id_map: HashMap<ElementId, ElementId> = HashMap::new();
        for old in &ordered {
            id_map.insert(old.clone(), self.ids.generate_next_id());
        }

        let mut copies = Vec::with_capacity(ordered.len());
        for old in &ordered {
            if let Some(element) = self.state.document.get(old) {
                copies.push(Self::remap_element(element.clone(), &id_map));
            }
        }

        let mut next = self.state.clone();
        next.clipboard = Some(Clipboard::new(copies));
        self.paste_count = 0;
        self.commit(next, Commit::VIEW);
    }

    fn remap_element(mut element: Element, id_map: &HashMap<ElementId, ElementId>) -> Element {
        if let Some(new_id) = id_map.get(element.id()) {
            element.set_id(new_id.clone());
        }
        let parent = element
            .parent_id()
            .and_then(|p| id_map.get(p))
            .cloned();
        element.set_parent_id(parent);
        if let Some(group) = element.as_group_mut() {
            group.children_ids = group
                .children_ids
                .iter()
                .filter_map(|c| id_map.get(c))
                .cloned()
                .collect();
        }
        element
    }

    /// Paste the clipboard contents.
    ///
    /// With a `pointer_position`, the first clipboard element moves to that
    /// point and every other pasted element keeps its relative offset.
    /// Without one, a cumulative offset (`base * paste_count`) is applied,
    /// growing on each repeated paste. Pasted elements get fresh ids and
    /// become the selection; their top-level ids are returned.
    pub fn paste(&mut self, offset: Option<Vec2>, pointer_position: Option<Point>) -> Vec<ElementId> {
        let Some(clipboard) = self.state.clipboard.clone() else {
            return Vec::new();
        };
        if clipboard.elements.is_empty() {
            return Vec::new();
        }

        let delta = match pointer_position {
            Some(pointer) => {
                let first = clipboard.elements[0].transform().position();
                pointer - first
            }
            None => {
                let base = offset.unwrap_or(DEFAULT_PASTE_OFFSET);
                self.paste_count += 1;
                base * self.paste_count as f64
            }
        };

        let mut id_map: HashMap<ElementId, ElementId> = HashMap::new();
        for element in &clipboard.elements {
            id_map.insert(element.id().clone(), self.ids.generate_next_id());
        }

        let mut next = self.state.clone();
        let mut root_ids = Vec::new();
        for element in &clipboard.elements {
            let mut copy = Self::remap_element(element.clone(), &id_map);
            *copy.transform_mut() = copy.transform().translated(delta);
            if copy.parent_id().is_none() {
                root_ids.push(copy.id().clone());
                next.document.insert(copy);
            } else {
                next.document.elements.insert(copy.id().clone(), copy);
            }
        }
        next.selection.selected_ids = root_ids.clone();
        next.document.touch();
        self.commit(next, Commit::DOCUMENT);
        root_ids
    }

    // ----- marquee selection (view-only) -----

    pub fn start_marquee(&mut self, point: Point) {
        let mut next = self.state.clone();
        next.selection.marquee = Some(MarqueeSelection::new(point));
        self.commit(next, Commit::VIEW);
    }

    pub fn update_marquee(&mut self, point: Point) {
        if self.state.selection.marquee.is_none() {
            return;
        }
        let mut next = self.state.clone();
        if let Some(marquee) = &mut next.selection.marquee {
            marquee.end_point = point;
        }
        self.commit(next, Commit::VIEW);
    }

    /// Evaluate the marquee and select every visible, sized top-level element
    /// whose AABB intersects it. Rectangles under the 5-unit threshold leave
    /// the selection untouched. The marquee state is always cleared.
    pub fn finish_marquee(&mut self, point: Point) -> Vec<ElementId> {
        let Some(mut marquee) = self.state.selection.marquee else {
            return Vec::new();
        };
        marquee.end_point = point;
        let rect = marquee.rect();

        let mut next = self.state.clone();
        next.selection.marquee = None;

        if rect.width() < MIN_MARQUEE_SIZE || rect.height() < MIN_MARQUEE_SIZE {
            self.commit(next, Commit::VIEW);
            return Vec::new();
        }

        let hits: Vec<ElementId> = next
            .document
            .roots_ordered()
            .filter(|e| e.visible() && e.size().is_some() && e.intersects_rect(rect))
            .map(|e| e.id().clone())
            .collect();
        next.selection.selected_ids = hits.clone();
        self.commit(next, Commit::VIEW);
        hits
    }

    /// Discard an in-progress marquee without evaluating selection.
    pub fn cancel_marquee(&mut self) {
        if self.state.selection.marquee.is_none() {
            return;
        }
        let mut next = self.state.clone();
        next.selection.marquee = None;
        self.commit(next, Commit::VIEW);
    }

    // ----- z-order -----

    pub fn bring_to_front(&mut self, id: &ElementId) -> Result<(), EditorError> {
        self.reorder(id, |doc, id| doc.bring_to_front(id))
    }

    pub fn send_to_back(&mut self, id: &ElementId) -> Result<(), EditorError> {
        self.reorder(id, |doc, id| doc.send_to_back(id))
    }

    pub fn bring_forward(&mut self, id: &ElementId) -> Result<(), EditorError> {
        self.reorder(id, |doc, id| doc.bring_forward(id))
    }

    pub fn send_backward(&mut self, id: &ElementId) -> Result<(), EditorError> {
        self.reorder(id, |doc, id| doc.send_backward(id))
    }

    fn reorder<F>(&mut self, id: &ElementId, op: F) -> Result<(), EditorError>
    where
        F: FnOnce(&mut CanvasDocument, &ElementId) -> bool,
    {
        if !self.state.document.contains(id) {
            return Err(EditorError::ElementNotFound(id.clone()));
        }
        let mut next = self.state.clone();
        if op(&mut next.document, id) {
            self.commit(next, Commit::DOCUMENT);
        }
        Ok(())
    }

    // ----- grouping -----

    /// Group the selected top-level elements. Returns the group id, or None
    /// when fewer than two top-level elements are selected.
    pub fn group_selection(&mut self) -> Option<ElementId> {
        let members: Vec<ElementId> = self
            .state
            .document
            .root_element_ids
            .iter()
            .filter(|id| self.state.selection.selected_ids.contains(id))
            .cloned()
            .collect();
        if members.len() < 2 {
            return None;
        }

        let group_id = self.ids.generate_next_id();
        let mut next = self.state.clone();

        // The group lands at the frontmost member's position in z-order.
        let max_pos = next
            .document
            .root_element_ids
            .iter()
            .enumerate()
            .filter(|(_, id)| members.contains(id))
            .map(|(pos, _)| pos)
            .max()?;

        for id in &members {
            if let Some(element) = next.document.get_mut(id) {
                element.set_parent_id(Some(group_id.clone()));
            }
        }
        next.document
            .root_element_ids
            .retain(|id| !members.contains(id));

        let group = GroupElement::new(group_id.clone(), members.clone());
        let insert_pos = max_pos
            .saturating_sub(members.len() - 1)
            .min(next.document.root_element_ids.len());
        next.document
            .root_element_ids
            .insert(insert_pos, group_id.clone());
        next.document.elements.insert(group_id.clone(), Element::Group(group));
        next.document.renumber_z();
        next.document.touch();
        next.selection.selected_ids = vec![group_id.clone()];
        self.commit(next, Commit::DOCUMENT);
        Some(group_id)
    }

    /// Dissolve a group, returning its children to the top level at the
    /// group's z-position. Returns the child ids, or None if `id` is not a
    /// group.
    pub fn ungroup(&mut self, id: &ElementId) -> Option<Vec<ElementId>> {
        let children = self.state.document.get(id)?.as_group()?.children_ids.clone();
        let mut next = self.state.clone();
        let pos = next
            .document
            .root_element_ids
            .iter()
            .position(|rid| rid == id)?;

        next.document.elements.remove(id);
        next.document.root_element_ids.retain(|rid| rid != id);
        for (i, child) in children.iter().enumerate() {
            if let Some(element) = next.document.get_mut(child) {
                element.set_parent_id(None);
            }
            next.document.root_element_ids.insert(pos + i, child.clone());
        }
        next.document.renumber_z();
        next.document.touch();
        next.selection.selected_ids = children.clone();
        self.commit(next, Commit::DOCUMENT);
        Some(children)
    }

    // ----- history -----

    /// Restore the previous snapshot. Returns false when there is nothing to
    /// undo or the snapshot was unusable.
    pub fn undo(&mut self) -> bool {
        match self.history.undo(&self.state) {
            Some(snapshot) => {
                self.restoring = true;
                self.state = snapshot;
                self.persist();
                self.notify();
                self.restoring = false;
                true
            }
            None => false,
        }
    }

    /// Re-apply the most recently undone snapshot.
    pub fn redo(&mut self) -> bool {
        match self.history.redo(&self.state) {
            Some(snapshot) => {
                self.restoring = true;
                self.state = snapshot;
                self.persist();
                self.notify();
                self.restoring = false;
                true
            }
            None => false,
        }
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // ----- document lifecycle -----

    /// Replace the runtime state from a persisted snapshot. Selection,
    /// clipboard and history are reset; a missing viewport means the default
    /// camera.
    pub fn load_persisted(&mut self, persisted: crate::state::PersistedState) -> Result<(), EditorError> {
        persisted.document.validate()?;
        let viewport = persisted
            .viewport
            .map(|v| ViewportState::new(v.x, v.y, v.scale))
            .unwrap_or_default();
        self.state = CanvasRuntimeState {
            document: persisted.document,
            viewport,
            selection: Default::default(),
            clipboard: None,
        };
        self.history.clear();
        self.paste_count = 0;
        self.notify();
        Ok(())
    }

    /// Project the current state into its persistable subset.
    pub fn persisted_state(&self) -> crate::state::PersistedState {
        self.state.persisted()
    }

    /// Load a document from the attached gateway. Returns `Ok(false)` when
    /// no gateway is attached or the document has never been saved.
    pub fn load_from_gateway(&mut self, doc_id: &str) -> StorageResult<bool> {
        let Some(gateway) = &self.gateway else {
            return Ok(false);
        };
        match storage::drive(gateway.load_state(doc_id))? {
            Some(persisted) => {
                self.load_persisted(persisted)
                    .map_err(|e| StorageError::Other(e.to_string()))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
