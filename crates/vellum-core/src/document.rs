//! Canvas document: the element store and its ordering.

use crate::element::{Element, ElementId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

/// Millisecond timestamp for created/updated fields.
pub fn now_millis() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Structural invariant violation detected in a document.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvariantError {
    #[error("root order references missing element: {0}")]
    DanglingRootId(ElementId),
    #[error("element {child} names missing or non-group parent: {parent}")]
    BadParentRef { child: ElementId, parent: ElementId },
    #[error("group {group} references missing child: {child}")]
    DanglingChildId { group: ElementId, child: ElementId },
}

/// The persistent part of a canvas: all elements plus their z-order.
///
/// Invariants (checked by [`CanvasDocument::validate`]):
/// - every id in `root_element_ids` exists in `elements`;
/// - every `parent_id` names an existing group element;
/// - every group child id exists in `elements`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasDocument {
    /// Unique document identifier.
    pub id: String,
    /// Document title.
    #[serde(default)]
    pub title: String,
    /// All elements, keyed by id.
    pub elements: HashMap<ElementId, Element>,
    /// Top-level element ids, back to front.
    pub root_element_ids: Vec<ElementId>,
    /// Creation time, epoch milliseconds.
    pub created_at: u64,
    /// Last mutation time, epoch milliseconds.
    pub updated_at: u64,
}

impl CanvasDocument {
    /// Create a new empty document.
    pub fn new(id: String) -> Self {
        let now = now_millis();
        Self {
            id,
            title: "Untitled".to_string(),
            elements: HashMap::new(),
            root_element_ids: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Refresh the mutation timestamp.
    pub fn touch(&mut self) {
        self.updated_at = now_millis();
    }

    /// Insert a top-level element, appending it to the root order and
    /// assigning its z-index from its position.
    pub fn insert(&mut self, mut element: Element) {
        let id = element.id().clone();
        element.set_z_index(self.root_element_ids.len() as u32);
        self.root_element_ids.push(id.clone());
        self.elements.insert(id, element);
        self.touch();
    }

    pub fn get(&self, id: &ElementId) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &ElementId) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    pub fn contains(&self, id: &ElementId) -> bool {
        self.elements.contains_key(id)
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Top-level elements in z-order (back to front).
    pub fn roots_ordered(&self) -> impl Iterator<Item = &Element> {
        self.root_element_ids
            .iter()
            .filter_map(|id| self.elements.get(id))
    }

    /// Collect `id` plus all group descendants, depth first.
    pub fn subtree_ids(&self, id: &ElementId) -> Vec<ElementId> {
        let mut ids = Vec::new();
        let mut pending = vec![id.clone()];
        while let Some(current) = pending.pop() {
            if let Some(element) = self.elements.get(&current) {
                if let Some(group) = element.as_group() {
                    pending.extend(group.children_ids.iter().cloned());
                }
                ids.push(current);
            }
        }
        ids
    }

    /// Remove an element and, for groups, its descendants.
    ///
    /// Returns the removed ids (empty when `id` is unknown). The root order
    /// is updated in the same step so the document never holds a dangling
    /// reference.
    pub fn remove_subtree(&mut self, id: &ElementId) -> Vec<ElementId> {
        let removed = self.subtree_ids(id);
        if removed.is_empty() {
            return removed;
        }
        for rid in &removed {
            self.elements.remove(rid);
        }
        self.root_element_ids.retain(|rid| !removed.contains(rid));
        self.renumber_z();
        self.touch();
        removed
    }

    /// Reassign z-indices from the root order.
    pub fn renumber_z(&mut self) {
        for (z, id) in self.root_element_ids.clone().into_iter().enumerate() {
            if let Some(element) = self.elements.get_mut(&id) {
                element.set_z_index(z as u32);
            }
        }
    }

    /// Bring an element to the front (topmost). Returns false if unknown.
    pub fn bring_to_front(&mut self, id: &ElementId) -> bool {
        if !self.root_element_ids.contains(id) {
            return false;
        }
        self.root_element_ids.retain(|rid| rid != id);
        self.root_element_ids.push(id.clone());
        self.renumber_z();
        self.touch();
        true
    }

    /// Send an element to the back (bottommost). Returns false if unknown.
    pub fn send_to_back(&mut self, id: &ElementId) -> bool {
        if !self.root_element_ids.contains(id) {
            return false;
        }
        self.root_element_ids.retain(|rid| rid != id);
        self.root_element_ids.insert(0, id.clone());
        self.renumber_z();
        self.touch();
        true
    }

    /// Move an element one layer forward. Returns false if already at front.
    pub fn bring_forward(&mut self, id: &ElementId) -> bool {
        if let Some(pos) = self.root_element_ids.iter().position(|rid| rid == id)
            && pos < self.root_element_ids.len() - 1
        {
            self.root_element_ids.swap(pos, pos + 1);
            self.renumber_z();
            self.touch();
            return true;
        }
        false
    }

    /// Move an element one layer backward. Returns false if already at back.
    pub fn send_backward(&mut self, id: &ElementId) -> bool {
        if let Some(pos) = self.root_element_ids.iter().position(|rid| rid == id)
            && pos > 0
        {
            self.root_element_ids.swap(pos, pos - 1);
            self.renumber_z();
            self.touch();
            return true;
        }
        false
    }

    /// Check the structural invariants.
    pub fn validate(&self) -> Result<(), InvariantError> {
        for id in &self.root_element_ids {
            if !self.elements.contains_key(id) {
                return Err(InvariantError::DanglingRootId(id.clone()));
            }
        }
        for element in self.elements.values() {
            if let Some(parent) = element.parent_id() {
                match self.elements.get(parent) {
                    Some(p) if p.is_group() => {}
                    _ => {
                        return Err(InvariantError::BadParentRef {
                            child: element.id().clone(),
                            parent: parent.clone(),
                        });
                    }
                }
            }
            if let Some(group) = element.as_group() {
                for child in &group.children_ids {
                    if !self.elements.contains_key(child) {
                        return Err(InvariantError::DanglingChildId {
                            group: element.id().clone(),
                            child: child.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
