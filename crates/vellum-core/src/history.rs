//! Snapshot-based undo/redo stacks.

use crate::state::CanvasRuntimeState;

/// Maximum number of undo snapshots to keep; the oldest is evicted first.
pub const MAX_HISTORY: usize = 50;

/// Bounded undo/redo history over full runtime-state snapshots.
///
/// Snapshots are structural clones and share nothing mutable with the live
/// state; that independence is what makes restore sound.
#[derive(Debug, Default)]
pub struct History {
    undo_stack: Vec<CanvasRuntimeState>,
    redo_stack: Vec<CanvasRuntimeState>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the pre-mutation state of a historyable mutation.
    ///
    /// Clears the redo stack: a new change invalidates the redone future.
    pub fn record(&mut self, pre_state: CanvasRuntimeState) {
        self.undo_stack.push(pre_state);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Pop the most recent snapshot, pushing `current` onto the redo stack.
    ///
    /// Returns `None` when there is nothing to undo, or when the popped
    /// snapshot fails validation (logged; the snapshot is discarded).
    pub fn undo(&mut self, current: &CanvasRuntimeState) -> Option<CanvasRuntimeState> {
        let snapshot = self.undo_stack.pop()?;
        if let Err(err) = snapshot.validate() {
            log::error!("discarding corrupted undo snapshot: {err}");
            return None;
        }
        self.redo_stack.push(current.clone());
        Some(snapshot)
    }

    /// Pop the most recent redo snapshot, pushing `current` onto undo.
    pub fn redo(&mut self, current: &CanvasRuntimeState) -> Option<CanvasRuntimeState> {
        let snapshot = self.redo_stack.pop()?;
        if let Err(err) = snapshot.validate() {
            log::error!("discarding corrupted redo snapshot: {err}");
            return None;
        }
        self.undo_stack.push(current.clone());
        Some(snapshot)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Drop all snapshots (used when a new document is loaded).
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
