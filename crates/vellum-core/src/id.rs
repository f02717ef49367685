//! Element id generation behind an injectable seam.

use crate::element::ElementId;
use uuid::Uuid;

/// Source of globally-unique opaque element ids.
///
/// Injected into the editor so tests can use deterministic ids and multiple
/// editor instances can share or isolate id spaces as the host prefers.
pub trait IdProvider {
    fn generate_next_id(&mut self) -> ElementId;
}

/// UUIDv4-backed id provider; the production default.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidIds;

impl IdProvider for UuidIds {
    fn generate_next_id(&mut self) -> ElementId {
        Uuid::new_v4().to_string()
    }
}

/// Deterministic sequential ids for tests (`el-1`, `el-2`, ...).
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: u64,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdProvider for SequentialIds {
    fn generate_next_id(&mut self) -> ElementId {
        self.next += 1;
        format!("el-{}", self.next)
    }
}
