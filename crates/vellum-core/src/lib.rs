//! Vellum Core Library
//!
//! Platform-agnostic editing engine for the Vellum vector canvas: the scene
//! model, coordinate transforms, the mutation API, gesture tools, undo/redo
//! and snapshot persistence. Rendering and input plumbing live in the host.

pub mod document;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod history;
pub mod id;
pub mod state;
pub mod storage;
pub mod tools;
pub mod viewport;

pub use document::{CanvasDocument, InvariantError};
pub use editor::{AddOptions, CanvasEditor, EditorError, SubscriptionId};
pub use element::{
    Element, ElementId, ElementPatch, ElementStyle, GroupElement, ImageElement, Rgba, ScalePatch,
    ShapeElement, ShapeKind, TextElement, TransformPatch,
};
pub use geometry::Transform;
pub use history::{History, MAX_HISTORY};
pub use id::{IdProvider, SequentialIds, UuidIds};
pub use state::{CanvasRuntimeState, Clipboard, MarqueeSelection, PersistedState, SelectionState};
pub use storage::{MemoryGateway, PersistenceGateway, StorageError, StorageResult};
pub use tools::{DragTool, Modifiers, RotateTool, ScaleHandle, ScaleTool};
pub use viewport::{MAX_SCALE, MIN_SCALE, ViewportState};

#[cfg(not(target_arch = "wasm32"))]
pub use storage::FileGateway;
