//! Persistence gateway abstraction.

mod memory;

#[cfg(not(target_arch = "wasm32"))]
mod file;

pub use memory::MemoryGateway;

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileGateway;

use crate::state::PersistedState;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("serialization error: {0}")]
    Serialization(String),
    #[error("io error: {0}")]
    Io(String),
    #[error("storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Async snapshot store keyed by document id.
///
/// The editor treats saves as fire-and-forget: a failure is logged and the
/// in-memory state stays authoritative. A missing document on load is `None`,
/// not an error.
pub trait PersistenceGateway {
    /// Persist a snapshot under the given document id.
    fn save_state(&self, id: &str, state: &PersistedState) -> BoxFuture<'_, StorageResult<()>>;

    /// Load a snapshot, or `None` if the document has never been saved.
    fn load_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<PersistedState>>>;

    /// Delete a saved snapshot.
    fn delete_state(&self, id: &str) -> BoxFuture<'_, StorageResult<()>>;

    /// List all saved document ids.
    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>>;
}

/// Drive a gateway future to completion with a no-op waker.
///
/// The backends in this crate perform their work on first poll; the editor
/// uses this to fire saves without blocking on a runtime.
pub fn drive<F: Future>(fut: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn noop_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            noop_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(noop_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut fut = std::pin::pin!(fut);

    loop {
        match fut.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}
