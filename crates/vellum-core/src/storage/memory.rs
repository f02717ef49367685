//! In-memory persistence gateway.

use super::{BoxFuture, PersistenceGateway, StorageError, StorageResult};
use crate::state::PersistedState;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory gateway for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryGateway {
    snapshots: RwLock<HashMap<String, PersistedState>>,
}

impl MemoryGateway {
    /// Create a new empty gateway.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceGateway for MemoryGateway {
    fn save_state(&self, id: &str, state: &PersistedState) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let state = state.clone();
        Box::pin(async move {
            let mut snapshots = self
                .snapshots
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            snapshots.insert(id, state);
            Ok(())
        })
    }

    fn load_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<PersistedState>>> {
        let id = id.to_string();
        Box::pin(async move {
            let snapshots = self
                .snapshots
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            Ok(snapshots.get(&id).cloned())
        })
    }

    fn delete_state(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut snapshots = self
                .snapshots
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            snapshots.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let snapshots = self
                .snapshots
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            Ok(snapshots.keys().cloned().collect())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CanvasDocument;
    use crate::storage::drive;

    fn snapshot(id: &str) -> PersistedState {
        PersistedState {
            document: CanvasDocument::new(id.into()),
            viewport: None,
        }
    }

    #[test]
    fn test_save_and_load() {
        let gateway = MemoryGateway::new();
        drive(gateway.save_state("doc", &snapshot("doc"))).unwrap();

        let loaded = drive(gateway.load_state("doc")).unwrap().unwrap();
        assert_eq!(loaded.document.id, "doc");
    }

    #[test]
    fn test_missing_is_none() {
        let gateway = MemoryGateway::new();
        assert!(drive(gateway.load_state("nope")).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let gateway = MemoryGateway::new();
        drive(gateway.save_state("doc", &snapshot("doc"))).unwrap();
        drive(gateway.delete_state("doc")).unwrap();
        assert!(drive(gateway.load_state("doc")).unwrap().is_none());
    }

    #[test]
    fn test_list() {
        let gateway = MemoryGateway::new();
        drive(gateway.save_state("a", &snapshot("a"))).unwrap();
        drive(gateway.save_state("b", &snapshot("b"))).unwrap();

        let mut ids = drive(gateway.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }
}
