//! File-based persistence gateway for native platforms.

use super::{BoxFuture, PersistenceGateway, StorageError, StorageResult};
use crate::state::PersistedState;
use std::fs;
use std::path::PathBuf;

/// Stores snapshots as JSON files in a directory, one file per document id.
pub struct FileGateway {
    base_path: PathBuf,
}

impl FileGateway {
    /// Create a gateway rooted at the given directory, creating it if needed.
    pub fn new(base_path: PathBuf) -> StorageResult<Self> {
        if !base_path.exists() {
            fs::create_dir_all(&base_path)
                .map_err(|e| StorageError::Io(format!("failed to create storage directory: {e}")))?;
        }
        Ok(Self { base_path })
    }

    /// Create a gateway in the platform data directory
    /// (e.g. `~/.local/share/vellum/documents`).
    pub fn default_location() -> StorageResult<Self> {
        let base = dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| StorageError::Io("could not determine home directory".to_string()))?;
        Self::new(base.join("vellum").join("documents"))
    }

    fn snapshot_path(&self, id: &str) -> PathBuf {
        // Sanitize id to be safe for filenames.
        let safe_id: String = id
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.base_path.join(format!("{safe_id}.json"))
    }

    pub fn base_path(&self) -> &PathBuf {
        &self.base_path
    }
}

impl PersistenceGateway for FileGateway {
    fn save_state(&self, id: &str, state: &PersistedState) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.snapshot_path(id);
        let json = serde_json::to_string_pretty(state);
        Box::pin(async move {
            let json = json.map_err(|e| StorageError::Serialization(e.to_string()))?;
            fs::write(&path, json)
                .map_err(|e| StorageError::Io(format!("failed to write {}: {e}", path.display())))
        })
    }

    fn load_state(&self, id: &str) -> BoxFuture<'_, StorageResult<Option<PersistedState>>> {
        let path = self.snapshot_path(id);
        Box::pin(async move {
            if !path.exists() {
                return Ok(None);
            }
            let json = fs::read_to_string(&path)
                .map_err(|e| StorageError::Io(format!("failed to read {}: {e}", path.display())))?;
            let state = serde_json::from_str(&json).map_err(|e| {
                StorageError::Serialization(format!("failed to parse {}: {e}", path.display()))
            })?;
            Ok(Some(state))
        })
    }

    fn delete_state(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let path = self.snapshot_path(id);
        Box::pin(async move {
            if path.exists() {
                fs::remove_file(&path).map_err(|e| {
                    StorageError::Io(format!("failed to delete {}: {e}", path.display()))
                })?;
            }
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        let base = self.base_path.clone();
        Box::pin(async move {
            if !base.exists() {
                return Ok(vec![]);
            }
            let entries = fs::read_dir(&base)
                .map_err(|e| StorageError::Io(format!("failed to read directory: {e}")))?;

            let mut ids = Vec::new();
            for entry in entries.flatten() {
                let path = entry.path();
                if path.extension().map(|e| e == "json").unwrap_or(false)
                    && let Some(stem) = path.file_stem().and_then(|s| s.to_str())
                {
                    ids.push(stem.to_string());
                }
            }
            Ok(ids)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::CanvasDocument;
    use crate::storage::drive;
    use crate::viewport::ViewportState;
    use tempfile::tempdir;

    fn snapshot(id: &str) -> PersistedState {
        PersistedState {
            document: CanvasDocument::new(id.into()),
            viewport: Some(ViewportState::new(10.0, 20.0, 2.0)),
        }
    }

    #[test]
    fn test_save_load_roundtrip() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().to_path_buf()).unwrap();

        let state = snapshot("doc-1");
        drive(gateway.save_state("doc-1", &state)).unwrap();

        let loaded = drive(gateway.load_state("doc-1")).unwrap().unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_missing_is_none() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().to_path_buf()).unwrap();
        assert!(drive(gateway.load_state("nonexistent")).unwrap().is_none());
    }

    #[test]
    fn test_list_and_delete() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().to_path_buf()).unwrap();

        drive(gateway.save_state("a", &snapshot("a"))).unwrap();
        drive(gateway.save_state("b", &snapshot("b"))).unwrap();

        let mut ids = drive(gateway.list()).unwrap();
        ids.sort();
        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);

        drive(gateway.delete_state("a")).unwrap();
        assert!(drive(gateway.load_state("a")).unwrap().is_none());
    }

    #[test]
    fn test_sanitizes_id() {
        let dir = tempdir().unwrap();
        let gateway = FileGateway::new(dir.path().to_path_buf()).unwrap();

        let state = snapshot("weird");
        drive(gateway.save_state("doc/with:odd*chars", &state)).unwrap();
        let loaded = drive(gateway.load_state("doc/with:odd*chars"))
            .unwrap()
            .unwrap();
        assert_eq!(loaded.document.id, "weird");
    }
}
