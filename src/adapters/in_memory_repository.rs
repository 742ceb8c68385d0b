//! In-memory table repository for testing.

use std::{
    collections::HashMap,
    path::Path,
    sync::{Arc, Mutex},
};

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::{LookupTable, SavedLookupTable},
};

/// Stores serialized tables in a shared map keyed by path.
///
/// Clones share the same storage.
#[derive(Clone)]
pub struct InMemoryRepository {
    storage: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            storage: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored tables.
    pub fn count(&self) -> usize {
        self.storage.lock().map_or(0, |storage| storage.len())
    }

    pub fn contains(&self, path: &Path) -> bool {
        let key = path.to_string_lossy().to_string();
        self.storage
            .lock()
            .is_ok_and(|storage| storage.contains_key(&key))
    }

    fn poisoned() -> Error {
        Error::SerializationContext {
            operation: "access in-memory storage".to_string(),
            message: "storage lock poisoned".to_string(),
        }
    }
}

impl Default for InMemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl TableRepository for InMemoryRepository {
    fn save(&self, table: &LookupTable, path: &Path) -> Result<()> {
        let key = path.to_string_lossy().to_string();

        let bytes = rmp_serde::to_vec(&SavedLookupTable::from_table(table)).map_err(|e| {
            Error::SerializationContext {
                operation: "serialize lookup table for in-memory storage".to_string(),
                message: e.to_string(),
            }
        })?;

        self.storage
            .lock()
            .map_err(|_| Self::poisoned())?
            .insert(key, bytes);
        Ok(())
    }

    fn load(&self, path: &Path) -> Result<LookupTable> {
        let key = path.to_string_lossy().to_string();
        let storage = self.storage.lock().map_err(|_| Self::poisoned())?;

        let bytes = storage.get(&key).ok_or_else(|| Error::Io {
            operation: format!("load lookup table from in-memory storage at {path:?}"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "key not found in memory"),
        })?;

        let saved: SavedLookupTable =
            rmp_serde::from_slice(bytes).map_err(|e| Error::SerializationContext {
                operation: "deserialize lookup table from in-memory storage".to_string(),
                message: e.to_string(),
            })?;
        saved.into_table(None)
    }
}
