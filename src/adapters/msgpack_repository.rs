//! MessagePack implementation of the table repository.

use std::{fs::File, path::Path};

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::{LookupTable, SavedLookupTable},
    quantizer::KeySpace,
};

/// Compact binary table storage via rmp_serde.
///
/// # Examples
///
/// ```no_run
/// use arena_rl::adapters::MsgPackRepository;
/// use arena_rl::ports::TableRepository;
/// use arena_rl::q_learning::LookupTable;
/// use std::path::Path;
///
/// let repo = MsgPackRepository::new();
/// repo.save(&LookupTable::new(), Path::new("table.msgpack"))?;
/// let loaded = repo.load(Path::new("table.msgpack"))?;
/// # Ok::<(), arena_rl::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MsgPackRepository {
    key_space: Option<KeySpace>,
}

impl MsgPackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_space(mut self, key_space: KeySpace) -> Self {
        self.key_space = Some(key_space);
        self
    }
}

impl TableRepository for MsgPackRepository {
    fn save(&self, table: &LookupTable, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;

        SavedLookupTable::from_table(table).write_msgpack(file)
    }

    fn load(&self, path: &Path) -> Result<LookupTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;

        let saved: SavedLookupTable =
            rmp_serde::decode::from_read(&file).map_err(|e| Error::SerializationContext {
                operation: "deserialize lookup table from MessagePack".to_string(),
                message: e.to_string(),
            })?;

        saved.into_table(self.key_space.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;
    use crate::q_learning::StateActionKey;

    #[test]
    fn test_msgpack_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("table.msgpack");

        let mut table = LookupTable::new();
        table.update(StateActionKey::new(vec![1, 2, 3]), 0.1 + 0.2);
        table.update(StateActionKey::new(vec![-4, 0, 1]), -100.0);

        let repo = MsgPackRepository::new();
        repo.save(&table, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_arena_rl_12345.msgpack"));
        assert!(result.is_err());
    }

    #[test]
    fn test_save_to_invalid_path_returns_error() {
        let repo = MsgPackRepository::new();
        let result = repo.save(
            &LookupTable::new(),
            Path::new("/invalid_dir_arena_rl_12345/table.msgpack"),
        );
        assert!(result.is_err());
    }
}
