//! CSV implementation of the table repository.

use std::{
    fs::File,
    io::{BufReader, BufWriter},
    path::Path,
};

use crate::{
    Result,
    error::Error,
    ports::TableRepository,
    q_learning::{LookupTable, read_csv, write_csv},
    quantizer::KeySpace,
};

/// Plain-text table storage, one `k0,...,kN-1,value` line per entry.
///
/// With a [`KeySpace`] attached, loads reject keys of the wrong arity or
/// outside the declared bounds.
#[derive(Debug, Clone, Default)]
pub struct CsvTableRepository {
    key_space: Option<KeySpace>,
}

impl CsvTableRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key_space(mut self, key_space: KeySpace) -> Self {
        self.key_space = Some(key_space);
        self
    }
}

impl TableRepository for CsvTableRepository {
    fn save(&self, table: &LookupTable, path: &Path) -> Result<()> {
        let file = File::create(path).map_err(|source| Error::Io {
            operation: format!("create file {path:?}"),
            source,
        })?;
        write_csv(table, BufWriter::new(file))
    }

    fn load(&self, path: &Path) -> Result<LookupTable> {
        let file = File::open(path).map_err(|source| Error::Io {
            operation: format!("open file {path:?}"),
            source,
        })?;
        read_csv(BufReader::new(file), self.key_space.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::TempDir;

    use super::*;
    use crate::{q_learning::StateActionKey, quantizer::DimensionBounds};

    #[test]
    fn test_csv_file_roundtrip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("table.csv");

        let mut table = LookupTable::new();
        table.update(StateActionKey::new(vec![3, -1, 2]), 12.25);
        table.update(StateActionKey::new(vec![0, 0, 0]), -0.001);

        let repo = CsvTableRepository::new();
        repo.save(&table, &file_path).expect("Failed to save");
        let loaded = repo.load(&file_path).expect("Failed to load");
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_load_rejects_keys_outside_space() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let file_path = temp_dir.path().join("table.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "0,1,0.5").unwrap();
        writeln!(file, "5,1,0.5").unwrap();

        let space = KeySpace::new(vec![DimensionBounds::new(-1, 1), DimensionBounds::new(0, 1)]);
        let repo = CsvTableRepository::new().with_key_space(space);
        assert!(matches!(
            repo.load(&file_path),
            Err(Error::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_load_nonexistent_returns_error() {
        let repo = CsvTableRepository::new();
        let result = repo.load(Path::new("/tmp/nonexistent_arena_rl_12345.csv"));
        assert!(matches!(result, Err(Error::Io { .. })));
    }
}
