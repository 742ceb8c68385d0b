//! Repository port for lookup-table persistence.

use std::path::Path;

use crate::{Result, q_learning::LookupTable};

/// Port for persisting and loading lookup tables.
///
/// Tables are written whole, at episode boundaries only.
///
/// # Examples
///
/// ```no_run
/// use arena_rl::adapters::CsvTableRepository;
/// use arena_rl::ports::TableRepository;
/// use arena_rl::q_learning::LookupTable;
/// use std::path::Path;
///
/// let repo = CsvTableRepository::new();
/// repo.save(&LookupTable::new(), Path::new("table.csv"))?;
/// let loaded = repo.load(Path::new("table.csv"))?;
/// # Ok::<(), arena_rl::Error>(())
/// ```
pub trait TableRepository {
    /// Save a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination cannot be written or
    /// serialization fails.
    fn save(&self, table: &LookupTable, path: &Path) -> Result<()>;

    /// Load a table.
    ///
    /// # Errors
    ///
    /// Returns an error if the source cannot be read or any record is
    /// malformed. No partial table is returned.
    fn load(&self, path: &Path) -> Result<LookupTable>;
}
