//! Subcommands of the `arena-rl` binary

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::{
    adapters::{CsvTableRepository, MsgPackRepository},
    agent::{ActionSet, CardinalAction, SurfAction},
    ports::TableRepository,
    q_learning::LookupTable,
    quantizer::{KeySpace, QuantizerConfig, RelativeEncoder, StateEncoder, SurfEncoder},
};

pub mod distill;
pub mod table;
pub mod xor;

/// Where a table's key ranges come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeySpaceSource {
    /// Tightest ranges covering the stored keys
    Observed,
    /// Relative encoder with cardinal actions
    Cardinal,
    /// Surf encoder with surf actions
    Surf,
}

impl KeySpaceSource {
    /// Declared key space, or `None` when it must be read off the table.
    pub fn declared(self, quantizer: &QuantizerConfig) -> Result<Option<KeySpace>> {
        let space = match self {
            KeySpaceSource::Observed => return Ok(None),
            KeySpaceSource::Cardinal => RelativeEncoder::new(*quantizer)?
                .key_space()
                .with_actions(CardinalAction::count()),
            KeySpaceSource::Surf => SurfEncoder::new(*quantizer)?
                .key_space()
                .with_actions(SurfAction::count()),
        };
        Ok(Some(space))
    }
}

fn is_csv(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
}

/// Repository chosen by file extension: `.csv` or MessagePack otherwise.
pub(crate) fn repository_for(
    path: &Path,
    key_space: Option<&KeySpace>,
) -> Box<dyn TableRepository> {
    match (is_csv(path), key_space) {
        (true, Some(space)) => Box::new(CsvTableRepository::new().with_key_space(space.clone())),
        (true, None) => Box::new(CsvTableRepository::new()),
        (false, Some(space)) => Box::new(MsgPackRepository::new().with_key_space(space.clone())),
        (false, None) => Box::new(MsgPackRepository::new()),
    }
}

pub(crate) fn load_table(path: &Path, key_space: Option<&KeySpace>) -> Result<LookupTable> {
    repository_for(path, key_space)
        .load(path)
        .with_context(|| format!("Failed to load lookup table: {}", path.display()))
}

pub(crate) fn save_table(table: &LookupTable, path: &Path) -> Result<()> {
    repository_for(path, None)
        .save(table, path)
        .with_context(|| format!("Failed to save lookup table: {}", path.display()))
}

/// Declared key space, or the one observed in `table`.
pub(crate) fn resolve_key_space(
    declared: Option<KeySpace>,
    table: &LookupTable,
) -> Result<KeySpace> {
    match declared {
        Some(space) => Ok(space),
        None => table
            .observed_key_space()
            .context("Lookup table is empty or mixes key lengths"),
    }
}
