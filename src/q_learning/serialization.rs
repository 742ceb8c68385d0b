//! Persistence formats for lookup tables
//!
//! Two layouts share one record model, N integer key components followed by
//! one value:
//!
//! - CSV lines `k0,k1,...,kN-1,value`, written sorted by key
//! - a versioned MessagePack document ([`SavedLookupTable`])
//!
//! Any malformed record aborts the whole load.

use std::{
    fs::File,
    io::{BufReader, BufWriter, Read, Write},
    path::Path,
};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::{
    Result,
    error::Error,
    q_learning::{LookupTable, StateActionKey},
    quantizer::KeySpace,
};

/// One persisted entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRecord {
    pub key: Vec<i32>,
    pub value: f64,
}

/// Versioned MessagePack form of a [`LookupTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedLookupTable {
    pub version: u32,
    pub records: Vec<TableRecord>,
}

impl SavedLookupTable {
    pub const VERSION: u32 = 1;

    pub fn from_table(table: &LookupTable) -> Self {
        Self {
            version: Self::VERSION,
            records: table
                .sorted_entries()
                .into_iter()
                .map(|(key, value)| TableRecord {
                    key: key.components().to_vec(),
                    value,
                })
                .collect(),
        }
    }

    /// Rebuild the table, validating every record.
    ///
    /// Record positions are reported 1-based in [`Error::MalformedRecord`].
    pub fn into_table(self, key_space: Option<&KeySpace>) -> Result<LookupTable> {
        if self.version != Self::VERSION {
            return Err(Error::UnsupportedVersion {
                format: "lookup table",
                found: self.version,
                expected: Self::VERSION,
            });
        }

        let mut validator = RecordValidator::new(key_space);
        let mut table = LookupTable::new();
        for (index, record) in self.records.into_iter().enumerate() {
            let line = index as u64 + 1;
            validator.accept(&mut table, line, record.key, record.value)?;
        }
        Ok(table)
    }

    /// Encode as MessagePack through a buffer, flushing before returning.
    pub fn write_msgpack<W: Write>(&self, writer: W) -> Result<()> {
        let mut writer = BufWriter::new(writer);
        rmp_serde::encode::write(&mut writer, self).map_err(|e| Error::SerializationContext {
            operation: "serialize lookup table to MessagePack".to_string(),
            message: e.to_string(),
        })?;
        writer.flush().map_err(|source| Error::Io {
            operation: "flush lookup table".to_string(),
            source,
        })
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create file: {}", path.as_ref().display()))?;

        self.write_msgpack(file)
            .with_context(|| format!("Failed to write lookup table: {}", path.as_ref().display()))
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let file = File::open(path.as_ref())
            .with_context(|| format!("Failed to open file: {}", path.as_ref().display()))?;
        let reader = BufReader::new(file);

        rmp_serde::decode::from_read(reader).context("Failed to deserialize lookup table")
    }
}

/// Shared per-record checks: consistent arity, finite value, key space,
/// unique key.
struct RecordValidator<'a> {
    key_space: Option<&'a KeySpace>,
    arity: Option<usize>,
}

impl<'a> RecordValidator<'a> {
    fn new(key_space: Option<&'a KeySpace>) -> Self {
        Self {
            key_space,
            arity: key_space.map(KeySpace::arity),
        }
    }

    fn check(&mut self, line: u64, key: &[i32], value: f64) -> Result<()> {
        let malformed = |reason: String| Error::MalformedRecord { line, reason };

        if key.is_empty() {
            return Err(malformed("record has no key components".to_string()));
        }
        match self.arity {
            Some(expected) if expected != key.len() => {
                return Err(malformed(format!(
                    "expected {expected} key components, found {}",
                    key.len()
                )));
            }
            Some(_) => {}
            None => self.arity = Some(key.len()),
        }
        if !value.is_finite() {
            return Err(malformed(format!("value {value} is not finite")));
        }
        if let Some(space) = self.key_space {
            if !space.contains(key) {
                return Err(malformed(format!(
                    "key {} lies outside the key space",
                    StateActionKey::new(key.to_vec())
                )));
            }
        }
        Ok(())
    }

    /// Check one record and insert it into `table`.
    fn accept(
        &mut self,
        table: &mut LookupTable,
        line: u64,
        key: Vec<i32>,
        value: f64,
    ) -> Result<()> {
        self.check(line, &key, value)?;
        let key = StateActionKey::new(key);
        if table.contains(&key) {
            return Err(Error::MalformedRecord {
                line,
                reason: format!("key {key} appears more than once"),
            });
        }
        table.update(key, value);
        Ok(())
    }
}

/// Write `table` as headerless CSV, one entry per line, sorted by key.
pub fn write_csv<W: Write>(table: &LookupTable, writer: W) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_writer(writer);

    for (key, value) in table.sorted_entries() {
        let mut fields: Vec<String> = key.components().iter().map(i32::to_string).collect();
        fields.push(value.to_string());
        csv_writer.write_record(&fields)?;
    }
    csv_writer.flush()?;
    Ok(())
}

/// Read a headerless CSV table. When `key_space` is given, every key must
/// match its arity and lie inside its bounds.
pub fn read_csv<R: Read>(reader: R, key_space: Option<&KeySpace>) -> Result<LookupTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut validator = RecordValidator::new(key_space);
    let mut table = LookupTable::new();

    for result in csv_reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |position| position.line());
        let malformed = |reason: String| Error::MalformedRecord { line, reason };

        let fields: Vec<&str> = record.iter().collect();
        let Some((value_field, key_fields)) = fields.split_last() else {
            return Err(malformed("empty record".to_string()));
        };

        let key = key_fields
            .iter()
            .map(|field| {
                field
                    .parse::<i32>()
                    .map_err(|e| malformed(format!("invalid key component {field:?}: {e}")))
            })
            .collect::<Result<Vec<_>>>()?;
        let value = value_field
            .parse::<f64>()
            .map_err(|e| malformed(format!("invalid value {value_field:?}: {e}")))?;

        validator.accept(&mut table, line, key, value)?;
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantizer::DimensionBounds;

    fn sample_table() -> LookupTable {
        [
            (StateActionKey::new(vec![1, -2, 0]), 0.125),
            (StateActionKey::new(vec![0, 0, 3]), -7.5),
            (StateActionKey::new(vec![-1, 4, 1]), 1.0 / 3.0),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_csv_layout_is_sorted() {
        let mut buffer = Vec::new();
        write_csv(&sample_table(), &mut buffer).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("-1,4,1,"));
        assert_eq!(lines[1], "0,0,3,-7.5");
        assert_eq!(lines[2], "1,-2,0,0.125");
    }

    #[test]
    fn test_csv_roundtrip_is_exact() {
        let table = sample_table();
        let mut buffer = Vec::new();
        write_csv(&table, &mut buffer).unwrap();
        let loaded = read_csv(buffer.as_slice(), None).unwrap();
        assert_eq!(loaded, table);
    }

    #[test]
    fn test_csv_malformed_value_reports_line() {
        let input = "0,0,1.5\n0,1,abc\n";
        match read_csv(input.as_bytes(), None) {
            Err(Error::MalformedRecord { line, .. }) => assert_eq!(line, 2),
            other => panic!("expected malformed record, got {other:?}"),
        }
    }

    #[test]
    fn test_csv_inconsistent_arity_is_rejected() {
        let input = "0,0,1.5\n0,1,2,3.0\n";
        assert!(matches!(
            read_csv(input.as_bytes(), None),
            Err(Error::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_csv_out_of_range_key_is_rejected() {
        let space = KeySpace::new(vec![DimensionBounds::new(-1, 1), DimensionBounds::new(0, 1)]);
        let input = "1,1,0.5\n2,0,0.5\n";
        assert!(matches!(
            read_csv(input.as_bytes(), Some(&space)),
            Err(Error::MalformedRecord { line: 2, .. })
        ));
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        let input = "0,1,1.5\n1,1,2.0\n0,1,-3.0\n";
        assert!(matches!(
            read_csv(input.as_bytes(), None),
            Err(Error::MalformedRecord { line: 3, .. })
        ));

        let mut saved = SavedLookupTable::from_table(&sample_table());
        let repeated = saved.records[0].clone();
        saved.records.push(repeated);
        assert!(matches!(
            saved.into_table(None),
            Err(Error::MalformedRecord { line: 4, .. })
        ));
    }

    #[test]
    fn test_saved_table_version_is_checked() {
        let mut saved = SavedLookupTable::from_table(&sample_table());
        saved.version = 99;
        assert!(matches!(
            saved.into_table(None),
            Err(Error::UnsupportedVersion { found: 99, .. })
        ));
    }

    /// Accepts nothing, so buffered bytes fail on flush.
    struct RejectingSink;

    impl Write for RejectingSink {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::other("device full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_write_failure_surfaces_on_flush() {
        let saved = SavedLookupTable::from_table(&sample_table());
        assert!(matches!(
            saved.write_msgpack(RejectingSink),
            Err(Error::Io { .. })
        ));

        let mut buffer = Vec::new();
        saved.write_msgpack(&mut buffer).unwrap();
        let reloaded: SavedLookupTable = rmp_serde::from_slice(&buffer).unwrap();
        assert_eq!(reloaded, saved);
    }

    #[test]
    fn test_saved_table_msgpack_roundtrip() {
        let table = sample_table();
        let bytes = rmp_serde::to_vec(&SavedLookupTable::from_table(&table)).unwrap();
        let saved: SavedLookupTable = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(saved.into_table(None).unwrap(), table);
    }
}
