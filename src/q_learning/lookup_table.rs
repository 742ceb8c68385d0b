//! Discrete state-action value store

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    Result,
    ports::ValueFunction,
    q_learning::StateActionKey,
    quantizer::{DimensionBounds, KeySpace},
};

/// Map from state-action keys to value estimates.
///
/// Absent keys read as `0.0`. Entries are only ever inserted or overwritten.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    values: HashMap<StateActionKey, f64>,
}

impl LookupTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored value for `key`, or `0.0` if it was never written.
    pub fn value_of(&self, key: &StateActionKey) -> f64 {
        self.values.get(key).copied().unwrap_or(0.0)
    }

    /// Insert or overwrite.
    pub fn update(&mut self, key: StateActionKey, value: f64) {
        self.values.insert(key, value);
    }

    pub fn contains(&self, key: &StateActionKey) -> bool {
        self.values.contains_key(key)
    }

    /// All entries in unspecified order.
    pub fn entries(&self) -> impl Iterator<Item = (&StateActionKey, f64)> {
        self.values.iter().map(|(key, &value)| (key, value))
    }

    /// Entries sorted by key, for deterministic output.
    pub fn sorted_entries(&self) -> Vec<(&StateActionKey, f64)> {
        let mut entries: Vec<_> = self.entries().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        entries
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Verify every key lies in `space`.
    pub fn check_key_space(&self, space: &KeySpace) -> Result<()> {
        for key in self.values.keys() {
            space.check(key.components())?;
        }
        Ok(())
    }

    /// Smallest and largest stored values.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.values.values().fold(None, |range, &value| match range {
            None => Some((value, value)),
            Some((lo, hi)) => Some((lo.min(value), hi.max(value))),
        })
    }

    /// Tightest key space covering every stored key.
    ///
    /// `None` when the table is empty or keys disagree on arity.
    pub fn observed_key_space(&self) -> Option<KeySpace> {
        let mut keys = self.values.keys();
        let first = keys.next()?.components();
        let mut bounds: Vec<DimensionBounds> = first
            .iter()
            .map(|&value| DimensionBounds::new(value, value))
            .collect();
        for key in keys {
            if key.arity() != bounds.len() {
                return None;
            }
            for (dimension, &value) in bounds.iter_mut().zip(key.components()) {
                dimension.floor = dimension.floor.min(value);
                dimension.ceiling = dimension.ceiling.max(value);
            }
        }
        Some(KeySpace::new(bounds))
    }
}

impl FromIterator<(StateActionKey, f64)> for LookupTable {
    fn from_iter<I: IntoIterator<Item = (StateActionKey, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl ValueFunction for LookupTable {
    fn value_of(&self, key: &StateActionKey) -> f64 {
        LookupTable::value_of(self, key)
    }

    fn update(&mut self, key: &StateActionKey, value: f64) -> Result<()> {
        LookupTable::update(self, key.clone(), value);
        Ok(())
    }

    fn name(&self) -> &str {
        "lookup_table"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(components: &[i32]) -> StateActionKey {
        StateActionKey::new(components.to_vec())
    }

    #[test]
    fn test_unseen_key_reads_zero() {
        let table = LookupTable::new();
        assert_eq!(table.value_of(&key(&[1, 2, 3])), 0.0);
        assert!(table.is_empty());
    }

    #[test]
    fn test_update_overwrites() {
        let mut table = LookupTable::new();
        table.update(key(&[0, 1]), 1.5);
        table.update(key(&[0, 1]), -2.0);
        assert_eq!(table.value_of(&key(&[0, 1])), -2.0);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_sorted_entries_and_range() {
        let table: LookupTable = [(key(&[1, 0]), 3.0), (key(&[0, 1]), -1.0)]
            .into_iter()
            .collect();
        let sorted = table.sorted_entries();
        assert_eq!(sorted[0].0, &key(&[0, 1]));
        assert_eq!(table.value_range(), Some((-1.0, 3.0)));
    }

    #[test]
    fn test_check_key_space() {
        let space = KeySpace::new(vec![DimensionBounds::new(-1, 1), DimensionBounds::new(0, 3)]);
        let mut table = LookupTable::new();
        table.update(key(&[1, 3]), 1.0);
        assert!(table.check_key_space(&space).is_ok());
        table.update(key(&[2, 0]), 1.0);
        assert!(table.check_key_space(&space).is_err());
    }

    #[test]
    fn test_observed_key_space() {
        assert!(LookupTable::new().observed_key_space().is_none());

        let table: LookupTable = [(key(&[-2, 4]), 1.0), (key(&[3, 0]), 2.0)]
            .into_iter()
            .collect();
        let space = table.observed_key_space().unwrap();
        assert_eq!(
            space.dimensions(),
            &[DimensionBounds::new(-2, 3), DimensionBounds::new(0, 4)]
        );
        assert!(table.check_key_space(&space).is_ok());
    }

    #[test]
    fn test_clear() {
        let mut table = LookupTable::new();
        table.update(key(&[0]), 1.0);
        table.clear();
        assert!(table.is_empty());
    }
}
