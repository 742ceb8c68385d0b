//! Structural state-action keys

use std::fmt;

use serde::{Deserialize, Serialize};

/// A quantized state followed by one trailing action ordinal.
///
/// Equality and hashing are structural over the integer components, so a
/// key rebuilt from the same observation always addresses the same entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StateActionKey(Vec<i32>);

impl StateActionKey {
    /// Build a key from raw components; the last component is the action.
    pub fn new(components: Vec<i32>) -> Self {
        Self(components)
    }

    pub fn from_parts(state: &[i32], action: i32) -> Self {
        let mut components = Vec::with_capacity(state.len() + 1);
        components.extend_from_slice(state);
        components.push(action);
        Self(components)
    }

    pub fn components(&self) -> &[i32] {
        &self.0
    }

    /// State part of the key, without the action.
    pub fn state(&self) -> &[i32] {
        match self.0.split_last() {
            Some((_, state)) => state,
            None => &[],
        }
    }

    pub fn action(&self) -> Option<i32> {
        self.0.last().copied()
    }

    /// Total number of components, action included.
    pub fn arity(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Display for StateActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for component in &self.0 {
            if !first {
                f.write_str(",")?;
            }
            write!(f, "{component}")?;
            first = false;
        }
        Ok(())
    }
}
