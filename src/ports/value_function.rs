//! Value function port
//!
//! The control loop reads and writes state-action estimates only through this
//! trait, so a lookup table and a fitted network are interchangeable.

use crate::{Result, q_learning::StateActionKey};

/// Source and sink of state-action value estimates.
pub trait ValueFunction {
    /// Current estimate for `key`. Keys never written read as `0.0`.
    fn value_of(&self, key: &StateActionKey) -> f64;

    /// Move the estimate for `key` to `value`.
    ///
    /// Tables overwrite; approximators take one training step towards it.
    fn update(&mut self, key: &StateActionKey, value: f64) -> Result<()>;

    /// Short identifier used in logs.
    fn name(&self) -> &str;
}

impl<V: ValueFunction + ?Sized> ValueFunction for Box<V> {
    fn value_of(&self, key: &StateActionKey) -> f64 {
        (**self).value_of(key)
    }

    fn update(&mut self, key: &StateActionKey, value: f64) -> Result<()> {
        (**self).update(key, value)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
