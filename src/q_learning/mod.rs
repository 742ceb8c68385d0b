//! Tabular temporal-difference learning
//!
//! - [`key`]: structural state-action keys
//! - [`lookup_table`]: the discrete value store, defaulting to zero
//! - [`td`]: the back-step `V(s,a) ← Q + α (r + γ Q' − Q)`
//! - [`serialization`]: CSV and MessagePack table formats
//!
//! ## Usage Example
//!
//! ```no_run
//! use arena_rl::q_learning::{LookupTable, StateActionKey, TdParams, back_step};
//!
//! let mut table = LookupTable::new();
//! let key = StateActionKey::new(vec![2, -1, 0, 1, 0, 1, 3]);
//! let previous_q = table.value_of(&key);
//! back_step(&mut table, &TdParams::default(), &key, previous_q, 0.0, -4.0)?;
//! # Ok::<(), arena_rl::Error>(())
//! ```

pub mod key;
pub mod lookup_table;
pub mod serialization;
pub mod td;

// Public re-exports
pub use key::StateActionKey;
pub use lookup_table::LookupTable;
pub use serialization::{SavedLookupTable, TableRecord, read_csv, write_csv};
pub use td::{TdParams, back_step};
