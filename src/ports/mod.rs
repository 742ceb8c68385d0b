//! Ports (trait boundaries) for external dependencies.
//!
//! The learning core owns these traits; storage formats, approximators and
//! training feedback are adapters that implement them.

pub mod observer;
pub mod repository;
pub mod value_function;

pub use observer::EpochObserver;
pub use repository::TableRepository;
pub use value_function::ValueFunction;
