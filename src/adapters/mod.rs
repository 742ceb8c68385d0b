//! Adapters implementing domain ports.
//!
//! Infrastructure implementations of the traits in [`crate::ports`]. Adapters
//! depend on the ports, never the other way around.

pub mod csv_repository;
pub mod in_memory_repository;
pub mod msgpack_repository;

pub use csv_repository::CsvTableRepository;
pub use in_memory_repository::InMemoryRepository;
pub use msgpack_repository::MsgPackRepository;
