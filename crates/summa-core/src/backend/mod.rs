//! Backend implementations of the `relation::Backend` fetch contract.

pub mod memory;

pub use memory::MemoryBackend;
