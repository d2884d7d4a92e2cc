//! Durable storage backends for the session store.

pub mod file;
pub mod memory;

pub use file::FileStorage;
pub use memory::MemoryStorage;
