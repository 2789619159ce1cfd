//! Concrete resource backend implementations.

mod memory;

pub use memory::{MemoryConnection, MemoryDriver};
