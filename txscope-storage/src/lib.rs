//! `txscope` Storage
//!
//! This crate provides the resource-driver abstraction the txscope
//! coordinator runs against, and backend implementations of it.
//!
//! # Modules
//!
//! - [`driver`] - Resource driver traits and abstractions
//! - [`backends`] - Concrete resource backend implementations

pub mod backends;
pub mod driver;

pub use backends::{MemoryConnection, MemoryDriver};
pub use driver::{DriverError, DriverResult, ResourceConnection, ResourceDriver, Savepoint};
