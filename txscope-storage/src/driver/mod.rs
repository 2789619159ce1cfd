//! Resource driver traits and abstractions.
//!
//! This module defines the traits a physical resource must implement for the
//! coordinator to drive it.

mod error;
mod traits;

pub use error::{DriverError, DriverResult};
pub use traits::{ResourceConnection, ResourceDriver, Savepoint};
