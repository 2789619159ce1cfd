//! Transaction coordination.
//!
//! This module provides the [`TransactionCoordinator`] and
//! [`TransactionContext`] types that implement propagation, outcome
//! resolution, and execution-scoped resource binding over a
//! [`ResourceDriver`](txscope_storage::ResourceDriver).
//!
//! # Example
//!
//! ```ignore
//! use txscope::{MemoryDriver, Outcome, TransactionCoordinator, TransactionDefinition};
//!
//! let mut coordinator = TransactionCoordinator::new(MemoryDriver::new());
//!
//! let mut ctx = coordinator.begin(&TransactionDefinition::required())?;
//! // ... unit of work against coordinator.resource_mut()? ...
//! coordinator.end(&mut ctx, Outcome::Success)?;
//! ```

mod binding;
mod context;
mod manager;
mod sync;

pub use context::{ScopeId, ScopeStatus, TransactionContext};
pub use manager::TransactionCoordinator;
pub use sync::{CompletionStatus, Synchronization};
