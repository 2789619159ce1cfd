//! `txscope`
//!
//! A transaction propagation coordinator. Independently written units of
//! work declare "this requires a transaction" with a chosen propagation
//! behavior; the coordinator guarantees that exactly one physical
//! transaction is opened per logically-outermost unit, that nested units
//! join or suspend it correctly, and that failures resolve into a single
//! commit-or-rollback decision — even when an inner unit fails after an
//! outer unit has already decided to succeed.
//!
//! # Example
//!
//! ```
//! use txscope::{
//!     FailureKind, MemoryDriver, TransactionCoordinator, TransactionDefinition, TxError,
//! };
//!
//! let driver = MemoryDriver::new();
//! let mut coordinator = TransactionCoordinator::new(driver.clone());
//!
//! // Outer unit of work: opens the physical transaction.
//! let result: Result<(), TxError> =
//!     coordinator.execute(&TransactionDefinition::required(), |coordinator| {
//!         coordinator
//!             .resource_mut()
//!             .expect("transaction is active")
//!             .put("accounts", b"alice", b"100")
//!             .map_err(|e| FailureKind::unexpected(e.to_string()))?;
//!
//!         // Inner unit joins the same physical transaction.
//!         coordinator.execute(&TransactionDefinition::required(), |_| Ok(()))?;
//!         Ok(())
//!     });
//!
//! result.expect("unit of work failed");
//! assert_eq!(
//!     driver.committed("accounts", b"alice").expect("store readable"),
//!     Some(b"100".to_vec()),
//! );
//! ```

// Re-export core types
pub use txscope_core::{
    BusinessFailurePolicy, ErrorCategory, FailureKind, Outcome, Propagation, RollbackRules,
    TransactionDefinition,
};

// Re-export storage types
pub use txscope_storage::{
    DriverError, DriverResult, MemoryConnection, MemoryDriver, ResourceConnection,
    ResourceDriver, Savepoint,
};

pub mod coordinator;
pub mod error;

pub use coordinator::{
    CompletionStatus, ScopeId, ScopeStatus, Synchronization, TransactionContext,
    TransactionCoordinator,
};
pub use error::{TxError, TxResult};
