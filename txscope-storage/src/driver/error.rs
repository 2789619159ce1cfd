//! Resource driver error types.

use thiserror::Error;

/// Errors that can occur in resource driver operations.
///
/// The coordinator surfaces these unchanged; it never reclassifies a driver
/// error into its rollback rules.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The resource could not be opened.
    #[error("failed to open resource: {0}")]
    Open(String),

    /// The operation requires an active transaction on the connection.
    #[error("no active transaction on connection")]
    NotActive,

    /// A transaction is already active on the connection.
    #[error("transaction already active on connection")]
    AlreadyActive,

    /// Attempted a write operation on a read-only transaction.
    #[error("cannot write in read-only transaction")]
    ReadOnly,

    /// The driver does not support savepoints.
    #[error("savepoints not supported by this driver")]
    SavepointsUnsupported,

    /// The savepoint handle does not refer to a live savepoint.
    #[error("unknown savepoint: {0}")]
    UnknownSavepoint(u64),

    /// An internal driver error occurred.
    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;
