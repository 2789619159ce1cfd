//! Error types for the coordinator crate.

use thiserror::Error;
use txscope_core::FailureKind;
use txscope_storage::DriverError;

/// Errors that can occur when using the transaction coordinator.
#[derive(Debug, Error)]
pub enum TxError {
    /// The resource driver returned an error. Driver errors are surfaced
    /// unchanged, never reclassified into rollback rules.
    #[error("driver error: {0}")]
    Driver(#[from] DriverError),

    /// Protocol misuse, such as beginning a mandatory scope with no active
    /// transaction or opening over a suspended one.
    #[error("illegal transaction state: {0}")]
    IllegalState(String),

    /// `end` was called on a scope that is not the innermost open one.
    #[error("scope {scope} completed out of order; it is not the innermost open scope")]
    MisorderedCompletion {
        /// The id of the scope passed to `end`.
        scope: u64,
    },

    /// `end` was called a second time on an already-completed scope.
    #[error("transaction scope already completed")]
    ScopeAlreadyCompleted,

    /// A savepoint-nested scope was requested on a driver without savepoint
    /// support.
    #[error("driver does not support savepoints required for nested scopes")]
    NestedTransactionNotSupported,

    /// The physical transaction was rolled back because an inner scope
    /// marked it rollback-only, while the outer caller reported success.
    /// The rollback has already happened when this error is returned.
    #[error("transaction rolled back because it has been marked as rollback-only")]
    UnexpectedRollback,

    /// The unit of work itself failed; carried back to the caller by
    /// [`execute`] after the transaction outcome was resolved.
    ///
    /// [`execute`]: crate::TransactionCoordinator::execute
    #[error("unit of work failed: {0}")]
    Unit(FailureKind),
}

impl From<TxError> for FailureKind {
    /// Lets a unit-of-work body propagate coordinator errors with `?`.
    ///
    /// A [`TxError::Unit`] unwraps to the original classified failure, so a
    /// business failure raised two scopes down still classifies as business
    /// in every enclosing scope. Everything else becomes an
    /// unexpected-category failure.
    fn from(error: TxError) -> Self {
        match error {
            TxError::Unit(kind) => kind,
            other => FailureKind::unexpected(other.to_string()),
        }
    }
}

impl TxError {
    /// Returns `true` for caller-misuse errors that are never retried.
    #[must_use]
    pub const fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::IllegalState(_)
                | Self::MisorderedCompletion { .. }
                | Self::ScopeAlreadyCompleted
        )
    }
}

/// Result type alias for coordinator operations.
pub type TxResult<T> = Result<T, TxError>;
