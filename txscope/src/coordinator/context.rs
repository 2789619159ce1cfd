//! Transaction context handed out by `begin` and resolved by `end`.

use txscope_core::RollbackRules;
use txscope_storage::Savepoint;

/// Unique identifier for a logical scope within one coordinator.
///
/// Ids are allocated in strictly increasing order; the coordinator uses them
/// to enforce LIFO completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    pub(crate) const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw u64 value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

/// Mutable record describing one logical transaction scope.
///
/// Returned by `begin`, resolved exactly once by `end`. Whether the scope
/// corresponds to a physical transaction of its own, a joined share of an
/// existing one, a savepoint inside one, or no transaction at all is fixed
/// at `begin` time and observable through the accessors.
#[derive(Debug)]
pub struct TransactionContext {
    pub(crate) id: ScopeId,
    pub(crate) new_transaction: bool,
    pub(crate) transactional: bool,
    pub(crate) savepoint: Option<Savepoint>,
    pub(crate) read_only: bool,
    pub(crate) suspended_outer: bool,
    pub(crate) completed: bool,
    pub(crate) rules: RollbackRules,
}

impl TransactionContext {
    /// The scope's id.
    #[must_use]
    pub const fn id(&self) -> ScopeId {
        self.id
    }

    /// `true` iff this scope opened the physical transaction.
    #[must_use]
    pub const fn is_new_transaction(&self) -> bool {
        self.new_transaction
    }

    /// `false` for scopes that run without any physical transaction.
    #[must_use]
    pub const fn is_transactional(&self) -> bool {
        self.transactional
    }

    /// The savepoint guarding this scope, if it is savepoint-nested.
    #[must_use]
    pub const fn savepoint(&self) -> Option<Savepoint> {
        self.savepoint
    }

    /// Whether the scope runs read-only.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Whether this scope suspended an outer physical transaction.
    #[must_use]
    pub const fn suspended_outer(&self) -> bool {
        self.suspended_outer
    }

    /// Whether `end` has resolved this scope.
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.completed
    }

    /// The rollback classification rules captured at `begin` time.
    #[must_use]
    pub const fn rules(&self) -> &RollbackRules {
        &self.rules
    }
}

/// Snapshot of the innermost open scope, for observation and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeStatus {
    /// Whether the innermost scope opened the physical transaction.
    pub new_transaction: bool,
    /// Whether the innermost scope participates in a physical transaction.
    pub transactional: bool,
    /// The physical transaction's sticky rollback-only flag.
    pub rollback_only: bool,
    /// Whether the physical transaction is read-only.
    pub read_only: bool,
}
