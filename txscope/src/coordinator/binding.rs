//! Execution-scoped binding of connection, physical state, and scope stack.

use super::context::ScopeId;
use super::sync::SyncRegistry;

/// State of the one physical transaction bound to this execution path.
#[derive(Debug)]
pub(crate) struct PhysicalState {
    /// Sticky flag; once `true` it can only stay `true` for the lifetime of
    /// the physical transaction.
    pub(crate) rollback_only: bool,
    pub(crate) read_only: bool,
    pub(crate) synchronizations: SyncRegistry,
}

impl PhysicalState {
    pub(crate) fn new(read_only: bool) -> Self {
        Self { rollback_only: false, read_only, synchronizations: SyncRegistry::default() }
    }
}

/// Stack entry for one open logical scope.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScopeFrame {
    pub(crate) id: ScopeId,
    pub(crate) new_transaction: bool,
    pub(crate) transactional: bool,
}

/// A suspended physical transaction, parked while an independent scope runs.
#[derive(Debug)]
pub(crate) struct Suspended<C> {
    pub(crate) connection: C,
    pub(crate) physical: PhysicalState,
}

/// Per-execution-path coordinator state.
///
/// At most one connection is bound at any instant; arbitrarily many logical
/// scopes stack inside it, and suspended transactions park in LIFO order
/// matching the scopes that suspended them.
#[derive(Debug)]
pub(crate) struct Binding<C> {
    pub(crate) connection: Option<C>,
    pub(crate) physical: Option<PhysicalState>,
    pub(crate) stack: Vec<ScopeFrame>,
    pub(crate) suspended: Vec<Suspended<C>>,
    next_scope: u64,
}

impl<C> Binding<C> {
    pub(crate) fn new() -> Self {
        Self {
            connection: None,
            physical: None,
            stack: Vec::new(),
            suspended: Vec::new(),
            next_scope: 1,
        }
    }

    pub(crate) fn allocate_scope_id(&mut self) -> ScopeId {
        let id = ScopeId::new(self.next_scope);
        self.next_scope += 1;
        id
    }

    /// Whether a physical transaction is bound right now.
    pub(crate) fn has_physical(&self) -> bool {
        self.physical.is_some()
    }
}
