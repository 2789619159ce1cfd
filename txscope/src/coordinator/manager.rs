//! Transaction coordinator implementation.

use tracing::{debug, warn};

use txscope_core::{Outcome, Propagation, TransactionDefinition};
use txscope_storage::{ResourceConnection, ResourceDriver};

use crate::error::{TxError, TxResult};

use super::binding::{Binding, PhysicalState, ScopeFrame, Suspended};
use super::context::{ScopeStatus, TransactionContext};
use super::sync::{CompletionStatus, SyncRegistry, Synchronization};

/// Coordinates transactional scopes over one resource driver.
///
/// A coordinator is the capability object for exactly one execution path:
/// it owns that path's resource binding and scope stack, and nothing in it
/// is shared across paths. Paths that should see each other's committed data
/// each get their own coordinator over clones of the same driver.
///
/// # Scope protocol
///
/// [`begin`] opens a logical scope according to its definition's propagation
/// behavior and returns a [`TransactionContext`]; [`end`] resolves that
/// scope with a success or classified-failure outcome. Scopes complete in
/// strict LIFO order, and only the scope that opened a physical transaction
/// ever commits or rolls it back. [`execute`] wraps the pair around a
/// closure, guaranteeing resolution on every exit path.
///
/// # Example
///
/// ```ignore
/// let mut coordinator = TransactionCoordinator::new(MemoryDriver::new());
///
/// let mut outer = coordinator.begin(&TransactionDefinition::required())?;
/// let mut inner = coordinator.begin(&TransactionDefinition::required())?;
/// assert!(!inner.is_new_transaction());
/// coordinator.end(&mut inner, Outcome::Success)?;
/// coordinator.end(&mut outer, Outcome::Success)?; // physical commit happens here
/// ```
///
/// [`begin`]: TransactionCoordinator::begin
/// [`end`]: TransactionCoordinator::end
/// [`execute`]: TransactionCoordinator::execute
pub struct TransactionCoordinator<D: ResourceDriver> {
    driver: D,
    binding: Binding<D::Connection>,
}

impl<D: ResourceDriver> TransactionCoordinator<D> {
    /// Create a coordinator over the given driver.
    pub fn new(driver: D) -> Self {
        Self { driver, binding: Binding::new() }
    }

    /// Get a reference to the underlying driver.
    pub fn driver(&self) -> &D {
        &self.driver
    }

    // ========================================================================
    // Propagation
    // ========================================================================

    /// Open a logical scope per the definition's propagation behavior.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::IllegalState`] on protocol misuse (mandatory scope
    /// with no transaction, never scope inside one, fresh open over a
    /// suspension), [`TxError::NestedTransactionNotSupported`] when a nested
    /// scope is requested on a driver without savepoints, and driver errors
    /// unchanged.
    pub fn begin(&mut self, definition: &TransactionDefinition) -> TxResult<TransactionContext> {
        match definition.propagation() {
            Propagation::Required => {
                if self.binding.has_physical() {
                    Ok(self.join(definition))
                } else {
                    self.open_physical(definition, false)
                }
            }
            Propagation::RequiresNew => {
                let suspending = self.binding.has_physical();
                if suspending {
                    self.suspend()?;
                }
                match self.open_physical(definition, suspending) {
                    Ok(mut context) => {
                        context.suspended_outer = suspending;
                        Ok(context)
                    }
                    Err(error) => {
                        // Put the suspended transaction back before surfacing.
                        if suspending {
                            self.resume()?;
                        }
                        Err(error)
                    }
                }
            }
            Propagation::Nested => {
                if self.binding.has_physical() {
                    self.open_savepoint_scope(definition)
                } else {
                    self.open_physical(definition, false)
                }
            }
            Propagation::Mandatory => {
                if self.binding.has_physical() {
                    Ok(self.join(definition))
                } else {
                    Err(TxError::IllegalState(
                        "no existing transaction found for mandatory scope".to_owned(),
                    ))
                }
            }
            Propagation::NotSupported => {
                let suspending = self.binding.has_physical();
                if suspending {
                    self.suspend()?;
                }
                Ok(self.open_plain_scope(definition, suspending))
            }
            Propagation::Never => {
                if self.binding.has_physical() {
                    Err(TxError::IllegalState(
                        "existing transaction found for never scope".to_owned(),
                    ))
                } else {
                    Ok(self.open_plain_scope(definition, false))
                }
            }
        }
    }

    /// Open a new physical transaction and bind it to this execution path.
    ///
    /// `just_suspended` is true only for the open performed by the same
    /// `RequiresNew` begin that just parked the previous transaction; any
    /// other fresh open over a suspension is a protocol error.
    fn open_physical(
        &mut self,
        definition: &TransactionDefinition,
        just_suspended: bool,
    ) -> TxResult<TransactionContext> {
        if !just_suspended && !self.binding.suspended.is_empty() {
            return Err(TxError::IllegalState(
                "cannot open a new physical transaction over a suspended one".to_owned(),
            ));
        }
        if self.binding.connection.is_some() {
            return Err(TxError::IllegalState(
                "a physical connection is already bound to this execution path".to_owned(),
            ));
        }

        let read_only = definition.is_read_only();
        let mut connection = self.driver.open()?;
        connection.begin(read_only)?;
        debug!("opened physical transaction (read_only={})", read_only);

        self.binding.connection = Some(connection);
        self.binding.physical = Some(PhysicalState::new(read_only));

        let id = self.binding.allocate_scope_id();
        self.binding.stack.push(ScopeFrame { id, new_transaction: true, transactional: true });
        Ok(TransactionContext {
            id,
            new_transaction: true,
            transactional: true,
            savepoint: None,
            read_only,
            suspended_outer: false,
            completed: false,
            rules: definition.rules().clone(),
        })
    }

    /// Join the active physical transaction without a savepoint.
    fn join(&mut self, definition: &TransactionDefinition) -> TransactionContext {
        let read_only =
            self.binding.physical.as_ref().map_or(false, |physical| physical.read_only);
        let id = self.binding.allocate_scope_id();
        self.binding.stack.push(ScopeFrame { id, new_transaction: false, transactional: true });
        debug!("joined existing physical transaction (scope={})", id.as_u64());
        TransactionContext {
            id,
            new_transaction: false,
            transactional: true,
            savepoint: None,
            read_only,
            suspended_outer: false,
            completed: false,
            rules: definition.rules().clone(),
        }
    }

    /// Nest inside the active physical transaction behind a savepoint.
    fn open_savepoint_scope(
        &mut self,
        definition: &TransactionDefinition,
    ) -> TxResult<TransactionContext> {
        if !self.driver.supports_savepoints() {
            return Err(TxError::NestedTransactionNotSupported);
        }
        let connection = self
            .binding
            .connection
            .as_mut()
            .ok_or_else(|| TxError::IllegalState("no connection bound for nested scope".to_owned()))?;
        let savepoint = connection.create_savepoint()?;
        let read_only =
            self.binding.physical.as_ref().map_or(false, |physical| physical.read_only);

        let id = self.binding.allocate_scope_id();
        self.binding.stack.push(ScopeFrame { id, new_transaction: false, transactional: true });
        debug!("created savepoint scope (scope={})", id.as_u64());
        Ok(TransactionContext {
            id,
            new_transaction: false,
            transactional: true,
            savepoint: Some(savepoint),
            read_only,
            suspended_outer: false,
            completed: false,
            rules: definition.rules().clone(),
        })
    }

    /// Open a scope that runs without any physical transaction.
    fn open_plain_scope(
        &mut self,
        definition: &TransactionDefinition,
        suspended_outer: bool,
    ) -> TransactionContext {
        let id = self.binding.allocate_scope_id();
        self.binding.stack.push(ScopeFrame { id, new_transaction: false, transactional: false });
        TransactionContext {
            id,
            new_transaction: false,
            transactional: false,
            savepoint: None,
            read_only: definition.is_read_only(),
            suspended_outer,
            completed: false,
            rules: definition.rules().clone(),
        }
    }

    /// Park the active physical transaction on the suspension stash.
    fn suspend(&mut self) -> TxResult<()> {
        let connection = self.binding.connection.take().ok_or_else(|| {
            TxError::IllegalState("no connection bound to suspend".to_owned())
        })?;
        let physical = self.binding.physical.take().ok_or_else(|| {
            TxError::IllegalState("no physical transaction to suspend".to_owned())
        })?;
        debug!("suspended physical transaction");
        self.binding.suspended.push(Suspended { connection, physical });
        Ok(())
    }

    /// Restore the most recently suspended physical transaction.
    fn resume(&mut self) -> TxResult<()> {
        let suspended = self.binding.suspended.pop().ok_or_else(|| {
            TxError::IllegalState("no suspended transaction to resume".to_owned())
        })?;
        if self.binding.connection.is_some() || self.binding.physical.is_some() {
            return Err(TxError::IllegalState(
                "cannot resume while a physical transaction is still bound".to_owned(),
            ));
        }
        debug!("resumed suspended physical transaction");
        self.binding.connection = Some(suspended.connection);
        self.binding.physical = Some(suspended.physical);
        Ok(())
    }

    // ========================================================================
    // Outcome Resolution
    // ========================================================================

    /// Resolve a scope with the given outcome.
    ///
    /// Joined scopes only ever escalate to the shared rollback-only flag;
    /// savepoint scopes roll back to or release their savepoint; the scope
    /// that opened the physical transaction commits or rolls it back and
    /// fires synchronizations. Returns `Ok(())` for a `Failure` outcome that
    /// resolved cleanly — the unit's own failure belongs to its caller.
    ///
    /// # Errors
    ///
    /// [`TxError::ScopeAlreadyCompleted`] and
    /// [`TxError::MisorderedCompletion`] fail fast without touching the
    /// resource. [`TxError::UnexpectedRollback`] reports that an inner scope
    /// forced a rollback the outer caller did not ask for; the physical
    /// rollback has already happened. Driver errors pass through unchanged.
    pub fn end(&mut self, context: &mut TransactionContext, outcome: Outcome) -> TxResult<()> {
        if context.completed {
            return Err(TxError::ScopeAlreadyCompleted);
        }
        match self.binding.stack.last() {
            Some(frame) if frame.id == context.id => {}
            _ => return Err(TxError::MisorderedCompletion { scope: context.id.as_u64() }),
        }

        let rollback_requested = match &outcome {
            Outcome::Success => false,
            Outcome::Failure(kind) => context.rules.should_roll_back(kind),
        };

        // The scope is done from here on, whatever the driver says below.
        self.binding.stack.pop();
        context.completed = true;

        if !context.transactional {
            if context.suspended_outer {
                self.resume()?;
            }
            return Ok(());
        }

        if let Some(savepoint) = context.savepoint {
            let connection = self.binding.connection.as_mut().ok_or_else(|| {
                TxError::IllegalState("no connection bound for savepoint scope".to_owned())
            })?;
            if rollback_requested {
                debug!("rolling back savepoint scope (scope={})", context.id.as_u64());
                connection.rollback_to_savepoint(savepoint)?;
            }
            connection.release_savepoint(savepoint)?;
            return Ok(());
        }

        if !context.new_transaction {
            if rollback_requested {
                let physical = self.binding.physical.as_mut().ok_or_else(|| {
                    TxError::IllegalState("no physical transaction for joined scope".to_owned())
                })?;
                debug!("joined scope marked transaction rollback-only");
                physical.rollback_only = true;
            }
            return Ok(());
        }

        // Outermost scope of a physical transaction: the decision point.
        let physical = self.binding.physical.take().ok_or_else(|| {
            TxError::IllegalState("no physical transaction to finalize".to_owned())
        })?;
        let mut connection = self.binding.connection.take().ok_or_else(|| {
            TxError::IllegalState("no connection bound to finalize".to_owned())
        })?;

        let result = finalize(&mut connection, physical, rollback_requested);
        drop(connection);

        if context.suspended_outer {
            let resumed = self.resume();
            if result.is_ok() {
                resumed?;
            }
        }
        result
    }

    /// Begin, run the body, and resolve, on every exit path.
    ///
    /// The body reports its own failures as classified [`FailureKind`]s;
    /// after resolution a failure is handed back as [`TxError::Unit`], so a
    /// commit-on-business-failure still surfaces the original failure.
    ///
    /// # Errors
    ///
    /// Everything [`begin`] and [`end`] can return, plus
    /// [`TxError::Unit`] for the body's own failure.
    ///
    /// [`begin`]: TransactionCoordinator::begin
    /// [`end`]: TransactionCoordinator::end
    /// [`FailureKind`]: txscope_core::FailureKind
    pub fn execute<T, F>(&mut self, definition: &TransactionDefinition, body: F) -> TxResult<T>
    where
        F: FnOnce(&mut Self) -> Result<T, txscope_core::FailureKind>,
    {
        let mut context = self.begin(definition)?;
        match body(self) {
            Ok(value) => {
                self.end(&mut context, Outcome::Success)?;
                Ok(value)
            }
            Err(kind) => {
                self.end(&mut context, Outcome::Failure(kind.clone()))?;
                Err(TxError::Unit(kind))
            }
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Whether a physical transaction is currently bound to this path.
    #[must_use]
    pub fn is_transaction_active(&self) -> bool {
        self.binding.has_physical()
    }

    /// Snapshot of the innermost open scope, if any.
    #[must_use]
    pub fn current(&self) -> Option<ScopeStatus> {
        self.binding.stack.last().map(|frame| ScopeStatus {
            new_transaction: frame.new_transaction,
            transactional: frame.transactional,
            rollback_only: self
                .binding
                .physical
                .as_ref()
                .map_or(false, |physical| physical.rollback_only),
            read_only: self
                .binding
                .physical
                .as_ref()
                .map_or(false, |physical| physical.read_only),
        })
    }

    /// The connection of the active physical transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::IllegalState`] when no physical transaction is
    /// active.
    pub fn resource(&self) -> TxResult<&D::Connection> {
        self.binding.connection.as_ref().ok_or_else(no_active_transaction)
    }

    /// Mutable access to the connection of the active physical transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::IllegalState`] when no physical transaction is
    /// active.
    pub fn resource_mut(&mut self) -> TxResult<&mut D::Connection> {
        self.binding.connection.as_mut().ok_or_else(no_active_transaction)
    }

    /// Mark the active physical transaction rollback-only.
    ///
    /// The flag is sticky: the transaction will roll back at its outermost
    /// scope no matter what the remaining outcomes report.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::IllegalState`] when no physical transaction is
    /// active.
    pub fn set_rollback_only(&mut self) -> TxResult<()> {
        let physical = self.binding.physical.as_mut().ok_or_else(no_active_transaction)?;
        physical.rollback_only = true;
        Ok(())
    }

    /// Register a synchronization against the active physical transaction.
    ///
    /// # Errors
    ///
    /// Returns [`TxError::IllegalState`] when no physical transaction is
    /// active.
    pub fn register_synchronization(
        &mut self,
        synchronization: Box<dyn Synchronization>,
    ) -> TxResult<()> {
        let physical = self.binding.physical.as_mut().ok_or_else(no_active_transaction)?;
        physical.synchronizations.register(synchronization);
        Ok(())
    }
}

fn no_active_transaction() -> TxError {
    TxError::IllegalState("no physical transaction is active".to_owned())
}

/// Commit or roll back the physical transaction and fire synchronizations.
fn finalize<C: ResourceConnection>(
    connection: &mut C,
    physical: PhysicalState,
    rollback_requested: bool,
) -> TxResult<()> {
    let mut registry: SyncRegistry = physical.synchronizations;

    if rollback_requested {
        debug!("rolling back physical transaction");
        connection.rollback()?;
        registry.fire_after_completion(CompletionStatus::RolledBack);
        Ok(())
    } else if physical.rollback_only {
        // An inner participant demanded rollback while this caller believes
        // it succeeded; roll back and make the discrepancy loud.
        warn!("commit attempted on a transaction marked rollback-only; rolling back");
        connection.rollback()?;
        registry.fire_after_completion(CompletionStatus::RolledBack);
        Err(TxError::UnexpectedRollback)
    } else {
        registry.fire_before_commit(physical.read_only);
        debug!("committing physical transaction");
        connection.commit()?;
        registry.fire_after_commit();
        registry.fire_after_completion(CompletionStatus::Committed);
        Ok(())
    }
}
