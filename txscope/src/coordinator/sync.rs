//! Synchronization callbacks tied to the physical transaction.

/// How the physical transaction was finalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionStatus {
    /// The physical transaction committed.
    Committed,
    /// The physical transaction rolled back.
    RolledBack,
}

/// Callback hooks invoked at well-defined points of the *physical*
/// transaction's finalization.
///
/// Callbacks fire at most once per physical transaction and never for
/// logical (joined or savepoint-nested) scopes. `before_commit` and
/// `after_commit` run on the commit path only; `after_completion` runs on
/// both paths.
pub trait Synchronization {
    /// Called before the physical commit is issued.
    fn before_commit(&mut self, read_only: bool) {
        let _ = read_only;
    }

    /// Called after the physical commit succeeded.
    fn after_commit(&mut self) {}

    /// Called after the physical transaction finished, either way.
    fn after_completion(&mut self, status: CompletionStatus) {
        let _ = status;
    }
}

/// FIFO registry of synchronizations for one physical transaction.
#[derive(Default)]
pub(crate) struct SyncRegistry {
    entries: Vec<Box<dyn Synchronization>>,
}

impl SyncRegistry {
    pub(crate) fn register(&mut self, synchronization: Box<dyn Synchronization>) {
        self.entries.push(synchronization);
    }

    pub(crate) fn fire_before_commit(&mut self, read_only: bool) {
        for entry in &mut self.entries {
            entry.before_commit(read_only);
        }
    }

    pub(crate) fn fire_after_commit(&mut self) {
        for entry in &mut self.entries {
            entry.after_commit();
        }
    }

    /// Fires `after_completion` and drains the registry, so callbacks can
    /// never run twice even if the registry value were to outlive the
    /// physical transaction.
    pub(crate) fn fire_after_completion(&mut self, status: CompletionStatus) {
        for mut entry in self.entries.drain(..) {
            entry.after_completion(status);
        }
    }
}

impl std::fmt::Debug for SyncRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncRegistry").field("entries", &self.entries.len()).finish()
    }
}
