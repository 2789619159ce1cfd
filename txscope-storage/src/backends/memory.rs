//! In-memory resource backend.
//!
//! This backend keeps a table/key/value byte store behind a lock. Each
//! connection buffers its writes in a log that overlays reads; `commit`
//! applies the log to the shared store, `rollback` discards it, and
//! savepoints are marks into the log that `rollback_to_savepoint` truncates
//! back to. Cloned drivers share the same store, so committed data is
//! visible across connections and execution paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use crate::driver::{DriverError, DriverResult, ResourceConnection, ResourceDriver, Savepoint};

type Table = BTreeMap<Vec<u8>, Vec<u8>>;
type Store = BTreeMap<String, Table>;

/// A buffered write awaiting commit.
#[derive(Debug, Clone)]
enum WriteOp {
    Put { table: String, key: Vec<u8>, value: Vec<u8> },
    Delete { table: String, key: Vec<u8> },
}

/// An in-memory resource driver.
///
/// Cheap to clone; clones share the underlying store. Use
/// [`without_savepoints`] to simulate a driver that cannot host
/// savepoint-nested scopes.
///
/// [`without_savepoints`]: MemoryDriver::without_savepoints
#[derive(Debug, Clone, Default)]
pub struct MemoryDriver {
    store: Arc<Mutex<Store>>,
    savepoints_disabled: bool,
}

impl MemoryDriver {
    /// Create a driver with a fresh empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a driver whose connections reject savepoint operations.
    #[must_use]
    pub fn without_savepoints() -> Self {
        Self { store: Arc::default(), savepoints_disabled: true }
    }

    /// Read a committed value directly, outside any transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lock is poisoned.
    pub fn committed(&self, table: &str, key: &[u8]) -> DriverResult<Option<Vec<u8>>> {
        let store = lock_store(&self.store)?;
        Ok(store.get(table).and_then(|t| t.get(key)).cloned())
    }
}

impl ResourceDriver for MemoryDriver {
    type Connection = MemoryConnection;

    fn open(&self) -> DriverResult<MemoryConnection> {
        Ok(MemoryConnection {
            store: Arc::clone(&self.store),
            log: Vec::new(),
            marks: HashMap::new(),
            next_savepoint: 1,
            active: false,
            read_only: false,
            savepoints_disabled: self.savepoints_disabled,
        })
    }

    fn supports_savepoints(&self) -> bool {
        !self.savepoints_disabled
    }
}

/// A connection to the in-memory store.
///
/// Reads see the shared store overlaid with this connection's own
/// uncommitted writes; other connections never observe the log until commit.
#[derive(Debug)]
pub struct MemoryConnection {
    store: Arc<Mutex<Store>>,
    log: Vec<WriteOp>,
    /// Savepoint id -> log length at creation time.
    marks: HashMap<u64, usize>,
    next_savepoint: u64,
    active: bool,
    read_only: bool,
    savepoints_disabled: bool,
}

impl MemoryConnection {
    /// Read a value, overlaying uncommitted writes over the shared store.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotActive`] outside a transaction.
    pub fn get(&self, table: &str, key: &[u8]) -> DriverResult<Option<Vec<u8>>> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        // Latest buffered write for this key wins.
        for op in self.log.iter().rev() {
            match op {
                WriteOp::Put { table: t, key: k, value } if t == table && k == key => {
                    return Ok(Some(value.clone()));
                }
                WriteOp::Delete { table: t, key: k } if t == table && k == key => {
                    return Ok(None);
                }
                _ => {}
            }
        }
        let store = lock_store(&self.store)?;
        Ok(store.get(table).and_then(|t| t.get(key)).cloned())
    }

    /// Buffer a put for commit.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotActive`] outside a transaction and
    /// [`DriverError::ReadOnly`] in a read-only one.
    pub fn put(&mut self, table: &str, key: &[u8], value: &[u8]) -> DriverResult<()> {
        self.check_writable()?;
        self.log.push(WriteOp::Put {
            table: table.to_owned(),
            key: key.to_vec(),
            value: value.to_vec(),
        });
        Ok(())
    }

    /// Buffer a delete for commit. Returns whether the key was visible.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::NotActive`] outside a transaction and
    /// [`DriverError::ReadOnly`] in a read-only one.
    pub fn delete(&mut self, table: &str, key: &[u8]) -> DriverResult<bool> {
        self.check_writable()?;
        let existed = self.get(table, key)?.is_some();
        self.log.push(WriteOp::Delete { table: table.to_owned(), key: key.to_vec() });
        Ok(existed)
    }

    fn check_writable(&self) -> DriverResult<()> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        if self.read_only {
            return Err(DriverError::ReadOnly);
        }
        Ok(())
    }
}

impl ResourceConnection for MemoryConnection {
    fn begin(&mut self, read_only: bool) -> DriverResult<()> {
        if self.active {
            return Err(DriverError::AlreadyActive);
        }
        self.active = true;
        self.read_only = read_only;
        Ok(())
    }

    fn commit(&mut self) -> DriverResult<()> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        let mut store = lock_store(&self.store)?;
        for op in self.log.drain(..) {
            match op {
                WriteOp::Put { table, key, value } => {
                    store.entry(table).or_default().insert(key, value);
                }
                WriteOp::Delete { table, key } => {
                    if let Some(t) = store.get_mut(&table) {
                        t.remove(&key);
                    }
                }
            }
        }
        self.marks.clear();
        self.active = false;
        Ok(())
    }

    fn rollback(&mut self) -> DriverResult<()> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        self.log.clear();
        self.marks.clear();
        self.active = false;
        Ok(())
    }

    fn create_savepoint(&mut self) -> DriverResult<Savepoint> {
        if self.savepoints_disabled {
            return Err(DriverError::SavepointsUnsupported);
        }
        if !self.active {
            return Err(DriverError::NotActive);
        }
        let id = self.next_savepoint;
        self.next_savepoint += 1;
        self.marks.insert(id, self.log.len());
        Ok(Savepoint::new(id))
    }

    fn rollback_to_savepoint(&mut self, savepoint: Savepoint) -> DriverResult<()> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        let mark = *self
            .marks
            .get(&savepoint.id())
            .ok_or(DriverError::UnknownSavepoint(savepoint.id()))?;
        self.log.truncate(mark);
        // Savepoints taken after this one no longer refer to live positions.
        self.marks.retain(|_, position| *position <= mark);
        Ok(())
    }

    fn release_savepoint(&mut self, savepoint: Savepoint) -> DriverResult<()> {
        if !self.active {
            return Err(DriverError::NotActive);
        }
        self.marks
            .remove(&savepoint.id())
            .map(|_| ())
            .ok_or(DriverError::UnknownSavepoint(savepoint.id()))
    }
}

fn lock_store(store: &Arc<Mutex<Store>>) -> DriverResult<std::sync::MutexGuard<'_, Store>> {
    store.lock().map_err(|_| DriverError::Internal("store lock poisoned".to_owned()))
}
