//! A resource driver wrapper that records physical operations.
#![allow(dead_code)]

use std::ops::{Deref, DerefMut};
use std::sync::{Arc, Mutex};

use txscope_storage::{
    DriverResult, MemoryConnection, MemoryDriver, ResourceConnection, ResourceDriver, Savepoint,
};

/// Shared log of physical operations, in call order.
#[derive(Debug, Clone, Default)]
pub struct OpLog(Arc<Mutex<Vec<String>>>);

impl OpLog {
    pub fn record(&self, op: impl Into<String>) {
        self.0.lock().expect("op log lock poisoned").push(op.into());
    }

    /// All recorded operations, in order.
    pub fn snapshot(&self) -> Vec<String> {
        self.0.lock().expect("op log lock poisoned").clone()
    }

    /// Number of recorded operations with the given name.
    pub fn count(&self, op: &str) -> usize {
        self.0.lock().expect("op log lock poisoned").iter().filter(|entry| *entry == op).count()
    }
}

/// A [`MemoryDriver`] wrapper whose connections log physical operations.
#[derive(Debug, Clone)]
pub struct RecordingDriver {
    inner: MemoryDriver,
    log: OpLog,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self { inner: MemoryDriver::new(), log: OpLog::default() }
    }

    pub fn without_savepoints() -> Self {
        Self { inner: MemoryDriver::without_savepoints(), log: OpLog::default() }
    }

    /// The operation log shared by all connections of this driver.
    pub fn log(&self) -> &OpLog {
        &self.log
    }

    /// The wrapped store, for committed-state assertions.
    pub fn store(&self) -> &MemoryDriver {
        &self.inner
    }
}

impl Default for RecordingDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceDriver for RecordingDriver {
    type Connection = RecordingConnection;

    fn open(&self) -> DriverResult<RecordingConnection> {
        self.log.record("open");
        Ok(RecordingConnection { inner: self.inner.open()?, log: self.log.clone() })
    }

    fn supports_savepoints(&self) -> bool {
        self.inner.supports_savepoints()
    }
}

/// A [`MemoryConnection`] that logs transaction-lifecycle operations.
///
/// Derefs to the wrapped connection, so data operations (`get`/`put`/
/// `delete`) are available directly.
#[derive(Debug)]
pub struct RecordingConnection {
    inner: MemoryConnection,
    log: OpLog,
}

impl Deref for RecordingConnection {
    type Target = MemoryConnection;

    fn deref(&self) -> &MemoryConnection {
        &self.inner
    }
}

impl DerefMut for RecordingConnection {
    fn deref_mut(&mut self) -> &mut MemoryConnection {
        &mut self.inner
    }
}

impl ResourceConnection for RecordingConnection {
    fn begin(&mut self, read_only: bool) -> DriverResult<()> {
        self.log.record("begin");
        self.inner.begin(read_only)
    }

    fn commit(&mut self) -> DriverResult<()> {
        self.log.record("commit");
        self.inner.commit()
    }

    fn rollback(&mut self) -> DriverResult<()> {
        self.log.record("rollback");
        self.inner.rollback()
    }

    fn create_savepoint(&mut self) -> DriverResult<Savepoint> {
        self.log.record("create_savepoint");
        self.inner.create_savepoint()
    }

    fn rollback_to_savepoint(&mut self, savepoint: Savepoint) -> DriverResult<()> {
        self.log.record("rollback_to_savepoint");
        self.inner.rollback_to_savepoint(savepoint)
    }

    fn release_savepoint(&mut self, savepoint: Savepoint) -> DriverResult<()> {
        self.log.record("release_savepoint");
        self.inner.release_savepoint(savepoint)
    }
}
