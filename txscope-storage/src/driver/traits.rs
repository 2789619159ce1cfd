//! Core resource driver traits.

use super::DriverError;

/// Opaque handle to a savepoint inside an open physical transaction.
///
/// Handles are issued by [`ResourceConnection::create_savepoint`] and are
/// only meaningful on the connection that issued them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Savepoint(u64);

impl Savepoint {
    /// Create a savepoint handle from a raw id. For driver implementations.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id backing this handle.
    #[must_use]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// A factory for physical resource connections.
///
/// One driver typically fronts a connection pool or an embedded store; the
/// coordinator calls [`open`] once per physical transaction it decides to
/// start.
///
/// [`open`]: ResourceDriver::open
pub trait ResourceDriver {
    /// The connection type produced by this driver.
    type Connection: ResourceConnection;

    /// Open a new physical connection.
    fn open(&self) -> Result<Self::Connection, DriverError>;

    /// Whether connections from this driver support savepoints.
    ///
    /// Drivers without savepoint support cannot host savepoint-nested
    /// scopes; the coordinator rejects those before touching the connection.
    fn supports_savepoints(&self) -> bool {
        true
    }
}

/// One physical connection-like resource.
///
/// The coordinator treats every method as an opaque synchronous call; any
/// blocking or timeout policy belongs to the driver. A connection hosts at
/// most one transaction at a time, dropped or reopened between uses.
pub trait ResourceConnection {
    /// Begin a physical transaction on this connection.
    fn begin(&mut self, read_only: bool) -> Result<(), DriverError>;

    /// Commit the active physical transaction.
    fn commit(&mut self) -> Result<(), DriverError>;

    /// Roll back the active physical transaction.
    fn rollback(&mut self) -> Result<(), DriverError>;

    /// Create a savepoint inside the active physical transaction.
    fn create_savepoint(&mut self) -> Result<Savepoint, DriverError>;

    /// Roll back to the given savepoint, discarding work done after it.
    /// The savepoint itself remains live until released.
    fn rollback_to_savepoint(&mut self, savepoint: Savepoint) -> Result<(), DriverError>;

    /// Release the given savepoint without undoing any work.
    fn release_savepoint(&mut self, savepoint: Savepoint) -> Result<(), DriverError>;
}
