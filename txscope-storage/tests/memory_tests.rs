//! Integration tests for the in-memory resource backend.

use txscope_storage::{DriverError, MemoryDriver, ResourceConnection, ResourceDriver};

// ============================================================================
// Basic Transaction Tests
// ============================================================================

#[test]
fn commit_makes_writes_visible() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    conn.put("accounts", b"alice", b"100").expect("failed to put");
    conn.commit().expect("failed to commit");

    let value = driver.committed("accounts", b"alice").expect("failed to read store");
    assert_eq!(value, Some(b"100".to_vec()));
}

#[test]
fn rollback_discards_writes() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    conn.put("accounts", b"alice", b"100").expect("failed to put");
    conn.rollback().expect("failed to rollback");

    assert_eq!(driver.committed("accounts", b"alice").expect("failed to read store"), None);
}

#[test]
fn uncommitted_writes_are_invisible_to_other_connections() {
    let driver = MemoryDriver::new();
    let mut writer = driver.open().expect("failed to open writer");
    let mut reader = driver.open().expect("failed to open reader");

    writer.begin(false).expect("failed to begin writer");
    reader.begin(true).expect("failed to begin reader");
    writer.put("accounts", b"alice", b"100").expect("failed to put");

    assert_eq!(reader.get("accounts", b"alice").expect("failed to get"), None);
    assert_eq!(
        writer.get("accounts", b"alice").expect("failed to get"),
        Some(b"100".to_vec()),
        "writer should see its own buffered write"
    );

    writer.commit().expect("failed to commit");
    assert_eq!(
        reader.get("accounts", b"alice").expect("failed to get"),
        Some(b"100".to_vec()),
        "committed data is visible to a running reader"
    );
}

#[test]
fn delete_overlays_committed_data() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    conn.put("accounts", b"alice", b"100").expect("failed to put");
    conn.commit().expect("failed to commit");

    let mut conn = driver.open().expect("failed to reopen connection");
    conn.begin(false).expect("failed to begin");
    assert!(conn.delete("accounts", b"alice").expect("failed to delete"));
    assert_eq!(conn.get("accounts", b"alice").expect("failed to get"), None);
    conn.commit().expect("failed to commit");

    assert_eq!(driver.committed("accounts", b"alice").expect("failed to read store"), None);
}

// ============================================================================
// Protocol Enforcement
// ============================================================================

#[test]
fn operations_require_an_active_transaction() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    assert!(matches!(conn.put("t", b"k", b"v"), Err(DriverError::NotActive)));
    assert!(matches!(conn.commit(), Err(DriverError::NotActive)));
    assert!(matches!(conn.rollback(), Err(DriverError::NotActive)));
    assert!(matches!(conn.create_savepoint(), Err(DriverError::NotActive)));
}

#[test]
fn begin_twice_is_rejected() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    assert!(matches!(conn.begin(false), Err(DriverError::AlreadyActive)));
}

#[test]
fn read_only_transaction_rejects_writes() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(true).expect("failed to begin");
    assert!(matches!(conn.put("t", b"k", b"v"), Err(DriverError::ReadOnly)));
    assert!(matches!(conn.delete("t", b"k"), Err(DriverError::ReadOnly)));
    assert_eq!(conn.get("t", b"k").expect("reads are allowed"), None);
}

// ============================================================================
// Savepoint Tests
// ============================================================================

#[test]
fn rollback_to_savepoint_discards_later_writes_only() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    conn.put("rows", b"a", b"1").expect("failed to put a");
    let sp = conn.create_savepoint().expect("failed to create savepoint");
    conn.put("rows", b"b", b"2").expect("failed to put b");

    conn.rollback_to_savepoint(sp).expect("failed to rollback to savepoint");
    conn.release_savepoint(sp).expect("failed to release savepoint");
    conn.commit().expect("failed to commit");

    assert_eq!(driver.committed("rows", b"a").expect("failed to read"), Some(b"1".to_vec()));
    assert_eq!(driver.committed("rows", b"b").expect("failed to read"), None);
}

#[test]
fn release_without_rollback_keeps_writes() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    let sp = conn.create_savepoint().expect("failed to create savepoint");
    conn.put("rows", b"a", b"1").expect("failed to put");
    conn.release_savepoint(sp).expect("failed to release");
    conn.commit().expect("failed to commit");

    assert_eq!(driver.committed("rows", b"a").expect("failed to read"), Some(b"1".to_vec()));
}

#[test]
fn rollback_to_savepoint_invalidates_later_savepoints() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    let outer = conn.create_savepoint().expect("failed to create outer");
    conn.put("rows", b"a", b"1").expect("failed to put");
    let inner = conn.create_savepoint().expect("failed to create inner");

    conn.rollback_to_savepoint(outer).expect("failed to rollback to outer");
    assert!(matches!(
        conn.rollback_to_savepoint(inner),
        Err(DriverError::UnknownSavepoint(_))
    ));
}

#[test]
fn released_savepoint_handles_are_dead() {
    let driver = MemoryDriver::new();
    let mut conn = driver.open().expect("failed to open connection");

    conn.begin(false).expect("failed to begin");
    let sp = conn.create_savepoint().expect("failed to create savepoint");
    conn.release_savepoint(sp).expect("failed to release");
    assert!(matches!(conn.release_savepoint(sp), Err(DriverError::UnknownSavepoint(_))));
}

#[test]
fn savepoints_can_be_disabled() {
    let driver = MemoryDriver::without_savepoints();
    assert!(!driver.supports_savepoints());

    let mut conn = driver.open().expect("failed to open connection");
    conn.begin(false).expect("failed to begin");
    assert!(matches!(conn.create_savepoint(), Err(DriverError::SavepointsUnsupported)));
}

#[test]
fn cloned_drivers_share_the_store() {
    let driver = MemoryDriver::new();
    let clone = driver.clone();

    let mut conn = driver.open().expect("failed to open connection");
    conn.begin(false).expect("failed to begin");
    conn.put("rows", b"a", b"1").expect("failed to put");
    conn.commit().expect("failed to commit");

    assert_eq!(clone.committed("rows", b"a").expect("failed to read"), Some(b"1".to_vec()));
}
