//! Test fixtures for coordinator tests.
//!
//! Provides a recording resource driver that logs every physical operation,
//! so tests can assert exactly which commits, rollbacks, and savepoint
//! operations a scenario performed.

pub mod recording;
