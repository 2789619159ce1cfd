//! Propagation behaviors for transactional scopes.

/// Policy governing how a new logical scope relates to an existing physical
/// transaction on the same execution path.
///
/// A *logical scope* is one `begin`/`end` pair; a *physical transaction* is
/// the single underlying resource-level transaction open at a time. Most
/// behaviors differ only in what they do when a physical transaction is
/// already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Propagation {
    /// Join the active physical transaction if one exists; otherwise open a
    /// new one. Joined scopes never commit or roll back physically.
    ///
    /// This is the default and by far the most common behavior.
    #[default]
    Required,

    /// Suspend any active physical transaction and open an independent new
    /// one. The suspended transaction is restored when this scope ends,
    /// regardless of this scope's outcome.
    RequiresNew,

    /// Run inside the active physical transaction behind a savepoint, so a
    /// failure rolls back this scope's work only. Behaves like [`Required`]
    /// when no physical transaction is active.
    ///
    /// Requires savepoint support from the resource driver.
    ///
    /// [`Required`]: Propagation::Required
    Nested,

    /// Join the active physical transaction; fail if none exists.
    Mandatory,

    /// Suspend any active physical transaction and run without one.
    NotSupported,

    /// Run without a transaction; fail if one is active.
    Never,
}
