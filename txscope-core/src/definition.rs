//! Per-call-site transaction attributes.

use crate::outcome::{BusinessFailurePolicy, RollbackRules};
use crate::propagation::Propagation;

/// Declarative attributes for one transactional scope.
///
/// A definition is supplied to `begin` by the interception layer and captures
/// everything the coordinator needs to know about the scope: its propagation
/// behavior, whether it is read-only, and how its failures classify into
/// commit or rollback.
///
/// # Example
///
/// ```
/// use txscope_core::{Propagation, TransactionDefinition};
///
/// let def = TransactionDefinition::new(Propagation::RequiresNew)
///     .with_read_only(true)
///     .rollback_on("insufficient-funds");
/// assert_eq!(def.propagation(), Propagation::RequiresNew);
/// assert!(def.is_read_only());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionDefinition {
    propagation: Propagation,
    read_only: bool,
    rules: RollbackRules,
}

impl TransactionDefinition {
    /// A definition with the given propagation, read-write, default rules.
    #[must_use]
    pub fn new(propagation: Propagation) -> Self {
        Self { propagation, read_only: false, rules: RollbackRules::new() }
    }

    /// The default definition: [`Propagation::Required`], read-write.
    #[must_use]
    pub fn required() -> Self {
        Self::new(Propagation::Required)
    }

    /// Mark the scope read-only. Only consulted when this scope opens the
    /// physical transaction; joined scopes inherit the existing mode.
    #[must_use]
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Force rollback for the given failure class.
    #[must_use]
    pub fn rollback_on(mut self, class: impl Into<String>) -> Self {
        self.rules = self.rules.rollback_on(class);
        self
    }

    /// Force commit for the given failure class.
    #[must_use]
    pub fn commit_on(mut self, class: impl Into<String>) -> Self {
        self.rules = self.rules.commit_on(class);
        self
    }

    /// Set the policy for unmatched business-category failures.
    #[must_use]
    pub fn with_business_policy(mut self, policy: BusinessFailurePolicy) -> Self {
        self.rules = self.rules.with_business_policy(policy);
        self
    }

    /// The scope's propagation behavior.
    #[must_use]
    pub const fn propagation(&self) -> Propagation {
        self.propagation
    }

    /// Whether the scope requests a read-only transaction.
    #[must_use]
    pub const fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// The scope's rollback classification rules.
    #[must_use]
    pub const fn rules(&self) -> &RollbackRules {
        &self.rules
    }
}
