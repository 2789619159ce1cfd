//! Unit-of-work outcomes and rollback classification.
//!
//! When a unit of work ends, its caller reports either success or a failure
//! described by a [`FailureKind`]: a caller-declared class name plus a broad
//! category. The [`RollbackRules`] attached to the scope's definition map
//! that failure to a commit-or-rollback decision. Unexpected failures roll
//! back by default; business failures commit by default, on the theory that
//! they are normal, recoverable results the caller will handle.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::fmt;

/// How a unit of work finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The unit of work ran to completion.
    Success,
    /// The unit of work failed with the given classified failure.
    Failure(FailureKind),
}

/// Broad category of a failure, carrying its default physical outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Unexpected failures (programming errors, infrastructure faults).
    /// Default outcome: rollback.
    Unexpected,
    /// Expected business results signaled as failures (insufficient funds,
    /// validation rejections). Default outcome: commit, so data already
    /// written is kept for the caller to act on.
    Business,
}

/// A classified failure raised by a unit of work.
///
/// The class name is declared by the caller and is what override rules match
/// against; the category supplies the default decision when no override
/// applies.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FailureKind {
    class: Cow<'static, str>,
    category: ErrorCategory,
}

impl FailureKind {
    /// A failure in the unexpected category.
    pub fn unexpected(class: impl Into<Cow<'static, str>>) -> Self {
        Self { class: class.into(), category: ErrorCategory::Unexpected }
    }

    /// A failure in the business category.
    pub fn business(class: impl Into<Cow<'static, str>>) -> Self {
        Self { class: class.into(), category: ErrorCategory::Business }
    }

    /// The caller-declared class name.
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// The failure's category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.category
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let category = match self.category {
            ErrorCategory::Unexpected => "unexpected",
            ErrorCategory::Business => "business",
        };
        write!(f, "{} ({category})", self.class)
    }
}

impl std::error::Error for FailureKind {}

/// What to do with business-category failures that no override rule matches.
///
/// Committing on business failures is a deliberate domain policy, not a
/// structural requirement, so it stays configurable per definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusinessFailurePolicy {
    /// Keep data written so far and commit (the default).
    #[default]
    Commit,
    /// Treat business failures like unexpected ones and roll back.
    Rollback,
}

/// Per-call-site rollback classification rules.
///
/// Explicit class-name overrides take precedence over the category default;
/// `rollback_on` wins over `commit_on` when a class is listed in both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RollbackRules {
    rollback_on: BTreeSet<String>,
    commit_on: BTreeSet<String>,
    business_policy: BusinessFailurePolicy,
}

impl RollbackRules {
    /// Rules with no overrides and the default business policy.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force rollback for the given failure class.
    #[must_use]
    pub fn rollback_on(mut self, class: impl Into<String>) -> Self {
        self.rollback_on.insert(class.into());
        self
    }

    /// Force commit for the given failure class.
    #[must_use]
    pub fn commit_on(mut self, class: impl Into<String>) -> Self {
        self.commit_on.insert(class.into());
        self
    }

    /// Set the policy for unmatched business-category failures.
    #[must_use]
    pub fn with_business_policy(mut self, policy: BusinessFailurePolicy) -> Self {
        self.business_policy = policy;
        self
    }

    /// The configured business-failure policy.
    #[must_use]
    pub const fn business_policy(&self) -> BusinessFailurePolicy {
        self.business_policy
    }

    /// Classify a failure: `true` means the physical outcome is rollback.
    #[must_use]
    pub fn should_roll_back(&self, failure: &FailureKind) -> bool {
        if self.rollback_on.contains(failure.class()) {
            return true;
        }
        if self.commit_on.contains(failure.class()) {
            return false;
        }
        match failure.category() {
            ErrorCategory::Unexpected => true,
            ErrorCategory::Business => {
                matches!(self.business_policy, BusinessFailurePolicy::Rollback)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_rolls_back_by_default() {
        let rules = RollbackRules::new();
        assert!(rules.should_roll_back(&FailureKind::unexpected("boom")));
    }

    #[test]
    fn business_commits_by_default() {
        let rules = RollbackRules::new();
        assert!(!rules.should_roll_back(&FailureKind::business("insufficient-funds")));
    }

    #[test]
    fn rollback_on_overrides_business_default() {
        let rules = RollbackRules::new().rollback_on("insufficient-funds");
        assert!(rules.should_roll_back(&FailureKind::business("insufficient-funds")));
    }

    #[test]
    fn commit_on_overrides_unexpected_default() {
        let rules = RollbackRules::new().commit_on("known-glitch");
        assert!(!rules.should_roll_back(&FailureKind::unexpected("known-glitch")));
    }

    #[test]
    fn rollback_on_wins_over_commit_on() {
        let rules = RollbackRules::new().commit_on("dup").rollback_on("dup");
        assert!(rules.should_roll_back(&FailureKind::business("dup")));
    }

    #[test]
    fn business_policy_can_flip_the_default() {
        let rules = RollbackRules::new().with_business_policy(BusinessFailurePolicy::Rollback);
        assert!(rules.should_roll_back(&FailureKind::business("insufficient-funds")));
    }

    #[test]
    fn overrides_match_exact_class_names_only() {
        let rules = RollbackRules::new().rollback_on("insufficient-funds");
        assert!(!rules.should_roll_back(&FailureKind::business("insufficient")));
    }
}
