//! Error type for the defensive self-check.
//!
//! The cache has no recoverable runtime failures: absent and expired keys
//! are signalled through the `Option` channel, and configuration floors are
//! clamped rather than rejected.  What remains is
//! [`InvariantError`], returned by
//! [`Cache::check_invariants`](crate::Cache::check_invariants) when the
//! internal bookkeeping has diverged — which is a bug, not an operational
//! condition.

use std::fmt;

/// Error returned when an internal cache invariant is violated.
///
/// Carries a human-readable description of which invariant failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantError(String);

impl InvariantError {
    /// Creates a new `InvariantError` with the given description.
    #[inline]
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }

    /// Returns the error description.
    #[inline]
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for InvariantError {}
