//! Auto-truncation policy.

use crate::config::DEFAULT_CEILING;

/// Returns true when a board holding `entry_count` entries must be cleared
/// before the next append.
pub fn should_truncate(entry_count: usize, ceiling: usize) -> bool {
    entry_count >= ceiling
}

/// Decides when the board must be cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationPolicy {
    ceiling: usize,
}

impl TruncationPolicy {
    /// Creates a policy with the given ceiling.
    pub fn new(ceiling: usize) -> Self {
        Self { ceiling }
    }

    /// Returns the ceiling.
    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Returns true when the board must be cleared before appending.
    pub fn should_truncate(&self, entry_count: usize) -> bool {
        should_truncate(entry_count, self.ceiling)
    }
}

impl Default for TruncationPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CEILING)
    }
}
