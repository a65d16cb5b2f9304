//! Consistency invariants for the callback registry.

use super::registry::CallbackRegistry;

/// INVARIANT-1: Dual-index consistency
/// The id-keyed index and the deadline-ordered index hold the same ids.
pub fn invariant_dual_index_consistent(registry: &CallbackRegistry) -> bool {
    let (mut by_id, mut by_deadline) = registry.index_ids();
    by_id.sort_unstable();
    by_deadline.sort_unstable();
    by_id == by_deadline
}

/// INVARIANT-2: Per-id uniqueness
/// No id appears more than once in the deadline index.
pub fn invariant_unique_pending(registry: &CallbackRegistry) -> bool {
    let (_, mut by_deadline) = registry.index_ids();
    let total = by_deadline.len();
    by_deadline.sort_unstable();
    by_deadline.dedup();
    by_deadline.len() == total
}

/// Invariant check result.
#[derive(Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    IndexMismatch,
    DuplicatePending,
}

/// Check all registry invariants.
pub fn check_all_invariants(registry: &CallbackRegistry) -> Result<(), InvariantViolation> {
    if !invariant_dual_index_consistent(registry) {
        return Err(InvariantViolation::IndexMismatch);
    }

    if !invariant_unique_pending(registry) {
        return Err(InvariantViolation::DuplicatePending);
    }

    Ok(())
}
