//! Guard checks.
//!
//! Every mutating path runs `ensure_mutable` before anything else, then the
//! bounds checks, and only then touches the items. A failed check therefore
//! never leaves the list half-modified.
//!
//! `WalkGuard` is the recursion guard for walks over shared lists, which
//! may contain themselves.

use std::cell::RefCell;
use std::ops::{Bound, Range, RangeBounds};

use log::trace;

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Frozen-state guards
// ---------------------------------------------------------------------------

/// Reject `operation` if the list is frozen.
pub fn ensure_mutable(frozen: bool, operation: &'static str) -> Result<()> {
    if frozen {
        trace!("rejected {}: list is frozen", operation);
        return Err(Error::Frozen { operation });
    }
    Ok(())
}

/// Hashing is only defined once the contents can no longer change.
pub fn ensure_hashable(frozen: bool) -> Result<()> {
    if !frozen {
        trace!("rejected hash: list is not frozen");
        return Err(Error::Unhashable);
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Bounds
// ---------------------------------------------------------------------------

/// `index` must address an existing item.
pub fn check_index(index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(Error::OutOfRange { index, len });
    }
    Ok(())
}

/// Resolve `range` against a sequence of length `len`.
///
/// Slices clamp instead of failing: both ends are capped at `len`, and an
/// inverted range collapses to an empty range at its start.
pub fn clamp_range<R: RangeBounds<usize>>(range: R, len: usize) -> Range<usize> {
    let start = match range.start_bound() {
        Bound::Included(&s) => s,
        Bound::Excluded(&s) => s.saturating_add(1),
        Bound::Unbounded => 0,
    }
    .min(len);
    let end = match range.end_bound() {
        Bound::Included(&e) => e.saturating_add(1),
        Bound::Excluded(&e) => e,
        Bound::Unbounded => len,
    }
    .min(len);
    start..end.max(start)
}

// ---------------------------------------------------------------------------
// Recursion guard
// ---------------------------------------------------------------------------

/// Recursive walks over shared lists. Each kind tracks its own entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Walk {
    Repr,
    Serialize,
    Hash,
    Compare,
}

thread_local! {
    static ACTIVE_WALKS: RefCell<Vec<(Walk, usize, usize)>> = const { RefCell::new(Vec::new()) };
}

/// Marks `(walk, left, right)` as in progress on this thread until dropped.
/// Walks over a single list pass `0` as `right`.
pub(crate) struct WalkGuard {
    key: (Walk, usize, usize),
}

impl WalkGuard {
    /// `None` if the same key is already in progress on this thread.
    pub(crate) fn enter(walk: Walk, left: usize, right: usize) -> Option<Self> {
        let key = (walk, left, right);
        ACTIVE_WALKS.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&key) {
                None
            } else {
                active.push(key);
                Some(Self { key })
            }
        })
    }
}

impl Drop for WalkGuard {
    fn drop(&mut self) {
        ACTIVE_WALKS.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(pos) = active.iter().rposition(|key| *key == self.key) {
                active.remove(pos);
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_mutable() {
        assert_eq!(ensure_mutable(false, "push"), Ok(()));
        assert_eq!(
            ensure_mutable(true, "push"),
            Err(Error::Frozen { operation: "push" })
        );
    }

    #[test]
    fn test_ensure_hashable() {
        assert_eq!(ensure_hashable(true), Ok(()));
        assert_eq!(ensure_hashable(false), Err(Error::Unhashable));
    }

    #[test]
    fn test_check_index() {
        assert_eq!(check_index(0, 1), Ok(()));
        assert_eq!(
            check_index(1, 1),
            Err(Error::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            check_index(0, 0),
            Err(Error::OutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn test_clamp_range_within_bounds() {
        assert_eq!(clamp_range(1..3, 5), 1..3);
        assert_eq!(clamp_range(1..=3, 5), 1..4);
        assert_eq!(clamp_range(.., 5), 0..5);
        assert_eq!(clamp_range(2.., 5), 2..5);
    }

    #[test]
    fn test_clamp_range_past_end() {
        assert_eq!(clamp_range(3..10, 5), 3..5);
        assert_eq!(clamp_range(7..9, 5), 5..5);
        assert_eq!(clamp_range(0..=usize::MAX, 5), 0..5);
    }

    #[test]
    fn test_clamp_range_inverted() {
        assert_eq!(clamp_range(4..2, 5), 4..4);
    }

    #[test]
    fn test_walk_guard_detects_reentry() {
        let outer = WalkGuard::enter(Walk::Repr, 0x10, 0).expect("first entry");
        assert!(WalkGuard::enter(Walk::Repr, 0x10, 0).is_none());
        assert!(WalkGuard::enter(Walk::Repr, 0x20, 0).is_some());
        assert!(WalkGuard::enter(Walk::Hash, 0x10, 0).is_some());
        drop(outer);
        assert!(WalkGuard::enter(Walk::Repr, 0x10, 0).is_some());
    }

    #[test]
    fn test_walk_guard_keys_on_pairs() {
        let _pair = WalkGuard::enter(Walk::Compare, 0x10, 0x20).expect("first entry");
        assert!(WalkGuard::enter(Walk::Compare, 0x10, 0x20).is_none());
        assert!(WalkGuard::enter(Walk::Compare, 0x20, 0x10).is_some());
    }
}
