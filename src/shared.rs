//! SharedList: reference-counted handle to a `FrozenList`.
//!
//! Owned lists cannot contain themselves. Handles can: a `SharedList`
//! stored inside its own items (directly or through other lists) forms a
//! cycle, which is what `DeepCopy`, `Debug`, hashing and comparison are
//! prepared for here.
//!
//! The `RwLock` exists so a list reachable from several handles can still
//! be built up; it does not replace the freeze guard. `freeze` needs only a
//! read lock since `FrozenList::freeze` takes `&self`.
//!
//! Next to the lock sits a mirror of the frozen flag, so `is_frozen` never
//! waits for a writer. The mirror is set by `freeze` and by any access
//! guard that observes a frozen list when it is released. It only ever goes
//! from false to true.
//!
//! Reference cycles between handles are never collected. Break them (for
//! example by clearing a list before freezing it) if that matters.

use std::fmt;
use std::hash::Hasher;
use std::ops::{Deref, DerefMut};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use log::{trace, warn};

use crate::copy::{CopyMemo, DeepCopy};
use crate::error::{Error, Result};
use crate::guard::{Walk, WalkGuard};
use crate::hashing::TryHash;
use crate::list::FrozenList;

struct Inner<T> {
    list: RwLock<FrozenList<T>>,
    frozen: AtomicBool,
}

pub struct SharedList<T> {
    inner: Arc<Inner<T>>,
}

// ── Access guards ──────────────────────────────────────────────────

/// Read access to a shared list. Publishes the frozen flag on release.
pub struct SharedRead<'a, T> {
    guard: RwLockReadGuard<'a, FrozenList<T>>,
    frozen: &'a AtomicBool,
}

/// Write access to a shared list. Publishes the frozen flag on release.
pub struct SharedWrite<'a, T> {
    guard: RwLockWriteGuard<'a, FrozenList<T>>,
    frozen: &'a AtomicBool,
}

impl<T> Deref for SharedRead<'_, T> {
    type Target = FrozenList<T>;

    fn deref(&self) -> &FrozenList<T> {
        &self.guard
    }
}

impl<T> Drop for SharedRead<'_, T> {
    fn drop(&mut self) {
        if self.guard.is_frozen() {
            self.frozen.store(true, Ordering::Release);
        }
    }
}

impl<T> Deref for SharedWrite<'_, T> {
    type Target = FrozenList<T>;

    fn deref(&self) -> &FrozenList<T> {
        &self.guard
    }
}

impl<T> DerefMut for SharedWrite<'_, T> {
    fn deref_mut(&mut self) -> &mut FrozenList<T> {
        &mut self.guard
    }
}

impl<T> Drop for SharedWrite<'_, T> {
    fn drop(&mut self) {
        if self.guard.is_frozen() {
            self.frozen.store(true, Ordering::Release);
        }
    }
}

// ── Handle ─────────────────────────────────────────────────────────

impl<T> SharedList<T> {
    pub fn new(list: FrozenList<T>) -> Self {
        let frozen = AtomicBool::new(list.is_frozen());
        Self {
            inner: Arc::new(Inner {
                list: RwLock::new(list),
                frozen,
            }),
        }
    }

    /// Read access. A poisoned lock is recovered: a panic elsewhere can
    /// only have interrupted a guarded mutation, never a frozen list.
    pub fn read(&self) -> SharedRead<'_, T> {
        let guard = self.inner.list.read().unwrap_or_else(|poisoned| {
            warn!("shared list {:#x}: recovering poisoned lock", self.identity());
            PoisonError::into_inner(poisoned)
        });
        SharedRead {
            guard,
            frozen: &self.inner.frozen,
        }
    }

    /// Write access. Mutations still go through the freeze guard.
    pub fn write(&self) -> SharedWrite<'_, T> {
        let guard = self.inner.list.write().unwrap_or_else(|poisoned| {
            warn!("shared list {:#x}: recovering poisoned lock", self.identity());
            PoisonError::into_inner(poisoned)
        });
        SharedWrite {
            guard,
            frozen: &self.inner.frozen,
        }
    }

    /// Lock-free acquire load of the mirrored flag.
    ///
    /// A list frozen through `read()` / `write()` reports true once that
    /// guard has been released.
    pub fn is_frozen(&self) -> bool {
        self.inner.frozen.load(Ordering::Acquire)
    }

    pub fn freeze(&self) {
        self.read().freeze();
        self.inner.frozen.store(true, Ordering::Release);
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Append through the handle. Shorthand for `write().push(value)`.
    pub fn push(&self, value: T) -> Result<()> {
        self.write().push(value)
    }

    /// Copy of the current items.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.read().as_slice().to_vec()
    }

    /// Whether both handles point at the same list.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Address of the shared allocation. Stable for the list's lifetime.
    pub fn identity(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub fn handle_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }
}

/// Another handle to the same list.
impl<T> Clone for SharedList<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SharedList<T> {
    fn default() -> Self {
        Self::new(FrozenList::new())
    }
}

impl<T> From<FrozenList<T>> for SharedList<T> {
    fn from(list: FrozenList<T>) -> Self {
        Self::new(list)
    }
}

impl<T> From<Vec<T>> for SharedList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::new(FrozenList::from(items))
    }
}

impl<T> FromIterator<T> for SharedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

// ── Deep copy ──────────────────────────────────────────────────────

/// The empty destination is registered before any child is visited, so a
/// child that leads back here picks up the destination from the memo.
impl<T: DeepCopy + 'static> DeepCopy for SharedList<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        let identity = self.identity();
        if let Some(existing) = memo.lookup::<SharedList<T>>(identity) {
            return existing;
        }

        let destination = SharedList::new(FrozenList::new());
        memo.register(identity, destination.clone());

        let (items, frozen) = {
            let source = self.read();
            let items: Vec<T> = source.iter().map(|item| item.deep_copy_with(memo)).collect();
            (items, source.is_frozen())
        };
        *destination.write() = FrozenList::from_parts(items, frozen);
        destination
    }
}

// ── Hashing / comparison / repr ────────────────────────────────────

/// A frozen list that contains itself has no finite hash and fails with
/// [`Error::Cycle`].
impl<T: TryHash> TryHash for SharedList<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        let _walk = WalkGuard::enter(Walk::Hash, self.identity(), 0).ok_or_else(|| {
            trace!("rejected hash: list {:#x} contains itself", self.identity());
            Error::Cycle
        })?;
        self.read().try_hash(state)
    }
}

/// Same handle, or equal contents. A pair of lists reached again while it
/// is still being compared counts as equal, so cyclic lists compare in
/// finite time.
impl<T: PartialEq> PartialEq for SharedList<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match WalkGuard::enter(Walk::Compare, self.identity(), other.identity()) {
            Some(_walk) => *self.read() == *other.read(),
            None => true,
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for SharedList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match WalkGuard::enter(Walk::Repr, self.identity(), 0) {
            Some(_walk) => fmt::Debug::fmt(&*self.read(), f),
            None => f.write_str("[...]"),
        }
    }
}
