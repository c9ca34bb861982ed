//! FrozenList: the freezable sequence.
//!
//! A `Vec<T>` plus a one-way atomic freeze flag. Reads go straight to the
//! items; every mutation passes through `guard::ensure_mutable` first.
//!
//! Flag ordering: `freeze` publishes with release semantics and
//! `is_frozen` reads with acquire, so any thread that sees the flag set
//! also sees every item written before the freeze.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, RangeBounds};
use std::sync::atomic::{self, AtomicBool};
use std::sync::Arc;

use log::debug;
use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::guard::{check_index, clamp_range, ensure_hashable, ensure_mutable};
use crate::hashing::{hash_items, TryHash};
use crate::repr::fmt_items;

/// Ordered sequence that is mutable until [`freeze`](FrozenList::freeze)
/// is called, and immutable (and hashable) afterwards.
pub struct FrozenList<T> {
    items: Vec<T>,
    frozen: AtomicBool,
}

// ── Construction ───────────────────────────────────────────────────

impl<T> FrozenList<T> {
    /// Empty, unfrozen list.
    pub fn new() -> Self {
        Self::from_parts(Vec::new(), false)
    }

    /// Empty, unfrozen list with room for `capacity` items.
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_parts(Vec::with_capacity(capacity), false)
    }

    /// Assemble a list without going through the guards.
    /// Used by deep copy and deserialization, where the destination is
    /// populated first and the flag applied last.
    pub(crate) fn from_parts(items: Vec<T>, frozen: bool) -> Self {
        Self {
            items,
            frozen: AtomicBool::new(frozen),
        }
    }

    /// Consume the list and hand back its items.
    ///
    /// Allowed on frozen lists too: the list itself ceases to exist, so
    /// nothing can observe a frozen list changing.
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }

    /// Freeze the list and move it behind an `Arc` for sharing.
    pub fn publish(self) -> Arc<Self> {
        self.freeze();
        Arc::new(self)
    }
}

// ── State ──────────────────────────────────────────────────────────

impl<T> FrozenList<T> {
    /// Whether the list has been frozen. Lock-free acquire load.
    pub fn is_frozen(&self) -> bool {
        self.frozen.load(atomic::Ordering::Acquire)
    }

    /// Make the list immutable. Idempotent, never fails.
    pub fn freeze(&self) {
        if !self.frozen.swap(true, atomic::Ordering::AcqRel) {
            debug!("froze list of {} item(s)", self.items.len());
        }
    }

    fn check_mutable(&self, operation: &'static str) -> Result<()> {
        ensure_mutable(self.is_frozen(), operation)
    }
}

// ── Reads ──────────────────────────────────────────────────────────

impl<T> FrozenList<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.as_slice().get(index)
    }

    /// Like `get`, but reports a missing index as [`Error::OutOfRange`].
    pub fn item(&self, index: usize) -> Result<&T> {
        check_index(index, self.items.len())?;
        Ok(&self.items[index])
    }

    /// Sub-slice for `range`, clamped to the current bounds.
    pub fn slice<R: RangeBounds<usize>>(&self, range: R) -> &[T] {
        let range = clamp_range(range, self.items.len());
        &self.items[range]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Number of items equal to `value`.
    pub fn count(&self, value: &T) -> usize
    where
        T: PartialEq,
    {
        self.items.iter().filter(|item| *item == value).count()
    }

    /// Position of the first item equal to `value`.
    pub fn index_of(&self, value: &T) -> Result<usize>
    where
        T: PartialEq,
    {
        self.items
            .iter()
            .position(|item| item == value)
            .ok_or(Error::NotFound)
    }
}

// ── Hashing ────────────────────────────────────────────────────────

impl<T: TryHash> FrozenList<T> {
    /// Hash of the items as a fixed tuple. Fails with
    /// [`Error::Unhashable`] until the list is frozen.
    pub fn hash_value(&self) -> Result<u64> {
        ensure_hashable(self.is_frozen())?;
        hash_items(&self.items)
    }
}

impl<T: TryHash> TryHash for FrozenList<T> {
    fn try_hash<H: std::hash::Hasher>(&self, state: &mut H) -> Result<()> {
        ensure_hashable(self.is_frozen())?;
        self.items.as_slice().try_hash(state)
    }
}

// ── Mutations ──────────────────────────────────────────────────────
//
// Order inside every method: frozen guard, bounds check, then the change.

impl<T> FrozenList<T> {
    /// Replace the item at `index`, returning the old one.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        self.check_mutable("set item")?;
        check_index(index, self.items.len())?;
        Ok(std::mem::replace(&mut self.items[index], value))
    }

    /// Replace the items in `range` (clamped) with `replace_with`.
    /// The replacement may be longer or shorter than the range.
    pub fn set_slice<R, I>(&mut self, range: R, replace_with: I) -> Result<()>
    where
        R: RangeBounds<usize>,
        I: IntoIterator<Item = T>,
    {
        self.check_mutable("set slice")?;
        let range = clamp_range(range, self.items.len());
        drop(self.items.splice(range, replace_with));
        Ok(())
    }

    /// Remove and return the item at `index`.
    pub fn delete(&mut self, index: usize) -> Result<T> {
        self.check_mutable("delete item")?;
        check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    /// Remove the items in `range` (clamped) and return them.
    pub fn delete_slice<R: RangeBounds<usize>>(&mut self, range: R) -> Result<Vec<T>> {
        self.check_mutable("delete slice")?;
        let range = clamp_range(range, self.items.len());
        Ok(self.items.drain(range).collect())
    }

    /// Insert before `index`. An index past the end appends.
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        self.check_mutable("insert")?;
        let index = index.min(self.items.len());
        self.items.insert(index, value);
        Ok(())
    }

    pub fn push(&mut self, value: T) -> Result<()> {
        self.check_mutable("append")?;
        self.items.push(value);
        Ok(())
    }

    /// Append every item of `iter`. Nothing is consumed when frozen.
    pub fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) -> Result<()> {
        self.check_mutable("extend")?;
        self.items.extend(iter);
        Ok(())
    }

    /// In-place concatenation.
    pub fn extend_from_slice(&mut self, other: &[T]) -> Result<()>
    where
        T: Clone,
    {
        self.check_mutable("concatenate")?;
        self.items.extend_from_slice(other);
        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        self.check_mutable("clear")?;
        self.items.clear();
        Ok(())
    }

    pub fn reverse(&mut self) -> Result<()> {
        self.check_mutable("reverse")?;
        self.items.as_mut_slice().reverse();
        Ok(())
    }

    /// Remove and return the first item equal to `value`.
    pub fn remove(&mut self, value: &T) -> Result<T>
    where
        T: PartialEq,
    {
        self.check_mutable("remove")?;
        let index = self.index_of(value)?;
        Ok(self.items.remove(index))
    }

    /// Remove and return the last item.
    pub fn pop(&mut self) -> Result<T> {
        self.check_mutable("pop")?;
        self.items
            .pop()
            .ok_or(Error::OutOfRange { index: 0, len: 0 })
    }

    /// Remove and return the item at `index`.
    pub fn pop_at(&mut self, index: usize) -> Result<T> {
        self.check_mutable("pop")?;
        check_index(index, self.items.len())?;
        Ok(self.items.remove(index))
    }

    // -- sorting (all stable) --

    pub fn sort(&mut self) -> Result<()>
    where
        T: Ord,
    {
        self.check_mutable("sort")?;
        self.items.as_mut_slice().sort();
        Ok(())
    }

    /// Descending order. Equal items keep their original relative order.
    pub fn sort_desc(&mut self) -> Result<()>
    where
        T: Ord,
    {
        self.check_mutable("sort")?;
        self.items.as_mut_slice().sort_by(|a, b| b.cmp(a));
        Ok(())
    }

    pub fn sort_by<F>(&mut self, compare: F) -> Result<()>
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.check_mutable("sort")?;
        self.items.as_mut_slice().sort_by(compare);
        Ok(())
    }

    pub fn sort_by_key<K, F>(&mut self, key: F) -> Result<()>
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.check_mutable("sort")?;
        self.items.as_mut_slice().sort_by_key(key);
        Ok(())
    }

    /// Descending by `key`. Items with equal keys keep their original
    /// relative order.
    pub fn sort_by_key_desc<K, F>(&mut self, mut key: F) -> Result<()>
    where
        K: Ord,
        F: FnMut(&T) -> K,
    {
        self.check_mutable("sort")?;
        self.items.as_mut_slice().sort_by(|a, b| key(b).cmp(&key(a)));
        Ok(())
    }
}

// ── Std trait surface ──────────────────────────────────────────────

impl<T> Default for FrozenList<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Copies the items and carries the frozen flag over.
impl<T: Clone> Clone for FrozenList<T> {
    fn clone(&self) -> Self {
        Self::from_parts(self.items.clone(), self.is_frozen())
    }
}

impl<T> Deref for FrozenList<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T> AsRef<[T]> for FrozenList<T> {
    fn as_ref(&self) -> &[T] {
        &self.items
    }
}

impl<T> FromIterator<T> for FrozenList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_parts(iter.into_iter().collect(), false)
    }
}

impl<T> From<Vec<T>> for FrozenList<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_parts(items, false)
    }
}

impl<T, const N: usize> From<[T; N]> for FrozenList<T> {
    fn from(items: [T; N]) -> Self {
        Self::from_parts(Vec::from(items), false)
    }
}

impl<T: Clone> From<&[T]> for FrozenList<T> {
    fn from(items: &[T]) -> Self {
        Self::from_parts(items.to_vec(), false)
    }
}

impl<T> IntoIterator for FrozenList<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a FrozenList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

// ── Comparison ─────────────────────────────────────────────────────
//
// Purely by item sequence. The frozen flag never takes part.

impl<T: PartialEq<U>, U> PartialEq<FrozenList<U>> for FrozenList<T> {
    fn eq(&self, other: &FrozenList<U>) -> bool {
        self.items == other.items
    }
}

impl<T: Eq> Eq for FrozenList<T> {}

impl<T: PartialEq<U>, U> PartialEq<Vec<U>> for FrozenList<T> {
    fn eq(&self, other: &Vec<U>) -> bool {
        self.items == *other
    }
}

impl<T: PartialEq<U>, U> PartialEq<[U]> for FrozenList<T> {
    fn eq(&self, other: &[U]) -> bool {
        self.items.as_slice() == other
    }
}

impl<T: PartialEq<U>, U> PartialEq<&[U]> for FrozenList<T> {
    fn eq(&self, other: &&[U]) -> bool {
        self.items.as_slice() == *other
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<[U; N]> for FrozenList<T> {
    fn eq(&self, other: &[U; N]) -> bool {
        self.items.as_slice() == other.as_slice()
    }
}

impl<T: PartialEq<U>, U> PartialEq<FrozenList<U>> for Vec<T> {
    fn eq(&self, other: &FrozenList<U>) -> bool {
        *self == other.items
    }
}

impl<T: PartialEq<U>, U> PartialEq<FrozenList<U>> for [T] {
    fn eq(&self, other: &FrozenList<U>) -> bool {
        self == other.items.as_slice()
    }
}

impl<T: PartialEq<U>, U, const N: usize> PartialEq<FrozenList<U>> for [T; N] {
    fn eq(&self, other: &FrozenList<U>) -> bool {
        self.as_slice() == other.items.as_slice()
    }
}

impl<T: PartialOrd> PartialOrd for FrozenList<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.items.as_slice().partial_cmp(other.items.as_slice())
    }
}

impl<T: PartialOrd> PartialOrd<Vec<T>> for FrozenList<T> {
    fn partial_cmp(&self, other: &Vec<T>) -> Option<Ordering> {
        self.items.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: PartialOrd> PartialOrd<[T]> for FrozenList<T> {
    fn partial_cmp(&self, other: &[T]) -> Option<Ordering> {
        self.items.as_slice().partial_cmp(other)
    }
}

impl<T: PartialOrd, const N: usize> PartialOrd<[T; N]> for FrozenList<T> {
    fn partial_cmp(&self, other: &[T; N]) -> Option<Ordering> {
        self.items.as_slice().partial_cmp(other.as_slice())
    }
}

impl<T: PartialOrd> PartialOrd<FrozenList<T>> for Vec<T> {
    fn partial_cmp(&self, other: &FrozenList<T>) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.items.as_slice())
    }
}

impl<T: PartialOrd> PartialOrd<FrozenList<T>> for [T] {
    fn partial_cmp(&self, other: &FrozenList<T>) -> Option<Ordering> {
        self.partial_cmp(other.items.as_slice())
    }
}

impl<T: PartialOrd, const N: usize> PartialOrd<FrozenList<T>> for [T; N] {
    fn partial_cmp(&self, other: &FrozenList<T>) -> Option<Ordering> {
        self.as_slice().partial_cmp(other.items.as_slice())
    }
}

impl<T: Ord> Ord for FrozenList<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.items.as_slice().cmp(other.items.as_slice())
    }
}

// ── Repr ───────────────────────────────────────────────────────────

impl<T: fmt::Debug> fmt::Debug for FrozenList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<FrozenList(frozen={}, ", self.is_frozen())?;
        fmt_items(&self.items, f)?;
        f.write_str(")>")
    }
}

// ── Serde ──────────────────────────────────────────────────────────

#[derive(Serialize)]
struct ListRepr<'a, T> {
    frozen: bool,
    items: &'a [T],
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ListReprOwned<T> {
    frozen: bool,
    items: Vec<T>,
}

impl<T: Serialize> Serialize for FrozenList<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        ListRepr {
            frozen: self.is_frozen(),
            items: &self.items,
        }
        .serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for FrozenList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let ListReprOwned { frozen, items } = ListReprOwned::deserialize(deserializer)?;
        Ok(Self::from_parts(items, frozen))
    }
}
