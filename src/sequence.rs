//! Sequence capabilities.
//!
//! `Sequence` is the read-only protocol, `MutableSequence` the mutable one.
//! Mutations are fallible so that a frozen `FrozenList` and a plain `Vec`
//! can sit behind the same bound. Code written against these traits (see
//! `bisect_left`, `bisect_right`, `insort`) runs on either without
//! special-casing.
//!
//! `MutableSequence` only needs `set`, `insert` and `delete`; the rest have
//! default implementations in terms of those three, which implementors are
//! free to override.

use std::cmp::Ordering;

use crate::error::{Error, Result};
use crate::list::FrozenList;

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

pub trait Sequence {
    type Item;

    fn as_slice(&self) -> &[Self::Item];

    fn len(&self) -> usize {
        self.as_slice().len()
    }

    fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    fn get(&self, index: usize) -> Option<&Self::Item> {
        self.as_slice().get(index)
    }

    fn contains(&self, value: &Self::Item) -> bool
    where
        Self::Item: PartialEq,
    {
        self.as_slice().iter().any(|item| item == value)
    }

    fn count(&self, value: &Self::Item) -> usize
    where
        Self::Item: PartialEq,
    {
        self.as_slice().iter().filter(|item| *item == value).count()
    }

    fn index_of(&self, value: &Self::Item) -> Result<usize>
    where
        Self::Item: PartialEq,
    {
        self.as_slice()
            .iter()
            .position(|item| item == value)
            .ok_or(Error::NotFound)
    }
}

pub trait MutableSequence: Sequence {
    /// Replace the item at `index`, returning the old one.
    fn set(&mut self, index: usize, value: Self::Item) -> Result<Self::Item>;

    /// Insert before `index`; an index past the end appends.
    fn insert(&mut self, index: usize, value: Self::Item) -> Result<()>;

    /// Remove and return the item at `index`.
    fn delete(&mut self, index: usize) -> Result<Self::Item>;

    fn push(&mut self, value: Self::Item) -> Result<()> {
        let end = self.as_slice().len();
        self.insert(end, value)
    }

    fn pop(&mut self) -> Result<Self::Item> {
        match self.as_slice().len() {
            0 => Err(Error::OutOfRange { index: 0, len: 0 }),
            len => self.delete(len - 1),
        }
    }

    fn extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = Self::Item>,
        Self: Sized,
    {
        for value in iter {
            self.push(value)?;
        }
        Ok(())
    }

    fn remove(&mut self, value: &Self::Item) -> Result<Self::Item>
    where
        Self::Item: PartialEq,
    {
        let index = self.index_of(value)?;
        self.delete(index)
    }

    /// Moves the last item to position 0, 1, 2, ... in turn.
    fn reverse(&mut self) -> Result<()> {
        let len = self.as_slice().len();
        for i in 0..len {
            let last = self.delete(len - 1)?;
            self.insert(i, last)?;
        }
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        while !self.as_slice().is_empty() {
            self.pop()?;
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// FrozenList
// ---------------------------------------------------------------------------
//
// Every method forwards to the inherent one, which carries the frozen guard.

impl<T> Sequence for FrozenList<T> {
    type Item = T;

    fn as_slice(&self) -> &[T] {
        FrozenList::as_slice(self)
    }
}

impl<T> MutableSequence for FrozenList<T> {
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        FrozenList::set(self, index, value)
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        FrozenList::insert(self, index, value)
    }

    fn delete(&mut self, index: usize) -> Result<T> {
        FrozenList::delete(self, index)
    }

    fn push(&mut self, value: T) -> Result<()> {
        FrozenList::push(self, value)
    }

    fn pop(&mut self) -> Result<T> {
        FrozenList::pop(self)
    }

    fn extend<I>(&mut self, iter: I) -> Result<()>
    where
        I: IntoIterator<Item = T>,
    {
        FrozenList::extend(self, iter)
    }

    fn remove(&mut self, value: &T) -> Result<T>
    where
        T: PartialEq,
    {
        FrozenList::remove(self, value)
    }

    fn reverse(&mut self) -> Result<()> {
        FrozenList::reverse(self)
    }

    fn clear(&mut self) -> Result<()> {
        FrozenList::clear(self)
    }
}

// ---------------------------------------------------------------------------
// Vec
// ---------------------------------------------------------------------------

impl<T> Sequence for Vec<T> {
    type Item = T;

    fn as_slice(&self) -> &[T] {
        Vec::as_slice(self)
    }
}

impl<T> MutableSequence for Vec<T> {
    fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = Vec::len(self);
        match self.as_mut_slice().get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, value)),
            None => Err(Error::OutOfRange { index, len }),
        }
    }

    fn insert(&mut self, index: usize, value: T) -> Result<()> {
        let index = index.min(Vec::len(self));
        Vec::insert(self, index, value);
        Ok(())
    }

    fn delete(&mut self, index: usize) -> Result<T> {
        let len = Vec::len(self);
        if index >= len {
            return Err(Error::OutOfRange { index, len });
        }
        Ok(Vec::remove(self, index))
    }

    fn push(&mut self, value: T) -> Result<()> {
        Vec::push(self, value);
        Ok(())
    }

    fn pop(&mut self) -> Result<T> {
        Vec::pop(self).ok_or(Error::OutOfRange { index: 0, len: 0 })
    }

    fn reverse(&mut self) -> Result<()> {
        self.as_mut_slice().reverse();
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        Vec::clear(self);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Generic algorithms
// ---------------------------------------------------------------------------

/// Leftmost position at which `value` could be inserted keeping `seq`
/// sorted. `seq` must already be sorted ascending.
pub fn bisect_left<S>(seq: &S, value: &S::Item) -> usize
where
    S: Sequence + ?Sized,
    S::Item: Ord,
{
    seq.as_slice()
        .partition_point(|item| item.cmp(value) == Ordering::Less)
}

/// Rightmost insert position for `value`, i.e. after any equal items.
pub fn bisect_right<S>(seq: &S, value: &S::Item) -> usize
where
    S: Sequence + ?Sized,
    S::Item: Ord,
{
    seq.as_slice()
        .partition_point(|item| item.cmp(value) != Ordering::Greater)
}

/// Insert `value` into sorted `seq` after any equal items.
/// Returns the index it landed at.
pub fn insort<S>(seq: &mut S, value: S::Item) -> Result<usize>
where
    S: MutableSequence + ?Sized,
    S::Item: Ord,
{
    let index = bisect_right(seq, &value);
    seq.insert(index, value)?;
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Sequence that only provides the three required mutators, so the
    /// default methods get exercised.
    struct Minimal(Vec<i32>);

    impl Sequence for Minimal {
        type Item = i32;

        fn as_slice(&self) -> &[i32] {
            &self.0
        }
    }

    impl MutableSequence for Minimal {
        fn set(&mut self, index: usize, value: i32) -> Result<i32> {
            MutableSequence::set(&mut self.0, index, value)
        }

        fn insert(&mut self, index: usize, value: i32) -> Result<()> {
            MutableSequence::insert(&mut self.0, index, value)
        }

        fn delete(&mut self, index: usize) -> Result<i32> {
            MutableSequence::delete(&mut self.0, index)
        }
    }

    #[test]
    fn test_default_methods() {
        let mut seq = Minimal(vec![1, 2, 3]);
        seq.push(4).unwrap();
        assert_eq!(seq.0, vec![1, 2, 3, 4]);
        seq.reverse().unwrap();
        assert_eq!(seq.0, vec![4, 3, 2, 1]);
        assert_eq!(seq.remove(&3), Ok(3));
        assert_eq!(seq.remove(&3), Err(Error::NotFound));
        assert_eq!(seq.pop(), Ok(1));
        MutableSequence::extend(&mut seq, vec![7, 8]).unwrap();
        assert_eq!(seq.0, vec![4, 2, 7, 8]);
        seq.clear().unwrap();
        assert!(Sequence::is_empty(&seq));
        assert_eq!(seq.pop(), Err(Error::OutOfRange { index: 0, len: 0 }));
    }

    #[test]
    fn test_read_defaults() {
        let seq = Minimal(vec![5, 6, 5]);
        assert_eq!(Sequence::len(&seq), 3);
        assert_eq!(Sequence::get(&seq, 1), Some(&6));
        assert!(Sequence::contains(&seq, &6));
        assert_eq!(Sequence::count(&seq, &5), 2);
        assert_eq!(Sequence::index_of(&seq, &6), Ok(1));
        assert_eq!(Sequence::index_of(&seq, &9), Err(Error::NotFound));
    }

    #[test]
    fn test_vec_out_of_range() {
        let mut v = vec![1];
        assert_eq!(
            MutableSequence::set(&mut v, 1, 0),
            Err(Error::OutOfRange { index: 1, len: 1 })
        );
        assert_eq!(
            MutableSequence::delete(&mut v, 5),
            Err(Error::OutOfRange { index: 5, len: 1 })
        );
    }

    #[test]
    fn test_bisect() {
        let v = vec![1, 2, 2, 2, 5];
        assert_eq!(bisect_left(&v, &2), 1);
        assert_eq!(bisect_right(&v, &2), 4);
        assert_eq!(bisect_left(&v, &0), 0);
        assert_eq!(bisect_right(&v, &9), 5);
    }

    #[test]
    fn test_insort_on_vec() {
        let mut v = vec![1, 3, 5];
        assert_eq!(insort(&mut v, 4), Ok(2));
        assert_eq!(insort(&mut v, 3), Ok(2));
        assert_eq!(v, vec![1, 3, 3, 4, 5]);
    }
}
