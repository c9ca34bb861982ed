//! Deep copy with an identity memo.
//!
//! One `CopyMemo` is threaded through a whole recursive copy. It maps the
//! identity of every shared source node (its allocation address plus type)
//! to the destination already created for it. A node met a second time
//! resolves to that destination instead of being copied again, which keeps
//! shared references shared and makes cycles terminate.
//!
//! Owned values (`Vec`, `FrozenList`, `Box`, scalars) cannot be aliased, so
//! they copy straight through. Only shared handles (`Arc`, `SharedList`)
//! consult the memo.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use log::trace;

use crate::list::FrozenList;

// ---------------------------------------------------------------------------
// Memo
// ---------------------------------------------------------------------------

/// Source identity → destination, for the duration of one deep copy.
#[derive(Default)]
pub struct CopyMemo {
    entries: HashMap<(usize, TypeId), Box<dyn Any>>,
}

impl CopyMemo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Destination previously registered for `identity`, if any.
    pub fn lookup<D: Any + Clone>(&self, identity: usize) -> Option<D> {
        let found = self
            .entries
            .get(&(identity, TypeId::of::<D>()))
            .and_then(|entry| entry.downcast_ref::<D>())
            .cloned();
        if found.is_some() {
            trace!("deep copy: memo hit for {:#x}", identity);
        }
        found
    }

    /// Record `destination` as the copy of the node at `identity`.
    /// Must happen before the node's children are copied.
    pub fn register<D: Any>(&mut self, identity: usize, destination: D) {
        self.entries
            .insert((identity, TypeId::of::<D>()), Box::new(destination));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Protocol
// ---------------------------------------------------------------------------

pub trait DeepCopy: Sized {
    /// Copy `self`, resolving shared nodes through `memo`.
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self;

    /// Copy `self` with a fresh memo.
    fn deep_copy(&self) -> Self {
        let mut memo = CopyMemo::new();
        self.deep_copy_with(&mut memo)
    }
}

macro_rules! deep_copy_via_clone {
    ($($ty:ty),* $(,)?) => {
        $(
            impl DeepCopy for $ty {
                fn deep_copy_with(&self, _memo: &mut CopyMemo) -> Self {
                    self.clone()
                }
            }
        )*
    };
}

deep_copy_via_clone!(
    (), bool, char, String,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
    f32, f64,
);

impl<T: DeepCopy> DeepCopy for Option<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        self.as_ref().map(|inner| inner.deep_copy_with(memo))
    }
}

impl<T: DeepCopy> DeepCopy for Box<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        Box::new((**self).deep_copy_with(memo))
    }
}

impl<A: DeepCopy, B: DeepCopy> DeepCopy for (A, B) {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        (self.0.deep_copy_with(memo), self.1.deep_copy_with(memo))
    }
}

impl<T: DeepCopy> DeepCopy for Vec<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        self.iter().map(|item| item.deep_copy_with(memo)).collect()
    }
}

/// Items are copied first, the frozen flag is applied last, so the
/// destination never passes through the mutation guards.
impl<T: DeepCopy> DeepCopy for FrozenList<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        let items = self.iter().map(|item| item.deep_copy_with(memo)).collect();
        FrozenList::from_parts(items, self.is_frozen())
    }
}

/// An `Arc` is immutable once built, so it cannot be part of a cycle on
/// its own. The memo still keeps a node reached twice shared in the copy.
///
/// Unlike `SharedList`, the destination is registered after its contents
/// are copied: an `Arc` cannot exist before its value does. A child can
/// only lead back to this node through a `SharedList`, which stops the
/// recursion there; the inner visit then registers its own copy of this
/// node first, and that copy is the one kept.
impl<T: DeepCopy + 'static> DeepCopy for Arc<T> {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        let identity = Arc::as_ptr(self) as *const () as usize;
        if let Some(existing) = memo.lookup::<Arc<T>>(identity) {
            return existing;
        }
        let copy = Arc::new((**self).deep_copy_with(memo));
        if let Some(existing) = memo.lookup::<Arc<T>>(identity) {
            return existing;
        }
        memo.register(identity, Arc::clone(&copy));
        copy
    }
}
