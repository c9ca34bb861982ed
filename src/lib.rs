#![forbid(unsafe_code)]

//! frozen_list: an ordered sequence that stays mutable until it is frozen.
//!
//! A [`FrozenList`] is built up like a `Vec`, then frozen exactly once.
//! After the freeze every mutating call fails with [`Error::Frozen`] and
//! leaves the contents untouched, while reads, comparison and hashing keep
//! working. The freeze flag is atomic, so a list frozen on one thread can be
//! published to others and read without a lock.
//!
//! ```
//! use frozen_list::{Error, FrozenList};
//!
//! let mut x = FrozenList::from(vec![3, 1, 2]);
//! x.sort().unwrap();
//! x.freeze();
//! assert_eq!(x, [1, 2, 3]);
//! assert!(matches!(x.push(4), Err(Error::Frozen { .. })));
//! assert!(x.hash_value().is_ok());
//! ```

/// Version tag written as the first field of the canonical encoding.
/// Changing the canonical layout requires bumping it.
pub const CANONICAL_FORMAT_VERSION: u32 = 1;

pub mod error;
pub mod guard;
pub mod repr;
pub mod list;
pub mod sequence;
pub mod hashing;
pub mod copy;
pub mod shared;
pub mod value;

pub use copy::{CopyMemo, DeepCopy};
pub use error::{Error, Result};
pub use hashing::{canonical_digest, canonical_serialize, hash_items, TryHash};
pub use list::FrozenList;
pub use sequence::{bisect_left, bisect_right, insort, MutableSequence, Sequence};
pub use shared::{SharedList, SharedRead, SharedWrite};
pub use value::Value;
