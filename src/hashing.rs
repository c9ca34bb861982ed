//! Hashing
//!
//! Two flavours:
//!   - `TryHash` / `hash_items`: fast in-process hash, the "hash of the
//!     items as a fixed tuple". Fallible, because a list only has a hash
//!     once it is frozen.
//!   - `canonical_serialize` / `canonical_digest`: deterministic UTF-8 JSON
//!     plus SHA-256, byte-identical across platforms and runs.
//!
//! Canonical layout (field order fixed, no whitespace):
//!   {"format_version":1,"items":[...]}

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value as Json};
use sha2::{Digest, Sha256};

use crate::error::{Error, Result};
use crate::guard::ensure_hashable;
use crate::list::FrozenList;
use crate::CANONICAL_FORMAT_VERSION;

// ---------------------------------------------------------------------------
// Fallible hashing
// ---------------------------------------------------------------------------

/// Hashing that may be refused, e.g. for a list that is not yet frozen.
///
/// For plain `Hash` types the output is exactly what `Hash::hash` feeds the
/// hasher.
pub trait TryHash {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()>;
}

macro_rules! try_hash_via_hash {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TryHash for $ty {
                fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
                    Hash::hash(self, state);
                    Ok(())
                }
            }
        )*
    };
}

try_hash_via_hash!(
    (), bool, char, str, String,
    u8, u16, u32, u64, u128, usize,
    i8, i16, i32, i64, i128, isize,
);

impl<T: TryHash + ?Sized> TryHash for &T {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        (**self).try_hash(state)
    }
}

impl<T: TryHash + ?Sized> TryHash for Box<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        (**self).try_hash(state)
    }
}

impl<T: TryHash + ?Sized> TryHash for Arc<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        (**self).try_hash(state)
    }
}

impl<T: TryHash> TryHash for Option<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        std::mem::discriminant(self).hash(state);
        match self {
            Some(inner) => inner.try_hash(state),
            None => Ok(()),
        }
    }
}

impl<A: TryHash, B: TryHash> TryHash for (A, B) {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        self.0.try_hash(state)?;
        self.1.try_hash(state)
    }
}

/// Length prefix, then every item in order.
impl<T: TryHash> TryHash for [T] {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        state.write_usize(self.len());
        for item in self {
            item.try_hash(state)?;
        }
        Ok(())
    }
}

impl<T: TryHash> TryHash for Vec<T> {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        self.as_slice().try_hash(state)
    }
}

/// Hash of `items` taken as one fixed-length tuple.
///
/// A frozen list hashes to exactly this value for its current items.
pub fn hash_items<T: TryHash>(items: &[T]) -> Result<u64> {
    let mut hasher = DefaultHasher::new();
    items.try_hash(&mut hasher)?;
    Ok(hasher.finish())
}

// ---------------------------------------------------------------------------
// Canonical encoding
// ---------------------------------------------------------------------------

/// Canonical serialization of a frozen list to UTF-8 JSON bytes.
/// No whitespace, `format_version` first.
pub fn canonical_serialize<T: Serialize>(list: &FrozenList<T>) -> Result<Vec<u8>> {
    ensure_hashable(list.is_frozen())?;
    let items = serde_json::to_value(list.as_slice()).map_err(|e| Error::Encode(e.to_string()))?;

    let mut root = Map::new();
    root.insert(
        "format_version".to_string(),
        Json::Number(CANONICAL_FORMAT_VERSION.into()),
    );
    root.insert("items".to_string(), items);

    serde_json::to_vec(&Json::Object(root)).map_err(|e| Error::Encode(e.to_string()))
}

/// SHA-256 of the canonical serialization. Lowercase hex string.
pub fn canonical_digest<T: Serialize>(list: &FrozenList<T>) -> Result<String> {
    let bytes = canonical_serialize(list)?;
    let digest = Sha256::digest(&bytes);
    Ok(digest.iter().map(|b| format!("{:02x}", b)).collect())
}
