//! Value: dynamic item type.
//!
//! Pure data: null, booleans, integers, strings and shared lists of
//! further values. Lists are held through `SharedList`, so a `Value` graph
//! may share sub-lists or contain itself.
//!
//! Floats are deliberately absent: every `Value` has a total equality and a
//! well-defined hash once its lists are frozen.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};

use serde::ser::{Error as _, SerializeSeq, Serializer};
use serde::Serialize;
use serde_json::Value as Json;

use crate::copy::{CopyMemo, DeepCopy};
use crate::error::{Error, Result};
use crate::guard::{Walk, WalkGuard};
use crate::hashing::TryHash;
use crate::list::FrozenList;
use crate::shared::SharedList;

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Str(String),
    List(SharedList<Value>),
}

impl Value {
    /// Wrap `items` in a fresh, unfrozen shared list.
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Self {
        Value::List(items.into_iter().collect())
    }

    pub fn as_list(&self) -> Option<&SharedList<Value>> {
        match self {
            Value::List(list) => Some(list),
            _ => None,
        }
    }

    /// Convert parsed JSON. Arrays become unfrozen lists; floats and
    /// objects have no counterpart and are rejected.
    pub fn from_json(json: &Json) -> Result<Self> {
        match json {
            Json::Null => Ok(Value::Null),
            Json::Bool(b) => Ok(Value::Bool(*b)),
            Json::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .ok_or_else(|| Error::InvalidValue(format!("not an i64: {}", n))),
            Json::String(s) => Ok(Value::Str(s.clone())),
            Json::Array(items) => {
                let items = items
                    .iter()
                    .map(Value::from_json)
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(SharedList::new(FrozenList::from(items))))
            }
            Json::Object(_) => Err(Error::InvalidValue("objects are not supported".to_string())),
        }
    }

    /// Freeze every list reachable from this value, cycles included.
    pub fn freeze_all(&self) {
        let mut seen = HashSet::new();
        self.freeze_reachable(&mut seen);
    }

    fn freeze_reachable(&self, seen: &mut HashSet<usize>) {
        if let Value::List(list) = self {
            if !seen.insert(list.identity()) {
                return;
            }
            list.freeze();
            for item in list.read().iter() {
                item.freeze_reachable(seen);
            }
        }
    }
}

// ── Conversions ────────────────────────────────────────────────────

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(s)
    }
}

impl From<SharedList<Value>> for Value {
    fn from(list: SharedList<Value>) -> Self {
        Value::List(list)
    }
}

// ── Comparison ─────────────────────────────────────────────────────

/// Lists compare by contents; identical handles short-circuit. A pair of
/// lists reached again while still being compared counts as equal, so
/// cyclic structures compare in finite time.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Value {}

/// Only values of the same kind are ordered; mixed kinds yield `None`.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Str(a), Value::Str(b)) => a.partial_cmp(b),
            (Value::List(a), Value::List(b)) => {
                if a.ptr_eq(b) {
                    return Some(Ordering::Equal);
                }
                let Some(_walk) = WalkGuard::enter(Walk::Compare, a.identity(), b.identity())
                else {
                    return Some(Ordering::Equal);
                };
                let (a, b) = (a.read(), b.read());
                a.as_slice().partial_cmp(b.as_slice())
            }
            _ => None,
        }
    }
}

// ── Hashing / copying ──────────────────────────────────────────────

/// Unhashable while any reachable list is still mutable, and fails with
/// [`Error::Cycle`] when a frozen list reaches itself.
impl TryHash for Value {
    fn try_hash<H: Hasher>(&self, state: &mut H) -> Result<()> {
        std::mem::discriminant(self).hash(state);
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => b.try_hash(state),
            Value::Int(n) => n.try_hash(state),
            Value::Str(s) => s.try_hash(state),
            Value::List(list) => list.try_hash(state),
        }
    }
}

impl DeepCopy for Value {
    fn deep_copy_with(&self, memo: &mut CopyMemo) -> Self {
        match self {
            Value::List(list) => Value::List(list.deep_copy_with(memo)),
            scalar => scalar.clone(),
        }
    }
}

// ── Serde ──────────────────────────────────────────────────────────

/// Lists serialize as plain arrays. A list that contains itself cannot be
/// written out and fails with a serialization error.
impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Str(s) => serializer.serialize_str(s),
            Value::List(list) => {
                let _walk = WalkGuard::enter(Walk::Serialize, list.identity(), 0)
                    .ok_or_else(|| S::Error::custom("cannot serialize a self-referential list"))?;
                let items = list.read();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items.iter() {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json() {
        let json: Json = serde_json::from_str(r#"[1, "a", null, [true]]"#).unwrap();
        let value = Value::from_json(&json).unwrap();
        let expected = Value::list(vec![
            Value::Int(1),
            Value::from("a"),
            Value::Null,
            Value::list(vec![Value::Bool(true)]),
        ]);
        assert_eq!(value, expected);
    }

    #[test]
    fn test_from_json_rejects_floats_and_objects() {
        let float: Json = serde_json::from_str("1.5").unwrap();
        assert!(matches!(Value::from_json(&float), Err(Error::InvalidValue(_))));
        let object: Json = serde_json::from_str(r#"{"a":1}"#).unwrap();
        assert!(matches!(Value::from_json(&object), Err(Error::InvalidValue(_))));
    }

    #[test]
    fn test_mixed_kinds_are_unordered() {
        assert_eq!(Value::Int(1).partial_cmp(&Value::from("1")), None);
        assert!(Value::Int(1) < Value::Int(2));
        assert!(Value::list(vec![Value::Int(1)]) < Value::list(vec![Value::Int(2)]));
    }

    #[test]
    fn test_hash_requires_frozen_nested_lists() {
        let inner = Value::list(vec![Value::Int(1)]);
        let outer = FrozenList::from(vec![inner.clone()]);
        outer.freeze();
        assert_eq!(outer.hash_value(), Err(Error::Unhashable));
        inner.freeze_all();
        assert!(outer.hash_value().is_ok());
    }

    #[test]
    fn test_serialize_nested() {
        let value = Value::list(vec![Value::from("a"), Value::list(vec![Value::Int(2)])]);
        assert_eq!(serde_json::to_string(&value).unwrap(), r#"["a",[2]]"#);
    }

    #[test]
    fn test_serialize_cycle_fails() {
        let list: SharedList<Value> = SharedList::default();
        list.push(Value::List(list.clone())).unwrap();
        assert!(serde_json::to_string(&Value::List(list.clone())).is_err());
        list.write().clear().unwrap();
    }
}
