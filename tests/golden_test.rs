//! Hashing tests: the unfrozen/frozen hash contract and the golden
//! canonical digests.
//!
//! The golden digests must NEVER be modified to match new behavior.
//! If they fail, the canonical encoding has changed; bump
//! CANONICAL_FORMAT_VERSION instead.

use std::collections::hash_map::DefaultHasher;

use frozen_list::{
    canonical_digest, canonical_serialize, hash_items, Error, FrozenList, SharedList, TryHash,
    Value, CANONICAL_FORMAT_VERSION,
};

/// SHA-256 of `{"format_version":1,"items":[1,2,3]}`.
const GOLDEN_INTS: &str = "b47ac2c35a89508a722a88c83bf0dd70e049b8ad3f8f898f7b1b03e4e6d4d692";

/// SHA-256 of `{"format_version":1,"items":["a",null,true,[1,2]]}`.
const GOLDEN_VALUES: &str = "380262d8048f54b29695de3d37264ec2d2e2ee600f79610648cc4f02a69fd2e9";

#[test]
fn hash_fails_until_frozen() {
    let list = FrozenList::from(vec![1, 2, 3]);
    assert_eq!(list.hash_value(), Err(Error::Unhashable));
    list.freeze();
    assert_eq!(list.hash_value(), hash_items(&[1, 2, 3]));
}

#[test]
fn equal_frozen_lists_hash_equal() {
    let a = FrozenList::from(vec!["x", "y"]);
    let b: FrozenList<&str> = ["x", "y"].into_iter().collect();
    a.freeze();
    b.freeze();
    assert_eq!(a.hash_value().unwrap(), b.hash_value().unwrap());

    let c = FrozenList::from(vec!["y", "x"]);
    c.freeze();
    assert_ne!(a.hash_value().unwrap(), c.hash_value().unwrap());
}

#[test]
fn hash_is_stable_after_freeze() {
    let list = FrozenList::from(vec![10u64, 20, 30]);
    list.freeze();
    let first = list.hash_value().unwrap();
    for _ in 0..10 {
        assert_eq!(list.hash_value().unwrap(), first);
    }
}

#[test]
fn shared_and_owned_lists_hash_alike() {
    let owned = FrozenList::from(vec![Value::Int(1), Value::from("a")]);
    owned.freeze();
    let shared = SharedList::from(vec![Value::Int(1), Value::from("a")]);
    shared.freeze();
    let expected = owned.hash_value().unwrap();
    assert_eq!(shared.read().hash_value().unwrap(), expected);
}

#[test]
fn canonical_requires_frozen() {
    let list = FrozenList::from(vec![1, 2, 3]);
    assert_eq!(canonical_digest(&list), Err(Error::Unhashable));
}

#[test]
fn canonical_format_version_is_one() {
    assert_eq!(CANONICAL_FORMAT_VERSION, 1, "CANONICAL_FORMAT_VERSION must be 1 and never change");
}

#[test]
fn golden_digest_ints() {
    let list = FrozenList::from(vec![1, 2, 3]);
    list.freeze();

    let bytes = canonical_serialize(&list).unwrap();
    assert_eq!(bytes, br#"{"format_version":1,"items":[1,2,3]}"#.to_vec());

    let digest = canonical_digest(&list).unwrap();
    assert_eq!(
        digest, GOLDEN_INTS,
        "GOLDEN TEST FAILED: canonical digest changed.\n\
         Got:      {}\n\
         Expected: {}",
        digest, GOLDEN_INTS
    );
}

#[test]
fn golden_digest_values() {
    let list = FrozenList::from(vec![
        Value::from("a"),
        Value::Null,
        Value::Bool(true),
        Value::list(vec![Value::Int(1), Value::Int(2)]),
    ]);
    list.freeze();

    let digest = canonical_digest(&list).unwrap();
    assert_eq!(digest, GOLDEN_VALUES);
}

#[test]
fn canonical_digest_is_deterministic() {
    let build = || {
        let mut list = FrozenList::new();
        list.extend((0..50).map(|i| i * 7 % 13)).unwrap();
        list.sort().unwrap();
        list.freeze();
        list
    };
    assert_eq!(canonical_digest(&build()), canonical_digest(&build()));
}

#[test]
fn self_referential_digest_is_an_error() {
    let x: SharedList<Value> = SharedList::default();
    x.push(Value::List(x.clone())).unwrap();
    let list = FrozenList::from(vec![Value::List(x.clone())]);
    list.freeze();
    assert!(matches!(canonical_digest(&list), Err(Error::Encode(_))));
    x.write().clear().unwrap();
}

#[test]
fn self_referential_hash_is_an_error() {
    let x: SharedList<Value> = SharedList::from(vec![Value::Int(1)]);
    x.push(Value::List(x.clone())).unwrap();
    Value::List(x.clone()).freeze_all();
    assert!(x.is_frozen());

    let mut hasher = DefaultHasher::new();
    assert_eq!(Value::List(x.clone()).try_hash(&mut hasher), Err(Error::Cycle));

    let outer = FrozenList::from(vec![Value::Null, Value::List(x.clone())]);
    outer.freeze();
    assert_eq!(outer.hash_value(), Err(Error::Cycle));

    // Frozen lists keep their cycle; leaking it here is fine for a test.
}

#[test]
fn shared_sublist_reached_twice_still_hashes() {
    let shared = SharedList::from(vec![Value::Int(1)]);
    shared.freeze();
    let list = FrozenList::from(vec![Value::List(shared.clone()), Value::List(shared)]);
    list.freeze();
    assert!(list.hash_value().is_ok());
}
