// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use proptest::prelude::*;
use yare::parameterized;

#[test]
fn dict_keys_are_encoded_in_byte_order() {
    let mut dict = Bencode::dict();
    dict.insert("piece length", 16384_i64);
    dict.insert("name", "Foo");
    dict.insert("files", Bencode::List(vec![Bencode::Int(-3), "x".into()]));

    assert_eq!(dict.encode(), b"d5:filesli-3e1:xe4:name3:Foo12:piece lengthi16384ee".to_vec());
}

#[test]
fn decode_nested_structure() {
    let value = Bencode::decode(b"d4:infod6:lengthi42e4:name5:a.mkvee").unwrap();
    let info = value.get("info").unwrap();

    assert_eq!(info.get("length").and_then(Bencode::as_int), Some(42));
    assert_eq!(info.get("name").and_then(Bencode::as_str), Some("a.mkv"));
    assert!(value.get("missing").is_none());
}

#[parameterized(
    zero = { b"i0e", 0 },
    positive = { b"i42e", 42 },
    negative = { b"i-17e", -17 },
)]
fn decode_integer(input: &[u8], expected: i64) {
    assert_eq!(Bencode::decode(input).unwrap(), Bencode::Int(expected));
}

#[test]
fn insert_into_non_dict_is_ignored() {
    let mut value = Bencode::Int(1);
    value.insert("a", 2_i64);
    assert_eq!(value, Bencode::Int(1));
}

#[parameterized(
    empty = { b"" },
    unterminated_int = { b"i42" },
    leading_zero = { b"i042e" },
    negative_zero = { b"i-0e" },
    empty_int = { b"ie" },
    short_string = { b"5:abc" },
    unterminated_list = { b"li1e" },
    non_string_key = { b"di1ei2ee" },
    trailing = { b"i1ei2e" },
    garbage = { b"x" },
)]
fn rejects_invalid_input(input: &[u8]) {
    assert!(Bencode::decode(input).is_err());
}

#[test]
fn error_reports_offset() {
    let err = Bencode::decode(b"li1ex").unwrap_err();
    assert_eq!(err.offset, 4);
    assert_eq!(err.to_string(), "invalid bencode at byte 4: unexpected byte");
}

#[test]
fn deep_nesting_is_rejected() {
    let mut input = vec![b'l'; 100];
    input.extend(vec![b'e'; 100]);
    let err = Bencode::decode(&input).unwrap_err();
    assert_eq!(err.message, "nesting too deep");
}

fn arb_bencode() -> impl Strategy<Value = Bencode> {
    let leaf = prop_oneof![
        any::<i64>().prop_map(Bencode::Int),
        proptest::collection::vec(any::<u8>(), 0..16).prop_map(Bencode::Bytes),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 0..4).prop_map(Bencode::List),
            proptest::collection::btree_map(proptest::collection::vec(any::<u8>(), 0..8), inner, 0..4)
                .prop_map(Bencode::Dict),
        ]
    })
}

proptest! {
    #[test]
    fn decode_inverts_encode(value in arb_bencode()) {
        prop_assert_eq!(Bencode::decode(&value.encode()).unwrap(), value);
    }

    #[test]
    fn decode_never_panics(input in proptest::collection::vec(any::<u8>(), 0..64)) {
        let _ = Bencode::decode(&input);
    }
}
