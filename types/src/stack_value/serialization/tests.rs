use assert_matches::assert_matches;
use proptest::prelude::*;

use super::*;
use crate::{gens::stack_value_arb, stack_value::InteropInterface, ScriptHash, StorageContext};

fn push_into(container: &StackValue, item: StackValue) {
    match container {
        StackValue::Array(items) | StackValue::Struct(items) => items.borrow_mut().push(item),
        _ => panic!("not a sequence"),
    }
}

fn clear(container: &StackValue) {
    match container {
        StackValue::Array(items) | StackValue::Struct(items) => items.borrow_mut().clear(),
        _ => panic!("not a sequence"),
    }
}

#[test]
fn encodes_array_of_integer_and_bytes() {
    let value = StackValue::array(vec![
        StackValue::from(1i64),
        StackValue::from(b"ab".to_vec()),
    ]);
    let encoded = serialize(&value).expect("should encode");
    assert_eq!(
        encoded,
        vec![0x80, 0x02, 0x02, 0x01, 0x01, 0x00, 0x02, 0x61, 0x62]
    );
    assert_eq!(deserialize(&encoded).expect("should decode"), value);
}

#[test]
fn encodes_scalars() {
    assert_eq!(serialize(&StackValue::from(true)).unwrap(), vec![0x01, 0x01]);
    assert_eq!(serialize(&StackValue::from(false)).unwrap(), vec![0x01, 0x00]);
    assert_eq!(serialize(&StackValue::from(0i64)).unwrap(), vec![0x02, 0x00]);
    assert_eq!(
        serialize(&StackValue::from(-129i64)).unwrap(),
        vec![0x02, 0x02, 0x7f, 0xff]
    );
    assert_eq!(serialize(&StackValue::from(vec![])).unwrap(), vec![0x00, 0x00]);
}

#[test]
fn struct_and_map_keep_tag_and_order() {
    let mut map = StackMap::new();
    map.insert(StackValue::from(b"z".to_vec()), StackValue::from(1i64));
    map.insert(StackValue::from(b"a".to_vec()), StackValue::structure(vec![]));
    let value = StackValue::map(map);
    let encoded = serialize(&value).unwrap();
    assert_eq!(
        encoded,
        vec![0x82, 0x02, 0x00, 0x01, b'z', 0x02, 0x01, 0x01, 0x00, 0x01, b'a', 0x81, 0x00]
    );
    assert_eq!(deserialize(&encoded).unwrap(), value);
}

#[test]
fn self_containing_array_is_cyclic() {
    let array = StackValue::array(vec![StackValue::from(1i64)]);
    push_into(&array, array.clone());
    assert_matches!(serialize(&array), Err(EncodeError::CyclicStructure));
    clear(&array);
}

#[test]
fn indirect_cycle_is_detected() {
    let outer = StackValue::array(vec![]);
    let inner = StackValue::structure(vec![]);
    push_into(&outer, inner.clone());
    push_into(&inner, StackValue::array(vec![outer.clone()]));
    assert_matches!(serialize(&outer), Err(EncodeError::CyclicStructure));
    clear(&inner);
}

#[test]
fn map_value_cycle_is_detected() {
    let map = StackValue::map(StackMap::new());
    if let StackValue::Map(entries) = &map {
        entries
            .borrow_mut()
            .insert(StackValue::from(1i64), map.clone());
    }
    assert_matches!(serialize(&map), Err(EncodeError::CyclicStructure));
    if let StackValue::Map(entries) = &map {
        entries.borrow_mut().remove(&StackValue::from(1i64));
    }
}

#[test]
fn shared_substructure_is_not_a_cycle() {
    let shared = StackValue::array(vec![StackValue::from(7i64)]);
    let value = StackValue::array(vec![shared.clone(), shared]);
    let encoded = serialize(&value).expect("shared but acyclic values should encode");
    let decoded = deserialize(&encoded).unwrap();
    assert_eq!(decoded, value);

    // Decoding yields independent copies.
    if let StackValue::Array(items) = &decoded {
        let items = items.borrow();
        assert!(!items[0].key_eq(&items[1]));
    }
}

#[test]
fn handles_are_unsupported() {
    let context = StorageContext::new(ScriptHash::new([1; 20]), false);
    let handle = StackValue::from(InteropInterface::from(context));
    assert_matches!(serialize(&handle), Err(EncodeError::UnsupportedType));
    let nested = StackValue::array(vec![StackValue::from(1i64), handle]);
    assert_matches!(serialize(&nested), Err(EncodeError::UnsupportedType));
}

#[test]
fn size_bound_is_inclusive() {
    // A byte string of n >= 0x10000 bytes encodes to 1 + 5 + n bytes.
    let max = MAX_ITEM_SIZE;
    let under = StackValue::from(vec![0u8; max - 7]);
    assert_eq!(serialize(&under).unwrap().len(), max - 1);
    let exact = StackValue::from(vec![0u8; max - 6]);
    assert_eq!(serialize(&exact).unwrap().len(), max);
    let over = StackValue::from(vec![0u8; max - 5]);
    assert_matches!(
        serialize(&over),
        Err(EncodeError::ItemTooLarge { size, max: limit }) if size == max + 1 && limit == max
    );
}

#[test]
fn size_bound_applies_to_shared_substructure() {
    let limits = StackValueLimits {
        max_item_size: 64,
        max_array_size: MAX_ARRAY_SIZE,
    };
    let blob = StackValue::from(vec![0u8; 20]);
    let value = StackValue::array(vec![blob.clone(), blob.clone(), blob]);
    assert_matches!(
        serialize_with_limits(&value, &limits),
        Err(EncodeError::ItemTooLarge { max: 64, .. })
    );
}

#[test]
fn size_bound_is_reported_before_a_later_handle() {
    let limits = StackValueLimits {
        max_item_size: 64,
        max_array_size: MAX_ARRAY_SIZE,
    };
    let handle = StackValue::Handle(StorageContext::new(ScriptHash::new([1; 20]), false).into());
    let value = StackValue::array(vec![StackValue::from(vec![0u8; 80]), handle.clone()]);
    assert_matches!(
        serialize_with_limits(&value, &limits),
        Err(EncodeError::ItemTooLarge { max: 64, .. })
    );

    let value = StackValue::array(vec![handle, StackValue::from(vec![0u8; 80])]);
    assert_matches!(
        serialize_with_limits(&value, &limits),
        Err(EncodeError::UnsupportedType)
    );
}

#[test]
fn declared_count_over_limit_is_rejected() {
    // Array declaring 1025 elements with no element data following.
    let payload = [0x80, 0xfd, 0x01, 0x04];
    assert_matches!(
        deserialize(&payload),
        Err(DecodeError::TooManyElements { count: 1025, max: MAX_ARRAY_SIZE })
    );
    let payload = [0x82, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff];
    assert_matches!(
        deserialize(&payload),
        Err(DecodeError::TooManyElements { count: u64::MAX, .. })
    );
}

#[test]
fn count_at_limit_is_accepted() {
    let limits = StackValueLimits {
        max_item_size: MAX_ITEM_SIZE,
        max_array_size: 2,
    };
    let value = StackValue::array(vec![StackValue::from(true), StackValue::from(false)]);
    let encoded = serialize(&value).unwrap();
    assert_eq!(deserialize_with_limits(&encoded, &limits).unwrap(), value);

    let value = StackValue::structure(vec![StackValue::from(true); 3]);
    let encoded = serialize(&value).unwrap();
    assert_matches!(
        deserialize_with_limits(&encoded, &limits),
        Err(DecodeError::TooManyElements { count: 3, max: 2 })
    );
}

#[test]
fn truncated_input_is_unexpected_eof() {
    assert_matches!(deserialize(&[]), Err(DecodeError::UnexpectedEof));
    assert_matches!(deserialize(&[0x80, 0x02, 0x02, 0x01]), Err(DecodeError::UnexpectedEof));
    assert_matches!(deserialize(&[0x80, 0x02, 0x01, 0x01]), Err(DecodeError::UnexpectedEof));
    assert_matches!(deserialize(&[0x00, 0x03, 0x61]), Err(DecodeError::UnexpectedEof));
    assert_matches!(deserialize(&[0x01]), Err(DecodeError::UnexpectedEof));
}

#[test]
fn unknown_tag_is_malformed() {
    assert_matches!(deserialize(&[0x03]), Err(DecodeError::MalformedData));
    assert_matches!(deserialize(&[0x80, 0x01, 0x40]), Err(DecodeError::MalformedData));
}

#[test]
fn duplicate_map_key_is_malformed() {
    let payload = [
        0x82, 0x02, 0x00, 0x01, b'k', 0x01, 0x01, 0x00, 0x01, b'k', 0x01, 0x00,
    ];
    assert_matches!(deserialize(&payload), Err(DecodeError::MalformedData));
}

#[test]
fn trailing_bytes_are_ignored() {
    let payload = [0x02, 0x01, 0x05, 0xde, 0xad];
    assert_eq!(deserialize(&payload).unwrap(), StackValue::from(5i64));
}

#[test]
fn nonzero_boolean_byte_is_true() {
    assert_eq!(deserialize(&[0x01, 0x02]).unwrap(), StackValue::from(true));
}

#[test]
fn deep_nesting_does_not_recurse() {
    let depth = 2_000;
    let mut value = StackValue::from(1i64);
    for _ in 0..depth {
        value = StackValue::array(vec![value]);
    }
    let encoded = serialize(&value).unwrap();
    assert_eq!(encoded.len(), depth * 2 + 3);

    let decoded = deserialize(&encoded).unwrap();
    let mut cursor = decoded;
    for _ in 0..depth {
        cursor = match cursor {
            StackValue::Array(items) => {
                let next = items.borrow()[0].clone();
                next
            }
            other => panic!("unexpected {}", other.type_name()),
        };
    }
    assert_eq!(cursor, StackValue::from(1i64));
}

proptest! {
    #[test]
    fn decode_inverts_encode(value in stack_value_arb()) {
        let encoded = serialize(&value).unwrap();
        prop_assert_eq!(deserialize(&encoded).unwrap(), value);
    }
}
