//! Contains functions for generating arbitrary values for use by
//! [`Proptest`](https://crates.io/crates/proptest).
#![allow(missing_docs)]

use num_bigint::BigInt;
use proptest::{collection::vec, prelude::*};

use crate::{Key, ScriptHash, StackMap, StackValue, StorageItem, StorageKey, StoredValue};

pub fn script_hash_arb() -> impl Strategy<Value = ScriptHash> {
    any::<[u8; 20]>().prop_map(ScriptHash::new)
}

pub fn storage_key_arb() -> impl Strategy<Value = StorageKey> {
    (script_hash_arb(), vec(any::<u8>(), 0..64))
        .prop_map(|(script_hash, key)| StorageKey::new(script_hash, key))
}

pub fn key_arb() -> impl Strategy<Value = Key> {
    prop_oneof![
        script_hash_arb().prop_map(Key::Contract),
        storage_key_arb().prop_map(Key::Storage),
        any::<u32>().prop_map(Key::BlockHashAtHeight),
    ]
}

pub fn storage_item_arb() -> impl Strategy<Value = StoredValue> {
    vec(any::<u8>(), 0..128).prop_map(|value| StoredValue::StorageItem(StorageItem::new(value)))
}

/// Generates acyclic, handle-free values which the canonical codec accepts under the default
/// limits.
pub fn stack_value_arb() -> impl Strategy<Value = StackValue> {
    let leaf = prop_oneof![
        vec(any::<u8>(), 0..24).prop_map(StackValue::ByteString),
        any::<bool>().prop_map(StackValue::Boolean),
        any::<i128>().prop_map(|value| StackValue::Integer(BigInt::from(value))),
    ];
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop_oneof![
            vec(inner.clone(), 0..6).prop_map(StackValue::array),
            vec(inner.clone(), 0..6).prop_map(StackValue::structure),
            vec((any::<u16>(), inner), 0..6).prop_map(|pairs| {
                let mut map = StackMap::new();
                for (key, value) in pairs {
                    map.insert(StackValue::from(u32::from(key)), value);
                }
                StackValue::map(map)
            }),
        ]
    })
}
