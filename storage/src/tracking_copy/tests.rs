use std::{cell::Cell, collections::BTreeSet, rc::Rc};

use assert_matches::assert_matches;
use proptest::prelude::*;

use halcyon_types::{
    gens::*, Block, BlockHash, ChainTip, ContractState, Digest, Header, Key, ScriptHash,
    StorageItem, StorageKey, StoredValue, Transaction, TransactionState,
};

use super::{meter::Count, TrackingCopy, TrackingCopyCache, TrackingCopyError};
use crate::{
    effects::{Effects, Transform, TransformKind},
    global_state::{
        error::Error as GlobalStateError, in_memory::InMemoryGlobalState, StateReader,
    },
    tracking_copy::TrackingCopyExt,
};

struct CountingDb {
    count: Rc<Cell<i32>>,
    value: Option<StoredValue>,
}

impl CountingDb {
    fn new(counter: Rc<Cell<i32>>) -> CountingDb {
        CountingDb {
            count: counter,
            value: None,
        }
    }

    fn new_init(v: StoredValue) -> CountingDb {
        CountingDb {
            count: Rc::new(Cell::new(0)),
            value: Some(v),
        }
    }
}

impl StateReader<Key, StoredValue> for CountingDb {
    type Error = GlobalStateError;

    fn read(&self, _key: &Key) -> Result<Option<StoredValue>, Self::Error> {
        let count = self.count.get();
        let value = match self.value {
            Some(ref v) => v.clone(),
            None => item(&count.to_le_bytes()),
        };
        self.count.set(count + 1);
        Ok(Some(value))
    }

    fn keys_with_prefix(&self, _prefix: &[u8]) -> Result<Vec<Key>, Self::Error> {
        Ok(Vec::new())
    }
}

fn item(value: &[u8]) -> StoredValue {
    StoredValue::StorageItem(StorageItem::new(value.to_vec()))
}

fn storage_key(owner: u8, key: &[u8]) -> Key {
    Key::Storage(StorageKey::new(ScriptHash::new([owner; 20]), key.to_vec()))
}

fn effects(transform_keys_and_kinds: Vec<(Key, TransformKind)>) -> Effects {
    let mut effects = Effects::new();
    for (key, kind) in transform_keys_and_kinds {
        effects.push(Transform::new(key, kind));
    }
    effects
}

fn header(index: u32, prev_hash: BlockHash) -> Header {
    Header::new(
        0,
        prev_hash,
        Digest::from_raw([0; 32]),
        1_600_000_000 + u64::from(index),
        index,
        ScriptHash::new([9; 20]),
    )
}

#[test]
fn tracking_copy_new() {
    let counter = Rc::new(Cell::new(0));
    let db = CountingDb::new(counter);
    let tc = TrackingCopy::new(db);

    assert!(tc.effects.is_empty());
    assert!(tc.persisting_block().is_none());
}

#[test]
fn tracking_copy_caching() {
    let counter = Rc::new(Cell::new(0));
    let db = CountingDb::new(Rc::clone(&counter));
    let mut tc = TrackingCopy::new(db);
    let k = storage_key(0, b"k");

    let zero = item(&0_i32.to_le_bytes());
    // first read
    let value = tc.read(&k).unwrap().unwrap();
    assert_eq!(value, zero);

    // second read; should use cache instead
    // of going back to the DB
    let value = tc.read(&k).unwrap().unwrap();
    let db_value = counter.get();
    assert_eq!(value, zero);
    assert_eq!(db_value, 1);
}

#[test]
fn tracking_copy_read() {
    let counter = Rc::new(Cell::new(0));
    let db = CountingDb::new(Rc::clone(&counter));
    let mut tc = TrackingCopy::new(db);
    let k = storage_key(0, b"k");

    let zero = item(&0_i32.to_le_bytes());
    let value = tc.read(&k).unwrap().unwrap();
    // value read correctly
    assert_eq!(value, zero);
    // Reading does produce an identity transform.
    assert_eq!(tc.effects, effects(vec![(k, TransformKind::Identity)]));
}

#[test]
fn tracking_copy_get_records_no_effect() {
    let db = CountingDb::new_init(item(b"v"));
    let mut tc = TrackingCopy::new(db);

    assert_eq!(tc.get(&storage_key(0, b"k")).unwrap(), Some(item(b"v")));
    assert!(tc.effects().is_empty());
}

#[test]
fn tracking_copy_write() {
    let counter = Rc::new(Cell::new(0));
    let db = CountingDb::new(Rc::clone(&counter));
    let mut tc = TrackingCopy::new(db);
    let k = storage_key(0, b"k");

    let one = item(b"1");
    let two = item(b"2");

    // writing should work
    tc.write(k.clone(), one.clone());
    // write does not need to query the DB
    let db_value = counter.get();
    assert_eq!(db_value, 0);
    // Writing creates a write transform.
    assert_eq!(
        tc.effects,
        effects(vec![(k.clone(), TransformKind::Write(one.clone()))])
    );

    // writing again should update the values
    tc.write(k.clone(), two.clone());
    let db_value = counter.get();
    assert_eq!(db_value, 0);
    assert_eq!(
        tc.effects,
        effects(vec![
            (k.clone(), TransformKind::Write(one)),
            (k.clone(), TransformKind::Write(two.clone()))
        ])
    );

    // reads observe the buffered write
    assert_eq!(tc.get(&k).unwrap(), Some(two));
    assert_eq!(counter.get(), 0);
}

#[test]
fn tracking_copy_prune_hides_value() {
    let counter = Rc::new(Cell::new(0));
    let db = CountingDb {
        count: Rc::clone(&counter),
        value: Some(item(b"stored")),
    };
    let mut tc = TrackingCopy::new(db);
    let k = storage_key(0, b"k");

    tc.prune(k.clone());
    assert_eq!(tc.read(&k).unwrap(), None);
    assert_eq!(counter.get(), 0);
    assert_eq!(tc.effects, effects(vec![(k.clone(), TransformKind::Prune)]));

    // writing after a prune makes the key visible again
    tc.write(k.clone(), item(b"new"));
    assert_eq!(tc.get(&k).unwrap(), Some(item(b"new")));
}

#[test]
fn keys_with_prefix_merges_buffered_changes() {
    let state = InMemoryGlobalState::from_pairs(&[
        (storage_key(1, b"a"), item(b"1")),
        (storage_key(1, b"b"), item(b"2")),
        (storage_key(2, b"a"), item(b"3")),
    ]);
    let mut tc = TrackingCopy::new(state);

    tc.prune(storage_key(1, b"a"));
    tc.write(storage_key(1, b"c"), item(b"4"));
    tc.write(storage_key(2, b"z"), item(b"5"));

    let keys = tc
        .keys_with_prefix(&Key::storage_prefix(&ScriptHash::new([1; 20])))
        .unwrap();
    let expected: BTreeSet<Key> = vec![storage_key(1, b"b"), storage_key(1, b"c")]
        .into_iter()
        .collect();
    assert_eq!(keys, expected);
}

#[test]
fn commit_publishes_effects_and_resets() {
    let state = InMemoryGlobalState::from_pairs(&[(storage_key(1, b"old"), item(b"x"))]);
    let view = state.clone();
    let mut tc = TrackingCopy::new(state);

    tc.write(storage_key(1, b"new"), item(b"y"));
    tc.prune(storage_key(1, b"old"));
    // nothing reaches the store before commit
    assert_eq!(view.read(&storage_key(1, b"new")).unwrap(), None);

    tc.commit().unwrap();
    assert!(tc.effects().is_empty());
    assert_eq!(view.read(&storage_key(1, b"new")).unwrap(), Some(item(b"y")));
    assert_eq!(view.read(&storage_key(1, b"old")).unwrap(), None);
    assert_eq!(tc.get(&storage_key(1, b"old")).unwrap(), None);
}

#[test]
fn cache_size_limit() {
    let mut cache = TrackingCopyCache::new(2, Count);
    let (k1, v1) = (storage_key(0, b"1"), item(b"1"));
    let (k2, v2) = (storage_key(0, b"2"), item(b"2"));
    let (k3, v3) = (storage_key(0, b"3"), item(b"3"));

    cache.insert_read(k1.clone(), v1);
    cache.insert_read(k2.clone(), v2.clone());
    // refreshing k1 makes k2 the least recently used entry
    assert!(cache.get(&k1).is_some());
    cache.insert_read(k3.clone(), v3.clone());

    assert!(cache.get(&k1).is_some());
    assert_eq!(cache.get(&k2), None);
    assert_eq!(cache.get(&k3), Some(&v3));

    // writes are never evicted
    cache.insert_write(k2.clone(), v2.clone());
    cache.insert_read(storage_key(0, b"4"), item(b"4"));
    cache.insert_read(storage_key(0, b"5"), item(b"5"));
    assert_eq!(cache.get(&k2), Some(&v2));
}

#[test]
fn ext_reads_typed_values() {
    let contract = ContractState::new(vec![0x51], true, false, false, "token".to_string());
    let genesis = header(0, BlockHash::from_raw([0; 32]));
    let transaction = Transaction::new(0, 7, vec![0x61], vec![ScriptHash::new([4; 20])]);
    let block = Block::new(header(1, genesis.hash()), vec![transaction.clone()]);
    let state = InMemoryGlobalState::from_pairs(&[
        (
            Key::Contract(contract.script_hash()),
            StoredValue::from(contract.clone()),
        ),
        (Key::Block(genesis.hash()), StoredValue::Header(genesis.clone())),
        (Key::Block(block.hash()), StoredValue::from(block.clone())),
        (Key::BlockHashAtHeight(0), StoredValue::BlockHash(genesis.hash())),
        (Key::BlockHashAtHeight(1), StoredValue::BlockHash(block.hash())),
        (
            Key::ChainTip,
            StoredValue::from(ChainTip::new(1, block.hash())),
        ),
        (
            Key::Transaction(transaction.hash()),
            StoredValue::from(TransactionState::new(1, transaction.clone())),
        ),
    ]);
    let mut tc = TrackingCopy::new(state);

    assert_eq!(
        tc.read_contract(&contract.script_hash()).unwrap(),
        Some(contract)
    );
    assert_eq!(tc.read_contract(&ScriptHash::new([8; 20])).unwrap(), None);
    assert_eq!(tc.read_block_hash_at_height(1).unwrap(), Some(block.hash()));
    assert_eq!(tc.read_block_hash_at_height(2).unwrap(), None);
    assert_eq!(tc.read_header(&genesis.hash()).unwrap(), Some(genesis.clone()));
    assert_eq!(
        tc.read_header(&block.hash()).unwrap().as_ref(),
        Some(block.header())
    );
    // a header stored without a body is not a block
    assert_eq!(tc.read_block(&genesis.hash()).unwrap(), None);
    assert_eq!(tc.read_block(&block.hash()).unwrap(), Some(block.clone()));
    assert_eq!(tc.read_tip_header().unwrap().as_ref(), Some(block.header()));
    let state = tc.read_transaction(&transaction.hash()).unwrap().unwrap();
    assert_eq!(state.block_index(), 1);
    assert_eq!(state.transaction(), &transaction);
}

#[test]
fn ext_reports_type_mismatch() {
    let db = CountingDb::new_init(item(b"not a contract"));
    let mut tc = TrackingCopy::new(db);

    let result = tc.read_contract(&ScriptHash::new([1; 20]));
    assert_matches!(result, Err(TrackingCopyError::TypeMismatch(Key::Contract(_), _)));
}

#[test]
fn ext_storage_keys_of_one_contract() {
    let state = InMemoryGlobalState::from_pairs(&[
        (storage_key(1, b"a"), item(b"1")),
        (storage_key(2, b"b"), item(b"2")),
    ]);
    let mut tc = TrackingCopy::new(state);
    tc.write(storage_key(1, b"c"), item(b"3"));

    let keys = tc.storage_keys(&ScriptHash::new([1; 20])).unwrap();
    let expected: BTreeSet<StorageKey> = vec![
        StorageKey::new(ScriptHash::new([1; 20]), b"a".to_vec()),
        StorageKey::new(ScriptHash::new([1; 20]), b"c".to_vec()),
    ]
    .into_iter()
    .collect();
    assert_eq!(keys, expected);
}

proptest! {
    #[test]
    fn query_empty_path(k in key_arb(), missing_key in key_arb(), v in storage_item_arb()) {
        let value = v.clone();
        let state = InMemoryGlobalState::from_pairs(&[(k.clone(), v)]);
        let mut tc = TrackingCopy::new(state);

        prop_assert_eq!(tc.get(&k).unwrap(), Some(value));
        if missing_key != k {
            prop_assert_eq!(tc.get(&missing_key).unwrap(), None);
        }
    }

    #[test]
    fn write_then_read_observes_write(k in key_arb(), v in storage_item_arb()) {
        let mut tc = TrackingCopy::new(InMemoryGlobalState::empty());
        tc.write(k.clone(), v.clone());
        prop_assert_eq!(tc.read(&k).unwrap(), Some(v));
    }
}
