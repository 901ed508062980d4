use std::{
    collections::BTreeMap,
    sync::{Arc, RwLock},
};

use tracing::debug;

use halcyon_types::{bytesrepr::ToBytes, Key, StoredValue};

use super::{error::Error, CommitProvider, StateReader};
use crate::effects::{Effects, TransformKind};

/// Global state implemented purely in memory only. No state is saved to disk. This is mostly
/// used for testing purposes.
///
/// Clones share the same underlying store, so each invocation may hold its own handle while
/// commits made through one handle become visible through all of them.
#[derive(Clone, Default, Debug)]
pub struct InMemoryGlobalState {
    data: Arc<RwLock<BTreeMap<Key, StoredValue>>>,
}

impl InMemoryGlobalState {
    /// Creates an empty state.
    pub fn empty() -> Self {
        InMemoryGlobalState::default()
    }

    /// Creates a state from a given set of `Key, StoredValue` pairs.
    pub fn from_pairs(pairs: &[(Key, StoredValue)]) -> Self {
        let data = pairs.iter().cloned().collect();
        InMemoryGlobalState {
            data: Arc::new(RwLock::new(data)),
        }
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> Result<usize, Error> {
        Ok(self.data.read()?.len())
    }

    /// Returns `true` if nothing is stored.
    pub fn is_empty(&self) -> Result<bool, Error> {
        Ok(self.data.read()?.is_empty())
    }
}

impl StateReader<Key, StoredValue> for InMemoryGlobalState {
    type Error = Error;

    fn read(&self, key: &Key) -> Result<Option<StoredValue>, Self::Error> {
        Ok(self.data.read()?.get(key).cloned())
    }

    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Key>, Self::Error> {
        let data = self.data.read()?;
        let mut ret = Vec::new();
        for key in data.keys() {
            if key.to_bytes()?.starts_with(prefix) {
                ret.push(key.clone());
            }
        }
        Ok(ret)
    }
}

impl CommitProvider for InMemoryGlobalState {
    fn commit(&self, effects: Effects) -> Result<(), Error> {
        debug!(transforms = effects.len(), "committing effects to in-memory global state");
        let mut data = self.data.write()?;
        for transform in effects.value() {
            match transform.destructure() {
                (_, TransformKind::Identity) => {}
                (key, TransformKind::Write(value)) => {
                    data.insert(key, value);
                }
                (key, TransformKind::Prune) => {
                    data.remove(&key);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use halcyon_types::{ScriptHash, StorageItem, StorageKey};

    use super::*;
    use crate::effects::Transform;

    fn storage_key(owner: u8, key: &[u8]) -> Key {
        Key::Storage(StorageKey::new(ScriptHash::new([owner; 20]), key.to_vec()))
    }

    fn item(value: &[u8]) -> StoredValue {
        StoredValue::StorageItem(StorageItem::new(value.to_vec()))
    }

    #[test]
    fn keys_with_prefix_selects_one_contract() {
        let state = InMemoryGlobalState::from_pairs(&[
            (storage_key(1, b"a"), item(b"1")),
            (storage_key(1, b"b"), item(b"2")),
            (storage_key(2, b"a"), item(b"3")),
        ]);
        let keys = state
            .keys_with_prefix(&Key::storage_prefix(&ScriptHash::new([1; 20])))
            .unwrap();
        assert_eq!(keys, vec![storage_key(1, b"a"), storage_key(1, b"b")]);
    }

    #[test]
    fn commit_applies_transforms_in_order() {
        let state = InMemoryGlobalState::from_pairs(&[(storage_key(1, b"gone"), item(b"x"))]);
        let mut effects = Effects::new();
        effects.push(Transform::new(storage_key(1, b"k"), TransformKind::Write(item(b"1"))));
        effects.push(Transform::new(storage_key(1, b"k"), TransformKind::Write(item(b"2"))));
        effects.push(Transform::new(storage_key(1, b"gone"), TransformKind::Prune));
        effects.push(Transform::new(storage_key(1, b"k"), TransformKind::Identity));

        let view = state.clone();
        state.commit(effects).unwrap();
        assert_eq!(view.read(&storage_key(1, b"k")).unwrap(), Some(item(b"2")));
        assert_eq!(view.read(&storage_key(1, b"gone")).unwrap(), None);
        assert_eq!(view.len().unwrap(), 1);
    }
}
