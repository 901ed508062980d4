//! This module defines the `TrackingCopy` - a utility that caches operations on the state, so that
//! the underlying state remains unmodified, but it can be interacted with as if the modifications
//! were applied on it.
//!
//! A `TrackingCopy` is the snapshot one invocation executes against: it is owned by that
//! invocation alone and its buffered changes reach the underlying store only through
//! [`TrackingCopy::commit`].
mod byte_size;
mod error;
mod ext;
mod meter;
#[cfg(test)]
mod tests;

use std::collections::{BTreeSet, HashMap, HashSet};

use linked_hash_map::LinkedHashMap;
use tracing::debug;

use halcyon_types::{bytesrepr::ToBytes, Block, Key, StoredValue};

use self::meter::{HeapSize, Meter};
pub use self::{error::Error as TrackingCopyError, ext::TrackingCopyExt};
use crate::{
    effects::{Effects, Transform, TransformKind},
    global_state::{error::Error as GlobalStateError, CommitProvider, StateReader},
};

const DEFAULT_MAX_CACHE_SIZE: usize = 1024 * 16;

/// Keeps track of already accessed keys.
/// We deliberately separate cached Reads from cached mutations
/// because we want to invalidate Reads' cache so it doesn't grow too fast.
pub struct TrackingCopyCache<M> {
    max_cache_size: usize,
    current_cache_size: usize,
    reads_cached: LinkedHashMap<Key, StoredValue>,
    muts_cached: HashMap<Key, StoredValue>,
    prunes_cached: HashSet<Key>,
    meter: M,
}

impl<M: Meter<Key, StoredValue>> TrackingCopyCache<M> {
    /// Creates instance of `TrackingCopyCache` with specified `max_cache_size`,
    /// above which least-recently-used elements of the cache are invalidated.
    /// Measurements of elements' "size" is done with the usage of `Meter`
    /// instance.
    pub fn new(max_cache_size: usize, meter: M) -> TrackingCopyCache<M> {
        TrackingCopyCache {
            max_cache_size,
            current_cache_size: 0,
            reads_cached: LinkedHashMap::new(),
            muts_cached: HashMap::new(),
            prunes_cached: HashSet::new(),
            meter,
        }
    }

    /// Inserts `key` and `value` pair to Read cache.
    pub fn insert_read(&mut self, key: Key, value: StoredValue) {
        let element_size = Meter::measure(&self.meter, &key, &value);
        if let Some(previous) = self.reads_cached.insert(key.clone(), value) {
            self.current_cache_size -= Meter::measure(&self.meter, &key, &previous);
        }
        self.current_cache_size += element_size;
        while self.current_cache_size > self.max_cache_size {
            match self.reads_cached.pop_front() {
                Some((k, v)) => {
                    let element_size = Meter::measure(&self.meter, &k, &v);
                    self.current_cache_size -= element_size;
                }
                None => break,
            }
        }
    }

    /// Inserts `key` and `value` pair to Write cache.
    pub fn insert_write(&mut self, key: Key, value: StoredValue) {
        self.prunes_cached.remove(&key);
        self.muts_cached.insert(key, value);
    }

    /// Marks `key` as pruned.
    pub fn insert_prune(&mut self, key: Key) {
        self.muts_cached.remove(&key);
        self.prunes_cached.insert(key);
    }

    /// Returns `true` if `key` is marked for pruning.
    pub fn is_pruned(&self, key: &Key) -> bool {
        self.prunes_cached.contains(key)
    }

    /// Gets value from `key` in the cache.
    pub fn get(&mut self, key: &Key) -> Option<&StoredValue> {
        if self.prunes_cached.contains(key) {
            // the item is marked for pruning and therefore
            // is no longer accessible.
            return None;
        }
        if let Some(value) = self.muts_cached.get(key) {
            return Some(value);
        };

        self.reads_cached.get_refresh(key).map(|v| &*v)
    }

    /// Returns the keys written (and not since pruned) whose serialized form starts with `prefix`.
    pub fn muts_with_prefix(&self, prefix: &[u8]) -> Result<Vec<Key>, TrackingCopyError> {
        let mut ret = Vec::new();
        for key in self.muts_cached.keys() {
            if key.to_bytes()?.starts_with(prefix) {
                ret.push(key.clone());
            }
        }
        Ok(ret)
    }
}

/// An interface for the global state that caches all operations (reads and writes) instead of
/// applying them directly to the state. This way the state remains unmodified, while the user can
/// interact with it as if it was being modified in real time.
pub struct TrackingCopy<R> {
    reader: R,
    cache: TrackingCopyCache<HeapSize>,
    effects: Effects,
    persisting_block: Option<Block>,
}

impl<R> TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Creates a new `TrackingCopy` using the `reader` as the interface to the state.
    pub fn new(reader: R) -> TrackingCopy<R> {
        TrackingCopy {
            reader,
            cache: TrackingCopyCache::new(DEFAULT_MAX_CACHE_SIZE, HeapSize),
            effects: Effects::new(),
            persisting_block: None,
        }
    }

    /// Creates a new `TrackingCopy` executing in the context of `block`, which is being
    /// persisted.
    pub fn with_persisting_block(reader: R, block: Block) -> TrackingCopy<R> {
        TrackingCopy {
            persisting_block: Some(block),
            ..TrackingCopy::new(reader)
        }
    }

    /// Returns the `reader` used to access the state.
    pub fn reader(&self) -> &R {
        &self.reader
    }

    /// Returns the block being persisted, if this snapshot executes as part of persisting one.
    pub fn persisting_block(&self) -> Option<&Block> {
        self.persisting_block.as_ref()
    }

    /// Returns a copy of the execution effects cached by this instance.
    pub fn effects(&self) -> Effects {
        self.effects.clone()
    }

    /// Gets the value under `key` without recording an effect.
    pub fn get(&mut self, key: &Key) -> Result<Option<StoredValue>, TrackingCopyError> {
        if let Some(value) = self.cache.get(key) {
            return Ok(Some(value.to_owned()));
        }
        if self.cache.is_pruned(key) {
            return Ok(None);
        }
        match self.reader.read(key) {
            Ok(ret) => {
                if let Some(value) = ret {
                    self.cache.insert_read(key.clone(), value.to_owned());
                    Ok(Some(value))
                } else {
                    Ok(None)
                }
            }
            Err(err) => Err(TrackingCopyError::Storage(err)),
        }
    }

    /// Gets the keys whose serialized form starts with `prefix`, including keys written through
    /// this instance and excluding keys pruned through it.
    pub fn keys_with_prefix(&mut self, prefix: &[u8]) -> Result<BTreeSet<Key>, TrackingCopyError> {
        let keys = match self.reader.keys_with_prefix(prefix) {
            Ok(ret) => ret,
            Err(err) => return Err(TrackingCopyError::Storage(err)),
        };
        // don't include keys marked for pruning
        let mut ret: BTreeSet<Key> = keys
            .into_iter()
            .filter(|key| !self.cache.is_pruned(key))
            .collect();
        // there may be newly inserted keys which have not been committed yet
        ret.extend(self.cache.muts_with_prefix(prefix)?);
        Ok(ret)
    }

    /// Reads the value stored under `key`.
    pub fn read(&mut self, key: &Key) -> Result<Option<StoredValue>, TrackingCopyError> {
        if let Some(value) = self.get(key)? {
            self.effects
                .push(Transform::new(key.clone(), TransformKind::Identity));
            Ok(Some(value))
        } else {
            Ok(None)
        }
    }

    /// Writes `value` under `key`. Note that the write is only cached, and the global state itself
    /// remains unmodified.
    pub fn write(&mut self, key: Key, value: StoredValue) {
        self.cache.insert_write(key.clone(), value.clone());
        self.effects
            .push(Transform::new(key, TransformKind::Write(value)));
    }

    /// Prunes a `key`. Pruning a key which holds no value is not an error.
    pub fn prune(&mut self, key: Key) {
        self.cache.insert_prune(key.clone());
        self.effects.push(Transform::new(key, TransformKind::Prune));
    }
}

impl<R> TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError> + CommitProvider,
{
    /// Hands the recorded effects to the underlying store, then resets this instance so that
    /// further reads observe the committed state.
    ///
    /// On failure the effects are retained.
    pub fn commit(&mut self) -> Result<(), TrackingCopyError> {
        debug!(transforms = self.effects.len(), "committing tracking copy");
        self.reader.commit(self.effects.clone())?;
        self.effects = Effects::new();
        self.cache = TrackingCopyCache::new(DEFAULT_MAX_CACHE_SIZE, HeapSize);
        Ok(())
    }
}
