use std::{collections::BTreeSet, convert::TryFrom};

use halcyon_types::{
    Block, BlockHash, ChainTip, ContractState, Header, Key, ScriptHash, StorageItem, StorageKey,
    StoredValue, TransactionHash, TransactionState, TypeMismatch,
};

use crate::{
    global_state::{error::Error as GlobalStateError, StateReader},
    tracking_copy::{TrackingCopy, TrackingCopyError},
};

/// Higher-level operations on the state via a `TrackingCopy`.
pub trait TrackingCopyExt<R> {
    /// The type for the returned errors.
    type Error;

    /// Reads the metadata of the contract with the given script hash.
    fn read_contract(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Option<ContractState>, Self::Error>;

    /// Reads a storage entry.
    fn read_storage_item(
        &mut self,
        storage_key: &StorageKey,
    ) -> Result<Option<StorageItem>, Self::Error>;

    /// Gets the keys of every storage entry owned by the given contract.
    fn storage_keys(&mut self, script_hash: &ScriptHash)
        -> Result<BTreeSet<StorageKey>, Self::Error>;

    /// Reads the current chain tip.
    fn read_chain_tip(&mut self) -> Result<Option<ChainTip>, Self::Error>;

    /// Reads the canonical block hash at `height`.
    fn read_block_hash_at_height(&mut self, height: u32)
        -> Result<Option<BlockHash>, Self::Error>;

    /// Reads a header, whether stored alone or as part of a full block.
    fn read_header(&mut self, block_hash: &BlockHash) -> Result<Option<Header>, Self::Error>;

    /// Reads a full block; a header stored without its body reads as `None`.
    fn read_block(&mut self, block_hash: &BlockHash) -> Result<Option<Block>, Self::Error>;

    /// Reads the header of the chain tip.
    fn read_tip_header(&mut self) -> Result<Option<Header>, Self::Error>;

    /// Reads a transaction together with the index of its containing block.
    fn read_transaction(
        &mut self,
        transaction_hash: &TransactionHash,
    ) -> Result<Option<TransactionState>, Self::Error>;
}

impl<R> TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    fn get_as<T>(&mut self, key: Key) -> Result<Option<T>, TrackingCopyError>
    where
        T: TryFrom<StoredValue, Error = TypeMismatch>,
    {
        match self.get(&key)? {
            Some(stored_value) => T::try_from(stored_value)
                .map(Some)
                .map_err(|mismatch| TrackingCopyError::TypeMismatch(key, mismatch)),
            None => Ok(None),
        }
    }
}

impl<R> TrackingCopyExt<R> for TrackingCopy<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    type Error = TrackingCopyError;

    fn read_contract(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<Option<ContractState>, Self::Error> {
        self.get_as(Key::Contract(*script_hash))
    }

    fn read_storage_item(
        &mut self,
        storage_key: &StorageKey,
    ) -> Result<Option<StorageItem>, Self::Error> {
        self.get_as(Key::Storage(storage_key.clone()))
    }

    fn storage_keys(
        &mut self,
        script_hash: &ScriptHash,
    ) -> Result<BTreeSet<StorageKey>, Self::Error> {
        let keys = self.keys_with_prefix(&Key::storage_prefix(script_hash))?;
        Ok(keys
            .into_iter()
            .filter_map(|key| match key {
                Key::Storage(storage_key) => Some(storage_key),
                _ => None,
            })
            .collect())
    }

    fn read_chain_tip(&mut self) -> Result<Option<ChainTip>, Self::Error> {
        self.get_as(Key::ChainTip)
    }

    fn read_block_hash_at_height(
        &mut self,
        height: u32,
    ) -> Result<Option<BlockHash>, Self::Error> {
        self.get_as(Key::BlockHashAtHeight(height))
    }

    fn read_header(&mut self, block_hash: &BlockHash) -> Result<Option<Header>, Self::Error> {
        self.get_as(Key::Block(*block_hash))
    }

    fn read_block(&mut self, block_hash: &BlockHash) -> Result<Option<Block>, Self::Error> {
        let key = Key::Block(*block_hash);
        match self.get(&key)? {
            Some(StoredValue::Block(block)) => Ok(Some(block)),
            Some(StoredValue::Header(_)) | None => Ok(None),
            Some(other) => Err(TrackingCopyError::TypeMismatch(
                key,
                TypeMismatch::new("Block".to_string(), other.type_name()),
            )),
        }
    }

    fn read_tip_header(&mut self) -> Result<Option<Header>, Self::Error> {
        match self.read_chain_tip()? {
            Some(tip) => self.read_header(tip.hash()),
            None => Ok(None),
        }
    }

    fn read_transaction(
        &mut self,
        transaction_hash: &TransactionHash,
    ) -> Result<Option<TransactionState>, Self::Error> {
        self.get_as(Key::Transaction(*transaction_hash))
    }
}
