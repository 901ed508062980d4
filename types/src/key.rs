//! Addresses of values held in global state.

use std::fmt::{self, Debug, Display, Formatter};

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, Error, FromBytes, ToBytes, U32_SERIALIZED_LENGTH, U8_SERIALIZED_LENGTH},
    BlockHash, ScriptHash, StorageKey, TransactionHash,
};

const CONTRACT_ID: u8 = 0;
const STORAGE_ID: u8 = 1;
const BLOCK_ID: u8 = 2;
const TRANSACTION_ID: u8 = 3;
const BLOCK_HASH_AT_HEIGHT_ID: u8 = 4;
const CHAIN_TIP_ID: u8 = 5;

const KEY_ID_SERIALIZED_LENGTH: usize = U8_SERIALIZED_LENGTH;

/// The key under which a value is stored in global state.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub enum Key {
    /// Metadata of the contract with the given script hash.
    Contract(ScriptHash),
    /// A contract storage entry.
    Storage(StorageKey),
    /// A block, or a header whose body is unknown.
    Block(BlockHash),
    /// A transaction together with its containing block index.
    Transaction(TransactionHash),
    /// Index from block height to the canonical block hash at that height.
    BlockHashAtHeight(u32),
    /// The current chain tip.
    ChainTip,
}

impl Key {
    /// Returns the name of the variant, for use in logs and errors.
    pub fn type_string(&self) -> &'static str {
        match self {
            Key::Contract(_) => "Key::Contract",
            Key::Storage(_) => "Key::Storage",
            Key::Block(_) => "Key::Block",
            Key::Transaction(_) => "Key::Transaction",
            Key::BlockHashAtHeight(_) => "Key::BlockHashAtHeight",
            Key::ChainTip => "Key::ChainTip",
        }
    }

    /// Returns the serialized prefix shared by every storage key of `script_hash`.
    pub fn storage_prefix(script_hash: &ScriptHash) -> Vec<u8> {
        let mut prefix =
            Vec::with_capacity(KEY_ID_SERIALIZED_LENGTH + script_hash.serialized_length());
        prefix.push(STORAGE_ID);
        prefix.extend_from_slice(script_hash.as_bytes());
        prefix
    }

    /// Returns the wrapped storage key if this is a `Storage` variant.
    pub fn as_storage_key(&self) -> Option<&StorageKey> {
        match self {
            Key::Storage(storage_key) => Some(storage_key),
            _ => None,
        }
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Key::Contract(script_hash) => write!(f, "Key::Contract({})", script_hash),
            Key::Storage(storage_key) => write!(f, "Key::{:?}", storage_key),
            Key::Block(block_hash) => write!(f, "Key::Block({})", block_hash),
            Key::Transaction(transaction_hash) => {
                write!(f, "Key::Transaction({})", transaction_hash)
            }
            Key::BlockHashAtHeight(height) => write!(f, "Key::BlockHashAtHeight({})", height),
            Key::ChainTip => write!(f, "Key::ChainTip"),
        }
    }
}

impl Debug for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl From<StorageKey> for Key {
    fn from(storage_key: StorageKey) -> Self {
        Key::Storage(storage_key)
    }
}

impl ToBytes for Key {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut result = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut result)?;
        Ok(result)
    }

    fn serialized_length(&self) -> usize {
        KEY_ID_SERIALIZED_LENGTH
            + match self {
                Key::Contract(script_hash) => script_hash.serialized_length(),
                Key::Storage(storage_key) => storage_key.serialized_length(),
                Key::Block(block_hash) => block_hash.serialized_length(),
                Key::Transaction(transaction_hash) => transaction_hash.serialized_length(),
                Key::BlockHashAtHeight(_) => U32_SERIALIZED_LENGTH,
                Key::ChainTip => 0,
            }
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        match self {
            Key::Contract(script_hash) => {
                writer.push(CONTRACT_ID);
                script_hash.write_bytes(writer)
            }
            Key::Storage(storage_key) => {
                writer.push(STORAGE_ID);
                storage_key.write_bytes(writer)
            }
            Key::Block(block_hash) => {
                writer.push(BLOCK_ID);
                block_hash.write_bytes(writer)
            }
            Key::Transaction(transaction_hash) => {
                writer.push(TRANSACTION_ID);
                transaction_hash.write_bytes(writer)
            }
            Key::BlockHashAtHeight(height) => {
                writer.push(BLOCK_HASH_AT_HEIGHT_ID);
                height.write_bytes(writer)
            }
            Key::ChainTip => {
                writer.push(CHAIN_TIP_ID);
                Ok(())
            }
        }
    }
}

impl FromBytes for Key {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (id, remainder) = u8::from_bytes(bytes)?;
        match id {
            CONTRACT_ID => {
                let (script_hash, rem) = ScriptHash::from_bytes(remainder)?;
                Ok((Key::Contract(script_hash), rem))
            }
            STORAGE_ID => {
                let (storage_key, rem) = StorageKey::from_bytes(remainder)?;
                Ok((Key::Storage(storage_key), rem))
            }
            BLOCK_ID => {
                let (block_hash, rem) = BlockHash::from_bytes(remainder)?;
                Ok((Key::Block(block_hash), rem))
            }
            TRANSACTION_ID => {
                let (transaction_hash, rem) = TransactionHash::from_bytes(remainder)?;
                Ok((Key::Transaction(transaction_hash), rem))
            }
            BLOCK_HASH_AT_HEIGHT_ID => {
                let (height, rem) = u32::from_bytes(remainder)?;
                Ok((Key::BlockHashAtHeight(height), rem))
            }
            CHAIN_TIP_ID => Ok((Key::ChainTip, remainder)),
            _ => Err(Error::Formatting),
        }
    }
}
