//! Values held in global state.

use std::{convert::TryFrom, fmt};

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{Block, BlockHash, ContractState, Header, StorageItem, TransactionState};

/// The current chain tip: the height and hash of the most recently persisted block.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct ChainTip {
    height: u32,
    hash: BlockHash,
}

impl ChainTip {
    /// Constructs a new `ChainTip`.
    pub fn new(height: u32, hash: BlockHash) -> Self {
        ChainTip { height, hash }
    }

    /// The height of the tip block.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The hash of the tip block.
    pub fn hash(&self) -> &BlockHash {
        &self.hash
    }
}

/// A value stored in global state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub enum StoredValue {
    /// Variant that stores [`ContractState`].
    Contract(ContractState),
    /// Variant that stores [`StorageItem`].
    StorageItem(StorageItem),
    /// Variant that stores a full [`Block`].
    Block(Block),
    /// Variant that stores a [`Header`] whose block body is not held.
    Header(Header),
    /// Variant that stores [`TransactionState`].
    Transaction(TransactionState),
    /// Variant that stores the canonical [`BlockHash`] at some height.
    BlockHash(BlockHash),
    /// Variant that stores the [`ChainTip`].
    ChainTip(ChainTip),
}

impl StoredValue {
    /// Returns a wrapped [`ContractState`] if this is a `Contract` variant.
    pub fn as_contract(&self) -> Option<&ContractState> {
        match self {
            StoredValue::Contract(contract) => Some(contract),
            _ => None,
        }
    }

    /// Returns a wrapped [`StorageItem`] if this is a `StorageItem` variant.
    pub fn as_storage_item(&self) -> Option<&StorageItem> {
        match self {
            StoredValue::StorageItem(item) => Some(item),
            _ => None,
        }
    }

    /// Returns the header of a `Block` variant or the wrapped header of a `Header` variant.
    pub fn as_header(&self) -> Option<&Header> {
        match self {
            StoredValue::Block(block) => Some(block.header()),
            StoredValue::Header(header) => Some(header),
            _ => None,
        }
    }

    /// Returns a wrapped [`Block`] if this is a `Block` variant.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            StoredValue::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Returns a wrapped [`TransactionState`] if this is a `Transaction` variant.
    pub fn as_transaction(&self) -> Option<&TransactionState> {
        match self {
            StoredValue::Transaction(transaction) => Some(transaction),
            _ => None,
        }
    }

    /// Returns the variant name.
    pub fn type_name(&self) -> String {
        match self {
            StoredValue::Contract(_) => "Contract".to_string(),
            StoredValue::StorageItem(_) => "StorageItem".to_string(),
            StoredValue::Block(_) => "Block".to_string(),
            StoredValue::Header(_) => "Header".to_string(),
            StoredValue::Transaction(_) => "Transaction".to_string(),
            StoredValue::BlockHash(_) => "BlockHash".to_string(),
            StoredValue::ChainTip(_) => "ChainTip".to_string(),
        }
    }
}

impl From<ContractState> for StoredValue {
    fn from(value: ContractState) -> StoredValue {
        StoredValue::Contract(value)
    }
}

impl From<StorageItem> for StoredValue {
    fn from(value: StorageItem) -> StoredValue {
        StoredValue::StorageItem(value)
    }
}

impl From<Block> for StoredValue {
    fn from(value: Block) -> StoredValue {
        StoredValue::Block(value)
    }
}

impl From<TransactionState> for StoredValue {
    fn from(value: TransactionState) -> StoredValue {
        StoredValue::Transaction(value)
    }
}

impl From<ChainTip> for StoredValue {
    fn from(value: ChainTip) -> StoredValue {
        StoredValue::ChainTip(value)
    }
}

/// An error returned when a [`StoredValue`] is not of the expected variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    expected: String,
    found: String,
}

impl TypeMismatch {
    /// Constructs a new `TypeMismatch`.
    pub fn new(expected: String, found: String) -> TypeMismatch {
        TypeMismatch { expected, found }
    }
}

impl fmt::Display for TypeMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Type mismatch. Expected {} but found {}.",
            self.expected, self.found
        )
    }
}

impl std::error::Error for TypeMismatch {}

impl TryFrom<StoredValue> for ContractState {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::Contract(contract) => Ok(contract),
            _ => Err(TypeMismatch::new(
                "Contract".to_string(),
                stored_value.type_name(),
            )),
        }
    }
}

impl TryFrom<StoredValue> for StorageItem {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::StorageItem(item) => Ok(item),
            _ => Err(TypeMismatch::new(
                "StorageItem".to_string(),
                stored_value.type_name(),
            )),
        }
    }
}

impl TryFrom<StoredValue> for Block {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::Block(block) => Ok(block),
            _ => Err(TypeMismatch::new("Block".to_string(), stored_value.type_name())),
        }
    }
}

impl TryFrom<StoredValue> for Header {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::Header(header) => Ok(header),
            StoredValue::Block(block) => Ok(block.header().clone()),
            _ => Err(TypeMismatch::new("Header".to_string(), stored_value.type_name())),
        }
    }
}

impl TryFrom<StoredValue> for TransactionState {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::Transaction(transaction) => Ok(transaction),
            _ => Err(TypeMismatch::new(
                "Transaction".to_string(),
                stored_value.type_name(),
            )),
        }
    }
}

impl TryFrom<StoredValue> for BlockHash {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::BlockHash(hash) => Ok(hash),
            _ => Err(TypeMismatch::new(
                "BlockHash".to_string(),
                stored_value.type_name(),
            )),
        }
    }
}

impl TryFrom<StoredValue> for ChainTip {
    type Error = TypeMismatch;

    fn try_from(stored_value: StoredValue) -> Result<Self, Self::Error> {
        match stored_value {
            StoredValue::ChainTip(tip) => Ok(tip),
            _ => Err(TypeMismatch::new(
                "ChainTip".to_string(),
                stored_value.type_name(),
            )),
        }
    }
}
