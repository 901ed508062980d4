//! Contract storage entries and the capability token that scopes access to them.

use std::fmt::{self, Debug, Formatter};

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, FromBytes, ToBytes},
    ScriptHash,
};

/// The maximum length of a storage key accepted on write.
pub const MAX_STORAGE_KEY_SIZE: usize = 1024;

/// Address of a storage entry: the owning contract plus a contract-chosen key.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct StorageKey {
    script_hash: ScriptHash,
    key: Vec<u8>,
}

impl StorageKey {
    /// Constructs a new `StorageKey`.
    pub fn new(script_hash: ScriptHash, key: Vec<u8>) -> Self {
        StorageKey { script_hash, key }
    }

    /// The contract owning the entry.
    pub fn script_hash(&self) -> &ScriptHash {
        &self.script_hash
    }

    /// The contract-chosen key bytes.
    pub fn key(&self) -> &[u8] {
        &self.key
    }
}

impl Debug for StorageKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StorageKey({}, {})",
            self.script_hash,
            base16::encode_lower(&self.key)
        )
    }
}

// The key bytes are written unframed so that every entry of a contract shares the serialized
// script hash as a prefix.
impl ToBytes for StorageKey {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        self.script_hash.serialized_length() + self.key.len()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.script_hash.write_bytes(writer)?;
        writer.extend_from_slice(&self.key);
        Ok(())
    }
}

impl FromBytes for StorageKey {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (script_hash, remainder) = ScriptHash::from_bytes(bytes)?;
        Ok((StorageKey::new(script_hash, remainder.to_vec()), &[]))
    }
}

/// The value of a storage entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct StorageItem {
    value: Vec<u8>,
}

impl StorageItem {
    /// Constructs a new `StorageItem`.
    pub fn new(value: Vec<u8>) -> Self {
        StorageItem { value }
    }

    /// The stored bytes.
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Consumes `self`, returning the stored bytes.
    pub fn into_value(self) -> Vec<u8> {
        self.value
    }
}

/// Capability token scoping storage operations to one contract.
///
/// A context is minted per call and handed to contract code as a handle; it is never persisted.
/// Once read-only, a context cannot regain write capability: [`StorageContext::as_read_only`]
/// is the only transformation and it never clears the flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct StorageContext {
    script_hash: ScriptHash,
    read_only: bool,
}

impl StorageContext {
    /// Constructs a new `StorageContext`.
    pub fn new(script_hash: ScriptHash, read_only: bool) -> Self {
        StorageContext {
            script_hash,
            read_only,
        }
    }

    /// The contract whose storage this context grants access to.
    pub fn script_hash(&self) -> &ScriptHash {
        &self.script_hash
    }

    /// Whether writes through this context are forbidden.
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Returns a read-only context for the same contract.
    pub fn as_read_only(&self) -> StorageContext {
        StorageContext {
            script_hash: self.script_hash,
            read_only: true,
        }
    }

    /// Returns the storage key addressing `key` within this context's contract.
    pub fn storage_key(&self, key: Vec<u8>) -> StorageKey {
        StorageKey::new(self.script_hash, key)
    }
}
