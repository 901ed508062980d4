//! Transactions and their on-chain location.

use std::fmt::{self, Display, Formatter};

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U32_SERIALIZED_LENGTH, U64_SERIALIZED_LENGTH},
    Digest, ScriptHash,
};

/// The cryptographic hash of a [`Transaction`].
#[derive(
    Copy,
    Clone,
    Ord,
    PartialOrd,
    Eq,
    PartialEq,
    Hash,
    Serialize,
    Deserialize,
    Debug,
    Default,
    DataSize,
)]
#[serde(deny_unknown_fields)]
pub struct TransactionHash(Digest);

impl TransactionHash {
    /// The number of bytes in a `TransactionHash` digest.
    pub const LENGTH: usize = Digest::LENGTH;

    /// Constructs a new `TransactionHash`.
    pub fn new(hash: Digest) -> Self {
        TransactionHash(hash)
    }

    /// Returns the wrapped inner digest.
    pub fn inner(&self) -> &Digest {
        &self.0
    }

    /// Returns a new `TransactionHash` directly initialized with the provided bytes; no hashing is
    /// done.
    pub const fn from_raw(raw_digest: [u8; Self::LENGTH]) -> Self {
        TransactionHash(Digest::from_raw(raw_digest))
    }
}

impl From<Digest> for TransactionHash {
    fn from(digest: Digest) -> Self {
        Self(digest)
    }
}

impl AsRef<[u8]> for TransactionHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Display for TransactionHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "transaction-hash({})", self.0)
    }
}

impl ToBytes for TransactionHash {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        self.0.to_bytes()
    }

    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.0.write_bytes(writer)
    }
}

impl FromBytes for TransactionHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        Digest::from_bytes(bytes).map(|(inner, remainder)| (TransactionHash(inner), remainder))
    }
}

/// A transaction: a script to run plus the accounts that authorized it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    version: u32,
    nonce: u64,
    script: Vec<u8>,
    signers: Vec<ScriptHash>,
}

impl Transaction {
    /// Constructs a new `Transaction`.
    pub fn new(version: u32, nonce: u64, script: Vec<u8>, signers: Vec<ScriptHash>) -> Self {
        Transaction {
            version,
            nonce,
            script,
            signers,
        }
    }

    /// Returns the hash of this transaction, computed over its serialized fields.
    pub fn hash(&self) -> TransactionHash {
        let serialized = self.to_bytes().unwrap_or_default();
        TransactionHash::new(Digest::hash(serialized))
    }

    /// The transaction format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The script executed by this transaction.
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// The script hashes whose witnesses accompany this transaction.
    pub fn signers(&self) -> &[ScriptHash] {
        &self.signers
    }
}

impl ToBytes for Transaction {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH
            + U64_SERIALIZED_LENGTH
            + bytesrepr::var_bytes_serialized_length(&self.script)
            + bytesrepr::var_int_serialized_length(self.signers.len() as u64)
            + self
                .signers
                .iter()
                .map(ToBytes::serialized_length)
                .sum::<usize>()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.version.write_bytes(writer)?;
        self.nonce.write_bytes(writer)?;
        bytesrepr::write_var_bytes(&self.script, writer);
        bytesrepr::write_var_int(self.signers.len() as u64, writer);
        for signer in &self.signers {
            signer.write_bytes(writer)?;
        }
        Ok(())
    }
}

/// A transaction together with the height of the block that included it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct TransactionState {
    block_index: u32,
    transaction: Transaction,
}

impl TransactionState {
    /// Constructs a new `TransactionState`.
    pub fn new(block_index: u32, transaction: Transaction) -> Self {
        TransactionState {
            block_index,
            transaction,
        }
    }

    /// The height of the block containing the transaction.
    pub fn block_index(&self) -> u32 {
        self.block_index
    }

    /// The transaction itself.
    pub fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Consumes `self`, returning the transaction.
    pub fn into_transaction(self) -> Transaction {
        self.transaction
    }
}
