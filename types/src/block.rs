//! Block headers and blocks as seen by contract code.

use std::fmt::{self, Display, Formatter};

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::{
    bytesrepr::{self, FromBytes, ToBytes, U32_SERIALIZED_LENGTH, U64_SERIALIZED_LENGTH},
    Digest, ScriptHash, Transaction,
};

/// The cryptographic hash of a [`Header`].
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
pub struct BlockHash(Digest);

impl BlockHash {
    /// The number of bytes in a `BlockHash` digest.
    pub const LENGTH: usize = Digest::LENGTH;

    /// Constructs a new `BlockHash`.
    pub fn new(hash: Digest) -> Self {
        BlockHash(hash)
    }

    /// Returns the wrapped inner digest.
    pub fn inner(&self) -> &Digest {
        &self.0
    }

    /// Returns a new `BlockHash` directly initialized with the provided bytes; no hashing is done.
    pub const fn from_raw(raw_digest: [u8; Self::LENGTH]) -> Self {
        BlockHash(Digest::from_raw(raw_digest))
    }
}

impl From<Digest> for BlockHash {
    fn from(digest: Digest) -> Self {
        Self(digest)
    }
}

impl AsRef<[u8]> for BlockHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Display for BlockHash {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        write!(formatter, "block-hash({})", self.0)
    }
}

impl ToBytes for BlockHash {
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

impl FromBytes for BlockHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        Digest::from_bytes(bytes).map(|(inner, remainder)| (BlockHash(inner), remainder))
    }
}

/// The header portion of a block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct Header {
    version: u32,
    prev_hash: BlockHash,
    merkle_root: Digest,
    timestamp: u64,
    index: u32,
    next_consensus: ScriptHash,
}

impl Header {
    /// Constructs a new `Header`.
    pub fn new(
        version: u32,
        prev_hash: BlockHash,
        merkle_root: Digest,
        timestamp: u64,
        index: u32,
        next_consensus: ScriptHash,
    ) -> Self {
        Header {
            version,
            prev_hash,
            merkle_root,
            timestamp,
            index,
            next_consensus,
        }
    }

    /// Returns the hash of this header, computed over its serialized fields.
    pub fn hash(&self) -> BlockHash {
        let serialized = self.to_bytes().unwrap_or_default();
        BlockHash::new(Digest::hash(serialized))
    }

    /// The header format version.
    pub fn version(&self) -> u32 {
        self.version
    }

    /// The hash of the parent block; zero for the genesis block.
    pub fn prev_hash(&self) -> &BlockHash {
        &self.prev_hash
    }

    /// The root of the transactions merkle tree.
    pub fn merkle_root(&self) -> &Digest {
        &self.merkle_root
    }

    /// Seconds since the Unix epoch.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// The height of the block.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The script hash the next block must be signed for.
    pub fn next_consensus(&self) -> &ScriptHash {
        &self.next_consensus
    }

    /// Returns `true` if this is the header of the genesis block.
    pub fn is_genesis(&self) -> bool {
        self.prev_hash.inner().is_zero()
    }
}

impl ToBytes for Header {
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        let mut buffer = bytesrepr::allocate_buffer(self)?;
        self.write_bytes(&mut buffer)?;
        Ok(buffer)
    }

    fn serialized_length(&self) -> usize {
        U32_SERIALIZED_LENGTH
            + self.prev_hash.serialized_length()
            + self.merkle_root.serialized_length()
            + U64_SERIALIZED_LENGTH
            + U32_SERIALIZED_LENGTH
            + self.next_consensus.serialized_length()
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        self.version.write_bytes(writer)?;
        self.prev_hash.write_bytes(writer)?;
        self.merkle_root.write_bytes(writer)?;
        self.timestamp.write_bytes(writer)?;
        self.index.write_bytes(writer)?;
        self.next_consensus.write_bytes(writer)
    }
}

/// A block: a header plus the transactions it includes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    header: Header,
    transactions: Vec<Transaction>,
}

impl Block {
    /// Constructs a new `Block`.
    pub fn new(header: Header, transactions: Vec<Transaction>) -> Self {
        Block {
            header,
            transactions,
        }
    }

    /// Returns the block's header.
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the block's hash, which is its header's hash.
    pub fn hash(&self) -> BlockHash {
        self.header.hash()
    }

    /// Returns the transactions included in the block, in order.
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }
}
