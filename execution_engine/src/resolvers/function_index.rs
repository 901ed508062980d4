use std::{collections::BTreeMap, convert::TryFrom, fmt};

use num_derive::{FromPrimitive, ToPrimitive};
use num_traits::{FromPrimitive, ToPrimitive};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

/// Every interop function the service exposes to contract code.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, ToPrimitive, Clone, Copy)]
#[repr(usize)]
pub enum InteropFunction {
    /// `System.Runtime.Platform`
    RuntimePlatform,
    /// `System.Runtime.GetTrigger`
    RuntimeGetTrigger,
    /// `System.Runtime.CheckWitness`
    RuntimeCheckWitness,
    /// `System.Runtime.Notify`
    RuntimeNotify,
    /// `System.Runtime.Log`
    RuntimeLog,
    /// `System.Runtime.GetTime`
    RuntimeGetTime,
    /// `System.Runtime.Serialize`
    RuntimeSerialize,
    /// `System.Runtime.Deserialize`
    RuntimeDeserialize,
    /// `System.Blockchain.GetHeight`
    BlockchainGetHeight,
    /// `System.Blockchain.GetHeader`
    BlockchainGetHeader,
    /// `System.Blockchain.GetBlock`
    BlockchainGetBlock,
    /// `System.Blockchain.GetTransaction`
    BlockchainGetTransaction,
    /// `System.Blockchain.GetTransactionHeight`
    BlockchainGetTransactionHeight,
    /// `System.Blockchain.GetContract`
    BlockchainGetContract,
    /// `System.Header.GetIndex`
    HeaderGetIndex,
    /// `System.Header.GetHash`
    HeaderGetHash,
    /// `System.Header.GetPrevHash`
    HeaderGetPrevHash,
    /// `System.Header.GetTimestamp`
    HeaderGetTimestamp,
    /// `System.Block.GetTransactionCount`
    BlockGetTransactionCount,
    /// `System.Block.GetTransactions`
    BlockGetTransactions,
    /// `System.Block.GetTransaction`
    BlockGetTransaction,
    /// `System.Transaction.GetHash`
    TransactionGetHash,
    /// `System.Contract.Destroy`
    ContractDestroy,
    /// `System.Contract.GetStorageContext`
    ContractGetStorageContext,
    /// `System.Storage.GetContext`
    StorageGetContext,
    /// `System.Storage.GetReadOnlyContext`
    StorageGetReadOnlyContext,
    /// `System.Storage.Get`
    StorageGet,
    /// `System.Storage.Put`
    StoragePut,
    /// `System.Storage.Delete`
    StorageDelete,
    /// `System.StorageContext.AsReadOnly`
    StorageContextAsReadOnly,
}

/// The number of interop functions.
pub const INTEROP_FUNCTION_COUNT: usize = InteropFunction::StorageContextAsReadOnly as usize + 1;

static BY_NAME: Lazy<BTreeMap<&'static str, InteropFunction>> = Lazy::new(|| {
    InteropFunction::all()
        .map(|function| (function.name(), function))
        .collect()
});

static BY_METHOD_HASH: Lazy<BTreeMap<u32, InteropFunction>> = Lazy::new(|| {
    InteropFunction::all()
        .map(|function| (method_hash(function.name()), function))
        .collect()
});

/// Returns the 32-bit method hash of an interop name: the first four bytes, read little-endian,
/// of the SHA-256 digest of the ASCII name.
pub fn method_hash(name: &str) -> u32 {
    let digest = Sha256::digest(name.as_bytes());
    u32::from_le_bytes([digest[0], digest[1], digest[2], digest[3]])
}

impl InteropFunction {
    /// Iterates over every interop function in index order.
    pub fn all() -> impl Iterator<Item = InteropFunction> {
        (0..INTEROP_FUNCTION_COUNT).filter_map(InteropFunction::from_usize)
    }

    /// Returns the stable name contract code uses to call this function.
    pub fn name(self) -> &'static str {
        match self {
            InteropFunction::RuntimePlatform => "System.Runtime.Platform",
            InteropFunction::RuntimeGetTrigger => "System.Runtime.GetTrigger",
            InteropFunction::RuntimeCheckWitness => "System.Runtime.CheckWitness",
            InteropFunction::RuntimeNotify => "System.Runtime.Notify",
            InteropFunction::RuntimeLog => "System.Runtime.Log",
            InteropFunction::RuntimeGetTime => "System.Runtime.GetTime",
            InteropFunction::RuntimeSerialize => "System.Runtime.Serialize",
            InteropFunction::RuntimeDeserialize => "System.Runtime.Deserialize",
            InteropFunction::BlockchainGetHeight => "System.Blockchain.GetHeight",
            InteropFunction::BlockchainGetHeader => "System.Blockchain.GetHeader",
            InteropFunction::BlockchainGetBlock => "System.Blockchain.GetBlock",
            InteropFunction::BlockchainGetTransaction => "System.Blockchain.GetTransaction",
            InteropFunction::BlockchainGetTransactionHeight => {
                "System.Blockchain.GetTransactionHeight"
            }
            InteropFunction::BlockchainGetContract => "System.Blockchain.GetContract",
            InteropFunction::HeaderGetIndex => "System.Header.GetIndex",
            InteropFunction::HeaderGetHash => "System.Header.GetHash",
            InteropFunction::HeaderGetPrevHash => "System.Header.GetPrevHash",
            InteropFunction::HeaderGetTimestamp => "System.Header.GetTimestamp",
            InteropFunction::BlockGetTransactionCount => "System.Block.GetTransactionCount",
            InteropFunction::BlockGetTransactions => "System.Block.GetTransactions",
            InteropFunction::BlockGetTransaction => "System.Block.GetTransaction",
            InteropFunction::TransactionGetHash => "System.Transaction.GetHash",
            InteropFunction::ContractDestroy => "System.Contract.Destroy",
            InteropFunction::ContractGetStorageContext => "System.Contract.GetStorageContext",
            InteropFunction::StorageGetContext => "System.Storage.GetContext",
            InteropFunction::StorageGetReadOnlyContext => "System.Storage.GetReadOnlyContext",
            InteropFunction::StorageGet => "System.Storage.Get",
            InteropFunction::StoragePut => "System.Storage.Put",
            InteropFunction::StorageDelete => "System.Storage.Delete",
            InteropFunction::StorageContextAsReadOnly => "System.StorageContext.AsReadOnly",
        }
    }

    /// Returns the 32-bit method hash of this function's name.
    pub fn method_hash(self) -> u32 {
        method_hash(self.name())
    }

    /// Looks up a function by its stable name.
    pub fn from_name(name: &str) -> Option<InteropFunction> {
        BY_NAME.get(name).copied()
    }

    /// Looks up a function by its method hash.
    pub fn from_method_hash(hash: u32) -> Option<InteropFunction> {
        BY_METHOD_HASH.get(&hash).copied()
    }
}

impl fmt::Display for InteropFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<InteropFunction> for usize {
    fn from(function: InteropFunction) -> usize {
        // NOTE: This can't fail as `InteropFunction` is represented by usize,
        // so this serves mostly as a syntax sugar.
        function.to_usize().unwrap_or_default()
    }
}

impl TryFrom<usize> for InteropFunction {
    type Error = &'static str;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        FromPrimitive::from_usize(value).ok_or("Invalid function index")
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    #[test]
    fn primitive_to_enum() {
        for index in 0..INTEROP_FUNCTION_COUNT {
            let function = InteropFunction::try_from(index).unwrap();
            assert_eq!(usize::from(function), index);
        }
        assert!(InteropFunction::try_from(INTEROP_FUNCTION_COUNT).is_err());
    }

    #[test]
    fn there_are_thirty_functions() {
        assert_eq!(InteropFunction::all().count(), 30);
    }

    #[test]
    fn names_round_trip() {
        for function in InteropFunction::all() {
            assert_eq!(InteropFunction::from_name(function.name()), Some(function));
        }
        assert_eq!(InteropFunction::from_name("System.Runtime.Exit"), None);
    }

    #[test]
    fn method_hashes_are_unique_and_resolve() {
        let hashes: BTreeSet<u32> = InteropFunction::all()
            .map(InteropFunction::method_hash)
            .collect();
        assert_eq!(hashes.len(), INTEROP_FUNCTION_COUNT);
        for function in InteropFunction::all() {
            assert_eq!(
                InteropFunction::from_method_hash(function.method_hash()),
                Some(function)
            );
        }
    }

    #[test]
    fn method_hash_reads_digest_prefix_little_endian() {
        // SHA-256("abc") begins ba 78 16 bf
        assert_eq!(method_hash("abc"), 0xbf16_78ba);
    }
}
