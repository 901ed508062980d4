//! Interop call error and supporting code.
use thiserror::Error;

use halcyon_storage::tracking_copy::TrackingCopyError;
use halcyon_types::{
    stack_value::{DecodeError, EncodeError},
    BlockHash, InteropKind, PublicKeyError, ScriptHash, Trigger,
};

/// The reason an interop call failed.
///
/// Contract code only ever observes a failed call; the reason is kept for logs and embedders.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Storage error.
    #[error("Storage error: {}", _0)]
    Storage(#[from] TrackingCopyError),
    /// A value could not be encoded.
    #[error("Serialization error: {}", _0)]
    Encode(#[from] EncodeError),
    /// Bytes did not decode to a value.
    #[error("Deserialization error: {}", _0)]
    Decode(#[from] DecodeError),
    /// The evaluation stack held fewer operands than the call pops.
    #[error("Evaluation stack underflow")]
    StackUnderflow,
    /// An operand could not be converted to the type the call needs.
    #[error("Expected {} operand, found {}", expected, found)]
    UnexpectedOperand {
        /// The type the call needs.
        expected: &'static str,
        /// The variant found on the stack.
        found: &'static str,
    },
    /// A handle was bound to the wrong kind of host object.
    #[error("Expected {} handle, found {}", expected, found)]
    UnexpectedHandle {
        /// The kind the call needs.
        expected: InteropKind,
        /// The kind of the handle found on the stack.
        found: InteropKind,
    },
    /// A byte-string operand had an unsupported length.
    #[error("Invalid {} operand length: {}", operand, length)]
    InvalidOperandLength {
        /// What the operand was meant to be.
        operand: &'static str,
        /// The length found.
        length: usize,
    },
    /// A height operand was negative or exceeded `u32::MAX`.
    #[error("Invalid block height")]
    InvalidHeight,
    /// A 33-byte witness operand was not a compressed public key.
    #[error("Invalid public key: {}", _0)]
    InvalidPublicKey(#[from] PublicKeyError),
    /// A transaction index was outside the block.
    #[error("Transaction index out of range for a block of {} transactions", count)]
    IndexOutOfRange {
        /// The number of transactions in the block.
        count: usize,
    },
    /// A container would hold more elements than permitted.
    #[error("{} elements exceed maximum {}", count, max)]
    TooManyElements {
        /// The number of elements.
        count: usize,
        /// The permitted maximum.
        max: usize,
    },
    /// A storage key exceeded the permitted length.
    #[error("Storage key of {} bytes exceeds maximum {}", size, max)]
    KeyTooLarge {
        /// The key length.
        size: usize,
        /// The permitted maximum.
        max: usize,
    },
    /// The call may not run under the current trigger.
    #[error("Not permitted under trigger {:?}", _0)]
    TriggerNotPermitted(Trigger),
    /// A write was attempted through a read-only storage context.
    #[error("Storage context is read-only")]
    ReadOnlyContext,
    /// The storage context's contract does not exist or has no storage.
    #[error("Invalid storage context for {}", _0)]
    InvalidStorageContext(ScriptHash),
    /// The caller did not create the contract in the current invocation.
    #[error("{} was not created by {}", contract, caller)]
    NotContractCreator {
        /// The contract whose storage was requested.
        contract: ScriptHash,
        /// The contract requesting it.
        caller: ScriptHash,
    },
    /// The invocation has no script container to check witnesses against.
    #[error("No script container")]
    NoScriptContainer,
    /// The snapshot has no chain tip.
    #[error("Chain tip not found")]
    ChainTipNotFound,
    /// A header the call depends on is missing from the snapshot.
    #[error("Header {} not found", _0)]
    HeaderNotFound(BlockHash),
    /// No interop function has the given name.
    #[error("Unknown interop function: {}", _0)]
    UnknownFunction(String),
    /// No interop function has the given method hash.
    #[error("Unknown interop method hash: {:#010x}", _0)]
    UnknownMethodHash(u32),
}
