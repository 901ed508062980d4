//! Types shared by the Halcyon interop layer: the values contract code exchanges with the host,
//! their canonical encoding, and the ledger objects and global-state addresses host functions
//! read and write.

#![doc(test(attr(forbid(warnings))))]
#![warn(missing_docs)]

mod block;
pub mod bytesrepr;
mod contract;
mod crypto;
mod digest;
#[cfg(any(feature = "gens", test))]
pub mod gens;
mod key;
mod script_hash;
pub mod stack_value;
mod storage;
mod stored_value;
mod transaction;
mod trigger;

pub use block::{Block, BlockHash, Header};
pub use contract::ContractState;
pub use crypto::{PublicKey, PublicKeyError, COMPRESSED_PUBLIC_KEY_LENGTH};
pub use digest::Digest;
pub use key::Key;
pub use script_hash::{ScriptHash, SCRIPT_HASH_LENGTH};
pub use stack_value::{InteropInterface, InteropKind, StackMap, StackValue};
pub use storage::{StorageContext, StorageItem, StorageKey, MAX_STORAGE_KEY_SIZE};
pub use stored_value::{ChainTip, StoredValue, TypeMismatch};
pub use transaction::{Transaction, TransactionHash, TransactionState};
pub use trigger::Trigger;
