//! Metadata of a deployed contract.

use datasize::DataSize;
use serde::{Deserialize, Serialize};

use crate::ScriptHash;

/// A deployed contract.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(deny_unknown_fields)]
pub struct ContractState {
    script: Vec<u8>,
    has_storage: bool,
    has_dynamic_invoke: bool,
    payable: bool,
    name: String,
}

impl ContractState {
    /// Constructs a new `ContractState`.
    pub fn new(
        script: Vec<u8>,
        has_storage: bool,
        has_dynamic_invoke: bool,
        payable: bool,
        name: String,
    ) -> Self {
        ContractState {
            script,
            has_storage,
            has_dynamic_invoke,
            payable,
            name,
        }
    }

    /// Returns the contract's script hash, which is the hash of its script.
    pub fn script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.script)
    }

    /// The contract's code.
    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// Whether the contract may use persistent storage.
    pub fn has_storage(&self) -> bool {
        self.has_storage
    }

    /// Whether the contract may call contracts chosen at runtime.
    pub fn has_dynamic_invoke(&self) -> bool {
        self.has_dynamic_invoke
    }

    /// Whether the contract accepts assets.
    pub fn payable(&self) -> bool {
        self.payable
    }

    /// The human-readable contract name.
    pub fn name(&self) -> &str {
        &self.name
    }
}
