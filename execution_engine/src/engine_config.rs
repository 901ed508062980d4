//! Support for runtime configuration of the execution engine - as an integral property of the
//! `StandardService` instance.
use datasize::DataSize;
use serde::{Deserialize, Serialize};

use halcyon_types::{
    stack_value::{StackValueLimits, MAX_ARRAY_SIZE, MAX_ITEM_SIZE},
    MAX_STORAGE_KEY_SIZE,
};

/// Default value for the maximum encoded size of a stack value.
pub const DEFAULT_MAX_ITEM_SIZE: u32 = MAX_ITEM_SIZE as u32;
/// Default value for the maximum number of elements of a container.
pub const DEFAULT_MAX_ARRAY_SIZE: u32 = MAX_ARRAY_SIZE as u32;
/// Default value for the maximum length of a storage key.
pub const DEFAULT_MAX_STORAGE_KEY_SIZE: u32 = MAX_STORAGE_KEY_SIZE as u32;
/// Default nominal interval between blocks, in seconds.
pub const DEFAULT_SECONDS_PER_BLOCK: u64 = 15;

/// The runtime configuration of the execution engine
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, DataSize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Encoded stack values longer than this many bytes are rejected.
    max_item_size: u32,
    /// Containers with more elements than this are rejected.
    max_array_size: u32,
    /// Storage keys longer than this many bytes cannot be written.
    max_storage_key_size: u32,
    /// Added to the tip header's timestamp when no block is being persisted.
    seconds_per_block: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            max_item_size: DEFAULT_MAX_ITEM_SIZE,
            max_array_size: DEFAULT_MAX_ARRAY_SIZE,
            max_storage_key_size: DEFAULT_MAX_STORAGE_KEY_SIZE,
            seconds_per_block: DEFAULT_SECONDS_PER_BLOCK,
        }
    }
}

impl EngineConfig {
    /// Creates a new engine configuration with provided parameters.
    pub fn new(
        max_item_size: u32,
        max_array_size: u32,
        max_storage_key_size: u32,
        seconds_per_block: u64,
    ) -> EngineConfig {
        EngineConfig {
            max_item_size,
            max_array_size,
            max_storage_key_size,
            seconds_per_block,
        }
    }

    /// Parses a configuration from a TOML document. Omitted fields take their defaults.
    pub fn from_toml_str(toml: &str) -> Result<EngineConfig, toml::de::Error> {
        toml::from_str(toml)
    }

    /// Sets the maximum encoded size of a stack value.
    pub fn with_max_item_size(mut self, max_item_size: u32) -> Self {
        self.max_item_size = max_item_size;
        self
    }

    /// Sets the maximum number of elements of a container.
    pub fn with_max_array_size(mut self, max_array_size: u32) -> Self {
        self.max_array_size = max_array_size;
        self
    }

    /// Sets the maximum length of a storage key.
    pub fn with_max_storage_key_size(mut self, max_storage_key_size: u32) -> Self {
        self.max_storage_key_size = max_storage_key_size;
        self
    }

    /// Sets the nominal interval between blocks.
    pub fn with_seconds_per_block(mut self, seconds_per_block: u64) -> Self {
        self.seconds_per_block = seconds_per_block;
        self
    }

    /// Returns the maximum encoded size of a stack value.
    pub fn max_item_size(&self) -> u32 {
        self.max_item_size
    }

    /// Returns the maximum number of elements of a container.
    pub fn max_array_size(&self) -> u32 {
        self.max_array_size
    }

    /// Returns the maximum length of a storage key.
    pub fn max_storage_key_size(&self) -> u32 {
        self.max_storage_key_size
    }

    /// Returns the nominal interval between blocks, in seconds.
    pub fn seconds_per_block(&self) -> u64 {
        self.seconds_per_block
    }

    /// Returns the codec bounds derived from this configuration.
    pub fn stack_value_limits(&self) -> StackValueLimits {
        StackValueLimits {
            max_item_size: self.max_item_size as usize,
            max_array_size: self.max_array_size as usize,
        }
    }
}
