//! Global state: the persistent key/value view of the ledger that snapshots read from and commit
//! to.

/// Error types for global state.
pub mod error;
/// In-memory implementation of global state.
pub mod in_memory;

use crate::effects::Effects;

pub use self::error::Error;

/// A trait expressing the reading of state. This trait is used to abstract the underlying store.
pub trait StateReader<K, V> {
    /// An error which occurs when reading state
    type Error;

    /// Returns the state value from the corresponding key
    fn read(&self, key: &K) -> Result<Option<V>, Self::Error>;

    /// Returns the keys whose serialized form starts with `prefix`.
    fn keys_with_prefix(&self, prefix: &[u8]) -> Result<Vec<K>, Self::Error>;
}

/// Provides `commit` method.
pub trait CommitProvider {
    /// Applies `effects`, in order, to the underlying store.
    fn commit(&self, effects: Effects) -> Result<(), Error>;
}
