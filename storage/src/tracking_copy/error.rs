use thiserror::Error;

use halcyon_types::{bytesrepr, Key, TypeMismatch};

/// Possible tracking copy errors.
#[derive(Error, Debug, Clone)]
#[non_exhaustive]
pub enum Error {
    /// Storage error.
    #[error("Storage error: {}", _0)]
    Storage(crate::global_state::error::Error),
    /// Failed to (de)serialize bytes.
    #[error("Serialization error: {}", _0)]
    BytesRepr(bytesrepr::Error),
    /// Type mismatch error.
    #[error("{} under {}", _1, _0)]
    TypeMismatch(Key, TypeMismatch),
}

impl From<bytesrepr::Error> for Error {
    fn from(e: bytesrepr::Error) -> Self {
        Error::BytesRepr(e)
    }
}

impl From<crate::global_state::error::Error> for Error {
    fn from(gse: crate::global_state::error::Error) -> Self {
        Error::Storage(gse)
    }
}
