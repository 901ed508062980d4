//! Errors raised while executing interop calls.
mod error;

pub use self::error::Error;
