//! This module is responsible for resolving interop functions from the names and method hashes
//! contract code calls them by.
pub mod function_index;

pub use self::function_index::{method_hash, InteropFunction, INTEROP_FUNCTION_COUNT};
