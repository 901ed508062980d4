//! The canonical binary encoding of [`StackValue`]s.
//!
//! ```text
//! ByteString  0x00 | var-int length | bytes
//! Boolean     0x01 | 0x00 or 0x01
//! Integer     0x02 | var-int length | minimal little-endian two's complement
//! Array       0x80 | var-int count  | count values
//! Struct      0x81 | var-int count  | count values
//! Map         0x82 | var-int count  | count (key, value) pairs
//! ```
//!
//! Both directions are iterative, so nesting depth is bounded only by the size limits.

use std::collections::HashSet;

use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use thiserror::Error;

use super::{integer_from_bytes, integer_to_bytes, StackMap, StackValue};
use crate::bytesrepr::{self, FromBytes, MAX_VAR_BYTES_LENGTH};

/// The maximum length in bytes of an encoded value.
pub const MAX_ITEM_SIZE: usize = 1024 * 1024;
/// The maximum number of elements (or pairs) of a single container.
pub const MAX_ARRAY_SIZE: usize = 1024;

/// The leading byte identifying the variant of an encoded value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, FromPrimitive)]
#[repr(u8)]
pub enum StackValueTag {
    /// [`StackValue::ByteString`].
    ByteString = 0x00,
    /// [`StackValue::Boolean`].
    Boolean = 0x01,
    /// [`StackValue::Integer`].
    Integer = 0x02,
    /// [`StackValue::Array`].
    Array = 0x80,
    /// [`StackValue::Struct`].
    Struct = 0x81,
    /// [`StackValue::Map`].
    Map = 0x82,
}

/// Bounds applied while encoding and decoding.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct StackValueLimits {
    /// Encoded output longer than this fails with [`EncodeError::ItemTooLarge`].
    pub max_item_size: usize,
    /// Decoded containers with more elements than this fail with
    /// [`DecodeError::TooManyElements`].
    pub max_array_size: usize,
}

impl Default for StackValueLimits {
    fn default() -> Self {
        StackValueLimits {
            max_item_size: MAX_ITEM_SIZE,
            max_array_size: MAX_ARRAY_SIZE,
        }
    }
}

/// Error returned when a value cannot be encoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum EncodeError {
    /// A container contains itself.
    #[error("cyclic structure")]
    CyclicStructure,
    /// The value holds a host handle.
    #[error("unsupported type")]
    UnsupportedType,
    /// The encoding exceeds the size limit.
    #[error("encoded size {size} exceeds maximum {max}")]
    ItemTooLarge {
        /// Bytes written when the limit was detected.
        size: usize,
        /// The permitted maximum.
        max: usize,
    },
}

/// Error returned when bytes do not decode to a value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// Unknown tag, oversized length prefix, duplicate map key or inconsistent structure.
    #[error("malformed data")]
    MalformedData,
    /// A container declares more elements than permitted.
    #[error("container of {count} elements exceeds maximum {max}")]
    TooManyElements {
        /// The declared element count.
        count: u64,
        /// The permitted maximum.
        max: usize,
    },
    /// The input ended in the middle of a value.
    #[error("unexpected end of input")]
    UnexpectedEof,
}

impl From<bytesrepr::Error> for DecodeError {
    fn from(error: bytesrepr::Error) -> Self {
        match error {
            bytesrepr::Error::EarlyEndOfStream => DecodeError::UnexpectedEof,
            _ => DecodeError::MalformedData,
        }
    }
}

enum EncodeFrame {
    Enter(StackValue),
    Exit(usize),
}

/// Encodes `value` under the default limits.
pub fn serialize(value: &StackValue) -> Result<Vec<u8>, EncodeError> {
    serialize_with_limits(value, &StackValueLimits::default())
}

/// Encodes `value`, failing if it is cyclic, holds a handle, or encodes to more than
/// `limits.max_item_size` bytes.
///
/// Cycles are detected by container identity on the path from the root, so a container
/// reachable along several acyclic paths is encoded once per path.
///
/// The size bound is checked after every item as the output grows, not once at the end. A value
/// that both overflows the bound and holds a handle later in encoding order therefore fails with
/// [`EncodeError::ItemTooLarge`] rather than [`EncodeError::UnsupportedType`]. Callers at the
/// interop boundary treat both alike.
pub fn serialize_with_limits(
    value: &StackValue,
    limits: &StackValueLimits,
) -> Result<Vec<u8>, EncodeError> {
    let mut buffer = Vec::new();
    let mut path = HashSet::new();
    let mut work = vec![EncodeFrame::Enter(value.clone())];

    while let Some(frame) = work.pop() {
        let value = match frame {
            EncodeFrame::Exit(id) => {
                path.remove(&id);
                continue;
            }
            EncodeFrame::Enter(value) => value,
        };

        if let Some(id) = value.container_id() {
            if !path.insert(id) {
                return Err(EncodeError::CyclicStructure);
            }
            work.push(EncodeFrame::Exit(id));
        }

        match &value {
            StackValue::ByteString(bytes) => {
                buffer.push(StackValueTag::ByteString as u8);
                bytesrepr::write_var_bytes(bytes, &mut buffer);
            }
            StackValue::Boolean(flag) => {
                buffer.push(StackValueTag::Boolean as u8);
                buffer.push(u8::from(*flag));
            }
            StackValue::Integer(integer) => {
                buffer.push(StackValueTag::Integer as u8);
                bytesrepr::write_var_bytes(&integer_to_bytes(integer), &mut buffer);
            }
            StackValue::Handle(_) => return Err(EncodeError::UnsupportedType),
            StackValue::Array(items) | StackValue::Struct(items) => {
                let tag = if matches!(value, StackValue::Array(_)) {
                    StackValueTag::Array
                } else {
                    StackValueTag::Struct
                };
                let items = items.borrow();
                buffer.push(tag as u8);
                bytesrepr::write_var_int(items.len() as u64, &mut buffer);
                work.extend(items.iter().rev().cloned().map(EncodeFrame::Enter));
            }
            StackValue::Map(map) => {
                let map = map.borrow();
                buffer.push(StackValueTag::Map as u8);
                bytesrepr::write_var_int(map.len() as u64, &mut buffer);
                let pairs: Vec<_> = map.iter().collect();
                for (key, item) in pairs.into_iter().rev() {
                    work.push(EncodeFrame::Enter(item.clone()));
                    work.push(EncodeFrame::Enter(key.clone()));
                }
            }
        }

        if buffer.len() > limits.max_item_size {
            return Err(EncodeError::ItemTooLarge {
                size: buffer.len(),
                max: limits.max_item_size,
            });
        }
    }

    Ok(buffer)
}

enum Flat {
    Value(StackValue),
    Container { tag: StackValueTag, count: usize },
}

/// Decodes one value from the front of `bytes` under the default limits.
pub fn deserialize(bytes: &[u8]) -> Result<StackValue, DecodeError> {
    deserialize_with_limits(bytes, &StackValueLimits::default())
}

/// Decodes one value from the front of `bytes`; trailing bytes are ignored.
pub fn deserialize_with_limits(
    bytes: &[u8],
    limits: &StackValueLimits,
) -> Result<StackValue, DecodeError> {
    let flat = flatten(bytes, limits)?;
    reconstruct(flat)
}

/// Reads tags in pre-order until every declared child has been read.
fn flatten(bytes: &[u8], limits: &StackValueLimits) -> Result<Vec<Flat>, DecodeError> {
    let mut flat = Vec::new();
    let mut remainder = bytes;
    let mut pending: usize = 1;

    while pending > 0 {
        pending -= 1;
        let (tag_byte, rem) = u8::from_bytes(remainder)?;
        let tag = StackValueTag::from_u8(tag_byte).ok_or(DecodeError::MalformedData)?;
        remainder = match tag {
            StackValueTag::ByteString => {
                let (data, rem) = bytesrepr::read_var_bytes(rem, MAX_VAR_BYTES_LENGTH)?;
                flat.push(Flat::Value(StackValue::ByteString(data.to_vec())));
                rem
            }
            StackValueTag::Boolean => {
                let (byte, rem) = u8::from_bytes(rem)?;
                flat.push(Flat::Value(StackValue::Boolean(byte != 0)));
                rem
            }
            StackValueTag::Integer => {
                let (data, rem) = bytesrepr::read_var_bytes(rem, MAX_VAR_BYTES_LENGTH)?;
                flat.push(Flat::Value(StackValue::Integer(integer_from_bytes(data))));
                rem
            }
            StackValueTag::Array | StackValueTag::Struct | StackValueTag::Map => {
                let (count, rem) = read_count(rem, limits)?;
                let children = if tag == StackValueTag::Map {
                    count * 2
                } else {
                    count
                };
                pending = pending
                    .checked_add(children)
                    .ok_or(DecodeError::MalformedData)?;
                flat.push(Flat::Container { tag, count });
                rem
            }
        };
    }

    Ok(flat)
}

fn read_count<'a>(
    bytes: &'a [u8],
    limits: &StackValueLimits,
) -> Result<(usize, &'a [u8]), DecodeError> {
    let (count, remainder) = bytesrepr::read_var_int(bytes, u64::MAX)?;
    if count > limits.max_array_size as u64 {
        return Err(DecodeError::TooManyElements {
            count,
            max: limits.max_array_size,
        });
    }
    Ok((count as usize, remainder))
}

/// Rebuilds containers bottom-up from the pre-order list.
fn reconstruct(mut flat: Vec<Flat>) -> Result<StackValue, DecodeError> {
    let mut built: Vec<StackValue> = Vec::new();

    while let Some(entry) = flat.pop() {
        let value = match entry {
            Flat::Value(value) => value,
            Flat::Container { tag, count } => {
                if tag == StackValueTag::Map {
                    let mut map = StackMap::new();
                    for _ in 0..count {
                        let key = built.pop().ok_or(DecodeError::MalformedData)?;
                        let value = built.pop().ok_or(DecodeError::MalformedData)?;
                        if map.insert(key, value).is_some() {
                            return Err(DecodeError::MalformedData);
                        }
                    }
                    StackValue::map(map)
                } else {
                    let mut items = Vec::with_capacity(count);
                    for _ in 0..count {
                        items.push(built.pop().ok_or(DecodeError::MalformedData)?);
                    }
                    if tag == StackValueTag::Array {
                        StackValue::array(items)
                    } else {
                        StackValue::structure(items)
                    }
                }
            }
        };
        built.push(value);
    }

    match (built.pop(), built.is_empty()) {
        (Some(root), true) => Ok(root),
        _ => Err(DecodeError::MalformedData),
    }
}

#[cfg(test)]
mod tests;
