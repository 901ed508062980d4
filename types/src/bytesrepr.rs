//! Contains serialization and deserialization code for types used throughout the system.
//!
//! Multi-byte integers are little-endian. Variable-length payloads are framed with a var-int
//! length prefix: values below `0xFD` take a single byte, larger values are prefixed with `0xFD`,
//! `0xFE` or `0xFF` followed by a `u16`, `u32` or `u64` respectively.

use std::convert::TryInto;

use thiserror::Error;

/// The number of bytes in a serialized `u8`.
pub const U8_SERIALIZED_LENGTH: usize = 1;
/// The number of bytes in a serialized `bool`.
pub const BOOL_SERIALIZED_LENGTH: usize = 1;
/// The number of bytes in a serialized `u16`.
pub const U16_SERIALIZED_LENGTH: usize = 2;
/// The number of bytes in a serialized `u32`.
pub const U32_SERIALIZED_LENGTH: usize = 4;
/// The number of bytes in a serialized `u64`.
pub const U64_SERIALIZED_LENGTH: usize = 8;

/// Upper bound on the length of a var-bytes payload accepted by [`read_var_bytes`].
pub const MAX_VAR_BYTES_LENGTH: u64 = 0x0100_0000;

const VAR_INT_U16_PREFIX: u8 = 0xFD;
const VAR_INT_U32_PREFIX: u8 = 0xFE;
const VAR_INT_U64_PREFIX: u8 = 0xFF;

/// Serialization and deserialization errors.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum Error {
    /// Early end of stream while deserializing.
    #[error("Deserialization error: early end of stream")]
    EarlyEndOfStream,
    /// Formatting error while deserializing.
    #[error("Deserialization error: formatting")]
    Formatting,
    /// Not all input bytes were consumed in [`deserialize`].
    #[error("Deserialization error: left-over bytes")]
    LeftOverBytes,
    /// Out of memory error.
    #[error("Serialization error: out of memory")]
    OutOfMemory,
    /// A length or count prefix exceeded the permitted maximum.
    #[error("Deserialization error: value {found} exceeds maximum {max}")]
    ExceededMaximum {
        /// The permitted maximum.
        max: u64,
        /// The value found in the stream.
        found: u64,
    },
}

/// A type which can be serialized to a `Vec<u8>`.
pub trait ToBytes {
    /// Serializes `&self` to a `Vec<u8>`.
    fn to_bytes(&self) -> Result<Vec<u8>, Error>;

    /// Consumes `self` and serializes to a `Vec<u8>`.
    fn into_bytes(self) -> Result<Vec<u8>, Error>
    where
        Self: Sized,
    {
        self.to_bytes()
    }

    /// Returns the length of the `Vec<u8>` which would be returned from a successful call to
    /// `to_bytes()` or `into_bytes()`.
    fn serialized_length(&self) -> usize;

    /// Writes `&self` into a mutable `writer`.
    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend(self.to_bytes()?);
        Ok(())
    }
}

/// A type which can be deserialized from a `Vec<u8>`.
pub trait FromBytes: Sized {
    /// Deserializes the slice into `Self`.
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error>;
}

/// Serializes `t` into a `Vec<u8>`.
pub fn serialize(t: impl ToBytes) -> Result<Vec<u8>, Error> {
    t.into_bytes()
}

/// Deserializes `bytes` into an instance of `T`.
///
/// Returns an error if the bytes cannot be deserialized into `T` or if not all of the input bytes
/// are consumed in the operation.
pub fn deserialize<T: FromBytes>(bytes: Vec<u8>) -> Result<T, Error> {
    let (t, remainder) = T::from_bytes(&bytes)?;
    if remainder.is_empty() {
        Ok(t)
    } else {
        Err(Error::LeftOverBytes)
    }
}

/// Returns a `Vec<u8>` initialized with sufficient capacity to hold `to_be_serialized` after
/// serialization, or an error if the capacity would exceed `u32::MAX`.
pub fn allocate_buffer<T: ToBytes>(to_be_serialized: &T) -> Result<Vec<u8>, Error> {
    let serialized_length = to_be_serialized.serialized_length();
    if serialized_length > u32::MAX as usize {
        return Err(Error::OutOfMemory);
    }
    Ok(Vec::with_capacity(serialized_length))
}

/// Returns a tuple of the first `n` bytes and the remainder, or an error if the slice is too short.
pub fn safe_split_at(bytes: &[u8], n: usize) -> Result<(&[u8], &[u8]), Error> {
    if n > bytes.len() {
        Err(Error::EarlyEndOfStream)
    } else {
        Ok(bytes.split_at(n))
    }
}

/// Returns the number of bytes `value` occupies when written with [`write_var_int`].
pub fn var_int_serialized_length(value: u64) -> usize {
    if value < VAR_INT_U16_PREFIX as u64 {
        U8_SERIALIZED_LENGTH
    } else if value <= u16::MAX as u64 {
        U8_SERIALIZED_LENGTH + U16_SERIALIZED_LENGTH
    } else if value <= u32::MAX as u64 {
        U8_SERIALIZED_LENGTH + U32_SERIALIZED_LENGTH
    } else {
        U8_SERIALIZED_LENGTH + U64_SERIALIZED_LENGTH
    }
}

/// Writes `value` as a var-int.
pub fn write_var_int(value: u64, writer: &mut Vec<u8>) {
    if value < VAR_INT_U16_PREFIX as u64 {
        writer.push(value as u8);
    } else if value <= u16::MAX as u64 {
        writer.push(VAR_INT_U16_PREFIX);
        writer.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= u32::MAX as u64 {
        writer.push(VAR_INT_U32_PREFIX);
        writer.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        writer.push(VAR_INT_U64_PREFIX);
        writer.extend_from_slice(&value.to_le_bytes());
    }
}

/// Reads a var-int, failing with [`Error::ExceededMaximum`] if it is larger than `max`.
pub fn read_var_int(bytes: &[u8], max: u64) -> Result<(u64, &[u8]), Error> {
    let (prefix, remainder) = u8::from_bytes(bytes)?;
    let (value, remainder) = match prefix {
        VAR_INT_U16_PREFIX => {
            let (value, remainder) = u16::from_bytes(remainder)?;
            (value as u64, remainder)
        }
        VAR_INT_U32_PREFIX => {
            let (value, remainder) = u32::from_bytes(remainder)?;
            (value as u64, remainder)
        }
        VAR_INT_U64_PREFIX => u64::from_bytes(remainder)?,
        value => (value as u64, remainder),
    };
    if value > max {
        return Err(Error::ExceededMaximum { max, found: value });
    }
    Ok((value, remainder))
}

/// Returns the number of bytes `value` occupies when written with [`write_var_bytes`].
pub fn var_bytes_serialized_length(value: &[u8]) -> usize {
    var_int_serialized_length(value.len() as u64) + value.len()
}

/// Writes `value` prefixed by its var-int length.
pub fn write_var_bytes(value: &[u8], writer: &mut Vec<u8>) {
    write_var_int(value.len() as u64, writer);
    writer.extend_from_slice(value);
}

/// Reads a var-int length prefixed byte payload of at most `max` bytes.
pub fn read_var_bytes(bytes: &[u8], max: u64) -> Result<(&[u8], &[u8]), Error> {
    let (length, remainder) = read_var_int(bytes, max)?;
    let length: usize = length.try_into().map_err(|_| Error::OutOfMemory)?;
    safe_split_at(remainder, length)
}

impl ToBytes for u8 {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(vec![*self])
    }

    fn serialized_length(&self) -> usize {
        U8_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(*self);
        Ok(())
    }
}

impl FromBytes for u8 {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            None => Err(Error::EarlyEndOfStream),
            Some((byte, rem)) => Ok((*byte, rem)),
        }
    }
}

impl ToBytes for bool {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        u8::from(*self).to_bytes()
    }

    fn serialized_length(&self) -> usize {
        BOOL_SERIALIZED_LENGTH
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.push(u8::from(*self));
        Ok(())
    }
}

impl FromBytes for bool {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        match bytes.split_first() {
            None => Err(Error::EarlyEndOfStream),
            Some((0, rem)) => Ok((false, rem)),
            Some((1, rem)) => Ok((true, rem)),
            Some(_) => Err(Error::Formatting),
        }
    }
}

macro_rules! impl_to_from_bytes_for_integer {
    ($type:ty, $length:expr) => {
        impl ToBytes for $type {
            fn to_bytes(&self) -> Result<Vec<u8>, Error> {
                Ok(self.to_le_bytes().to_vec())
            }

            fn serialized_length(&self) -> usize {
                $length
            }

            fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
                writer.extend_from_slice(&self.to_le_bytes());
                Ok(())
            }
        }

        impl FromBytes for $type {
            fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
                let (bytes, remainder) = safe_split_at(bytes, $length)?;
                let bytes: [u8; $length] = bytes.try_into().map_err(|_| Error::Formatting)?;
                Ok((<$type>::from_le_bytes(bytes), remainder))
            }
        }
    };
}

impl_to_from_bytes_for_integer!(u16, U16_SERIALIZED_LENGTH);
impl_to_from_bytes_for_integer!(u32, U32_SERIALIZED_LENGTH);
impl_to_from_bytes_for_integer!(u64, U64_SERIALIZED_LENGTH);

impl<const N: usize> ToBytes for [u8; N] {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        Ok(self.to_vec())
    }

    fn serialized_length(&self) -> usize {
        N
    }

    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), Error> {
        writer.extend_from_slice(self);
        Ok(())
    }
}

impl<const N: usize> FromBytes for [u8; N] {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (bytes, remainder) = safe_split_at(bytes, N)?;
        let array = bytes.try_into().map_err(|_| Error::Formatting)?;
        Ok((array, remainder))
    }
}

impl ToBytes for String {
    fn to_bytes(&self) -> Result<Vec<u8>, Error> {
        let mut result = Vec::with_capacity(self.serialized_length());
        write_var_bytes(self.as_bytes(), &mut result);
        Ok(result)
    }

    fn serialized_length(&self) -> usize {
        var_bytes_serialized_length(self.as_bytes())
    }
}

impl FromBytes for String {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), Error> {
        let (bytes, remainder) = read_var_bytes(bytes, MAX_VAR_BYTES_LENGTH)?;
        let string = String::from_utf8(bytes.to_vec()).map_err(|_| Error::Formatting)?;
        Ok((string, remainder))
    }
}
