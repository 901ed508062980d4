//! The 20-byte identifier of a contract or account.

use std::{
    array::TryFromSliceError,
    convert::TryFrom,
    fmt::{self, Debug, Display, Formatter},
};

use datasize::DataSize;
use ripemd160::Ripemd160;
use serde::{de::Error as SerdeError, Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest as _, Sha256};

use crate::bytesrepr::{self, FromBytes, ToBytes};

/// The number of bytes in a [`ScriptHash`].
pub const SCRIPT_HASH_LENGTH: usize = 20;

/// The RIPEMD-160 over SHA-256 hash of a script, identifying the contract or account it belongs to.
#[derive(DataSize, Default, PartialOrd, Ord, PartialEq, Eq, Hash, Clone, Copy)]
pub struct ScriptHash([u8; SCRIPT_HASH_LENGTH]);

impl ScriptHash {
    /// Constructs a new `ScriptHash` instance from the raw bytes.
    pub const fn new(value: [u8; SCRIPT_HASH_LENGTH]) -> ScriptHash {
        ScriptHash(value)
    }

    /// Hashes `script` into the script hash identifying it.
    pub fn from_script(script: &[u8]) -> ScriptHash {
        let sha = Sha256::digest(script);
        let ripemd = Ripemd160::digest(&sha);
        let mut result = [0; SCRIPT_HASH_LENGTH];
        result.copy_from_slice(&ripemd);
        ScriptHash(result)
    }

    /// Returns the raw bytes of the script hash as an array.
    pub fn value(&self) -> [u8; SCRIPT_HASH_LENGTH] {
        self.0
    }

    /// Returns the raw bytes of the script hash as a `slice`.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl Display for ScriptHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", base16::encode_lower(&self.0))
    }
}

impl Debug for ScriptHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ScriptHash({})", base16::encode_lower(&self.0))
    }
}

impl AsRef<[u8]> for ScriptHash {
    fn as_ref(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl From<[u8; SCRIPT_HASH_LENGTH]> for ScriptHash {
    fn from(bytes: [u8; SCRIPT_HASH_LENGTH]) -> Self {
        ScriptHash(bytes)
    }
}

impl TryFrom<&[u8]> for ScriptHash {
    type Error = TryFromSliceError;

    fn try_from(bytes: &[u8]) -> Result<Self, TryFromSliceError> {
        <[u8; SCRIPT_HASH_LENGTH]>::try_from(bytes).map(ScriptHash)
    }
}

impl ToBytes for ScriptHash {
    #[inline(always)]
    fn to_bytes(&self) -> Result<Vec<u8>, bytesrepr::Error> {
        self.0.to_bytes()
    }

    #[inline(always)]
    fn serialized_length(&self) -> usize {
        self.0.serialized_length()
    }

    #[inline(always)]
    fn write_bytes(&self, writer: &mut Vec<u8>) -> Result<(), bytesrepr::Error> {
        writer.extend_from_slice(&self.0);
        Ok(())
    }
}

impl FromBytes for ScriptHash {
    fn from_bytes(bytes: &[u8]) -> Result<(Self, &[u8]), bytesrepr::Error> {
        let (bytes, rem) = FromBytes::from_bytes(bytes)?;
        Ok((ScriptHash(bytes), rem))
    }
}

impl Serialize for ScriptHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            base16::encode_lower(&self.0).serialize(serializer)
        } else {
            self.0.serialize(serializer)
        }
    }
}

impl<'de> Deserialize<'de> for ScriptHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let hex_string = String::deserialize(deserializer)?;
            let bytes = base16::decode(hex_string.as_bytes()).map_err(SerdeError::custom)?;
            ScriptHash::try_from(bytes.as_slice()).map_err(SerdeError::custom)
        } else {
            let bytes = <[u8; SCRIPT_HASH_LENGTH]>::deserialize(deserializer)?;
            Ok(ScriptHash(bytes))
        }
    }
}
