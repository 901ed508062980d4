//! Public keys and the single-signature redeem script derived from them.

use std::{
    convert::TryFrom,
    fmt::{self, Debug, Display, Formatter},
};

use thiserror::Error;

use crate::ScriptHash;

/// The number of bytes in a compressed secp256r1 public key.
pub const COMPRESSED_PUBLIC_KEY_LENGTH: usize = 33;

/// Pushes the following 33 bytes onto the evaluation stack.
const OP_PUSHBYTES33: u8 = 0x21;
/// Verifies a signature against the public key on top of the stack.
const OP_CHECKSIG: u8 = 0xAC;

/// Error returned when bytes do not form a compressed public key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PublicKeyError {
    /// The input had the wrong length.
    #[error("expected 33 bytes, got {0}")]
    InvalidLength(usize),
    /// The first byte is not a compressed-point prefix.
    #[error("invalid compressed point prefix {0:#04x}")]
    InvalidPrefix(u8),
}

/// A compressed public key on the secp256r1 curve.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PublicKey([u8; COMPRESSED_PUBLIC_KEY_LENGTH]);

impl PublicKey {
    /// Returns the raw compressed encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the script which verifies a single signature made with this key.
    pub fn signature_redeem_script(&self) -> Vec<u8> {
        let mut script = Vec::with_capacity(COMPRESSED_PUBLIC_KEY_LENGTH + 2);
        script.push(OP_PUSHBYTES33);
        script.extend_from_slice(&self.0);
        script.push(OP_CHECKSIG);
        script
    }

    /// Returns the script hash of the single-signature redeem script.
    pub fn to_script_hash(&self) -> ScriptHash {
        ScriptHash::from_script(&self.signature_redeem_script())
    }
}

impl TryFrom<&[u8]> for PublicKey {
    type Error = PublicKeyError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let raw = <[u8; COMPRESSED_PUBLIC_KEY_LENGTH]>::try_from(bytes)
            .map_err(|_| PublicKeyError::InvalidLength(bytes.len()))?;
        match raw[0] {
            0x02 | 0x03 => Ok(PublicKey(raw)),
            prefix => Err(PublicKeyError::InvalidPrefix(prefix)),
        }
    }
}

impl Display for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", base16::encode_lower(&self.0))
    }
}

impl Debug for PublicKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", base16::encode_lower(&self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redeem_script_wraps_key() {
        let mut raw = [7u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        raw[0] = 0x02;
        let public_key = PublicKey::try_from(&raw[..]).expect("should parse");
        let script = public_key.signature_redeem_script();
        assert_eq!(script.len(), 35);
        assert_eq!(script[0], 0x21);
        assert_eq!(&script[1..34], &raw[..]);
        assert_eq!(script[34], 0xAC);
        assert_eq!(public_key.to_script_hash(), ScriptHash::from_script(&script));
    }

    #[test]
    fn rejects_uncompressed_prefix_and_bad_length() {
        let mut raw = [7u8; COMPRESSED_PUBLIC_KEY_LENGTH];
        raw[0] = 0x04;
        assert_eq!(
            PublicKey::try_from(&raw[..]),
            Err(PublicKeyError::InvalidPrefix(0x04))
        );
        assert_eq!(
            PublicKey::try_from(&raw[..20]),
            Err(PublicKeyError::InvalidLength(20))
        );
    }
}
