//! The reason the VM is executing.

use datasize::DataSize;
use num_derive::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Serialize};

/// Identifies why a script is being executed, and so which interop calls may mutate state.
#[derive(
    Copy,
    Clone,
    Debug,
    PartialEq,
    Eq,
    Hash,
    FromPrimitive,
    ToPrimitive,
    Serialize,
    Deserialize,
    DataSize,
)]
#[repr(u8)]
pub enum Trigger {
    /// Verifying a witness of a transaction or block.
    Verification = 0x00,
    /// Verifying the receiving side of a transfer.
    VerificationR = 0x01,
    /// Running the application logic of a transaction.
    Application = 0x10,
    /// Running the receiving side of a transfer.
    ApplicationR = 0x11,
}

impl Trigger {
    /// Returns `true` if interop calls executing under this trigger may write to storage.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Trigger::Application | Trigger::ApplicationR)
    }

    /// Returns the numeric tag exposed to contract code.
    pub fn value(&self) -> u8 {
        *self as u8
    }
}
