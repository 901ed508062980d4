//! Operand extraction from the evaluation stack.
use std::convert::TryFrom;

use num_bigint::BigInt;

use halcyon_types::{InteropInterface, InteropKind, StackValue};

use super::VmContext;
use crate::execution::Error;

pub(super) fn pop(vm: &mut dyn VmContext) -> Result<StackValue, Error> {
    vm.pop().ok_or(Error::StackUnderflow)
}

/// Pops an operand convertible to a byte string.
pub(super) fn pop_bytes(vm: &mut dyn VmContext) -> Result<Vec<u8>, Error> {
    let value = pop(vm)?;
    value.as_bytes().ok_or(Error::UnexpectedOperand {
        expected: "ByteString",
        found: value.type_name(),
    })
}

/// Pops an operand convertible to an integer.
pub(super) fn pop_integer(vm: &mut dyn VmContext) -> Result<BigInt, Error> {
    let value = pop(vm)?;
    value.as_integer().ok_or(Error::UnexpectedOperand {
        expected: "Integer",
        found: value.type_name(),
    })
}

pub(super) fn pop_handle(vm: &mut dyn VmContext) -> Result<InteropInterface, Error> {
    match pop(vm)? {
        StackValue::Handle(handle) => Ok(handle),
        other => Err(Error::UnexpectedOperand {
            expected: "Handle",
            found: other.type_name(),
        }),
    }
}

pub(super) fn unexpected_handle(expected: InteropKind, found: &InteropInterface) -> Error {
    Error::UnexpectedHandle {
        expected,
        found: found.kind(),
    }
}

/// Requires `bytes` to be exactly `N` long.
pub(super) fn fixed_bytes<const N: usize>(
    bytes: &[u8],
    operand: &'static str,
) -> Result<[u8; N], Error> {
    <[u8; N]>::try_from(bytes).map_err(|_| Error::InvalidOperandLength {
        operand,
        length: bytes.len(),
    })
}
