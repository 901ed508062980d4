//! `System.Runtime.*`
use num_bigint::BigInt;

use halcyon_storage::{
    global_state::{error::Error as GlobalStateError, StateReader},
    tracking_copy::TrackingCopyExt,
};
use halcyon_types::{
    stack_value, Key, PublicKey, ScriptHash, StackValue, StoredValue,
    COMPRESSED_PUBLIC_KEY_LENGTH, SCRIPT_HASH_LENGTH,
};

use super::{args, LogEventArgs, NotifyEventArgs, StandardService, VmContext, PLATFORM};
use crate::execution::Error;

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Returns the deterministic time of the invocation, in seconds.
    ///
    /// This is the timestamp of the block being persisted or, when none is, the tip header's
    /// timestamp advanced by one nominal block interval.
    pub fn get_time(&self) -> Result<u64, Error> {
        let mut tracking_copy = self.tracking_copy.borrow_mut();
        if let Some(block) = tracking_copy.persisting_block() {
            return Ok(block.header().timestamp());
        }
        let tip = tracking_copy
            .read_chain_tip()?
            .ok_or(Error::ChainTipNotFound)?;
        let header = tracking_copy
            .read_header(tip.hash())?
            .ok_or(Error::HeaderNotFound(*tip.hash()))?;
        Ok(header
            .timestamp()
            .saturating_add(self.config.seconds_per_block()))
    }

    pub(super) fn runtime_platform(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        vm.push(StackValue::from(PLATFORM.as_bytes()));
        Ok(())
    }

    pub(super) fn runtime_get_trigger(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        vm.push(StackValue::from(u32::from(self.trigger.value())));
        Ok(())
    }

    pub(super) fn runtime_check_witness(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let hash_or_pubkey = args::pop_bytes(vm)?;
        let script_hash = match hash_or_pubkey.len() {
            SCRIPT_HASH_LENGTH => ScriptHash::new(args::fixed_bytes(&hash_or_pubkey, "hash")?),
            COMPRESSED_PUBLIC_KEY_LENGTH => {
                PublicKey::try_from(hash_or_pubkey.as_slice())?.to_script_hash()
            }
            length => {
                return Err(Error::InvalidOperandLength {
                    operand: "hash or public key",
                    length,
                })
            }
        };
        let container = vm.script_container().ok_or(Error::NoScriptContainer)?;
        let witnessed = self.check_witness(&container, &script_hash)?;
        vm.push(StackValue::from(witnessed));
        Ok(())
    }

    pub(super) fn runtime_notify(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let state = args::pop(vm)?;
        let notification =
            NotifyEventArgs::new(vm.script_container(), vm.current_script_hash(), state);
        self.event_sink.notify(&notification);
        self.notifications.push(notification);
        Ok(())
    }

    pub(super) fn runtime_log(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let message = String::from_utf8_lossy(&args::pop_bytes(vm)?).into_owned();
        let event = LogEventArgs::new(vm.script_container(), vm.current_script_hash(), message);
        self.event_sink.log(&event);
        Ok(())
    }

    pub(super) fn runtime_get_time(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let time = self.get_time()?;
        vm.push(StackValue::from(BigInt::from(time)));
        Ok(())
    }

    pub(super) fn runtime_serialize(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let value = args::pop(vm)?;
        let limits = self.config.stack_value_limits();
        let bytes = stack_value::serialize_with_limits(&value, &limits)?;
        vm.push(StackValue::from(bytes));
        Ok(())
    }

    pub(super) fn runtime_deserialize(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let bytes = args::pop_bytes(vm)?;
        let limits = self.config.stack_value_limits();
        let value = stack_value::deserialize_with_limits(&bytes, &limits)?;
        vm.push(value);
        Ok(())
    }
}
