//! `System.Storage.*`, `System.StorageContext.*` and `System.Contract.*`.
//!
//! Every storage operation is scoped by a [`StorageContext`]: a context only reaches the entries
//! of the contract it names, and a read-only context never writes.
use tracing::debug;

use halcyon_storage::{
    global_state::{error::Error as GlobalStateError, StateReader},
    tracking_copy::TrackingCopyExt,
};
use halcyon_types::{
    ContractState, InteropInterface, InteropKind, Key, ScriptHash, StackValue, StorageContext,
    StorageItem, StoredValue, Trigger,
};

use super::{args, StandardService, VmContext};
use crate::execution::Error;

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Returns `true` if `context` names a contract which exists and has storage.
    pub fn check_storage_context(&self, context: &StorageContext) -> Result<bool, Error> {
        let contract = self
            .tracking_copy
            .borrow_mut()
            .read_contract(context.script_hash())?;
        Ok(contract.map_or(false, |contract| contract.has_storage()))
    }

    /// Returns a writable storage context for `contract`, provided `caller` created it during
    /// this invocation.
    pub fn get_storage_context_for(
        &self,
        contract: &ContractState,
        caller: &ScriptHash,
    ) -> Result<StorageContext, Error> {
        let script_hash = contract.script_hash();
        match self.contracts_created.get(&script_hash) {
            Some(creator) if creator == caller => Ok(StorageContext::new(script_hash, false)),
            _ => Err(Error::NotContractCreator {
                contract: script_hash,
                caller: *caller,
            }),
        }
    }

    /// Deletes the contract `script_hash` together with its storage. Destroying a contract which
    /// does not exist succeeds without effect.
    pub fn destroy_contract(&mut self, script_hash: &ScriptHash) -> Result<(), Error> {
        if self.trigger != Trigger::Application {
            return Err(Error::TriggerNotPermitted(self.trigger));
        }
        let mut tracking_copy = self.tracking_copy.borrow_mut();
        let contract = match tracking_copy.read_contract(script_hash)? {
            Some(contract) => contract,
            None => return Ok(()),
        };
        tracking_copy.prune(Key::Contract(*script_hash));
        let mut entries = 0;
        if contract.has_storage() {
            for storage_key in tracking_copy.storage_keys(script_hash)? {
                tracking_copy.prune(Key::Storage(storage_key));
                entries += 1;
            }
        }
        debug!(%script_hash, entries, "contract destroyed");
        Ok(())
    }

    fn ensure_mutating_trigger(&self) -> Result<(), Error> {
        if self.trigger.is_mutating() {
            Ok(())
        } else {
            Err(Error::TriggerNotPermitted(self.trigger))
        }
    }

    fn ensure_valid_context(&self, context: &StorageContext) -> Result<(), Error> {
        if self.check_storage_context(context)? {
            Ok(())
        } else {
            Err(Error::InvalidStorageContext(*context.script_hash()))
        }
    }

    /// Pops a storage context which may be written through.
    fn pop_writable_context(&self, vm: &mut dyn VmContext) -> Result<StorageContext, Error> {
        self.ensure_mutating_trigger()?;
        let context = pop_storage_context(vm)?;
        if context.is_read_only() {
            return Err(Error::ReadOnlyContext);
        }
        self.ensure_valid_context(&context)?;
        Ok(context)
    }

    pub(super) fn storage_get_context(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let context = StorageContext::new(vm.current_script_hash(), false);
        vm.push(StackValue::Handle(context.into()));
        Ok(())
    }

    pub(super) fn storage_get_read_only_context(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let context = StorageContext::new(vm.current_script_hash(), true);
        vm.push(StackValue::Handle(context.into()));
        Ok(())
    }

    pub(super) fn storage_context_as_read_only(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let context = handle
            .as_storage_context()
            .ok_or_else(|| args::unexpected_handle(InteropKind::StorageContext, &handle))?;
        let read_only = if context.is_read_only() {
            handle.clone()
        } else {
            InteropInterface::from(context.as_read_only())
        };
        vm.push(StackValue::Handle(read_only));
        Ok(())
    }

    pub(super) fn storage_get(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let context = pop_storage_context(vm)?;
        self.ensure_valid_context(&context)?;
        let key = args::pop_bytes(vm)?;
        let value = self
            .tracking_copy
            .borrow_mut()
            .read_storage_item(&context.storage_key(key))?
            .map(StorageItem::into_value)
            .unwrap_or_default();
        vm.push(StackValue::ByteString(value));
        Ok(())
    }

    pub(super) fn storage_put(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let context = self.pop_writable_context(vm)?;
        let key = args::pop_bytes(vm)?;
        let max = self.config.max_storage_key_size() as usize;
        if key.len() > max {
            return Err(Error::KeyTooLarge {
                size: key.len(),
                max,
            });
        }
        let value = args::pop_bytes(vm)?;
        self.tracking_copy.borrow_mut().write(
            Key::Storage(context.storage_key(key)),
            StoredValue::StorageItem(StorageItem::new(value)),
        );
        Ok(())
    }

    pub(super) fn storage_delete(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let context = self.pop_writable_context(vm)?;
        let storage_key = context.storage_key(args::pop_bytes(vm)?);
        let mut tracking_copy = self.tracking_copy.borrow_mut();
        if tracking_copy.read_storage_item(&storage_key)?.is_some() {
            tracking_copy.prune(Key::Storage(storage_key));
        }
        Ok(())
    }

    pub(super) fn contract_get_storage_context(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let contract = handle
            .as_contract()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Contract, &handle))?;
        let context = self.get_storage_context_for(contract, &vm.current_script_hash())?;
        vm.push(StackValue::Handle(context.into()));
        Ok(())
    }

    pub(super) fn contract_destroy(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        self.destroy_contract(&vm.current_script_hash())
    }
}

fn pop_storage_context(vm: &mut dyn VmContext) -> Result<StorageContext, Error> {
    let handle = args::pop_handle(vm)?;
    handle
        .as_storage_context()
        .copied()
        .ok_or_else(|| args::unexpected_handle(InteropKind::StorageContext, &handle))
}
