//! `System.Blockchain.*`, `System.Header.*`, `System.Block.*` and `System.Transaction.*`.
//!
//! Lookups that miss push an empty byte string; only a malformed operand fails the call.
use num_bigint::BigInt;
use num_traits::ToPrimitive;

use halcyon_storage::{
    global_state::{error::Error as GlobalStateError, StateReader},
    tracking_copy::TrackingCopyExt,
};
use halcyon_types::{
    Block, BlockHash, Header, InteropInterface, InteropKind, Key, ScriptHash, StackValue,
    StoredValue, TransactionHash,
};

use super::{args, StandardService, VmContext};
use crate::execution::Error;

/// Operands of at most this many bytes are block heights rather than hashes.
const MAX_HEIGHT_OPERAND_LENGTH: usize = 5;

fn empty() -> StackValue {
    StackValue::ByteString(Vec::new())
}

fn hash_bytes<T: AsRef<[u8]>>(hash: T) -> StackValue {
    StackValue::ByteString(hash.as_ref().to_vec())
}

fn handle_or_empty<T: Into<InteropInterface>>(object: Option<T>) -> StackValue {
    match object {
        Some(object) => StackValue::Handle(object.into()),
        None => empty(),
    }
}

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Resolves a height-or-hash operand to a block hash; `None` if no block has that height.
    fn resolve_block_hash(&self, operand: &[u8]) -> Result<Option<BlockHash>, Error> {
        if operand.len() <= MAX_HEIGHT_OPERAND_LENGTH {
            let height = BigInt::from_signed_bytes_le(operand)
                .to_u32()
                .ok_or(Error::InvalidHeight)?;
            Ok(self
                .tracking_copy
                .borrow_mut()
                .read_block_hash_at_height(height)?)
        } else {
            let raw = args::fixed_bytes(operand, "height or hash")?;
            Ok(Some(BlockHash::from_raw(raw)))
        }
    }

    /// Pops a header, or the header of a block.
    fn pop_header(vm: &mut dyn VmContext) -> Result<Header, Error> {
        let handle = args::pop_handle(vm)?;
        handle
            .as_header()
            .or_else(|| handle.as_block().map(Block::header))
            .cloned()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Header, &handle))
    }

    pub(super) fn blockchain_get_height(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let tip = self
            .tracking_copy
            .borrow_mut()
            .read_chain_tip()?
            .ok_or(Error::ChainTipNotFound)?;
        vm.push(StackValue::from(tip.height()));
        Ok(())
    }

    pub(super) fn blockchain_get_header(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let operand = args::pop_bytes(vm)?;
        let header = match self.resolve_block_hash(&operand)? {
            Some(hash) => self.tracking_copy.borrow_mut().read_header(&hash)?,
            None => None,
        };
        vm.push(handle_or_empty(header));
        Ok(())
    }

    pub(super) fn blockchain_get_block(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let operand = args::pop_bytes(vm)?;
        let block = match self.resolve_block_hash(&operand)? {
            Some(hash) => self.tracking_copy.borrow_mut().read_block(&hash)?,
            None => None,
        };
        vm.push(handle_or_empty(block));
        Ok(())
    }

    pub(super) fn blockchain_get_transaction(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let hash = TransactionHash::from_raw(args::fixed_bytes(
            &args::pop_bytes(vm)?,
            "transaction hash",
        )?);
        let transaction = self
            .tracking_copy
            .borrow_mut()
            .read_transaction(&hash)?
            .map(|state| state.into_transaction());
        vm.push(handle_or_empty(transaction));
        Ok(())
    }

    pub(super) fn blockchain_get_transaction_height(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let hash = TransactionHash::from_raw(args::fixed_bytes(
            &args::pop_bytes(vm)?,
            "transaction hash",
        )?);
        let height = self
            .tracking_copy
            .borrow_mut()
            .read_transaction(&hash)?
            .map_or(-1, |state| i64::from(state.block_index()));
        vm.push(StackValue::from(height));
        Ok(())
    }

    pub(super) fn blockchain_get_contract(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let operand = args::pop_bytes(vm)?;
        let script_hash = ScriptHash::new(args::fixed_bytes(&operand, "script hash")?);
        let contract = self.tracking_copy.borrow_mut().read_contract(&script_hash)?;
        vm.push(handle_or_empty(contract));
        Ok(())
    }

    pub(super) fn header_get_index(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let header = Self::pop_header(vm)?;
        vm.push(StackValue::from(header.index()));
        Ok(())
    }

    pub(super) fn header_get_hash(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let header = Self::pop_header(vm)?;
        vm.push(hash_bytes(header.hash()));
        Ok(())
    }

    pub(super) fn header_get_prev_hash(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let header = Self::pop_header(vm)?;
        vm.push(hash_bytes(header.prev_hash()));
        Ok(())
    }

    pub(super) fn header_get_timestamp(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let header = Self::pop_header(vm)?;
        vm.push(StackValue::from(BigInt::from(header.timestamp())));
        Ok(())
    }

    pub(super) fn block_get_transaction_count(
        &mut self,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let block = handle
            .as_block()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Block, &handle))?;
        vm.push(StackValue::from(BigInt::from(block.transactions().len())));
        Ok(())
    }

    pub(super) fn block_get_transactions(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let block = handle
            .as_block()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Block, &handle))?;
        let count = block.transactions().len();
        let max = self.config.max_array_size() as usize;
        if count > max {
            return Err(Error::TooManyElements { count, max });
        }
        let transactions = block
            .transactions()
            .iter()
            .cloned()
            .map(|transaction| StackValue::Handle(transaction.into()))
            .collect();
        vm.push(StackValue::array(transactions));
        Ok(())
    }

    pub(super) fn block_get_transaction(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let index = args::pop_integer(vm)?;
        let block = handle
            .as_block()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Block, &handle))?;
        let count = block.transactions().len();
        let transaction = index
            .to_usize()
            .and_then(|index| block.transactions().get(index))
            .ok_or(Error::IndexOutOfRange { count })?;
        vm.push(StackValue::Handle(transaction.clone().into()));
        Ok(())
    }

    pub(super) fn transaction_get_hash(&mut self, vm: &mut dyn VmContext) -> Result<(), Error> {
        let handle = args::pop_handle(vm)?;
        let transaction = handle
            .as_transaction()
            .ok_or_else(|| args::unexpected_handle(InteropKind::Transaction, &handle))?;
        vm.push(hash_bytes(transaction.hash()));
        Ok(())
    }
}
