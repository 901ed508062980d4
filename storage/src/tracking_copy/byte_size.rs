use std::mem;

use halcyon_types::{bytesrepr::ToBytes, Block, Header, Key, StoredValue, Transaction};

/// Returns byte size of the element - both heap size and stack size.
pub trait ByteSize {
    fn byte_size(&self) -> usize;
}

impl ByteSize for Key {
    fn byte_size(&self) -> usize {
        mem::size_of::<Self>() + self.serialized_length()
    }
}

fn transaction_heap_size(transaction: &Transaction) -> usize {
    transaction.script().len() + mem::size_of_val(transaction.signers())
}

fn header_heap_size(header: &Header) -> usize {
    header.serialized_length()
}

fn block_heap_size(block: &Block) -> usize {
    header_heap_size(block.header())
        + block
            .transactions()
            .iter()
            .map(|transaction| mem::size_of::<Transaction>() + transaction_heap_size(transaction))
            .sum::<usize>()
}

impl ByteSize for StoredValue {
    fn byte_size(&self) -> usize {
        mem::size_of::<Self>()
            + match self {
                StoredValue::Contract(contract) => contract.script().len() + contract.name().len(),
                StoredValue::StorageItem(item) => item.value().len(),
                StoredValue::Block(block) => block_heap_size(block),
                StoredValue::Header(header) => header_heap_size(header),
                StoredValue::Transaction(state) => transaction_heap_size(state.transaction()),
                StoredValue::BlockHash(_) | StoredValue::ChainTip(_) => 0,
            }
    }
}
