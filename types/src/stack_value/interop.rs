use std::{
    fmt::{self, Display, Formatter},
    rc::Rc,
};

use crate::{Block, ContractState, Header, StorageContext, Transaction};

/// The kind of host object wrapped by an [`InteropInterface`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum InteropKind {
    /// A block header.
    Header,
    /// A full block.
    Block,
    /// A transaction.
    Transaction,
    /// Contract metadata.
    Contract,
    /// A storage capability token.
    StorageContext,
}

impl Display for InteropKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            InteropKind::Header => write!(f, "Header"),
            InteropKind::Block => write!(f, "Block"),
            InteropKind::Transaction => write!(f, "Transaction"),
            InteropKind::Contract => write!(f, "Contract"),
            InteropKind::StorageContext => write!(f, "StorageContext"),
        }
    }
}

/// A host object handed to contract code as an opaque handle.
///
/// Consumers must check the kind through the `as_*` accessors; a handle of the wrong kind is a
/// failed call, never a panic.
#[derive(Clone, Debug)]
pub enum InteropInterface {
    /// A block header.
    Header(Rc<Header>),
    /// A full block.
    Block(Rc<Block>),
    /// A transaction.
    Transaction(Rc<Transaction>),
    /// Contract metadata.
    Contract(Rc<ContractState>),
    /// A storage capability token.
    StorageContext(Rc<StorageContext>),
}

impl InteropInterface {
    /// Returns the kind of the wrapped object.
    pub fn kind(&self) -> InteropKind {
        match self {
            InteropInterface::Header(_) => InteropKind::Header,
            InteropInterface::Block(_) => InteropKind::Block,
            InteropInterface::Transaction(_) => InteropKind::Transaction,
            InteropInterface::Contract(_) => InteropKind::Contract,
            InteropInterface::StorageContext(_) => InteropKind::StorageContext,
        }
    }

    /// Returns the header of a `Header` handle, or the header of a `Block` handle.
    pub fn as_header(&self) -> Option<&Header> {
        match self {
            InteropInterface::Header(header) => Some(header),
            InteropInterface::Block(block) => Some(block.header()),
            _ => None,
        }
    }

    /// Returns the wrapped block.
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            InteropInterface::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Returns the wrapped transaction.
    pub fn as_transaction(&self) -> Option<&Transaction> {
        match self {
            InteropInterface::Transaction(transaction) => Some(transaction),
            _ => None,
        }
    }

    /// Returns the wrapped contract metadata.
    pub fn as_contract(&self) -> Option<&ContractState> {
        match self {
            InteropInterface::Contract(contract) => Some(contract),
            _ => None,
        }
    }

    /// Returns the wrapped storage context.
    pub fn as_storage_context(&self) -> Option<&StorageContext> {
        match self {
            InteropInterface::StorageContext(context) => Some(context),
            _ => None,
        }
    }

    /// Returns `true` if both handles refer to the same host object.
    pub fn ptr_eq(&self, other: &InteropInterface) -> bool {
        match (self, other) {
            (InteropInterface::Header(left), InteropInterface::Header(right)) => {
                Rc::ptr_eq(left, right)
            }
            (InteropInterface::Block(left), InteropInterface::Block(right)) => {
                Rc::ptr_eq(left, right)
            }
            (InteropInterface::Transaction(left), InteropInterface::Transaction(right)) => {
                Rc::ptr_eq(left, right)
            }
            (InteropInterface::Contract(left), InteropInterface::Contract(right)) => {
                Rc::ptr_eq(left, right)
            }
            (InteropInterface::StorageContext(left), InteropInterface::StorageContext(right)) => {
                Rc::ptr_eq(left, right)
            }
            _ => false,
        }
    }
}

impl From<Header> for InteropInterface {
    fn from(header: Header) -> Self {
        InteropInterface::Header(Rc::new(header))
    }
}

impl From<Block> for InteropInterface {
    fn from(block: Block) -> Self {
        InteropInterface::Block(Rc::new(block))
    }
}

impl From<Transaction> for InteropInterface {
    fn from(transaction: Transaction) -> Self {
        InteropInterface::Transaction(Rc::new(transaction))
    }
}

impl From<ContractState> for InteropInterface {
    fn from(contract: ContractState) -> Self {
        InteropInterface::Contract(Rc::new(contract))
    }
}

impl From<StorageContext> for InteropInterface {
    fn from(context: StorageContext) -> Self {
        InteropInterface::StorageContext(Rc::new(context))
    }
}
