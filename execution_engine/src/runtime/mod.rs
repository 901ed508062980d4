//! The interop service: host functions contract code reaches through the VM's `SYSCALL`
//! instruction.
//!
//! A [`StandardService`] lives for exactly one top-level invocation. It owns the invocation's
//! notification log and contract-creation attribution, executes every call against a single
//! [`TrackingCopy`] snapshot, and reports each call's outcome to the VM as a plain `bool`.
mod args;
mod blockchain;
mod events;
mod storage;
mod system;
#[cfg(test)]
pub(crate) mod test_utils;
mod witness;

use std::{cell::RefCell, collections::BTreeMap, fmt, rc::Rc};

use tracing::{debug, trace};

use halcyon_storage::{
    global_state::{error::Error as GlobalStateError, CommitProvider, StateReader},
    tracking_copy::TrackingCopy,
};
use halcyon_types::{Block, Key, ScriptHash, StackValue, StoredValue, Transaction, Trigger};

pub use self::events::{EventSink, LogEventArgs, NotifyEventArgs, TracingEventSink};
use crate::{engine_config::EngineConfig, execution::Error, resolvers::InteropFunction};

/// The identifier pushed by `System.Runtime.Platform`.
pub const PLATFORM: &str = "HALCYON";

/// The view of the virtual machine an interop call needs.
pub trait VmContext {
    /// Pops the top of the current evaluation stack.
    fn pop(&mut self) -> Option<StackValue>;

    /// Pushes onto the current evaluation stack.
    fn push(&mut self, value: StackValue);

    /// Returns the script hash of the contract currently executing.
    fn current_script_hash(&self) -> ScriptHash;

    /// Returns the transaction or block the invocation verifies or executes, if any.
    fn script_container(&self) -> Option<ScriptContainer>;
}

/// The verifiable object an invocation runs on behalf of.
#[derive(Clone, Debug, PartialEq)]
pub enum ScriptContainer {
    /// A transaction.
    Transaction(Rc<Transaction>),
    /// A block.
    Block(Rc<Block>),
}

impl From<Transaction> for ScriptContainer {
    fn from(transaction: Transaction) -> Self {
        ScriptContainer::Transaction(Rc::new(transaction))
    }
}

impl From<Block> for ScriptContainer {
    fn from(block: Block) -> Self {
        ScriptContainer::Block(Rc::new(block))
    }
}

/// A resource scoped to one invocation, released when the service is disposed.
pub trait Disposable {
    /// Releases the resource.
    fn dispose(&mut self);
}

/// The interop service for one top-level invocation.
pub struct StandardService<R> {
    trigger: Trigger,
    tracking_copy: Rc<RefCell<TrackingCopy<R>>>,
    config: EngineConfig,
    event_sink: Rc<dyn EventSink>,
    disposables: Vec<Box<dyn Disposable>>,
    // Created contract -> the contract that created it, for this invocation only.
    contracts_created: BTreeMap<ScriptHash, ScriptHash>,
    notifications: Vec<NotifyEventArgs>,
}

impl<R> StandardService<R> {
    /// Registers a resource to be released on [`StandardService::dispose`] or drop.
    pub fn register_disposable(&mut self, disposable: Box<dyn Disposable>) {
        self.disposables.push(disposable);
    }

    /// Releases every registered resource, in registration order. Resources are released once;
    /// later calls do nothing.
    pub fn dispose(&mut self) {
        for mut disposable in self.disposables.drain(..) {
            disposable.dispose();
        }
    }
}

impl<R> Drop for StandardService<R> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<R> fmt::Debug for StandardService<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardService")
            .field("trigger", &self.trigger)
            .field("config", &self.config)
            .field("contracts_created", &self.contracts_created)
            .field("notifications", &self.notifications.len())
            .finish()
    }
}

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError>,
{
    /// Creates a service executing under `trigger` against `tracking_copy`. Events go to a
    /// [`TracingEventSink`] until another sink is installed.
    pub fn new(
        trigger: Trigger,
        tracking_copy: Rc<RefCell<TrackingCopy<R>>>,
        config: EngineConfig,
    ) -> Self {
        StandardService {
            trigger,
            tracking_copy,
            config,
            event_sink: Rc::new(TracingEventSink),
            disposables: Vec::new(),
            contracts_created: BTreeMap::new(),
            notifications: Vec::new(),
        }
    }

    /// Replaces the sink receiving `Notify` and `Log` events.
    pub fn with_event_sink(mut self, event_sink: Rc<dyn EventSink>) -> Self {
        self.event_sink = event_sink;
        self
    }

    /// Returns the trigger of this invocation.
    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Returns the configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns the snapshot calls execute against.
    pub fn tracking_copy(&self) -> Rc<RefCell<TrackingCopy<R>>> {
        Rc::clone(&self.tracking_copy)
    }

    /// Returns the notifications raised so far, in order.
    pub fn notifications(&self) -> &[NotifyEventArgs] {
        &self.notifications
    }

    /// Records that `creator` created `created` during this invocation, allowing `creator` to
    /// obtain the new contract's storage context.
    pub fn record_contract_created(&mut self, created: ScriptHash, creator: ScriptHash) {
        debug!(%created, %creator, "contract created");
        self.contracts_created.insert(created, creator);
    }

    /// Executes `function`, returning `false` if the call failed.
    pub fn invoke(&mut self, function: InteropFunction, vm: &mut dyn VmContext) -> bool {
        let result = self.try_invoke(function, vm);
        self.outcome(function.name(), result)
    }

    /// Executes the function called `name`, returning `false` if there is none or the call
    /// failed.
    pub fn invoke_by_name(&mut self, name: &str, vm: &mut dyn VmContext) -> bool {
        let result = InteropFunction::from_name(name)
            .ok_or_else(|| Error::UnknownFunction(name.to_string()))
            .and_then(|function| self.try_invoke(function, vm));
        self.outcome(name, result)
    }

    /// Executes the function whose method hash is `method_hash`, returning `false` if there is
    /// none or the call failed.
    pub fn invoke_by_method_hash(&mut self, method_hash: u32, vm: &mut dyn VmContext) -> bool {
        match InteropFunction::from_method_hash(method_hash) {
            Some(function) => self.invoke(function, vm),
            None => self.outcome("unknown", Err(Error::UnknownMethodHash(method_hash))),
        }
    }

    /// Executes `function`, returning the reason it failed.
    ///
    /// On failure nothing has been pushed, though operands may already have been popped.
    pub fn try_invoke(
        &mut self,
        function: InteropFunction,
        vm: &mut dyn VmContext,
    ) -> Result<(), Error> {
        trace!(%function, script_hash = %vm.current_script_hash(), "interop call");
        match function {
            InteropFunction::RuntimePlatform => self.runtime_platform(vm),
            InteropFunction::RuntimeGetTrigger => self.runtime_get_trigger(vm),
            InteropFunction::RuntimeCheckWitness => self.runtime_check_witness(vm),
            InteropFunction::RuntimeNotify => self.runtime_notify(vm),
            InteropFunction::RuntimeLog => self.runtime_log(vm),
            InteropFunction::RuntimeGetTime => self.runtime_get_time(vm),
            InteropFunction::RuntimeSerialize => self.runtime_serialize(vm),
            InteropFunction::RuntimeDeserialize => self.runtime_deserialize(vm),
            InteropFunction::BlockchainGetHeight => self.blockchain_get_height(vm),
            InteropFunction::BlockchainGetHeader => self.blockchain_get_header(vm),
            InteropFunction::BlockchainGetBlock => self.blockchain_get_block(vm),
            InteropFunction::BlockchainGetTransaction => self.blockchain_get_transaction(vm),
            InteropFunction::BlockchainGetTransactionHeight => {
                self.blockchain_get_transaction_height(vm)
            }
            InteropFunction::BlockchainGetContract => self.blockchain_get_contract(vm),
            InteropFunction::HeaderGetIndex => self.header_get_index(vm),
            InteropFunction::HeaderGetHash => self.header_get_hash(vm),
            InteropFunction::HeaderGetPrevHash => self.header_get_prev_hash(vm),
            InteropFunction::HeaderGetTimestamp => self.header_get_timestamp(vm),
            InteropFunction::BlockGetTransactionCount => self.block_get_transaction_count(vm),
            InteropFunction::BlockGetTransactions => self.block_get_transactions(vm),
            InteropFunction::BlockGetTransaction => self.block_get_transaction(vm),
            InteropFunction::TransactionGetHash => self.transaction_get_hash(vm),
            InteropFunction::ContractDestroy => self.contract_destroy(vm),
            InteropFunction::ContractGetStorageContext => self.contract_get_storage_context(vm),
            InteropFunction::StorageGetContext => self.storage_get_context(vm),
            InteropFunction::StorageGetReadOnlyContext => self.storage_get_read_only_context(vm),
            InteropFunction::StorageGet => self.storage_get(vm),
            InteropFunction::StoragePut => self.storage_put(vm),
            InteropFunction::StorageDelete => self.storage_delete(vm),
            InteropFunction::StorageContextAsReadOnly => self.storage_context_as_read_only(vm),
        }
    }

    fn outcome(&self, function: &str, result: Result<(), Error>) -> bool {
        match result {
            Ok(()) => true,
            Err(error) => {
                debug!(function, trigger = ?self.trigger, %error, "interop call failed");
                false
            }
        }
    }
}

impl<R> StandardService<R>
where
    R: StateReader<Key, StoredValue, Error = GlobalStateError> + CommitProvider,
{
    /// Flushes every change made during the invocation to the underlying store.
    pub fn commit(&self) -> Result<(), Error> {
        self.tracking_copy.borrow_mut().commit()?;
        Ok(())
    }
}
