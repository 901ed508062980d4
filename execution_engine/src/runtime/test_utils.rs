//! Some types and functions to use in tests.
use std::{cell::RefCell, rc::Rc};

use halcyon_storage::{global_state::in_memory::InMemoryGlobalState, tracking_copy::TrackingCopy};
use halcyon_types::{
    Block, BlockHash, ChainTip, ContractState, Digest, Header, Key, ScriptHash, StackValue,
    StoredValue, Trigger,
};

use super::{
    EventSink, LogEventArgs, NotifyEventArgs, ScriptContainer, StandardService, VmContext,
};
use crate::engine_config::EngineConfig;

/// A bare evaluation stack standing in for the VM.
#[derive(Debug)]
pub(crate) struct TestVm {
    stack: Vec<StackValue>,
    script_hash: ScriptHash,
    container: Option<ScriptContainer>,
}

impl TestVm {
    pub(crate) fn new(script_hash: ScriptHash) -> Self {
        TestVm {
            stack: Vec::new(),
            script_hash,
            container: None,
        }
    }

    pub(crate) fn with_container(mut self, container: ScriptContainer) -> Self {
        self.container = Some(container);
        self
    }

    pub(crate) fn stack(&self) -> &[StackValue] {
        &self.stack
    }

    /// Pops the single result of a call, panicking if the stack holds anything else.
    pub(crate) fn result(&mut self) -> StackValue {
        assert_eq!(self.stack.len(), 1, "expected exactly one result");
        self.stack.pop().unwrap()
    }
}

impl VmContext for TestVm {
    fn pop(&mut self) -> Option<StackValue> {
        self.stack.pop()
    }

    fn push(&mut self, value: StackValue) {
        self.stack.push(value);
    }

    fn current_script_hash(&self) -> ScriptHash {
        self.script_hash
    }

    fn script_container(&self) -> Option<ScriptContainer> {
        self.container.clone()
    }
}

/// Collects every event delivered to it.
#[derive(Default)]
pub(crate) struct RecordingEventSink {
    pub(crate) notifications: RefCell<Vec<NotifyEventArgs>>,
    pub(crate) logs: RefCell<Vec<LogEventArgs>>,
}

impl EventSink for RecordingEventSink {
    fn notify(&self, event: &NotifyEventArgs) {
        self.notifications.borrow_mut().push(event.clone());
    }

    fn log(&self, event: &LogEventArgs) {
        self.logs.borrow_mut().push(event.clone());
    }
}

pub(crate) fn script_hash(byte: u8) -> ScriptHash {
    ScriptHash::new([byte; 20])
}

pub(crate) fn contract(name: &str, has_storage: bool) -> ContractState {
    ContractState::new(
        name.as_bytes().to_vec(),
        has_storage,
        false,
        false,
        name.to_string(),
    )
}

pub(crate) fn header(prev_hash: BlockHash, index: u32, timestamp: u64) -> Header {
    Header::new(
        0,
        prev_hash,
        Digest::from_raw([index as u8; 32]),
        timestamp,
        index,
        script_hash(0xc0 + index as u8),
    )
}

/// A two block chain: genesis at height 0 and its child at height 1, which is the tip.
pub(crate) struct TestChain {
    pub(crate) genesis: Block,
    pub(crate) tip: Block,
}

impl TestChain {
    pub(crate) fn new(tip_block: impl FnOnce(Header) -> Block) -> Self {
        let genesis = Block::new(header(BlockHash::from_raw([0; 32]), 0, 1_000), Vec::new());
        let tip = tip_block(header(genesis.hash(), 1, 1_015));
        TestChain { genesis, tip }
    }

    pub(crate) fn pairs(&self) -> Vec<(Key, StoredValue)> {
        vec![
            (Key::Block(self.genesis.hash()), StoredValue::Block(self.genesis.clone())),
            (Key::Block(self.tip.hash()), StoredValue::Block(self.tip.clone())),
            (Key::BlockHashAtHeight(0), StoredValue::BlockHash(self.genesis.hash())),
            (Key::BlockHashAtHeight(1), StoredValue::BlockHash(self.tip.hash())),
            (Key::ChainTip, StoredValue::ChainTip(ChainTip::new(1, self.tip.hash()))),
        ]
    }
}

pub(crate) fn tracking_copy(
    pairs: &[(Key, StoredValue)],
) -> Rc<RefCell<TrackingCopy<InMemoryGlobalState>>> {
    let state = InMemoryGlobalState::from_pairs(pairs);
    Rc::new(RefCell::new(TrackingCopy::new(state)))
}

pub(crate) fn service(
    trigger: Trigger,
    pairs: &[(Key, StoredValue)],
) -> StandardService<InMemoryGlobalState> {
    StandardService::new(trigger, tracking_copy(pairs), EngineConfig::default())
}
