use tracing::{debug, info};

use halcyon_types::{ScriptHash, StackValue};

use super::ScriptContainer;

/// A notification raised by `System.Runtime.Notify`.
#[derive(Clone, Debug)]
pub struct NotifyEventArgs {
    script_container: Option<ScriptContainer>,
    script_hash: ScriptHash,
    state: StackValue,
}

impl NotifyEventArgs {
    /// Constructs a new `NotifyEventArgs`.
    pub fn new(
        script_container: Option<ScriptContainer>,
        script_hash: ScriptHash,
        state: StackValue,
    ) -> Self {
        NotifyEventArgs {
            script_container,
            script_hash,
            state,
        }
    }

    /// The container the invocation ran on behalf of.
    pub fn script_container(&self) -> Option<&ScriptContainer> {
        self.script_container.as_ref()
    }

    /// The contract that raised the notification.
    pub fn script_hash(&self) -> &ScriptHash {
        &self.script_hash
    }

    /// The payload.
    pub fn state(&self) -> &StackValue {
        &self.state
    }
}

/// A message written by `System.Runtime.Log`.
#[derive(Clone, Debug, PartialEq)]
pub struct LogEventArgs {
    script_container: Option<ScriptContainer>,
    script_hash: ScriptHash,
    message: String,
}

impl LogEventArgs {
    /// Constructs a new `LogEventArgs`.
    pub fn new(
        script_container: Option<ScriptContainer>,
        script_hash: ScriptHash,
        message: String,
    ) -> Self {
        LogEventArgs {
            script_container,
            script_hash,
            message,
        }
    }

    /// The container the invocation ran on behalf of.
    pub fn script_container(&self) -> Option<&ScriptContainer> {
        self.script_container.as_ref()
    }

    /// The contract that wrote the message.
    pub fn script_hash(&self) -> &ScriptHash {
        &self.script_hash
    }

    /// The message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Receives the events contract code raises. Delivery is synchronous and cannot fail.
pub trait EventSink {
    /// Called on every successful `System.Runtime.Notify`.
    fn notify(&self, event: &NotifyEventArgs);

    /// Called on every successful `System.Runtime.Log`.
    fn log(&self, event: &LogEventArgs);
}

/// Writes events to the tracing stream.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn notify(&self, event: &NotifyEventArgs) {
        // payloads may be cyclic, so only the variant is logged
        info!(
            script_hash = %event.script_hash(),
            state = event.state().type_name(),
            "contract notification"
        );
    }

    fn log(&self, event: &LogEventArgs) {
        debug!(
            script_hash = %event.script_hash(),
            message = event.message(),
            "contract log"
        );
    }
}
