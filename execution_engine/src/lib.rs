//! The interop layer of the Halcyon virtual machine: the host functions contract code reaches
//! through `SYSCALL`, together with the configuration and logging they run under.

#![doc(test(attr(forbid(warnings))))]
#![warn(
    missing_docs,
    trivial_casts,
    trivial_numeric_casts,
    unused_qualifications
)]

pub mod engine_config;
pub mod execution;
pub mod logging;
pub mod resolvers;
pub mod runtime;

pub use engine_config::EngineConfig;
pub use execution::Error;
pub use resolvers::InteropFunction;
pub use runtime::{
    Disposable, EventSink, LogEventArgs, NotifyEventArgs, ScriptContainer, StandardService,
    TracingEventSink, VmContext, PLATFORM,
};
