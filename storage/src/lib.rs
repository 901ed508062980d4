//! Storage for the Halcyon contract interop layer: the global state host functions read from and
//! the tracking copy each invocation buffers its changes in.

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![warn(missing_docs)]

/// Ordered logs of state changes.
pub mod effects;
/// Global state logic.
pub mod global_state;
/// Tracking copy.
pub mod tracking_copy;

pub use effects::{Effects, Transform, TransformKind};
pub use tracking_copy::{TrackingCopy, TrackingCopyError, TrackingCopyExt};
