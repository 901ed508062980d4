//! The ordered log of state changes produced while executing against a `TrackingCopy`.

use datasize::DataSize;

use halcyon_types::{Key, StoredValue};

/// The kind of change applied to a single key.
#[derive(Clone, Debug, PartialEq, Eq, DataSize)]
pub enum TransformKind {
    /// The value was read; no change.
    Identity,
    /// The value was replaced.
    Write(StoredValue),
    /// The value was deleted.
    Prune,
}

/// A change applied to the value under a key.
#[derive(Clone, Debug, PartialEq, Eq, DataSize)]
pub struct Transform {
    key: Key,
    kind: TransformKind,
}

impl Transform {
    /// Constructs a new `Transform`.
    pub fn new(key: Key, kind: TransformKind) -> Self {
        Transform { key, kind }
    }

    /// The key the transform applies to.
    pub fn key(&self) -> &Key {
        &self.key
    }

    /// The change applied.
    pub fn kind(&self) -> &TransformKind {
        &self.kind
    }

    /// Consumes `self`, returning its components.
    pub fn destructure(self) -> (Key, TransformKind) {
        (self.key, self.kind)
    }
}

/// A log of all transforms produced during execution, in the order they were made.
#[derive(Clone, Debug, Default, PartialEq, Eq, DataSize)]
pub struct Effects(Vec<Transform>);

impl Effects {
    /// Constructs a new, empty `Effects`.
    pub const fn new() -> Self {
        Effects(vec![])
    }

    /// Returns a reference to the transforms.
    pub fn transforms(&self) -> &[Transform] {
        &self.0
    }

    /// Appends a transform.
    pub fn push(&mut self, transform: Transform) {
        self.0.push(transform)
    }

    /// Returns `true` if there are no transforms recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of transforms recorded.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Consumes `self`, returning the wrapped vec.
    pub fn value(self) -> Vec<Transform> {
        self.0
    }
}
