//! Values exchanged between contract code and host interop functions.

mod interop;
mod serialization;

use std::{cell::RefCell, rc::Rc};

use num_bigint::BigInt;
use num_traits::{One, Zero};

pub use interop::{InteropInterface, InteropKind};
pub use serialization::{
    deserialize, deserialize_with_limits, serialize, serialize_with_limits, DecodeError,
    EncodeError, StackValueLimits, StackValueTag, MAX_ARRAY_SIZE, MAX_ITEM_SIZE,
};

/// Shared, mutable element list of an `Array` or `Struct`.
pub type Items = Rc<RefCell<Vec<StackValue>>>;

/// A value on the VM evaluation stack.
///
/// `Array`, `Struct` and `Map` are reference types: cloning a `StackValue` clones the reference,
/// not the elements, so containers may be shared and may contain themselves.
///
/// `PartialEq` compares containers structurally and must not be used on cyclic values. Map keys
/// are matched with [`StackValue::key_eq`], which compares containers by identity.
#[derive(Clone, Debug)]
pub enum StackValue {
    /// Raw bytes.
    ByteString(Vec<u8>),
    /// A boolean.
    Boolean(bool),
    /// An arbitrary-precision signed integer.
    Integer(BigInt),
    /// An opaque reference to a host object. Never serializable.
    Handle(InteropInterface),
    /// An ordered sequence with reference semantics.
    Array(Items),
    /// An ordered sequence; shares the layout of `Array` but carries a distinct tag.
    Struct(Items),
    /// Key/value pairs in insertion order.
    Map(Rc<RefCell<StackMap>>),
}

impl StackValue {
    /// Constructs an `Array` holding `items`.
    pub fn array(items: Vec<StackValue>) -> Self {
        StackValue::Array(Rc::new(RefCell::new(items)))
    }

    /// Constructs a `Struct` holding `items`.
    pub fn structure(items: Vec<StackValue>) -> Self {
        StackValue::Struct(Rc::new(RefCell::new(items)))
    }

    /// Constructs a `Map` holding `map`.
    pub fn map(map: StackMap) -> Self {
        StackValue::Map(Rc::new(RefCell::new(map)))
    }

    /// Returns the variant name, for use in logs and errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            StackValue::ByteString(_) => "ByteString",
            StackValue::Boolean(_) => "Boolean",
            StackValue::Integer(_) => "Integer",
            StackValue::Handle(_) => "Handle",
            StackValue::Array(_) => "Array",
            StackValue::Struct(_) => "Struct",
            StackValue::Map(_) => "Map",
        }
    }

    /// Returns the value as a byte string, or `None` for containers and handles.
    ///
    /// `true` converts to `[1]`, `false` to `[]`, and integers to their minimal little-endian
    /// two's-complement form, with zero as `[]`.
    pub fn as_bytes(&self) -> Option<Vec<u8>> {
        match self {
            StackValue::ByteString(bytes) => Some(bytes.clone()),
            StackValue::Boolean(true) => Some(vec![1]),
            StackValue::Boolean(false) => Some(Vec::new()),
            StackValue::Integer(value) => Some(integer_to_bytes(value)),
            StackValue::Handle(_)
            | StackValue::Array(_)
            | StackValue::Struct(_)
            | StackValue::Map(_) => None,
        }
    }

    /// Returns the value as an integer, or `None` for containers and handles.
    ///
    /// Byte strings are read as little-endian two's complement; the empty string is zero.
    pub fn as_integer(&self) -> Option<BigInt> {
        match self {
            StackValue::Integer(value) => Some(value.clone()),
            StackValue::Boolean(true) => Some(BigInt::one()),
            StackValue::Boolean(false) => Some(BigInt::zero()),
            StackValue::ByteString(bytes) => Some(integer_from_bytes(bytes)),
            StackValue::Handle(_)
            | StackValue::Array(_)
            | StackValue::Struct(_)
            | StackValue::Map(_) => None,
        }
    }

    /// Returns the wrapped host object if this is a `Handle`.
    pub fn as_handle(&self) -> Option<&InteropInterface> {
        match self {
            StackValue::Handle(handle) => Some(handle),
            _ => None,
        }
    }

    /// Equality used for map keys: primitives compare by value within the same variant, while
    /// containers and handles compare by identity.
    pub fn key_eq(&self, other: &StackValue) -> bool {
        match (self, other) {
            (StackValue::ByteString(left), StackValue::ByteString(right)) => left == right,
            (StackValue::Boolean(left), StackValue::Boolean(right)) => left == right,
            (StackValue::Integer(left), StackValue::Integer(right)) => left == right,
            (StackValue::Handle(left), StackValue::Handle(right)) => left.ptr_eq(right),
            (StackValue::Array(left), StackValue::Array(right))
            | (StackValue::Struct(left), StackValue::Struct(right)) => Rc::ptr_eq(left, right),
            (StackValue::Map(left), StackValue::Map(right)) => Rc::ptr_eq(left, right),
            _ => false,
        }
    }

    /// Returns an address identifying the container, or `None` for non-container values.
    pub(crate) fn container_id(&self) -> Option<usize> {
        match self {
            StackValue::Array(items) | StackValue::Struct(items) => {
                Some(Rc::as_ptr(items) as *const () as usize)
            }
            StackValue::Map(map) => Some(Rc::as_ptr(map) as *const () as usize),
            _ => None,
        }
    }
}

impl PartialEq for StackValue {
    fn eq(&self, other: &StackValue) -> bool {
        match (self, other) {
            (StackValue::ByteString(left), StackValue::ByteString(right)) => left == right,
            (StackValue::Boolean(left), StackValue::Boolean(right)) => left == right,
            (StackValue::Integer(left), StackValue::Integer(right)) => left == right,
            (StackValue::Handle(left), StackValue::Handle(right)) => left.ptr_eq(right),
            (StackValue::Array(left), StackValue::Array(right))
            | (StackValue::Struct(left), StackValue::Struct(right)) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            }
            (StackValue::Map(left), StackValue::Map(right)) => {
                Rc::ptr_eq(left, right) || *left.borrow() == *right.borrow()
            }
            _ => false,
        }
    }
}

impl From<Vec<u8>> for StackValue {
    fn from(bytes: Vec<u8>) -> Self {
        StackValue::ByteString(bytes)
    }
}

impl From<&[u8]> for StackValue {
    fn from(bytes: &[u8]) -> Self {
        StackValue::ByteString(bytes.to_vec())
    }
}

impl From<bool> for StackValue {
    fn from(value: bool) -> Self {
        StackValue::Boolean(value)
    }
}

impl From<BigInt> for StackValue {
    fn from(value: BigInt) -> Self {
        StackValue::Integer(value)
    }
}

impl From<i64> for StackValue {
    fn from(value: i64) -> Self {
        StackValue::Integer(BigInt::from(value))
    }
}

impl From<u32> for StackValue {
    fn from(value: u32) -> Self {
        StackValue::Integer(BigInt::from(value))
    }
}

impl From<InteropInterface> for StackValue {
    fn from(handle: InteropInterface) -> Self {
        StackValue::Handle(handle)
    }
}

/// Returns the minimal little-endian two's-complement encoding of `value`; zero is empty.
pub(crate) fn integer_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        Vec::new()
    } else {
        value.to_signed_bytes_le()
    }
}

/// Reads little-endian two's-complement bytes; the empty slice is zero.
pub(crate) fn integer_from_bytes(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        BigInt::zero()
    } else {
        BigInt::from_signed_bytes_le(bytes)
    }
}

/// The pairs of a `Map` value, kept in insertion order with keys unique under
/// [`StackValue::key_eq`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StackMap {
    entries: Vec<(StackValue, StackValue)>,
}

impl StackMap {
    /// Constructs an empty map.
    pub fn new() -> Self {
        StackMap::default()
    }

    /// Returns the number of pairs.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the map holds no pairs.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &StackValue) -> Option<&StackValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing.key_eq(key))
            .map(|(_, value)| value)
    }

    /// Returns `true` if `key` is present.
    pub fn contains_key(&self, key: &StackValue) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`, returning the previous value.
    ///
    /// Replacing an existing key keeps its original position.
    pub fn insert(&mut self, key: StackValue, value: StackValue) -> Option<StackValue> {
        match self
            .entries
            .iter_mut()
            .find(|(existing, _)| existing.key_eq(&key))
        {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &StackValue) -> Option<StackValue> {
        let position = self
            .entries
            .iter()
            .position(|(existing, _)| existing.key_eq(key))?;
        Some(self.entries.remove(position).1)
    }

    /// Iterates the pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&StackValue, &StackValue)> {
        self.entries.iter().map(|(key, value)| (key, value))
    }
}
