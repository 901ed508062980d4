//! Weights of cached reads, used to bound the read cache of a `TrackingCopy`.
use super::byte_size::ByteSize;

/// Assigns each cached key/value pair a weight counted against the cache limit.
pub trait Meter<K, V> {
    fn measure(&self, key: &K, value: &V) -> usize;
}

/// Weighs an entry by its approximate memory footprint.
pub struct HeapSize;

impl<K: ByteSize, V: ByteSize> Meter<K, V> for HeapSize {
    fn measure(&self, key: &K, value: &V) -> usize {
        key.byte_size() + value.byte_size()
    }
}

/// Weighs every entry as one, turning the cache limit into an entry count.
#[cfg(test)]
pub struct Count;

#[cfg(test)]
impl<K, V> Meter<K, V> for Count {
    fn measure(&self, _key: &K, _value: &V) -> usize {
        1
    }
}
