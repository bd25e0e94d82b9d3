//! The operation set shared by both index forms.

use strata_core::{ArenaError, InvariantViolation, SlotIndex};

use crate::key::NodeKey;
use crate::tree::ValueMut;

/// Keyed red-black index over arena-resident nodes.
///
/// Implemented by [`OrderedIndex`](crate::OrderedIndex) and
/// [`BucketedIndex`](crate::BucketedIndex). Generic code (the
/// [`ConcurrentIndex`](crate::ConcurrentIndex) wrapper, test fixtures,
/// benchmarks) is written against this trait.
pub trait KeyedIndex {
    /// Key type stored in node headers.
    type Key: NodeKey;

    /// Find or create the node for `key` and return its value region.
    fn set(&mut self, key: Self::Key) -> Result<ValueMut<'_>, ArenaError>;

    /// Find or create the node for `key` and overwrite its value.
    fn insert(&mut self, key: Self::Key, value: &[u8]) -> Result<SlotIndex, ArenaError>;

    /// Remove `key`. Returns `Ok(false)` if it was absent.
    fn remove(&mut self, key: Self::Key) -> Result<bool, ArenaError>;

    /// Whether `key` is present.
    fn contains(&self, key: Self::Key) -> bool;

    /// Value bytes for `key`.
    fn try_get_value(&self, key: Self::Key) -> Option<&[u8]>;

    /// Mutable value bytes for `key`; marks the node dirty.
    fn try_get_value_mut(&mut self, key: Self::Key) -> Option<&mut [u8]>;

    /// Current slot of `key`. Valid until the next removal.
    fn index_of(&self, key: Self::Key) -> Option<SlotIndex>;

    /// Key and value stored at arena position `index` (arena order).
    fn get_by_index(&self, index: usize) -> Result<(Self::Key, &[u8]), ArenaError>;

    /// Number of live nodes.
    fn len(&self) -> usize;

    /// Whether the index holds no nodes.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes of value stored per node.
    fn value_size(&self) -> usize;

    /// Pre-grow storage for `additional` more nodes.
    fn extend(&mut self, additional: usize) -> Result<(), ArenaError>;

    /// Forget every node in O(buckets).
    fn clear(&mut self);

    /// Walk every tree and verify the structural invariants.
    fn check(&self) -> Result<(), InvariantViolation>;
}

/// Implement [`KeyedIndex`] for an index type by forwarding to its
/// inherent methods of the same names.
macro_rules! impl_keyed_index {
    ($ty:ident) => {
        impl<K: $crate::key::NodeKey> $crate::traits::KeyedIndex for $ty<K> {
            type Key = K;

            fn set(
                &mut self,
                key: K,
            ) -> Result<$crate::tree::ValueMut<'_>, strata_core::ArenaError> {
                $ty::set(self, key)
            }

            fn insert(
                &mut self,
                key: K,
                value: &[u8],
            ) -> Result<strata_core::SlotIndex, strata_core::ArenaError> {
                $ty::insert(self, key, value)
            }

            fn remove(&mut self, key: K) -> Result<bool, strata_core::ArenaError> {
                $ty::remove(self, key)
            }

            fn contains(&self, key: K) -> bool {
                $ty::contains(self, key)
            }

            fn try_get_value(&self, key: K) -> Option<&[u8]> {
                $ty::try_get_value(self, key)
            }

            fn try_get_value_mut(&mut self, key: K) -> Option<&mut [u8]> {
                $ty::try_get_value_mut(self, key)
            }

            fn index_of(&self, key: K) -> Option<strata_core::SlotIndex> {
                $ty::index_of(self, key)
            }

            fn get_by_index(&self, index: usize) -> Result<(K, &[u8]), strata_core::ArenaError> {
                $ty::get_by_index(self, index)
            }

            fn len(&self) -> usize {
                $ty::len(self)
            }

            fn value_size(&self) -> usize {
                $ty::value_size(self)
            }

            fn extend(&mut self, additional: usize) -> Result<(), strata_core::ArenaError> {
                $ty::extend(self, additional)
            }

            fn clear(&mut self) {
                $ty::clear(self)
            }

            fn check(&self) -> Result<(), strata_core::InvariantViolation> {
                $ty::check(self)
            }
        }
    };
}

pub(crate) use impl_keyed_index;
