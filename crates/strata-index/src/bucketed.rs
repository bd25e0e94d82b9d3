//! Hash-bucketed forest of red-black trees sharing one arena.

use strata_core::{ArenaError, InvariantViolation, SlotIndex};

use crate::config::IndexConfig;
use crate::iter::InOrder;
use crate::key::NodeKey;
use crate::roots::{HashedRoots, RootTable};
use crate::traits::impl_keyed_index;
use crate::tree::{Forest, ValueMut};

/// `map_length` red-black trees selected by [`key_hash`](crate::key_hash),
/// with all nodes of all trees packed into one chunked arena.
///
/// Lookups descend only the tree for the key's bucket, so each tree stays
/// roughly `len / map_length` nodes deep. Iteration is ordered within a
/// bucket, not across buckets.
pub struct BucketedIndex<K: NodeKey> {
    forest: Forest<K, HashedRoots>,
}

impl<K: NodeKey> BucketedIndex<K> {
    /// Create an empty index with `config.map_length` buckets.
    pub fn new(config: IndexConfig) -> Result<Self, ArenaError> {
        config.validate::<K>()?;
        let roots = HashedRoots::new(config.map_length);
        Ok(Self {
            forest: Forest::new(&config, roots)?,
        })
    }

    /// Find or create the node for `key` in its bucket's tree.
    pub fn set(&mut self, key: K) -> Result<ValueMut<'_>, ArenaError> {
        self.forest.set(key)
    }

    /// Find or create the node for `key` and overwrite its value,
    /// zero-padding to `value_size`.
    pub fn insert(&mut self, key: K, value: &[u8]) -> Result<SlotIndex, ArenaError> {
        self.forest.insert(key, value)
    }

    /// Remove `key`. Returns `Ok(false)` if it was absent.
    pub fn remove(&mut self, key: K) -> Result<bool, ArenaError> {
        self.forest.remove(key)
    }

    /// Whether `key` is present.
    pub fn contains(&self, key: K) -> bool {
        self.forest.find(key).is_some()
    }

    /// Value bytes for `key`.
    pub fn try_get_value(&self, key: K) -> Option<&[u8]> {
        self.forest.try_get_value(key)
    }

    /// Mutable value bytes for `key`. Marks the node dirty.
    pub fn try_get_value_mut(&mut self, key: K) -> Option<&mut [u8]> {
        self.forest.try_get_value_mut(key)
    }

    /// Current slot of `key`. Valid until the next removal.
    pub fn index_of(&self, key: K) -> Option<SlotIndex> {
        self.forest.find(key).map(SlotIndex)
    }

    /// Key and value at arena position `index`.
    pub fn get_by_index(&self, index: usize) -> Result<(K, &[u8]), ArenaError> {
        self.forest.get_by_index(index)
    }

    /// Number of live nodes across all buckets.
    pub fn len(&self) -> usize {
        self.forest.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Value bytes per node.
    pub fn value_size(&self) -> usize {
        self.forest.value_size()
    }

    /// Number of buckets.
    pub fn map_length(&self) -> usize {
        self.forest.roots.bucket_count()
    }

    /// Bucket that `key` hashes to.
    pub fn bucket_of(&self, key: K) -> usize {
        self.forest.roots.bucket_of(key)
    }

    /// Nodes in `bucket`'s tree; zero for an out-of-range bucket.
    pub fn bucket_len(&self, bucket: usize) -> usize {
        self.iter_bucket(bucket).count()
    }

    /// Ascending `(key, value)` pairs of one bucket. Empty if `bucket` is out
    /// of range.
    pub fn iter_bucket(&self, bucket: usize) -> impl Iterator<Item = (K, &[u8])> + '_ {
        let root = if bucket < self.map_length() {
            self.forest.roots.root(bucket)
        } else {
            None
        };
        InOrder::new(&self.forest, root)
    }

    /// Every `(key, value)` pair, bucket by bucket.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[u8])> + '_ {
        (0..self.map_length()).flat_map(move |b| InOrder::new(&self.forest, self.forest.roots.root(b)))
    }

    /// Whether `key`'s node is dirty, or `None` if absent.
    pub fn is_dirty(&self, key: K) -> Option<bool> {
        self.forest.is_dirty(key)
    }

    /// Slots of all dirty nodes, in arena order.
    pub fn dirty_indices(&self) -> Vec<SlotIndex> {
        self.forest.dirty_indices()
    }

    /// Reset every dirty bit.
    pub fn clear_dirty(&mut self) {
        self.forest.clear_dirty();
    }

    /// Pre-grow storage for `additional` more nodes.
    pub fn extend(&mut self, additional: usize) -> Result<(), ArenaError> {
        self.forest.extend(additional)
    }

    /// Forget every node and reset all bucket roots.
    pub fn clear(&mut self) {
        self.forest.clear();
    }

    /// Release all storage.
    pub fn dispose(&mut self) {
        self.forest.dispose();
    }

    /// Verify the invariants of every bucket's tree, including that each
    /// node sits in the bucket its key hashes to.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        self.forest.check()
    }

    /// Number of arena chunks allocated.
    pub fn chunk_count(&self) -> usize {
        self.forest.arena.chunk_count()
    }

    /// Memory held by the arena and the bucket root table, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.forest.memory_bytes()
    }
}

impl<K: NodeKey> std::fmt::Debug for BucketedIndex<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BucketedIndex")
            .field("len", &self.len())
            .field("value_size", &self.value_size())
            .field("map_length", &self.map_length())
            .field("chunks", &self.chunk_count())
            .finish()
    }
}

impl_keyed_index!(BucketedIndex);
