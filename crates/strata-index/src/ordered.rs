//! Single-root red-black index.

use strata_core::{ArenaError, InvariantViolation, SlotIndex};

use crate::config::IndexConfig;
use crate::iter::InOrder;
use crate::key::NodeKey;
use crate::roots::{RootTable, SingleRoot};
use crate::traits::impl_keyed_index;
use crate::tree::{Forest, ValueMut};

/// Red-black tree whose nodes live in the slots of one chunked arena.
///
/// Each slot holds a node header, the key, and `value_size` caller-owned
/// bytes. Slot indices are not stable across [`remove`](Self::remove):
/// freeing a node moves the arena's last node into its slot.
///
/// # Examples
///
/// ```
/// use strata_index::{IndexConfig, OrderedIndex};
///
/// let mut index = OrderedIndex::<u32>::new(IndexConfig::new(4)).unwrap();
/// index.insert(14, &7u32.to_le_bytes()).unwrap();
/// assert!(index.contains(14));
/// assert_eq!(index.try_get_value(14), Some(&7u32.to_le_bytes()[..]));
/// assert!(index.remove(14).unwrap());
/// assert!(index.is_empty());
/// ```
pub struct OrderedIndex<K: NodeKey> {
    forest: Forest<K, SingleRoot>,
}

impl<K: NodeKey> OrderedIndex<K> {
    /// Create an empty index.
    pub fn new(config: IndexConfig) -> Result<Self, ArenaError> {
        Ok(Self {
            forest: Forest::new(&config, SingleRoot::default())?,
        })
    }

    /// Find or create the node for `key`.
    ///
    /// An existing key is returned untouched with `inserted == false`. A new
    /// key gets a zeroed value region and the tree is rebalanced before
    /// this returns.
    pub fn set(&mut self, key: K) -> Result<ValueMut<'_>, ArenaError> {
        self.forest.set(key)
    }

    /// Find or create the node for `key` and overwrite its value with
    /// `value`, zero-padding to `value_size`.
    ///
    /// Returns `Err(InvalidArgument)` before any mutation if `value` is
    /// longer than `value_size`.
    pub fn insert(&mut self, key: K, value: &[u8]) -> Result<SlotIndex, ArenaError> {
        self.forest.insert(key, value)
    }

    /// Remove `key`, rebalancing and compacting the arena.
    ///
    /// Returns `Ok(false)` without mutating if `key` is absent.
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

    /// Current arena slot of `key`.
    pub fn index_of(&self, key: K) -> Option<SlotIndex> {
        self.forest.find(key).map(SlotIndex)
    }

    /// Key and value at arena position `index`. Arena order is unrelated to
    /// key order.
    pub fn get_by_index(&self, index: usize) -> Result<(K, &[u8]), ArenaError> {
        self.forest.get_by_index(index)
    }

    /// Number of live nodes.
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

    /// Smallest key, if any.
    pub fn min_key(&self) -> Option<K> {
        let root = self.forest.roots.root(0)?;
        Some(self.forest.key(self.forest.minimum(root)))
    }

    /// Largest key, if any.
    pub fn max_key(&self) -> Option<K> {
        let root = self.forest.roots.root(0)?;
        Some(self.forest.key(self.forest.maximum(root)))
    }

    /// Ascending `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (K, &[u8])> + '_ {
        InOrder::new(&self.forest, self.forest.roots.root(0))
    }

    /// Whether `key`'s node is dirty, or `None` if absent.
    ///
    /// A node is dirty from creation, from a mutable value borrow or an
    /// `insert`, and whenever removal moves its bytes, until
    /// [`clear_dirty`](Self::clear_dirty).
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

    /// Drop every node in O(1); arena chunks are kept.
    pub fn clear(&mut self) {
        self.forest.clear();
    }

    /// Release all storage. Later operations fail with
    /// [`ArenaError::UseAfterFree`] in debug builds.
    pub fn dispose(&mut self) {
        self.forest.dispose();
    }

    /// Verify every red-black and arena invariant. For tests and debugging.
    pub fn check(&self) -> Result<(), InvariantViolation> {
        self.forest.check()
    }

    /// Number of arena chunks allocated.
    pub fn chunk_count(&self) -> usize {
        self.forest.arena.chunk_count()
    }

    /// Memory held by the arena and root table, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.forest.memory_bytes()
    }
}

impl<K: NodeKey> std::fmt::Debug for OrderedIndex<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OrderedIndex")
            .field("len", &self.len())
            .field("value_size", &self.value_size())
            .field("chunks", &self.chunk_count())
            .finish()
    }
}

impl_keyed_index!(OrderedIndex);
