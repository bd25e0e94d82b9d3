//! Root reference tables: one root, or one per hash bucket.

use crate::key::{key_hash, NodeKey};

/// Where a forest keeps its tree roots.
///
/// Roots are resolved from a key, not stored per node, so a node relocated
/// by swap compaction finds its root again by re-hashing its own key.
pub(crate) trait RootTable {
    /// Number of independent roots.
    fn bucket_count(&self) -> usize;

    /// The bucket a key belongs to. Must be pure.
    fn bucket_of<K: NodeKey>(&self, key: K) -> usize;

    fn root(&self, bucket: usize) -> Option<u32>;

    fn set_root(&mut self, bucket: usize, root: Option<u32>);

    /// Forget every root in O(buckets).
    fn clear(&mut self);
}

/// A single tree.
#[derive(Debug, Default)]
pub(crate) struct SingleRoot {
    root: Option<u32>,
}

impl RootTable for SingleRoot {
    #[inline]
    fn bucket_count(&self) -> usize {
        1
    }

    #[inline]
    fn bucket_of<K: NodeKey>(&self, _key: K) -> usize {
        0
    }

    #[inline]
    fn root(&self, _bucket: usize) -> Option<u32> {
        self.root
    }

    #[inline]
    fn set_root(&mut self, _bucket: usize, root: Option<u32>) {
        self.root = root;
    }

    fn clear(&mut self) {
        self.root = None;
    }
}

/// `map_length` trees selected by `key_hash(key) % map_length`.
#[derive(Debug)]
pub(crate) struct HashedRoots {
    roots: Vec<Option<u32>>,
}

impl HashedRoots {
    /// `map_length` must be non-zero; callers validate it first.
    pub(crate) fn new(map_length: usize) -> Self {
        Self {
            roots: vec![None; map_length],
        }
    }
}

impl RootTable for HashedRoots {
    #[inline]
    fn bucket_count(&self) -> usize {
        self.roots.len()
    }

    #[inline]
    fn bucket_of<K: NodeKey>(&self, key: K) -> usize {
        (key_hash(key) % self.roots.len() as u64) as usize
    }

    #[inline]
    fn root(&self, bucket: usize) -> Option<u32> {
        self.roots[bucket]
    }

    #[inline]
    fn set_root(&mut self, bucket: usize, root: Option<u32>) {
        self.roots[bucket] = root;
    }

    fn clear(&mut self) {
        self.roots.fill(None);
    }
}
