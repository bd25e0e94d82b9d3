//! Test fixtures and a reference model for Strata development.
//!
//! [`Model`] mirrors a [`KeyedIndex`] with an [`IndexMap`] so randomized
//! tests can compare contents after every step. [`assert_valid`] turns a
//! failed `check()` into a panic carrying the violated rule.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod fixtures;

use indexmap::IndexMap;
use strata_index::KeyedIndex;

pub use fixtures::{random_keys, random_ops, seeded_rng, shuffled_range, value_for, Op};

/// Panic with the violated invariant if `index` fails its consistency walk.
#[track_caller]
pub fn assert_valid<I: KeyedIndex>(index: &I) {
    if let Err(violation) = index.check() {
        panic!("index invariant violated: {violation}");
    }
}

/// Reference contents for a `u32`-keyed index.
#[derive(Debug, Default)]
pub struct Model {
    entries: IndexMap<u32, Vec<u8>>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an insert, padding `value` to `value_size` the way the index
    /// does. Returns whether the key was new.
    pub fn insert(&mut self, key: u32, value: &[u8], value_size: usize) -> bool {
        let mut padded = value.to_vec();
        padded.resize(value_size, 0);
        self.entries.insert(key, padded).is_none()
    }

    /// Record a removal. Returns whether the key was present.
    pub fn remove(&mut self, key: u32) -> bool {
        self.entries.swap_remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: u32) -> bool {
        self.entries.contains_key(&key)
    }

    /// Keys in ascending order.
    pub fn sorted_keys(&self) -> Vec<u32> {
        let mut keys: Vec<u32> = self.entries.keys().copied().collect();
        keys.sort_unstable();
        keys
    }

    /// Panic unless `index` holds exactly this model's entries.
    #[track_caller]
    pub fn assert_matches<I: KeyedIndex<Key = u32>>(&self, index: &I) {
        assert_eq!(index.len(), self.len(), "node count differs from model");
        for (&key, value) in &self.entries {
            assert_eq!(
                index.try_get_value(key),
                Some(value.as_slice()),
                "value for key {key} differs from model"
            );
        }
        for i in 0..index.len() {
            let (key, _) = index
                .get_by_index(i)
                .unwrap_or_else(|e| panic!("slot {i} unreadable: {e}"));
            assert!(self.contains(key), "index holds key {key} absent from model");
        }
    }

    /// Apply `op` to both `index` and the model, checking that they agree on
    /// whether the key was present.
    #[track_caller]
    pub fn apply<I: KeyedIndex<Key = u32>>(&mut self, index: &mut I, op: Op) {
        match op {
            Op::Insert(key) => {
                let value = value_for(key, index.value_size());
                let existed = index.contains(key);
                index
                    .insert(key, &value)
                    .unwrap_or_else(|e| panic!("insert {key} failed: {e}"));
                assert_eq!(self.insert(key, &value, index.value_size()), !existed);
            }
            Op::Remove(key) => {
                let removed = index
                    .remove(key)
                    .unwrap_or_else(|e| panic!("remove {key} failed: {e}"));
                assert_eq!(removed, self.remove(key), "remove {key} disagrees with model");
            }
        }
    }
}
