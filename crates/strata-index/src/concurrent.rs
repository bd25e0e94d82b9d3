//! Spin-locked index for parallel-for style writers.
//!
//! Each call acquires the lock for one complete structural operation:
//! search, node allocation, rebalancing and swap compaction all happen
//! under the same guard. Readers take the lock too; there is no lock-free
//! lookup path.

use strata_core::{ArenaError, InvariantViolation, SpinGuard, SpinLock};

use crate::traits::KeyedIndex;

/// Any [`KeyedIndex`] behind a [`SpinLock`].
///
/// Slot indices returned by one call may be invalidated by a removal on
/// another thread before the caller uses them, so the closure-taking
/// methods hand out value bytes only while the lock is held.
///
/// # Examples
///
/// ```
/// use strata_index::{ConcurrentIndex, IndexConfig, OrderedIndex};
///
/// let index = ConcurrentIndex::new(OrderedIndex::<u64>::new(IndexConfig::new(8)).unwrap());
/// std::thread::scope(|s| {
///     for t in 0..4u64 {
///         let index = &index;
///         s.spawn(move || index.insert(t, &t.to_le_bytes()).unwrap());
///     }
/// });
/// assert_eq!(index.len(), 4);
/// ```
#[derive(Debug)]
pub struct ConcurrentIndex<I> {
    inner: SpinLock<I>,
}

// Compile-time assertion: the shared forms must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ConcurrentIndex<crate::OrderedIndex<u64>>>();
    assert::<ConcurrentIndex<crate::BucketedIndex<[u8; 16]>>>();
};

impl<I: KeyedIndex> ConcurrentIndex<I> {
    /// Share `index` between threads.
    pub fn new(index: I) -> Self {
        Self {
            inner: SpinLock::new(index),
        }
    }

    /// Find or create `key` and run `f` over its value bytes under the lock.
    ///
    /// `f` receives `true` if this call created the node.
    pub fn set_with<R>(
        &self,
        key: I::Key,
        f: impl FnOnce(bool, &mut [u8]) -> R,
    ) -> Result<R, ArenaError> {
        let mut index = self.inner.lock();
        let slot = index.set(key)?;
        Ok(f(slot.inserted, slot.value))
    }

    /// Locked [`KeyedIndex::insert`]. Returns whether `key` was new.
    pub fn insert(&self, key: I::Key, value: &[u8]) -> Result<bool, ArenaError> {
        let mut index = self.inner.lock();
        let existed = index.contains(key);
        index.insert(key, value)?;
        Ok(!existed)
    }

    /// Locked [`KeyedIndex::remove`].
    pub fn remove(&self, key: I::Key) -> Result<bool, ArenaError> {
        self.inner.lock().remove(key)
    }

    /// Locked [`KeyedIndex::contains`].
    pub fn contains(&self, key: I::Key) -> bool {
        self.inner.lock().contains(key)
    }

    /// Run `f` over `key`'s value bytes under the lock.
    pub fn read_value<R>(&self, key: I::Key, f: impl FnOnce(&[u8]) -> R) -> Option<R> {
        let index = self.inner.lock();
        index.try_get_value(key).map(f)
    }

    /// Run `f` over `key`'s mutable value bytes under the lock. Marks the
    /// node dirty.
    pub fn write_value<R>(&self, key: I::Key, f: impl FnOnce(&mut [u8]) -> R) -> Option<R> {
        let mut index = self.inner.lock();
        index.try_get_value_mut(key).map(f)
    }

    /// Locked node count.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Locked emptiness check.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Locked [`KeyedIndex::extend`].
    pub fn extend(&self, additional: usize) -> Result<(), ArenaError> {
        self.inner.lock().extend(additional)
    }

    /// Locked [`KeyedIndex::clear`].
    pub fn clear(&self) {
        self.inner.lock().clear();
    }

    /// Locked [`KeyedIndex::check`].
    pub fn check(&self) -> Result<(), InvariantViolation> {
        self.inner.lock().check()
    }

    /// Hold the lock across several operations.
    pub fn lock(&self) -> SpinGuard<'_, I> {
        self.inner.lock()
    }

    /// Unlocked exclusive access.
    pub fn get_mut(&mut self) -> &mut I {
        self.inner.get_mut()
    }

    /// Unwrap the index.
    pub fn into_inner(self) -> I {
        self.inner.into_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BucketedIndex, IndexConfig, OrderedIndex};

    fn ordered() -> ConcurrentIndex<OrderedIndex<u64>> {
        ConcurrentIndex::new(OrderedIndex::new(IndexConfig::new(8).with_chunk_size(1024)).unwrap())
    }

    #[test]
    fn parallel_disjoint_inserts() {
        let index = ordered();
        std::thread::scope(|s| {
            for t in 0..8u64 {
                let index = &index;
                s.spawn(move || {
                    for i in 0..250u64 {
                        let key = t * 1000 + i;
                        assert!(index.insert(key, &key.to_le_bytes()).unwrap());
                    }
                });
            }
        });
        assert_eq!(index.len(), 2000);
        index.check().unwrap();
        assert_eq!(
            index.read_value(7042, |v| v.to_vec()),
            Some(7042u64.to_le_bytes().to_vec())
        );
    }

    #[test]
    fn parallel_overlapping_set_counts_once() {
        let index = ConcurrentIndex::new(
            BucketedIndex::<u64>::new(IndexConfig::new(8).with_map_length(16)).unwrap(),
        );
        std::thread::scope(|s| {
            for _ in 0..4 {
                let index = &index;
                s.spawn(move || {
                    for key in 0..300u64 {
                        index
                            .set_with(key, |_, v| {
                                let n = u64::from_le_bytes(v[..8].try_into().unwrap());
                                v.copy_from_slice(&(n + 1).to_le_bytes());
                            })
                            .unwrap();
                    }
                });
            }
        });
        assert_eq!(index.len(), 300);
        index.check().unwrap();
        for key in 0..300u64 {
            assert_eq!(index.read_value(key, |v| v[0]), Some(4));
        }
    }

    #[test]
    fn parallel_mixed_insert_and_remove() {
        let index = ordered();
        for key in 0..1000u64 {
            index.insert(key, &[0; 8]).unwrap();
        }
        std::thread::scope(|s| {
            for t in 0..4u64 {
                let index = &index;
                s.spawn(move || {
                    for key in (t..1000).step_by(4) {
                        if key % 2 == 0 {
                            assert!(index.remove(key).unwrap());
                        } else {
                            index.write_value(key, |v| v[0] = 1).unwrap();
                        }
                    }
                });
            }
        });
        index.check().unwrap();
        assert_eq!(index.len(), 500);
        assert!(!index.contains(10));
        assert_eq!(index.read_value(11, |v| v[0]), Some(1));
    }

    #[test]
    fn failed_insert_releases_lock() {
        let index = ordered();
        assert!(index.insert(1, &[0; 9]).is_err());
        assert!(!index.inner.is_locked());
        assert!(index.is_empty());
    }

    #[test]
    fn guard_spans_several_operations() {
        let mut index = ordered();
        {
            let mut guard = index.lock();
            guard.insert(1, &[1; 8]).unwrap();
            guard.insert(2, &[2; 8]).unwrap();
            assert_eq!(guard.len(), 2);
        }
        index.get_mut().clear();
        assert!(index.into_inner().is_empty());
    }
}
