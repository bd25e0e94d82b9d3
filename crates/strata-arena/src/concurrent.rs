//! Spin-locked arena shared between worker threads.
//!
//! Every method on [`ConcurrentArena`] holds the lock for the whole
//! operation, growth included. Errors are returned after the guard has been
//! dropped, so a rejected call never leaves the arena locked.

use strata_core::{ArenaError, SpinGuard, SpinLock};

use crate::arena::{ChunkedArena, Relocation};
use crate::config::ArenaConfig;

/// A [`ChunkedArena`] behind a [`SpinLock`].
///
/// Locked accessors take `&self`. For single-threaded bulk work use
/// [`get_mut`](Self::get_mut), which skips the lock because `&mut self`
/// already rules out concurrent access.
#[derive(Debug)]
pub struct ConcurrentArena {
    inner: SpinLock<ChunkedArena>,
}

// Compile-time assertion: ConcurrentArena must be Send + Sync.
const _: fn() = || {
    fn assert<T: Send + Sync>() {}
    assert::<ConcurrentArena>();
};

impl ConcurrentArena {
    /// Create an empty shared arena.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        Ok(Self::from_arena(ChunkedArena::new(config)?))
    }

    /// Share an existing arena.
    pub fn from_arena(arena: ChunkedArena) -> Self {
        Self {
            inner: SpinLock::new(arena),
        }
    }

    /// Append an element and let `init` fill it while the lock is held.
    pub fn add_with<R>(&self, init: impl FnOnce(usize, &mut [u8]) -> R) -> Result<R, ArenaError> {
        let mut arena = self.inner.lock();
        let (index, slot) = arena.add()?;
        Ok(init(index, slot))
    }

    /// Run `f` over element `index` under the lock.
    pub fn read<R>(&self, index: usize, f: impl FnOnce(&[u8]) -> R) -> Result<R, ArenaError> {
        let arena = self.inner.lock();
        arena.get(index).map(f)
    }

    /// Run `f` over element `index` mutably under the lock.
    pub fn write<R>(&self, index: usize, f: impl FnOnce(&mut [u8]) -> R) -> Result<R, ArenaError> {
        let mut arena = self.inner.lock();
        arena.get_mut(index).map(f)
    }

    /// Locked [`ChunkedArena::remove`].
    pub fn remove(&self, index: usize) -> Result<(), ArenaError> {
        self.inner.lock().remove(index)
    }

    /// Locked [`ChunkedArena::swap_last_and_remove`].
    pub fn swap_last_and_remove(&self, index: usize) -> Result<Option<Relocation>, ArenaError> {
        self.inner.lock().swap_last_and_remove(index)
    }

    /// Locked [`ChunkedArena::extend`].
    pub fn extend(&self, additional: usize) -> Result<(), ArenaError> {
        self.inner.lock().extend(additional)
    }

    /// Locked element count.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Locked emptiness check.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Hold the lock across several operations.
    pub fn lock(&self) -> SpinGuard<'_, ChunkedArena> {
        self.inner.lock()
    }

    /// Unlocked exclusive access.
    pub fn get_mut(&mut self) -> &mut ChunkedArena {
        self.inner.get_mut()
    }

    /// Unwrap the arena.
    pub fn into_inner(self) -> ChunkedArena {
        self.inner.into_inner()
    }
}
