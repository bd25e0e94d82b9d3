//! Slot identifiers and the process-wide [`ExistenceMark`] counter.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Raw link value meaning "no slot".
///
/// Stored in node link fields in place of a missing parent or child.
pub const NIL_SLOT: u32 = u32::MAX;

/// Position of an element inside an arena.
///
/// A slot index identifies an element only until the next removal: swap
/// compaction may move the arena's last element into a freed position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SlotIndex(pub u32);

impl SlotIndex {
    /// The index as a `usize`, for arena addressing.
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for SlotIndex {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

/// Counter for unique [`ExistenceMark`] allocation.
static EXISTENCE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique per-instance token distinguishing a live collection from a
/// disposed one.
///
/// Allocated from a monotonic atomic counter via [`ExistenceMark::next`].
/// Two instances never share a mark, even when one reuses the other's
/// memory after disposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ExistenceMark(u64);

impl ExistenceMark {
    /// Allocate a fresh, unique mark. Thread-safe.
    pub fn next() -> Self {
        Self(EXISTENCE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// The raw token value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ExistenceMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
