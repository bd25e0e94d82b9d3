//! Strata: chunked arena storage and arena-resident red-black indices.
//!
//! This is the top-level facade crate that re-exports the public API from all
//! Strata sub-crates.
//!
//! # Quick start
//!
//! ```rust
//! use strata::prelude::*;
//!
//! // 8-byte values keyed by u32, spread over 16 trees.
//! let mut index = BucketedIndex::<u32>::new(IndexConfig::new(8).with_map_length(16)).unwrap();
//! for key in [2, 14, 1, 65, 32, 7] {
//!     index.insert(key, &u64::from(key).to_le_bytes()).unwrap();
//! }
//! assert!(index.contains(65));
//! assert!(!index.contains(64));
//! assert_eq!(index.try_get_value(14), Some(&14u64.to_le_bytes()[..]));
//!
//! index.remove(14).unwrap();
//! index.check().unwrap();
//!
//! // Raw fixed-size element storage.
//! let mut arena = ChunkedArena::new(ArenaConfig::new(4).with_chunk_size(16)).unwrap();
//! for i in 0..21u32 {
//!     let (_, slot) = arena.add().unwrap();
//!     slot.copy_from_slice(&i.to_le_bytes());
//! }
//! assert_eq!(arena.chunk_count(), 6);
//! ```
//!
//! # Modules
//!
//! | Module | Sub-crate | Contents |
//! |--------|-----------|----------|
//! | [`arena`] | `strata-arena` | `ChunkedArena`, `ConcurrentArena`, `ArenaConfig` |
//! | [`index`] | `strata-index` | `OrderedIndex`, `BucketedIndex`, `ConcurrentIndex`, `KeyedIndex` |
//! | [`types`] | `strata-core` | Errors, slot ids, `SpinLock` |

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

/// Chunked element storage (`strata-arena`).
pub use strata_arena as arena;

/// Arena-resident red-black indices (`strata-index`).
///
/// [`index::OrderedIndex`] keeps one tree; [`index::BucketedIndex`] keeps
/// one tree per hash bucket. Both implement [`index::KeyedIndex`], which is
/// what [`index::ConcurrentIndex`] wraps.
pub use strata_index as index;

/// Errors, slot identifiers and the spin-lock (`strata-core`).
pub use strata_core as types;

/// Common imports for typical Strata usage.
///
/// ```rust
/// use strata::prelude::*;
/// ```
pub mod prelude {
    // Storage
    pub use strata_arena::{ArenaConfig, ChunkedArena, ConcurrentArena, Relocation};

    // Indices
    pub use strata_index::{
        BucketedIndex, ConcurrentIndex, IndexConfig, KeyedIndex, NodeKey, OrderedIndex, ValueMut,
    };

    // Errors and ids
    pub use strata_core::{ArenaError, InvariantViolation, SlotIndex};
}
