//! Red-black ordered indices whose nodes live inside a chunked arena.
//!
//! # Architecture
//!
//! ```text
//! OrderedIndex<K>   ─┐
//! BucketedIndex<K>  ─┼─ Forest<K, RootTable> ── ChunkedArena (one slot per node)
//!                    │
//! ConcurrentIndex<I: KeyedIndex> = SpinLock<I>
//! ```
//!
//! A slot is laid out as
//!
//! ```text
//! 0       4      8       12      16     17        17+K::SIZE
//! parent  left   right   index   flags  key ...   value (value_size bytes)
//! ```
//!
//! with links stored as little-endian `u32` slot numbers and `u32::MAX`
//! meaning "none". Nodes carry no pointers, only slot numbers, so the arena
//! can grow without fix-ups. Removal compacts the arena by moving the last
//! node into the freed slot and re-pointing its neighbours; slot indices
//! handed out earlier are therefore only valid until the next removal.
//!
//! [`BucketedIndex`] splits keys over `map_length` independent trees chosen
//! by [`key_hash`], all sharing the same arena.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod traits;

pub mod bucketed;
mod check;
pub mod concurrent;
pub mod config;
mod iter;
pub mod key;
mod node;
pub mod ordered;
mod roots;
mod tree;

// Public re-exports for the primary API surface.
pub use bucketed::BucketedIndex;
pub use concurrent::ConcurrentIndex;
pub use config::IndexConfig;
pub use key::{key_hash, NodeKey};
pub use node::NODE_HEADER;
pub use ordered::OrderedIndex;
pub use traits::KeyedIndex;
pub use tree::ValueMut;

pub use strata_core::{ArenaError, InvariantViolation, SlotIndex};
