//! Growable chunked storage arena for fixed-size, individually addressable
//! elements.
//!
//! # Architecture
//!
//! ```text
//! ChunkedArena
//! ├── chunk table: Vec<Chunk> (headroom 32, doubled when exceeded)
//! │   └── Chunk (Box<[u8]>, zeroed, never moved once allocated)
//! └── len / element_size / chunk_size / ExistenceMark
//!
//! ConcurrentArena = SpinLock<ChunkedArena>
//! ```
//!
//! Element `i` lives in chunk `i / elements_per_chunk` at byte offset
//! `(i % elements_per_chunk) * element_size`. Growth only appends chunks to
//! the table, so slot bytes never move while the arena grows. Removal is
//! different: [`ChunkedArena::swap_last_and_remove`] copies the last element
//! over the removed one, so any removal may relocate an unrelated element.
//!
//! # Checked overlay
//!
//! Index bounds are checked in every build. Use-after-dispose detection
//! compares the arena's [`ExistenceMark`](strata_core::ExistenceMark) state
//! and is compiled only with `debug_assertions`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod arena;
pub mod chunk;
pub mod concurrent;
pub mod config;

// Public re-exports for the primary API surface.
pub use arena::{ChunkedArena, Relocation};
pub use concurrent::ConcurrentArena;
pub use config::ArenaConfig;
pub use strata_core::ArenaError;
