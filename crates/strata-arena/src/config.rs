//! Arena configuration parameters.

use strata_core::ArenaError;

/// Configuration for a [`ChunkedArena`](crate::ChunkedArena).
///
/// Validated at construction; immutable afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of one element in bytes. Must be non-zero.
    pub element_size: usize,

    /// Requested size of each chunk in bytes.
    ///
    /// Must be at least `element_size`. Rounded down to a multiple of
    /// `element_size` so elements never straddle chunks.
    /// Default: 16 KiB.
    pub chunk_size: usize,
}

impl ArenaConfig {
    /// Default chunk size: 16 KiB.
    pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

    /// Initial number of entries reserved in the chunk table.
    pub const INITIAL_TABLE_CAPACITY: usize = 32;

    /// Create a config for `element_size`-byte elements with the default
    /// chunk size.
    pub fn new(element_size: usize) -> Self {
        Self {
            element_size,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
        }
    }

    /// Override the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Check the sizes for consistency.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.element_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "element_size must be non-zero".into(),
            });
        }
        if self.chunk_size == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "chunk_size must be non-zero".into(),
            });
        }
        if self.element_size > self.chunk_size {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "element_size {} exceeds chunk_size {}",
                    self.element_size, self.chunk_size
                ),
            });
        }
        Ok(())
    }

    /// Number of whole elements that fit in one chunk.
    pub fn elements_per_chunk(&self) -> usize {
        self.chunk_size / self.element_size
    }

    /// Chunk size after rounding down to a multiple of the element size.
    pub fn effective_chunk_size(&self) -> usize {
        self.elements_per_chunk() * self.element_size
    }
}
