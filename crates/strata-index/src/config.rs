//! Index configuration parameters.

use strata_arena::ArenaConfig;
use strata_core::ArenaError;

use crate::key::NodeKey;
use crate::node::NODE_HEADER;

/// Configuration for an [`OrderedIndex`](crate::OrderedIndex) or
/// [`BucketedIndex`](crate::BucketedIndex).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IndexConfig {
    /// Bytes of caller-owned value stored after each key. May be zero.
    pub value_size: usize,

    /// Requested arena chunk size in bytes. Default: 16 KiB.
    pub chunk_size: usize,

    /// Number of independent tree roots in a bucketed index.
    ///
    /// Ignored by [`OrderedIndex`](crate::OrderedIndex). Default: 64.
    pub map_length: usize,
}

impl IndexConfig {
    /// Default arena chunk size in bytes.
    pub const DEFAULT_CHUNK_SIZE: usize = ArenaConfig::DEFAULT_CHUNK_SIZE;

    /// Default bucket count.
    pub const DEFAULT_MAP_LENGTH: usize = 64;

    /// Create a config for `value_size`-byte values with default chunk size
    /// and bucket count.
    pub fn new(value_size: usize) -> Self {
        Self {
            value_size,
            chunk_size: Self::DEFAULT_CHUNK_SIZE,
            map_length: Self::DEFAULT_MAP_LENGTH,
        }
    }

    /// Override the chunk size.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Override the bucket count.
    pub fn with_map_length(mut self, map_length: usize) -> Self {
        self.map_length = map_length;
        self
    }

    /// Bytes per slot for key type `K`: header, key, then value.
    pub fn element_size<K: NodeKey>(&self) -> usize {
        NODE_HEADER + K::SIZE + self.value_size
    }

    /// The arena configuration backing an index keyed by `K`.
    pub fn arena_config<K: NodeKey>(&self) -> ArenaConfig {
        ArenaConfig::new(self.element_size::<K>()).with_chunk_size(self.chunk_size)
    }

    /// Check the parameters for keys of type `K`.
    pub fn validate<K: NodeKey>(&self) -> Result<(), ArenaError> {
        if self.map_length == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "map_length must be non-zero".into(),
            });
        }
        self.arena_config::<K>().validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_size_includes_header_key_and_value() {
        let config = IndexConfig::new(8);
        assert_eq!(config.element_size::<u32>(), NODE_HEADER + 4 + 8);
    }

    #[test]
    fn rejects_zero_map_length() {
        let err = IndexConfig::new(4)
            .with_map_length(0)
            .validate::<u32>()
            .unwrap_err();
        assert!(matches!(err, ArenaError::InvalidConfig { .. }));
    }

    #[test]
    fn rejects_chunk_smaller_than_node() {
        let config = IndexConfig::new(64).with_chunk_size(32);
        assert!(config.validate::<u64>().is_err());
    }

    #[test]
    fn arena_config_carries_chunk_size() {
        let config = IndexConfig::new(4).with_chunk_size(4096);
        let arena = config.arena_config::<u64>();
        assert_eq!(arena.chunk_size, 4096);
        assert_eq!(arena.element_size, NODE_HEADER + 8 + 4);
    }
}
