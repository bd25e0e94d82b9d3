//! Benchmark profiles for the Strata arena and indices.
//!
//! - [`bench_keys`]: deterministic key stream with repeats
//! - [`filled_ordered`] / [`filled_bucketed`]: indices pre-loaded from it

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use strata_index::{ArenaError, BucketedIndex, IndexConfig, OrderedIndex};

/// Value bytes stored per node in every profile.
pub const VALUE_SIZE: usize = 16;

/// `count` keys drawn from `0..=count`, repeats allowed.
pub fn bench_keys(count: usize, seed: u64) -> Vec<u32> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let max = u32::try_from(count).unwrap_or(u32::MAX);
    (0..count).map(|_| rng.random_range(0..=max)).collect()
}

/// Ordered index holding every key of `keys`.
pub fn filled_ordered(keys: &[u32]) -> Result<OrderedIndex<u32>, ArenaError> {
    let mut index = OrderedIndex::new(IndexConfig::new(VALUE_SIZE))?;
    for &k in keys {
        index.set(k)?;
    }
    Ok(index)
}

/// Bucketed index with `map_length` buckets holding every key of `keys`.
pub fn filled_bucketed(keys: &[u32], map_length: usize) -> Result<BucketedIndex<u32>, ArenaError> {
    let mut index = BucketedIndex::new(IndexConfig::new(VALUE_SIZE).with_map_length(map_length))?;
    for &k in keys {
        index.set(k)?;
    }
    Ok(index)
}
