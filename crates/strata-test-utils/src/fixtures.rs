//! Deterministic key and value generators.
//!
//! Everything is driven by a seeded ChaCha8 RNG so a failing run can be
//! replayed from its seed.

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// RNG for a fixture seed.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// `count` keys drawn uniformly from `0..=max`, repeats allowed.
pub fn random_keys(seed: u64, count: usize, max: u32) -> Vec<u32> {
    let mut rng = seeded_rng(seed);
    (0..count).map(|_| rng.random_range(0..=max)).collect()
}

/// `0..n` in a seeded random order.
pub fn shuffled_range(seed: u64, n: u32) -> Vec<u32> {
    let mut keys: Vec<u32> = (0..n).collect();
    keys.shuffle(&mut seeded_rng(seed));
    keys
}

/// `value_size` bytes derived from `key`, distinct for distinct keys when
/// `value_size >= 4`.
pub fn value_for(key: u32, value_size: usize) -> Vec<u8> {
    let tag = key.to_le_bytes();
    (0..value_size)
        .map(|i| tag[i % 4] ^ (i / 4) as u8)
        .collect()
}

/// One step of a randomized workload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Insert(u32),
    Remove(u32),
}

/// `count` operations over keys in `0..=max`; roughly one in three is a
/// removal.
pub fn random_ops(seed: u64, count: usize, max: u32) -> Vec<Op> {
    let mut rng = seeded_rng(seed);
    (0..count)
        .map(|_| {
            let key = rng.random_range(0..=max);
            if rng.random_ratio(1, 3) {
                Op::Remove(key)
            } else {
                Op::Insert(key)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_keys() {
        assert_eq!(random_keys(7, 100, 50), random_keys(7, 100, 50));
        assert_ne!(random_keys(7, 100, 50), random_keys(8, 100, 50));
    }

    #[test]
    fn keys_stay_in_range() {
        assert!(random_keys(1, 1000, 9).iter().all(|&k| k <= 9));
    }

    #[test]
    fn shuffle_is_a_permutation() {
        let mut keys = shuffled_range(3, 500);
        keys.sort_unstable();
        assert_eq!(keys, (0..500).collect::<Vec<_>>());
    }

    #[test]
    fn values_differ_per_key() {
        assert_ne!(value_for(1, 8), value_for(2, 8));
        assert_eq!(value_for(1, 0), Vec::<u8>::new());
    }
}
