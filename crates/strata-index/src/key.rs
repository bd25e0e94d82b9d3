//! Fixed-width keys stored inside node headers.

use smallvec::{smallvec, SmallVec};
use std::fmt::Debug;

/// FNV-1a offset basis for 64-bit.
const FNV_OFFSET: u64 = 0xcbf29ce484222325;
/// FNV-1a prime for 64-bit.
const FNV_PRIME: u64 = 0x00000100000001B3;

/// A key that can live in a node header as `SIZE` little-endian bytes.
///
/// Ordering must be total and consistent with equality; the tree compares
/// decoded keys, never raw bytes.
pub trait NodeKey: Copy + Ord + Debug {
    /// Encoded width in bytes.
    const SIZE: usize;

    /// Write the key into `out[..SIZE]`.
    fn write_to(self, out: &mut [u8]);

    /// Decode a key from `bytes[..SIZE]`.
    fn read_from(bytes: &[u8]) -> Self;
}

macro_rules! impl_node_key_int {
    ($($t:ty),* $(,)?) => {
        $(
            impl NodeKey for $t {
                const SIZE: usize = std::mem::size_of::<$t>();

                #[inline]
                fn write_to(self, out: &mut [u8]) {
                    out[..Self::SIZE].copy_from_slice(&self.to_le_bytes());
                }

                #[inline]
                fn read_from(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; std::mem::size_of::<$t>()];
                    buf.copy_from_slice(&bytes[..Self::SIZE]);
                    <$t>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_node_key_int!(u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize);

impl<const N: usize> NodeKey for [u8; N] {
    const SIZE: usize = N;

    #[inline]
    fn write_to(self, out: &mut [u8]) {
        out[..N].copy_from_slice(&self);
    }

    #[inline]
    fn read_from(bytes: &[u8]) -> Self {
        let mut buf = [0u8; N];
        buf.copy_from_slice(&bytes[..N]);
        buf
    }
}

/// Feed a single byte into an FNV-1a hash state.
#[inline]
fn fnv1a_byte(hash: u64, byte: u8) -> u64 {
    (hash ^ byte as u64).wrapping_mul(FNV_PRIME)
}

/// FNV-1a hash of a key's encoded bytes.
///
/// Pure and deterministic: keys are hashed in their little-endian encoding.
pub fn key_hash<K: NodeKey>(key: K) -> u64 {
    let mut buf: SmallVec<[u8; 16]> = smallvec![0; K::SIZE];
    key.write_to(&mut buf);
    buf.iter().fold(FNV_OFFSET, |hash, &b| fnv1a_byte(hash, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip<K: NodeKey + PartialEq>(key: K) -> K {
        let mut buf = vec![0u8; K::SIZE];
        key.write_to(&mut buf);
        K::read_from(&buf)
    }

    #[test]
    fn integer_sizes_match_width() {
        assert_eq!(<u8 as NodeKey>::SIZE, 1);
        assert_eq!(<i32 as NodeKey>::SIZE, 4);
        assert_eq!(<u128 as NodeKey>::SIZE, 16);
    }

    #[test]
    fn negative_keys_survive_encoding() {
        assert_eq!(round_trip(-17i64), -17);
        assert_eq!(round_trip(i32::MIN), i32::MIN);
    }

    #[test]
    fn byte_array_keys_order_lexicographically() {
        assert!(*b"abc" < *b"abd");
        assert_eq!(round_trip(*b"key!"), *b"key!");
    }

    #[test]
    fn hash_is_deterministic_and_spreads() {
        assert_eq!(key_hash(42u32), key_hash(42u32));
        assert_ne!(key_hash(1u32), key_hash(2u32));
        // FNV-1a of the empty input is the offset basis.
        assert_eq!(key_hash::<[u8; 0]>([]), FNV_OFFSET);
    }

    #[test]
    fn wide_keys_spill_the_inline_buffer() {
        let a = [7u8; 32];
        let mut b = a;
        b[31] = 8;
        assert_ne!(key_hash(a), key_hash(b));
    }
}
