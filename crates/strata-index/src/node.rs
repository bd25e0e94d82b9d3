//! Byte layout of the node header at the front of every index slot.
//!
//! ```text
//! offset  size  field
//!  0      4     parent   (u32 LE, NIL_SLOT = none)
//!  4      4     left     (u32 LE)
//!  8      4     right    (u32 LE)
//! 12      4     index    (u32 LE, cached slot position)
//! 16      1     flags    (bit 0 red, bit 1 dirty)
//! 17      K     key      (K::SIZE bytes)
//! 17+K    V     value    (caller-owned bytes)
//! ```
//!
//! Links are slot indices, never addresses, so growing the arena cannot
//! invalidate them. Swap compaction can; see `Forest::release_slot`.

use strata_core::NIL_SLOT;

use crate::key::NodeKey;

pub(crate) const PARENT: usize = 0;
pub(crate) const LEFT: usize = 4;
pub(crate) const RIGHT: usize = 8;
pub(crate) const INDEX: usize = 12;
pub(crate) const FLAGS: usize = 16;
pub(crate) const KEY: usize = 17;

/// Bytes taken by the node header before the key.
pub const NODE_HEADER: usize = KEY;

pub(crate) const RED: u8 = 1 << 0;
pub(crate) const DIRTY: u8 = 1 << 1;

/// Which child of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    #[inline]
    pub(crate) fn offset(self) -> usize {
        match self {
            Side::Left => LEFT,
            Side::Right => RIGHT,
        }
    }
}

/// Offset of the value region for key type `K`.
#[inline]
pub(crate) fn value_offset<K: NodeKey>() -> usize {
    KEY + K::SIZE
}

#[inline]
pub(crate) fn read_u32(slot: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&slot[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

#[inline]
pub(crate) fn write_u32(slot: &mut [u8], offset: usize, v: u32) {
    slot[offset..offset + 4].copy_from_slice(&v.to_le_bytes());
}

#[inline]
pub(crate) fn read_link(slot: &[u8], offset: usize) -> Option<u32> {
    let raw = read_u32(slot, offset);
    (raw != NIL_SLOT).then_some(raw)
}

#[inline]
pub(crate) fn write_link(slot: &mut [u8], offset: usize, link: Option<u32>) {
    write_u32(slot, offset, link.unwrap_or(NIL_SLOT));
}

#[inline]
pub(crate) fn read_key<K: NodeKey>(slot: &[u8]) -> K {
    K::read_from(&slot[KEY..KEY + K::SIZE])
}

/// Initialise a fresh slot as a red, dirty leaf hanging under `parent`.
pub(crate) fn init<K: NodeKey>(slot: &mut [u8], parent: Option<u32>, index: u32, key: K) {
    write_link(slot, PARENT, parent);
    write_link(slot, LEFT, None);
    write_link(slot, RIGHT, None);
    write_u32(slot, INDEX, index);
    slot[FLAGS] = RED | DIRTY;
    key.write_to(&mut slot[KEY..KEY + K::SIZE]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_writes_red_leaf() {
        let mut slot = vec![0xffu8; NODE_HEADER + 4 + 2];
        init(&mut slot, Some(3), 9, 77u32);
        assert_eq!(read_link(&slot, PARENT), Some(3));
        assert_eq!(read_link(&slot, LEFT), None);
        assert_eq!(read_link(&slot, RIGHT), None);
        assert_eq!(read_u32(&slot, INDEX), 9);
        assert_eq!(slot[FLAGS], RED | DIRTY);
        assert_eq!(read_key::<u32>(&slot), 77);
        // Value bytes are left to the caller.
        assert_eq!(&slot[value_offset::<u32>()..], &[0xff, 0xff]);
    }

    #[test]
    fn nil_link_round_trips_as_none() {
        let mut slot = vec![0u8; NODE_HEADER];
        write_link(&mut slot, LEFT, Some(0));
        assert_eq!(read_link(&slot, LEFT), Some(0));
        write_link(&mut slot, LEFT, None);
        assert_eq!(read_u32(&slot, LEFT), NIL_SLOT);
    }

    #[test]
    fn sides_are_mirrored() {
        assert_eq!(Side::Left.opposite(), Side::Right);
        assert_eq!(Side::Right.offset(), RIGHT);
    }
}
