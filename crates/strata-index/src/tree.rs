//! Red-black engine shared by the single-root and bucketed indices.
//!
//! A [`Forest`] is one [`ChunkedArena`] of node slots plus a [`RootTable`].
//! Every slot in the arena is a live node of exactly one tree, which is what
//! makes swap compaction safe: the element moved into a freed slot is always
//! a node whose neighbours can be re-pointed.
//!
//! Mirrored cases are written once against a [`Side`] and its opposite.

use std::cmp::Ordering;
use std::marker::PhantomData;

use smallvec::SmallVec;
use strata_arena::ChunkedArena;
use strata_core::{ArenaError, SlotIndex, NIL_SLOT};
use tracing::trace;

use crate::config::IndexConfig;
use crate::key::NodeKey;
use crate::node::{self, Side, DIRTY, FLAGS, INDEX, KEY, PARENT, RED};
use crate::roots::RootTable;

/// Mutable view of a value region handed out by `set`.
#[derive(Debug)]
pub struct ValueMut<'a> {
    /// Slot holding the node. Valid until the next removal.
    pub index: SlotIndex,
    /// `true` if this call created the node.
    pub inserted: bool,
    /// The caller-owned value bytes. Zeroed when `inserted`.
    pub value: &'a mut [u8],
}

pub(crate) struct Forest<K: NodeKey, R: RootTable> {
    pub(crate) arena: ChunkedArena,
    pub(crate) roots: R,
    value_size: usize,
    _key: PhantomData<K>,
}

impl<K: NodeKey, R: RootTable> Forest<K, R> {
    pub(crate) fn new(config: &IndexConfig, roots: R) -> Result<Self, ArenaError> {
        config.validate::<K>()?;
        Ok(Self {
            arena: ChunkedArena::new(config.arena_config::<K>())?,
            roots,
            value_size: config.value_size,
            _key: PhantomData,
        })
    }

    pub(crate) fn value_size(&self) -> usize {
        self.value_size
    }

    pub(crate) fn len(&self) -> usize {
        self.arena.len()
    }

    // ── node field access ─────────────────────────────────────────

    #[inline]
    pub(crate) fn parent(&self, n: u32) -> Option<u32> {
        node::read_link(self.arena.slot(n as usize), PARENT)
    }

    #[inline]
    pub(crate) fn child(&self, n: u32, side: Side) -> Option<u32> {
        node::read_link(self.arena.slot(n as usize), side.offset())
    }

    #[inline]
    pub(crate) fn left(&self, n: u32) -> Option<u32> {
        self.child(n, Side::Left)
    }

    #[inline]
    pub(crate) fn right(&self, n: u32) -> Option<u32> {
        self.child(n, Side::Right)
    }

    #[inline]
    fn set_parent(&mut self, n: u32, parent: Option<u32>) {
        node::write_link(self.arena.slot_mut(n as usize), PARENT, parent);
    }

    #[inline]
    fn set_child(&mut self, n: u32, side: Side, child: Option<u32>) {
        node::write_link(self.arena.slot_mut(n as usize), side.offset(), child);
    }

    #[inline]
    pub(crate) fn key(&self, n: u32) -> K {
        node::read_key(self.arena.slot(n as usize))
    }

    #[inline]
    pub(crate) fn cached_index(&self, n: u32) -> u32 {
        node::read_u32(self.arena.slot(n as usize), INDEX)
    }

    #[inline]
    pub(crate) fn is_red(&self, n: u32) -> bool {
        self.arena.slot(n as usize)[FLAGS] & RED != 0
    }

    /// Null children count as black.
    #[inline]
    fn red(&self, n: Option<u32>) -> bool {
        n.is_some_and(|n| self.is_red(n))
    }

    #[inline]
    fn set_red(&mut self, n: u32, red: bool) {
        let flags = &mut self.arena.slot_mut(n as usize)[FLAGS];
        if red {
            *flags |= RED;
        } else {
            *flags &= !RED;
        }
    }

    #[inline]
    fn mark_dirty(&mut self, n: u32) {
        self.arena.slot_mut(n as usize)[FLAGS] |= DIRTY;
    }

    pub(crate) fn is_dirty_slot(&self, n: u32) -> bool {
        self.arena.slot(n as usize)[FLAGS] & DIRTY != 0
    }

    pub(crate) fn value(&self, n: u32) -> &[u8] {
        &self.arena.slot(n as usize)[node::value_offset::<K>()..]
    }

    fn value_mut(&mut self, n: u32) -> &mut [u8] {
        &mut self.arena.slot_mut(n as usize)[node::value_offset::<K>()..]
    }

    fn side_of(&self, parent: u32, child: u32) -> Side {
        if self.left(parent) == Some(child) {
            Side::Left
        } else {
            Side::Right
        }
    }

    /// Bucket of the tree holding `n`, recomputed from its current key.
    #[inline]
    fn bucket_of_node(&self, n: u32) -> usize {
        self.roots.bucket_of(self.key(n))
    }

    pub(crate) fn minimum(&self, mut n: u32) -> u32 {
        while let Some(l) = self.left(n) {
            n = l;
        }
        n
    }

    pub(crate) fn maximum(&self, mut n: u32) -> u32 {
        while let Some(r) = self.right(n) {
            n = r;
        }
        n
    }

    // ── lookups ───────────────────────────────────────────────────

    pub(crate) fn find(&self, key: K) -> Option<u32> {
        let mut cur = self.roots.root(self.roots.bucket_of(key));
        while let Some(n) = cur {
            cur = match key.cmp(&self.key(n)) {
                Ordering::Less => self.left(n),
                Ordering::Greater => self.right(n),
                Ordering::Equal => return Some(n),
            };
        }
        None
    }

    pub(crate) fn try_get_value(&self, key: K) -> Option<&[u8]> {
        self.find(key).map(|n| self.value(n))
    }

    pub(crate) fn try_get_value_mut(&mut self, key: K) -> Option<&mut [u8]> {
        let n = self.find(key)?;
        self.mark_dirty(n);
        Some(self.value_mut(n))
    }

    pub(crate) fn get_by_index(&self, index: usize) -> Result<(K, &[u8]), ArenaError> {
        let slot = self.arena.get(index)?;
        Ok((node::read_key(slot), &slot[node::value_offset::<K>()..]))
    }

    pub(crate) fn is_dirty(&self, key: K) -> Option<bool> {
        self.find(key).map(|n| self.is_dirty_slot(n))
    }

    pub(crate) fn clear_dirty(&mut self) {
        for i in 0..self.arena.len() {
            self.arena.slot_mut(i)[FLAGS] &= !DIRTY;
        }
    }

    pub(crate) fn dirty_indices(&self) -> Vec<SlotIndex> {
        (0..self.arena.len() as u32)
            .filter(|&n| self.is_dirty_slot(n))
            .map(SlotIndex)
            .collect()
    }

    // ── structural primitives ─────────────────────────────────────

    /// Point `parent`'s link to `old` at `new` instead. A `None` parent
    /// means `old` was a root.
    fn replace_child(&mut self, parent: Option<u32>, old: u32, new: Option<u32>) {
        match parent {
            None => {
                let bucket = self.bucket_of_node(old);
                self.roots.set_root(bucket, new);
            }
            Some(p) => {
                let side = self.side_of(p, old);
                self.set_child(p, side, new);
            }
        }
    }

    /// Rotate `x` down toward `dir`; its child on the opposite side takes
    /// its place.
    fn rotate(&mut self, x: u32, dir: Side) {
        let Some(y) = self.child(x, dir.opposite()) else {
            debug_assert!(false, "rotation of {x} without a pivot child");
            return;
        };
        let inner = self.child(y, dir);
        self.set_child(x, dir.opposite(), inner);
        if let Some(c) = inner {
            self.set_parent(c, Some(x));
        }
        let xp = self.parent(x);
        self.set_parent(y, xp);
        self.replace_child(xp, x, Some(y));
        self.set_child(y, dir, Some(x));
        self.set_parent(x, Some(y));
    }

    fn blacken_root(&mut self, bucket: usize) {
        if let Some(root) = self.roots.root(bucket) {
            self.set_red(root, false);
        }
    }

    // ── insertion ─────────────────────────────────────────────────

    pub(crate) fn set(&mut self, key: K) -> Result<ValueMut<'_>, ArenaError> {
        let bucket = self.roots.bucket_of(key);
        let mut parent = None;
        let mut side = Side::Left;
        let mut cur = self.roots.root(bucket);
        while let Some(n) = cur {
            match key.cmp(&self.key(n)) {
                Ordering::Less => side = Side::Left,
                Ordering::Greater => side = Side::Right,
                Ordering::Equal => {
                    return Ok(ValueMut {
                        index: SlotIndex(n),
                        inserted: false,
                        value: self.value_mut(n),
                    });
                }
            }
            parent = Some(n);
            cur = self.child(n, side);
        }

        if self.arena.len() >= NIL_SLOT as usize {
            return Err(ArenaError::InvalidArgument {
                reason: format!("index is full at {} nodes", self.arena.len()),
            });
        }
        let (index, slot) = self.arena.add()?;
        let n = index as u32;
        node::init(slot, parent, n, key);
        match parent {
            None => self.roots.set_root(bucket, Some(n)),
            Some(p) => self.set_child(p, side, Some(n)),
        }
        self.insert_fixup(n);
        self.blacken_root(bucket);

        Ok(ValueMut {
            index: SlotIndex(n),
            inserted: true,
            value: self.value_mut(n),
        })
    }

    /// `set`, then overwrite the value region with `value`, zero-padding
    /// any remaining bytes.
    pub(crate) fn insert(&mut self, key: K, value: &[u8]) -> Result<SlotIndex, ArenaError> {
        if value.len() > self.value_size {
            return Err(ArenaError::InvalidArgument {
                reason: format!(
                    "value of {} bytes exceeds value_size {}",
                    value.len(),
                    self.value_size
                ),
            });
        }
        let slot = self.set(key)?;
        let (head, tail) = slot.value.split_at_mut(value.len());
        head.copy_from_slice(value);
        tail.fill(0);
        let index = slot.index;
        self.mark_dirty(index.0);
        Ok(index)
    }

    fn insert_fixup(&mut self, mut z: u32) {
        loop {
            let Some(p) = self.parent(z) else { break };
            if !self.is_red(p) {
                break;
            }
            // A red parent is never the root, so the grandparent exists.
            let Some(g) = self.parent(p) else { break };
            let side = self.side_of(g, p);
            let uncle = self.child(g, side.opposite());

            if let Some(u) = uncle.filter(|&u| self.is_red(u)) {
                self.set_red(p, false);
                self.set_red(u, false);
                self.set_red(g, true);
                z = g;
                continue;
            }

            // Inner grandchild: straighten into the outer case first.
            let mut p = p;
            if self.child(p, side.opposite()) == Some(z) {
                self.rotate(p, side);
                std::mem::swap(&mut z, &mut p);
            }
            self.set_red(p, false);
            self.set_red(g, true);
            self.rotate(g, side.opposite());
            break;
        }
    }

    // ── removal ───────────────────────────────────────────────────

    pub(crate) fn remove(&mut self, key: K) -> Result<bool, ArenaError> {
        let Some(z) = self.find(key) else {
            return Ok(false);
        };
        let bucket = self.roots.bucket_of(key);

        // Two children: take over the successor's key and value, then
        // delete the successor's slot. Colour and links stay put.
        let target = match (self.left(z), self.right(z)) {
            (Some(_), Some(r)) => {
                let y = self.minimum(r);
                self.copy_payload(y, z);
                y
            }
            _ => z,
        };

        let child = self.left(target).or(self.right(target));
        let parent = self.parent(target);
        if let Some(c) = child {
            self.set_parent(c, parent);
        }
        self.replace_child(parent, target, child);

        if !self.is_red(target) {
            self.remove_fixup(child, parent);
        }
        self.blacken_root(bucket);

        self.release_slot(target)?;
        Ok(true)
    }

    /// Copy key and value bytes of `from` into `to`.
    fn copy_payload(&mut self, from: u32, to: u32) {
        let payload: SmallVec<[u8; 64]> = SmallVec::from_slice(&self.arena.slot(from as usize)[KEY..]);
        self.arena.slot_mut(to as usize)[KEY..].copy_from_slice(&payload);
        self.mark_dirty(to);
    }

    /// Restore the black height after a black node left the position now
    /// held by `x` (possibly null) under `parent`.
    fn remove_fixup(&mut self, mut x: Option<u32>, mut parent: Option<u32>) {
        while !self.red(x) {
            let Some(p) = parent else { break };
            // A null `x` sits on the side whose link is null; the sibling
            // side is never null because it carries the missing black.
            let side = if self.left(p) == x {
                Side::Left
            } else {
                Side::Right
            };
            let Some(mut w) = self.child(p, side.opposite()) else {
                break;
            };

            if self.is_red(w) {
                self.set_red(w, false);
                self.set_red(p, true);
                self.rotate(p, side);
                let Some(next) = self.child(p, side.opposite()) else {
                    break;
                };
                w = next;
            }

            let near = self.child(w, side);
            let far = self.child(w, side.opposite());
            if !self.red(near) && !self.red(far) {
                self.set_red(w, true);
                x = Some(p);
                parent = self.parent(p);
                continue;
            }

            if !self.red(far) {
                if let Some(n) = near {
                    self.set_red(n, false);
                }
                self.set_red(w, true);
                self.rotate(w, side.opposite());
                let Some(next) = self.child(p, side.opposite()) else {
                    break;
                };
                w = next;
            }

            let parent_red = self.is_red(p);
            self.set_red(w, parent_red);
            self.set_red(p, false);
            if let Some(f) = self.child(w, side.opposite()) {
                self.set_red(f, false);
            }
            self.rotate(p, side);
            x = None;
            break;
        }
        if let Some(x) = x {
            self.set_red(x, false);
        }
    }

    /// Free a node's slot that is already unlinked from its tree.
    ///
    /// Swap compaction moves the arena's last node into `n`; its parent's
    /// child link (or its bucket's root) and its children's parent links
    /// still name the old position and are re-pointed here.
    fn release_slot(&mut self, n: u32) -> Result<(), ArenaError> {
        let Some(moved) = self.arena.swap_last_and_remove(n as usize)? else {
            return Ok(());
        };
        let from = moved.from as u32;
        let to = moved.to as u32;

        node::write_u32(self.arena.slot_mut(to as usize), INDEX, to);
        self.mark_dirty(to);

        match self.parent(to) {
            None => {
                let bucket = self.bucket_of_node(to);
                debug_assert_eq!(self.roots.root(bucket), Some(from));
                self.roots.set_root(bucket, Some(to));
            }
            Some(p) => {
                let side = if self.left(p) == Some(from) {
                    Side::Left
                } else {
                    debug_assert_eq!(self.right(p), Some(from));
                    Side::Right
                };
                self.set_child(p, side, Some(to));
            }
        }
        for side in [Side::Left, Side::Right] {
            if let Some(c) = self.child(to, side) {
                self.set_parent(c, Some(to));
            }
        }
        trace!(from, to, "node relocated");
        Ok(())
    }

    // ── bulk ──────────────────────────────────────────────────────

    pub(crate) fn extend(&mut self, additional: usize) -> Result<(), ArenaError> {
        self.arena.extend(additional)
    }

    pub(crate) fn clear(&mut self) {
        self.roots.clear();
        self.arena.clear();
    }

    pub(crate) fn dispose(&mut self) {
        self.roots.clear();
        self.arena.dispose();
    }

    pub(crate) fn memory_bytes(&self) -> usize {
        self.arena.memory_bytes() + self.roots.bucket_count() * std::mem::size_of::<Option<u32>>()
    }
}
