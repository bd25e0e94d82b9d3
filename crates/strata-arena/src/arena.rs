//! The growable chunked arena.

use strata_core::{ArenaError, ExistenceMark};
use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::config::ArenaConfig;

/// Record of an element moved by [`ChunkedArena::swap_last_and_remove`].
///
/// Anything that refers to elements by index must rewrite references to
/// `from` so they point at `to`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// Index the element occupied before the removal (the old last index).
    pub from: usize,
    /// Index the element occupies now (the removed index).
    pub to: usize,
}

/// Growable set of fixed-size chunks providing indexed element storage.
///
/// Elements are `element_size` bytes, zeroed when created, and addressed by
/// index in `[0, len)`. Appends are amortised O(1), indexed reads O(1),
/// swap removal O(1); ordered insert/remove shift bytes in O(n).
///
/// Accessors on `&self`/`&mut self` take no lock: the borrow checker
/// already proves exclusivity. Wrap the arena in a
/// [`ConcurrentArena`](crate::ConcurrentArena) to share it across threads.
pub struct ChunkedArena {
    chunks: Vec<Chunk>,
    element_size: usize,
    chunk_size: usize,
    per_chunk: usize,
    len: usize,
    mark: ExistenceMark,
    disposed: bool,
}

impl ChunkedArena {
    /// Create an empty arena. No chunk is allocated until the first append.
    ///
    /// Returns `Err(ArenaError::InvalidConfig)` if either size is zero or
    /// the element does not fit in a chunk.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        Ok(Self {
            chunks: Vec::with_capacity(ArenaConfig::INITIAL_TABLE_CAPACITY),
            element_size: config.element_size,
            chunk_size: config.effective_chunk_size(),
            per_chunk: config.elements_per_chunk(),
            len: 0,
            mark: ExistenceMark::next(),
            disposed: false,
        })
    }

    /// Shorthand for `new(ArenaConfig::new(element_size).with_chunk_size(chunk_size))`.
    pub fn with_sizes(element_size: usize, chunk_size: usize) -> Result<Self, ArenaError> {
        Self::new(ArenaConfig::new(element_size).with_chunk_size(chunk_size))
    }

    /// Append one zeroed element, growing first if needed.
    ///
    /// Returns the new element's index and bytes.
    pub fn add(&mut self) -> Result<(usize, &mut [u8]), ArenaError> {
        self.ensure_live()?;
        self.reserve_slots(self.len + 1);
        let index = self.len;
        self.len += 1;
        let slot = self.slot_mut(index);
        slot.fill(0);
        Ok((index, slot))
    }

    /// Insert a zeroed element at `index`, shifting `[index, len)` up by one.
    ///
    /// `index == len` appends. Returns `Err(IndexOutOfRange)` if
    /// `index > len`, before any mutation.
    pub fn insert(&mut self, index: usize) -> Result<&mut [u8], ArenaError> {
        self.ensure_live()?;
        if index > self.len {
            return Err(ArenaError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        self.reserve_slots(self.len + 1);
        for i in (index..self.len).rev() {
            self.copy_slot(i, i + 1);
        }
        self.len += 1;
        let slot = self.slot_mut(index);
        slot.fill(0);
        Ok(slot)
    }

    /// Borrow the bytes of element `index`.
    pub fn get(&self, index: usize) -> Result<&[u8], ArenaError> {
        self.ensure_live()?;
        self.check_index(index)?;
        Ok(self.slot(index))
    }

    /// Mutably borrow the bytes of element `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut [u8], ArenaError> {
        self.ensure_live()?;
        self.check_index(index)?;
        Ok(self.slot_mut(index))
    }

    /// Remove element `index`, shifting `(index, len)` down by one.
    pub fn remove(&mut self, index: usize) -> Result<(), ArenaError> {
        self.ensure_live()?;
        self.check_index(index)?;
        for i in index + 1..self.len {
            self.copy_slot(i, i - 1);
        }
        self.len -= 1;
        Ok(())
    }

    /// Drop the last element. O(1).
    pub fn remove_last(&mut self) -> Result<(), ArenaError> {
        self.ensure_live()?;
        if self.len == 0 {
            return Err(ArenaError::IndexOutOfRange { index: 0, len: 0 });
        }
        self.len -= 1;
        Ok(())
    }

    /// Overwrite element `index` with the last element, then drop the last.
    /// O(1).
    ///
    /// Returns the move that happened, or `None` when `index` was already
    /// the last element. Every removal through this path can relocate an
    /// unrelated element.
    pub fn swap_last_and_remove(&mut self, index: usize) -> Result<Option<Relocation>, ArenaError> {
        self.ensure_live()?;
        self.check_index(index)?;
        let last = self.len - 1;
        self.len = last;
        if index == last {
            return Ok(None);
        }
        self.copy_slot(last, index);
        Ok(Some(Relocation {
            from: last,
            to: index,
        }))
    }

    /// Pre-grow so that `additional` more elements fit without allocating.
    pub fn extend(&mut self, additional: usize) -> Result<(), ArenaError> {
        self.ensure_live()?;
        let target = self.len.checked_add(additional).ok_or_else(|| ArenaError::InvalidArgument {
            reason: format!("extend by {additional} overflows capacity"),
        })?;
        self.reserve_slots(target);
        Ok(())
    }

    /// Forget all elements in O(1). Chunks are retained for reuse.
    pub fn clear(&mut self) {
        debug!(mark = %self.mark, len = self.len, "arena cleared");
        self.len = 0;
    }

    /// Release every chunk and the chunk table.
    ///
    /// In builds with `debug_assertions`, any later operation returns
    /// [`ArenaError::UseAfterFree`].
    pub fn dispose(&mut self) {
        debug!(
            mark = %self.mark,
            chunks = self.chunks.len(),
            "arena disposed"
        );
        self.chunks = Vec::new();
        self.len = 0;
        self.disposed = true;
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the arena holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of allocated chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Number of elements that fit in the allocated chunks.
    pub fn capacity(&self) -> usize {
        self.chunks.len() * self.per_chunk
    }

    /// Size of one element in bytes.
    pub fn element_size(&self) -> usize {
        self.element_size
    }

    /// Chunk size in bytes, after rounding to a multiple of the element size.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of elements per chunk.
    pub fn elements_per_chunk(&self) -> usize {
        self.per_chunk
    }

    /// Entries reserved in the chunk table.
    pub fn table_capacity(&self) -> usize {
        self.chunks.capacity()
    }

    /// This instance's existence mark.
    pub fn mark(&self) -> ExistenceMark {
        self.mark
    }

    /// Whether [`dispose`](Self::dispose) has been called.
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Memory held by chunks and the chunk table, in bytes.
    pub fn memory_bytes(&self) -> usize {
        self.chunks.len() * self.chunk_size
            + self.chunks.capacity() * std::mem::size_of::<Chunk>()
    }

    /// Iterate over live elements in index order.
    pub fn iter(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.len).map(move |i| self.slot(i))
    }

    /// Borrow element `index` without the `Result` wrapper.
    ///
    /// For callers that have already validated `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= len` in builds with `debug_assertions`. In
    /// release builds only `index >= capacity` panics; an index in
    /// `[len, capacity)` returns the stale bytes of a removed or
    /// never-written slot.
    #[inline]
    pub fn slot(&self, index: usize) -> &[u8] {
        debug_assert!(index < self.len, "slot {index} >= len {}", self.len);
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk].bytes(offset, self.element_size)
    }

    /// Mutably borrow element `index` without the `Result` wrapper.
    ///
    /// # Panics
    ///
    /// Same contract as [`slot`](Self::slot): `index >= len` panics only
    /// with `debug_assertions`; in release builds an index in
    /// `[len, capacity)` hands out stale bytes.
    #[inline]
    pub fn slot_mut(&mut self, index: usize) -> &mut [u8] {
        debug_assert!(index < self.len, "slot {index} >= len {}", self.len);
        let (chunk, offset) = self.locate(index);
        self.chunks[chunk].bytes_mut(offset, self.element_size)
    }

    #[inline]
    fn locate(&self, index: usize) -> (usize, usize) {
        (
            index / self.per_chunk,
            (index % self.per_chunk) * self.element_size,
        )
    }

    fn check_index(&self, index: usize) -> Result<(), ArenaError> {
        if index >= self.len {
            return Err(ArenaError::IndexOutOfRange {
                index,
                len: self.len,
            });
        }
        Ok(())
    }

    #[inline]
    fn ensure_live(&self) -> Result<(), ArenaError> {
        #[cfg(debug_assertions)]
        {
            if self.disposed {
                return Err(ArenaError::UseAfterFree { mark: self.mark });
            }
        }
        Ok(())
    }

    /// Grow until `slots` elements fit.
    ///
    /// The table doubles only when the target chunk count exceeds its
    /// reserved capacity; chunks themselves are appended one at a time and
    /// never reallocated.
    fn reserve_slots(&mut self, slots: usize) {
        let target_chunks = slots.div_ceil(self.per_chunk);
        if target_chunks <= self.chunks.len() {
            return;
        }
        if target_chunks > self.chunks.capacity() {
            let mut table = self
                .chunks
                .capacity()
                .max(ArenaConfig::INITIAL_TABLE_CAPACITY);
            while table < target_chunks {
                table *= 2;
            }
            self.chunks.reserve_exact(table - self.chunks.len());
            debug!(
                mark = %self.mark,
                table_capacity = self.chunks.capacity(),
                "chunk table grown"
            );
        }
        while self.chunks.len() < target_chunks {
            self.chunks.push(Chunk::new(self.chunk_size));
            trace!(
                mark = %self.mark,
                chunk = self.chunks.len() - 1,
                "chunk allocated"
            );
        }
    }

    /// Copy element `from` over element `to`. The two may live in
    /// different chunks.
    fn copy_slot(&mut self, from: usize, to: usize) {
        if from == to {
            return;
        }
        let size = self.element_size;
        let (fc, fo) = self.locate(from);
        let (tc, to_off) = self.locate(to);
        if fc == tc {
            self.chunks[fc].copy_within(fo, to_off, size);
        } else if fc < tc {
            let (lo, hi) = self.chunks.split_at_mut(tc);
            hi[0]
                .bytes_mut(to_off, size)
                .copy_from_slice(lo[fc].bytes(fo, size));
        } else {
            let (lo, hi) = self.chunks.split_at_mut(fc);
            lo[tc]
                .bytes_mut(to_off, size)
                .copy_from_slice(hi[0].bytes(fo, size));
        }
    }
}

impl std::fmt::Debug for ChunkedArena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkedArena")
            .field("mark", &self.mark)
            .field("len", &self.len)
            .field("element_size", &self.element_size)
            .field("chunk_size", &self.chunk_size)
            .field("chunk_count", &self.chunks.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_arena(chunk_size: usize) -> ChunkedArena {
        ChunkedArena::with_sizes(4, chunk_size).unwrap()
    }

    fn push_u32(arena: &mut ChunkedArena, v: u32) -> usize {
        let (index, slot) = arena.add().unwrap();
        slot.copy_from_slice(&v.to_le_bytes());
        index
    }

    fn read_u32(arena: &ChunkedArena, index: usize) -> u32 {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(arena.get(index).unwrap());
        u32::from_le_bytes(buf)
    }

    fn contents(arena: &ChunkedArena) -> Vec<u32> {
        (0..arena.len()).map(|i| read_u32(arena, i)).collect()
    }

    #[test]
    fn twenty_one_ints_in_four_element_chunks() {
        let mut arena = int_arena(16);
        for v in 0..21u32 {
            push_u32(&mut arena, v);
        }
        assert_eq!(arena.chunk_count(), 6);
        assert_eq!(arena.len(), 21);
        for i in 0..21 {
            assert_eq!(read_u32(&arena, i), i as u32);
        }
    }

    #[test]
    fn construction_rejects_bad_sizes() {
        assert!(matches!(
            ChunkedArena::with_sizes(0, 16),
            Err(ArenaError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChunkedArena::with_sizes(4, 0),
            Err(ArenaError::InvalidConfig { .. })
        ));
        assert!(matches!(
            ChunkedArena::with_sizes(32, 16),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn chunk_size_rounded_down() {
        let arena = ChunkedArena::with_sizes(6, 20).unwrap();
        assert_eq!(arena.chunk_size(), 18);
        assert_eq!(arena.elements_per_chunk(), 3);
    }

    #[test]
    fn add_returns_zeroed_slot_after_reuse() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 0xdead_beef);
        arena.remove_last().unwrap();
        let (index, slot) = arena.add().unwrap();
        assert_eq!(index, 0);
        assert_eq!(slot, &[0, 0, 0, 0]);
    }

    #[test]
    fn insert_at_len_appends() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 1);
        let slot = arena.insert(1).unwrap();
        slot.copy_from_slice(&2u32.to_le_bytes());
        assert_eq!(contents(&arena), vec![1, 2]);
    }

    #[test]
    fn insert_past_len_fails_without_mutation() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 1);
        let err = arena.insert(2).unwrap_err();
        assert_eq!(err, ArenaError::IndexOutOfRange { index: 2, len: 1 });
        assert_eq!(contents(&arena), vec![1]);
    }

    #[test]
    fn insert_at_zero_on_empty() {
        let mut arena = int_arena(16);
        arena.insert(0).unwrap().copy_from_slice(&9u32.to_le_bytes());
        assert_eq!(contents(&arena), vec![9]);
    }

    #[test]
    fn insert_shifts_across_chunk_boundaries() {
        let mut arena = int_arena(8);
        for v in 0..5u32 {
            push_u32(&mut arena, v);
        }
        arena.insert(1).unwrap().copy_from_slice(&100u32.to_le_bytes());
        assert_eq!(contents(&arena), vec![0, 100, 1, 2, 3, 4]);
        assert_eq!(arena.chunk_count(), 3);
    }

    #[test]
    fn remove_shifts_down() {
        let mut arena = int_arena(8);
        for v in 0..5u32 {
            push_u32(&mut arena, v);
        }
        arena.remove(1).unwrap();
        assert_eq!(contents(&arena), vec![0, 2, 3, 4]);
    }

    #[test]
    fn remove_at_zero_on_singleton() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 7);
        arena.remove(0).unwrap();
        assert!(arena.is_empty());
    }

    #[test]
    fn get_and_remove_at_len_fail() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 7);
        assert!(matches!(
            arena.get(1),
            Err(ArenaError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            arena.remove(1),
            Err(ArenaError::IndexOutOfRange { index: 1, len: 1 })
        ));
        assert!(matches!(
            arena.swap_last_and_remove(1),
            Err(ArenaError::IndexOutOfRange { .. })
        ));
    }

    #[test]
    fn remove_on_empty_fails() {
        let mut arena = int_arena(16);
        assert!(arena.remove(0).is_err());
        assert!(arena.remove_last().is_err());
    }

    #[test]
    fn swap_last_and_remove_reports_relocation() {
        let mut arena = int_arena(8);
        for v in 10..15u32 {
            push_u32(&mut arena, v);
        }
        let moved = arena.swap_last_and_remove(1).unwrap();
        assert_eq!(moved, Some(Relocation { from: 4, to: 1 }));
        assert_eq!(contents(&arena), vec![10, 14, 12, 13]);
    }

    #[test]
    fn swap_last_and_remove_of_last_moves_nothing() {
        let mut arena = int_arena(8);
        for v in 0..3u32 {
            push_u32(&mut arena, v);
        }
        assert_eq!(arena.swap_last_and_remove(2).unwrap(), None);
        assert_eq!(contents(&arena), vec![0, 1]);
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "slot 1 >= len 1")]
    fn unchecked_slot_past_len_panics_in_debug() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 7);
        push_u32(&mut arena, 8);
        arena.remove_last().unwrap();
        let _ = arena.slot(1);
    }

    #[cfg(not(debug_assertions))]
    #[test]
    fn unchecked_slot_past_len_reads_stale_bytes_in_release() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 7);
        push_u32(&mut arena, 8);
        arena.remove_last().unwrap();
        assert_eq!(arena.slot(1), &8u32.to_le_bytes());
        assert!(arena.get(1).is_err());
    }

    #[test]
    fn growth_keeps_existing_chunks_in_place() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 1);
        let before = arena.get(0).unwrap().as_ptr();
        let first_chunk = arena.chunks[0].base_ptr();
        assert_eq!(before, first_chunk);
        // Push well past the initial 32-entry table so it doubles.
        for v in 0..(4 * 40) {
            push_u32(&mut arena, v);
        }
        assert!(arena.table_capacity() >= 64);
        assert_eq!(arena.get(0).unwrap().as_ptr(), before);
        assert_eq!(arena.chunks[0].base_ptr(), first_chunk);
        assert_eq!(read_u32(&arena, 0), 1);
    }

    #[test]
    fn extend_pre_allocates_chunks() {
        let mut arena = int_arena(16);
        arena.extend(9).unwrap();
        assert_eq!(arena.chunk_count(), 3);
        assert_eq!(arena.len(), 0);
        assert!(arena.capacity() >= 9);
        for v in 0..9 {
            push_u32(&mut arena, v);
        }
        assert_eq!(arena.chunk_count(), 3);
    }

    #[test]
    fn table_doubles_only_when_exceeded() {
        let mut arena = int_arena(4);
        arena.extend(32).unwrap();
        assert_eq!(arena.table_capacity(), 32);
        arena.extend(33).unwrap();
        assert_eq!(arena.table_capacity(), 64);
        arena.extend(200).unwrap();
        assert_eq!(arena.table_capacity(), 256);
    }

    #[test]
    fn clear_keeps_chunks() {
        let mut arena = int_arena(16);
        for v in 0..10 {
            push_u32(&mut arena, v);
        }
        let chunks = arena.chunk_count();
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.chunk_count(), chunks);
    }

    #[test]
    fn dispose_releases_chunks() {
        let mut arena = int_arena(16);
        push_u32(&mut arena, 1);
        arena.dispose();
        assert!(arena.is_disposed());
        assert_eq!(arena.chunk_count(), 0);
        assert_eq!(arena.memory_bytes(), 0);
    }

    #[cfg(debug_assertions)]
    #[test]
    fn use_after_dispose_detected() {
        let mut arena = int_arena(16);
        let mark = arena.mark();
        arena.dispose();
        assert_eq!(arena.add().unwrap_err(), ArenaError::UseAfterFree { mark });
        assert!(matches!(arena.get(0), Err(ArenaError::UseAfterFree { .. })));
    }

    #[test]
    fn iter_visits_in_index_order() {
        let mut arena = int_arena(8);
        for v in [5u32, 6, 7] {
            push_u32(&mut arena, v);
        }
        let seen: Vec<Vec<u8>> = arena.iter().map(<[u8]>::to_vec).collect();
        assert_eq!(seen[2], 7u32.to_le_bytes().to_vec());
        assert_eq!(seen.len(), 3);
    }

    #[cfg(not(miri))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        #[derive(Clone, Debug)]
        enum Op {
            Add(u32),
            Insert(usize, u32),
            Remove(usize),
            SwapRemove(usize),
            RemoveLast,
        }

        fn op() -> impl Strategy<Value = Op> {
            prop_oneof![
                3 => any::<u32>().prop_map(Op::Add),
                1 => (0usize..64, any::<u32>()).prop_map(|(i, v)| Op::Insert(i, v)),
                1 => (0usize..64).prop_map(Op::Remove),
                1 => (0usize..64).prop_map(Op::SwapRemove),
                1 => Just(Op::RemoveLast),
            ]
        }

        proptest! {
            #[test]
            fn behaves_like_vec(ops in proptest::collection::vec(op(), 1..200)) {
                let mut arena = ChunkedArena::with_sizes(4, 12).unwrap();
                let mut model: Vec<u32> = Vec::new();
                for op in ops {
                    match op {
                        Op::Add(v) => {
                            push_u32(&mut arena, v);
                            model.push(v);
                        }
                        Op::Insert(i, v) => {
                            let r = arena.insert(i);
                            if i <= model.len() {
                                r.unwrap().copy_from_slice(&v.to_le_bytes());
                                model.insert(i, v);
                            } else {
                                prop_assert!(r.is_err());
                            }
                        }
                        Op::Remove(i) => {
                            let r = arena.remove(i);
                            if i < model.len() {
                                prop_assert!(r.is_ok());
                                model.remove(i);
                            } else {
                                prop_assert!(r.is_err());
                            }
                        }
                        Op::SwapRemove(i) => {
                            let r = arena.swap_last_and_remove(i);
                            if i < model.len() {
                                prop_assert!(r.is_ok());
                                model.swap_remove(i);
                            } else {
                                prop_assert!(r.is_err());
                            }
                        }
                        Op::RemoveLast => {
                            let r = arena.remove_last();
                            prop_assert_eq!(r.is_ok(), model.pop().is_some());
                        }
                    }
                    prop_assert_eq!(arena.len(), model.len());
                }
                prop_assert_eq!(contents(&arena), model);
            }

            #[test]
            fn chunk_count_is_ceiling_of_peak(n in 1usize..300, per in 1usize..9) {
                let mut arena = ChunkedArena::with_sizes(4, 4 * per).unwrap();
                for v in 0..n {
                    push_u32(&mut arena, v as u32);
                }
                prop_assert_eq!(arena.chunk_count(), n.div_ceil(per));
            }
        }
    }
}
