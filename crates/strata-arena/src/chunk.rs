//! Fixed-size chunk buffers.
//!
//! A [`Chunk`] is one zero-initialised heap buffer. Once allocated its bytes
//! never move: the arena's table holds chunks by owning pointer, so growing
//! the table relocates only the pointers.

/// A single fixed-size byte buffer holding whole elements.
pub struct Chunk {
    data: Box<[u8]>,
}

impl Chunk {
    /// Allocate a zeroed chunk of `size` bytes.
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0u8; size].into_boxed_slice(),
        }
    }

    /// Borrow `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the chunk.
    pub fn bytes(&self, offset: usize, len: usize) -> &[u8] {
        &self.data[offset..offset + len]
    }

    /// Mutably borrow `len` bytes starting at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset + len` exceeds the chunk.
    pub fn bytes_mut(&mut self, offset: usize, len: usize) -> &mut [u8] {
        &mut self.data[offset..offset + len]
    }

    /// Copy `len` bytes from `src` to `dst` within this chunk.
    /// Ranges may overlap.
    pub fn copy_within(&mut self, src: usize, dst: usize, len: usize) {
        self.data.copy_within(src..src + len, dst);
    }

    /// Address of the first byte, for address-stability assertions.
    pub fn base_ptr(&self) -> *const u8 {
        self.data.as_ptr()
    }

    /// Size of the buffer in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the buffer is zero-sized.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_chunk_is_zeroed() {
        let chunk = Chunk::new(64);
        assert_eq!(chunk.len(), 64);
        assert!(chunk.bytes(0, 64).iter().all(|&b| b == 0));
    }

    #[test]
    fn bytes_mut_writes_are_visible() {
        let mut chunk = Chunk::new(16);
        chunk.bytes_mut(4, 4).copy_from_slice(&[1, 2, 3, 4]);
        assert_eq!(chunk.bytes(4, 4), &[1, 2, 3, 4]);
    }

    #[test]
    fn copy_within_handles_overlap() {
        let mut chunk = Chunk::new(8);
        chunk.bytes_mut(0, 4).copy_from_slice(&[1, 2, 3, 4]);
        chunk.copy_within(0, 2, 4);
        assert_eq!(chunk.bytes(0, 6), &[1, 2, 1, 2, 3, 4]);
    }

    #[test]
    fn base_ptr_is_first_byte() {
        let chunk = Chunk::new(8);
        assert_eq!(chunk.base_ptr(), chunk.bytes(0, 1).as_ptr());
    }

    #[test]
    #[should_panic]
    fn out_of_bounds_slice_panics() {
        let chunk = Chunk::new(8);
        let _ = chunk.bytes(6, 4);
    }
}
