//! In-order traversal of one tree.

use smallvec::SmallVec;

use crate::key::NodeKey;
use crate::roots::RootTable;
use crate::tree::Forest;

/// Ascending `(key, value)` iterator over one tree of a forest.
pub(crate) struct InOrder<'a, K: NodeKey, R: RootTable> {
    forest: &'a Forest<K, R>,
    // Red-black depth is at most 2·log2(n + 1), so 64 covers u32 slots.
    stack: SmallVec<[u32; 64]>,
}

impl<'a, K: NodeKey, R: RootTable> InOrder<'a, K, R> {
    pub(crate) fn new(forest: &'a Forest<K, R>, root: Option<u32>) -> Self {
        let mut iter = Self {
            forest,
            stack: SmallVec::new(),
        };
        iter.push_left_spine(root);
        iter
    }

    fn push_left_spine(&mut self, mut cur: Option<u32>) {
        while let Some(n) = cur {
            self.stack.push(n);
            cur = self.forest.left(n);
        }
    }
}

impl<'a, K: NodeKey, R: RootTable> Iterator for InOrder<'a, K, R> {
    type Item = (K, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let n = self.stack.pop()?;
        self.push_left_spine(self.forest.right(n));
        Some((self.forest.key(n), self.forest.value(n)))
    }
}
