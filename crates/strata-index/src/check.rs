//! Debug consistency walk over every tree in a forest.
//!
//! Verifies colour rules, black heights, key order, parent links, cached
//! slot indices, bucket placement and that every arena element is
//! reachable. Intended for tests and debugging; nothing on the hot path
//! calls it.

use strata_core::{InvariantViolation, SlotIndex};

use crate::key::NodeKey;
use crate::roots::RootTable;
use crate::tree::Forest;

impl<K: NodeKey, R: RootTable> Forest<K, R> {
    pub(crate) fn check(&self) -> Result<(), InvariantViolation> {
        let live = self.arena.len();
        let mut reachable = 0usize;

        for bucket in 0..self.roots.bucket_count() {
            let Some(root) = self.roots.root(bucket) else {
                continue;
            };
            if root as usize >= live {
                return Err(InvariantViolation::DanglingLink {
                    slot: SlotIndex(root),
                    target: SlotIndex(root),
                });
            }
            if self.is_red(root) {
                return Err(InvariantViolation::RedRoot {
                    slot: SlotIndex(root),
                });
            }
            if self.parent(root).is_some() {
                return Err(InvariantViolation::RootHasParent {
                    slot: SlotIndex(root),
                });
            }
            let mut walk = Walk {
                bucket,
                live,
                reachable: &mut reachable,
                prev: None,
            };
            self.check_subtree(root, &mut walk)?;
        }

        if reachable != live {
            return Err(InvariantViolation::CountMismatch { reachable, live });
        }
        Ok(())
    }

    /// Returns the black height of the subtree rooted at `n`, counting
    /// null leaves as zero.
    fn check_subtree(&self, n: u32, walk: &mut Walk<'_, K>) -> Result<usize, InvariantViolation> {
        *walk.reachable += 1;
        if *walk.reachable > walk.live {
            // A cycle or a shared child; stop before looping forever.
            return Err(InvariantViolation::CountMismatch {
                reachable: *walk.reachable,
                live: walk.live,
            });
        }

        let cached = self.cached_index(n);
        if cached != n {
            return Err(InvariantViolation::StaleIndex {
                slot: SlotIndex(n),
                cached: SlotIndex(cached),
            });
        }
        let key = self.key(n);
        let expected = self.roots.bucket_of(key);
        if expected != walk.bucket {
            return Err(InvariantViolation::WrongBucket {
                slot: SlotIndex(n),
                found: walk.bucket,
                expected,
            });
        }

        let left = match self.left(n) {
            Some(l) => {
                self.check_edge(n, l, walk.live)?;
                self.check_subtree(l, walk)?
            }
            None => 0,
        };

        if walk.prev.is_some_and(|prev| prev >= key) {
            return Err(InvariantViolation::OrderViolation {
                slot: SlotIndex(n),
            });
        }
        walk.prev = Some(key);

        let right = match self.right(n) {
            Some(r) => {
                self.check_edge(n, r, walk.live)?;
                self.check_subtree(r, walk)?
            }
            None => 0,
        };

        if left != right {
            return Err(InvariantViolation::BlackHeightMismatch {
                slot: SlotIndex(n),
                left,
                right,
            });
        }
        Ok(left + usize::from(!self.is_red(n)))
    }

    fn check_edge(&self, parent: u32, child: u32, live: usize) -> Result<(), InvariantViolation> {
        if child as usize >= live {
            return Err(InvariantViolation::DanglingLink {
                slot: SlotIndex(parent),
                target: SlotIndex(child),
            });
        }
        if self.parent(child) != Some(parent) {
            return Err(InvariantViolation::BrokenParentLink {
                parent: SlotIndex(parent),
                child: SlotIndex(child),
            });
        }
        if self.is_red(parent) && self.is_red(child) {
            return Err(InvariantViolation::RedRedEdge {
                parent: SlotIndex(parent),
                child: SlotIndex(child),
            });
        }
        Ok(())
    }
}

struct Walk<'a, K> {
    bucket: usize,
    live: usize,
    reachable: &'a mut usize,
    prev: Option<K>,
}
