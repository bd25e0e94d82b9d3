//! Error types for the Strata collections.
//!
//! Split by concern: [`ArenaError`] covers construction, positional access
//! and lifecycle failures of any public operation; [`InvariantViolation`]
//! is produced only by the debug `check()` walk of an index.

use std::error::Error;
use std::fmt;

use crate::id::{ExistenceMark, SlotIndex};

/// Errors returned by arena and index operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// Construction parameters are zero or inconsistent
    /// (e.g. an element larger than a chunk).
    InvalidConfig {
        /// Description of the rejected parameter.
        reason: String,
    },
    /// An operation argument was rejected before any mutation.
    InvalidArgument {
        /// Description of the rejected argument.
        reason: String,
    },
    /// Positional access outside `[0, len)` (or `[0, len]` for insertion).
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The live element count at the time of the request.
        len: usize,
    },
    /// Operation on an instance whose storage has been disposed.
    ///
    /// Only detected in builds with `debug_assertions`.
    UseAfterFree {
        /// The retired existence mark of the instance.
        mark: ExistenceMark,
    },
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid configuration: {reason}"),
            Self::InvalidArgument { reason } => write!(f, "invalid argument: {reason}"),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::UseAfterFree { mark } => {
                write!(f, "use after free: instance {mark} has been disposed")
            }
        }
    }
}

impl Error for ArenaError {}

/// A structural defect found by an index consistency check.
///
/// Slot positions are arena indices, not key order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// A tree root is coloured red.
    RedRoot {
        /// Slot of the offending root.
        slot: SlotIndex,
    },
    /// A tree root records a parent link.
    RootHasParent {
        /// Slot of the offending root.
        slot: SlotIndex,
    },
    /// A red node has a red child.
    RedRedEdge {
        /// The red parent.
        parent: SlotIndex,
        /// The red child.
        child: SlotIndex,
    },
    /// Two null paths below a node pass through different black counts.
    BlackHeightMismatch {
        /// The node whose subtrees disagree.
        slot: SlotIndex,
        /// Black height of the left subtree.
        left: usize,
        /// Black height of the right subtree.
        right: usize,
    },
    /// In-order traversal is not strictly increasing.
    OrderViolation {
        /// The node whose key is out of order.
        slot: SlotIndex,
    },
    /// A child does not point back at its parent.
    BrokenParentLink {
        /// The parent that owns the child link.
        parent: SlotIndex,
        /// The child whose parent link disagrees.
        child: SlotIndex,
    },
    /// A node's cached slot index differs from its position.
    StaleIndex {
        /// The node's real position.
        slot: SlotIndex,
        /// The index cached inside the node.
        cached: SlotIndex,
    },
    /// A node is reachable from a bucket its key does not hash to.
    WrongBucket {
        /// The misplaced node.
        slot: SlotIndex,
        /// The bucket it was found under.
        found: usize,
        /// The bucket its key hashes to.
        expected: usize,
    },
    /// A link points outside the arena's live range.
    DanglingLink {
        /// The node that owns the link.
        slot: SlotIndex,
        /// The out-of-range target.
        target: SlotIndex,
    },
    /// Reachable node count differs from the arena's element count.
    CountMismatch {
        /// Nodes reachable from the root(s).
        reachable: usize,
        /// Live elements in the arena.
        live: usize,
    },
}

impl fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RedRoot { slot } => write!(f, "root {slot} is red"),
            Self::RootHasParent { slot } => write!(f, "root {slot} has a parent link"),
            Self::RedRedEdge { parent, child } => {
                write!(f, "red node {parent} has red child {child}")
            }
            Self::BlackHeightMismatch { slot, left, right } => write!(
                f,
                "black height mismatch below {slot}: left {left}, right {right}"
            ),
            Self::OrderViolation { slot } => write!(f, "key order violated at {slot}"),
            Self::BrokenParentLink { parent, child } => {
                write!(f, "child {child} does not link back to parent {parent}")
            }
            Self::StaleIndex { slot, cached } => {
                write!(f, "node at {slot} caches stale index {cached}")
            }
            Self::WrongBucket {
                slot,
                found,
                expected,
            } => write!(
                f,
                "node {slot} found in bucket {found} but hashes to bucket {expected}"
            ),
            Self::DanglingLink { slot, target } => {
                write!(f, "node {slot} links to dead slot {target}")
            }
            Self::CountMismatch { reachable, live } => write!(
                f,
                "{reachable} nodes reachable but arena holds {live} elements"
            ),
        }
    }
}

impl Error for InvariantViolation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_error_names_both_bounds() {
        let err = ArenaError::IndexOutOfRange { index: 7, len: 3 };
        assert_eq!(err.to_string(), "index 7 out of range for length 3");
    }

    #[test]
    fn violation_display_mentions_slots() {
        let v = InvariantViolation::RedRedEdge {
            parent: SlotIndex(4),
            child: SlotIndex(9),
        };
        let msg = v.to_string();
        assert!(msg.contains('4') && msg.contains('9'));
    }

    #[test]
    fn every_slot_variant_formats() {
        let violations = [
            InvariantViolation::RedRoot { slot: SlotIndex(1) },
            InvariantViolation::RootHasParent { slot: SlotIndex(1) },
            InvariantViolation::OrderViolation { slot: SlotIndex(1) },
            InvariantViolation::BlackHeightMismatch {
                slot: SlotIndex(1),
                left: 2,
                right: 3,
            },
            InvariantViolation::BrokenParentLink {
                parent: SlotIndex(1),
                child: SlotIndex(2),
            },
            InvariantViolation::StaleIndex {
                slot: SlotIndex(1),
                cached: SlotIndex(5),
            },
            InvariantViolation::WrongBucket {
                slot: SlotIndex(1),
                found: 0,
                expected: 3,
            },
            InvariantViolation::DanglingLink {
                slot: SlotIndex(1),
                target: SlotIndex(40),
            },
        ];
        for v in violations {
            assert!(v.to_string().contains('1'), "{v:?}");
        }
    }

    #[test]
    fn errors_are_std_errors() {
        fn takes_error(_: &dyn Error) {}
        takes_error(&ArenaError::InvalidConfig {
            reason: "zero".into(),
        });
        takes_error(&InvariantViolation::RedRoot { slot: SlotIndex(0) });
    }
}
