//! Core types and primitives for the Strata collections.
//!
//! This is the leaf crate with zero internal dependencies. It defines the
//! pieces shared by the arena and index crates: the error taxonomy, the
//! process-wide [`ExistenceMark`] counter and the [`SpinLock`] that guards
//! structural mutations.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod error;
pub mod id;
pub mod lock;

pub use error::{ArenaError, InvariantViolation};
pub use id::{ExistenceMark, SlotIndex, NIL_SLOT};
pub use lock::{SpinGuard, SpinLock};
