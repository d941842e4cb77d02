//! # Snapshot Testing Support
//!
//! Stable views of a parsed [`Document`](crate::doc::Document) for snapshot
//! assertions, plus structural invariant checks.
//!
//! ## Modules
//!
//! - **`normalize`**: converts a document into a serializable [`Snap`] tree and
//!   an indented text outline (also printed by the CLI's `--ast`)
//! - **`invariants`**: runtime checks for parser correctness (spans inside the
//!   source, siblings in source order, children inside their parents)

pub mod invariants;
pub mod normalize;

pub use invariants::check as invariants;
pub use normalize::{NodeSnap, Snap, normalize};
