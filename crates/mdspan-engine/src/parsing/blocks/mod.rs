//! # Block Parser
//!
//! First pass over the lines of a container: lines are classified, grouped
//! into typed fragments and handed to the per-type handlers in
//! [`crate::parsing::context`].
//!
//! ## Modules
//!
//! - **`types`**: `BlockType`, `TextKind` and `Fragment`
//! - **`kinds`**: recognizers for headings, fences, quotes, lists, tables, HTML blocks and footnotes
//! - **`classify`**: line classification with and without an open list item
//! - **`builder`**: fragment collection with lazy continuation
//! - **`strip`**: container prefix removal
//! - **`refdef`**: link reference definitions at the start of paragraphs

pub mod builder;
pub mod classify;
pub mod kinds;
pub mod refdef;
pub mod strip;
pub mod types;

pub use builder::collect;
pub use refdef::{RefDef, parse_definitions};
pub use types::{BlockType, Fragment, TextKind};
