//! # Text Utilities
//!
//! Span-preserving strings and the character classes the parsers share.
//!
//! ## Modules
//!
//! - **`internal`**: `InternalString`, a working string that maps every offset back to the source
//! - **`position`**: `WithPosition`, the virgin line/column span carried by nodes
//! - **`lines`**: line splitting with newline normalization and tab expansion
//! - **`chars`**: escapes, entities and flanking character classes

pub mod chars;
pub mod internal;
pub mod lines;
pub mod position;

pub use internal::InternalString;
pub use lines::{SourceLine, block_span, split_lines};
pub use position::WithPosition;
