//! # mdspan engine
//!
//! CommonMark-family Markdown parser producing an arena document tree in which
//! every node keeps its span in the original source.
//!
//! ## Modules
//!
//! - **`doc`**: node kinds and the [`Document`] arena
//! - **`parsing`**: block and inline parsing, positions, link rewriting
//! - **`plugins`**: text and block plugins (autolinks, custom emphasis, YAML front matter)
//! - **`visitor`**: per-kind walk over a document
//! - **`html`**: HTML renderer built on the visitor
//! - **`poscache`**: lookup of the nodes under a source position
//! - **`algo`**: `for_each` over nodes of given kinds
//! - **`io`**: file reading for multi-file parses
//! - **`snapshot`**: outlines and invariant checks for tests and tooling

pub mod algo;
pub mod doc;
pub mod html;
pub mod io;
pub mod parsing;
pub mod plugins;
pub mod poscache;
pub mod snapshot;
pub mod visitor;

pub use doc::{Document, ItemType, NodeId, NodeKind};
pub use html::{HtmlOptions, to_html};
pub use parsing::{ParseError, Parser, ParserOptions};
pub use poscache::PosCache;
pub use visitor::Visitor;
