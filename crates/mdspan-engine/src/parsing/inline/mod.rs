//! # Inline Parser
//!
//! Second pass over text-bearing fragments. The lines of a fragment are
//! flattened, scanned for delimiters, split into literal zones, resolved into
//! links and emphasis, and finally emitted as leaves under a block node.
//!
//! ## Modules
//!
//! - **`cursor`**: character cursor shared by the recognizers
//! - **`kinds`**: link parts, autolinks and raw HTML recognizers
//! - **`scanner`**: delimiter records with flanking metadata
//! - **`flat`**: paragraph lines joined with positions kept
//! - **`zones`**: code spans, math, autolinks and inline HTML
//! - **`items`**: intermediate pieces between tokenizing and emission
//! - **`emphasis`**: delimiter run matching
//! - **`parser`**: bracket and link resolution
//! - **`emit`**: node creation with styles and positions

pub mod cursor;
pub mod emit;
pub mod emphasis;
pub mod flat;
pub mod items;
pub mod kinds;
pub mod parser;
pub mod scanner;
pub mod zones;

use std::collections::HashSet;

pub use emit::Columns;

use crate::doc::{Document, NodeId};
use crate::parsing::links::LinkResolver;
use crate::parsing::text::SourceLine;
use emit::Emitter;
use flat::Flat;
use parser::Tokenizer;

/// What the inline parser needs from the surrounding parse.
pub struct InlineEnv<'e> {
    /// Appended to label keys in multi-file parses.
    pub label_suffix: &'e str,
    /// Footnote keys seen during the collecting pass.
    pub footnotes: &'e HashSet<String>,
    pub resolver: &'e mut LinkResolver,
}

/// Parses the inline content of `lines` and appends the result to `parent`.
///
/// Returns the virgin column of every character of the text nodes created.
pub fn parse_inline(
    doc: &mut Document,
    lines: &[SourceLine],
    parent: NodeId,
    env: &mut InlineEnv<'_>,
) -> Columns {
    if lines.is_empty() {
        return Columns::new();
    }

    let flat = Flat::new(lines);
    let mut delims = scanner::scan(&flat.chars);
    let zones = zones::find_zones(&flat.chars, &mut delims);
    let items = Tokenizer::new(&flat, &delims, &zones, doc, env).run();

    Emitter::new(doc, lines, &flat).emit(items, parent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{NodeKind, TextOptions};
    use crate::parsing::text::split_lines;
    use pretty_assertions::assert_eq;

    fn parse(src: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let p = doc.add(NodeKind::Paragraph, Default::default());
        let footnotes = HashSet::new();
        let mut resolver = LinkResolver::default();
        let mut env = InlineEnv {
            label_suffix: "",
            footnotes: &footnotes,
            resolver: &mut resolver,
        };
        parse_inline(&mut doc, &split_lines(src), p, &mut env);
        (doc, p)
    }

    fn texts(doc: &Document, p: NodeId) -> Vec<(String, TextOptions)> {
        doc.children(p)
            .iter()
            .filter_map(|id| match doc.kind(*id) {
                NodeKind::Text(t) => Some((t.text.clone(), t.opts.style)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn rule_of_three_nests_italic_in_bold() {
        let (doc, p) = parse("**a*b***");
        assert_eq!(texts(&doc, p), vec![
            ("a".to_string(), TextOptions::BOLD),
            ("b".to_string(), TextOptions::BOLD | TextOptions::ITALIC),
        ]);

        let NodeKind::Text(b) = doc.kind(doc.children(p)[1]) else {
            panic!("expected text");
        };
        assert_eq!(b.opts.close_styles.len(), 2);
        assert_eq!(b.opts.close_styles[0].style, TextOptions::ITALIC);
        assert_eq!(b.opts.close_styles[1].style, TextOptions::BOLD);
    }

    #[test]
    fn unmatched_delimiters_stay_literal() {
        let (doc, p) = parse("a * b [c");
        assert_eq!(texts(&doc, p), vec![("a * b [c".to_string(), TextOptions::empty())]);
    }

    #[test]
    fn inline_link_with_emphasised_text() {
        let (doc, p) = parse("see [*x*](/u \"t\")");
        let NodeKind::Link(link) = doc.kind(doc.children(p)[1]) else {
            panic!("expected link");
        };
        assert_eq!(link.url, "/u");
        assert_eq!(link.title, "t");
        assert_eq!(link.text, "*x*");
        let inner = link.p.expect("link text");
        assert_eq!(texts(&doc, inner), vec![("x".to_string(), TextOptions::ITALIC)]);
    }

    #[test]
    fn link_wrapping_single_image_owns_it() {
        let (doc, p) = parse("[![alt](i.png)](/u)");
        let NodeKind::Link(link) = doc.kind(doc.children(p)[0]) else {
            panic!("expected link");
        };
        assert!(link.p.is_none());
        let img = link.img.expect("image");
        let NodeKind::Image(image) = doc.kind(img) else {
            panic!("expected image");
        };
        assert_eq!(image.url, "i.png");
        assert_eq!(image.text, "alt");
    }

    #[test]
    fn links_do_not_nest() {
        let (doc, p) = parse("[a [b](c) d](e)");
        let kinds: Vec<_> = doc.children(p).iter().map(|id| doc.item_type(*id)).collect();
        use crate::doc::ItemType;
        assert_eq!(kinds, vec![ItemType::Text, ItemType::Link, ItemType::Text]);
    }

    #[test]
    fn code_span_and_hard_break() {
        let (doc, p) = parse("`a`  \nb");
        let kinds: Vec<_> = doc.children(p).iter().map(|id| doc.item_type(*id)).collect();
        use crate::doc::ItemType;
        assert_eq!(kinds, vec![ItemType::Code, ItemType::LineBreak, ItemType::Text]);
    }

    #[test]
    fn text_columns_follow_escapes() {
        let mut doc = Document::new();
        let p = doc.add(NodeKind::Paragraph, Default::default());
        let footnotes = HashSet::new();
        let mut resolver = LinkResolver::default();
        let mut env = InlineEnv {
            label_suffix: "",
            footnotes: &footnotes,
            resolver: &mut resolver,
        };
        let columns = parse_inline(&mut doc, &split_lines("  \\*a"), p, &mut env);
        let t = doc.children(p)[0];
        assert_eq!(columns[&t], vec![3, 4]);
    }
}
