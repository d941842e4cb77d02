//! # Algorithms
//!
//! [`for_each`] calls a function on every node of the requested kinds,
//! optionally limited to the outer nesting levels.

use crate::doc::{
    Anchor, Code, Document, Footnote, FootnoteRef, Heading, Image, ItemType, Link, ListItem,
    NodeId, NodeKind, RawHtml, Table, Text,
};
use crate::visitor::{Visitor, walk_blocks, walk_inlines, walk_list_item, walk_paragraph};

/// Calls `func` for each node whose kind is in `types`, footnotes included.
///
/// `max_nesting_level` of 0 means no limit; 1 visits only top-level items,
/// 2 also their direct content, and so on.
pub fn for_each(
    types: &[ItemType],
    doc: &Document,
    func: impl FnMut(&Document, NodeId),
    max_nesting_level: usize,
) {
    let mut v = ForEach {
        types,
        func,
        max: max_nesting_level,
        level: 0,
    };
    v.process(doc);
    for &id in doc.footnotes().values() {
        if let NodeKind::Footnote(footnote) = doc.kind(id) {
            v.on_footnote(doc, id, footnote);
        }
    }
}

struct ForEach<'t, F> {
    types: &'t [ItemType],
    func: F,
    max: usize,
    level: usize,
}

impl<F: FnMut(&Document, NodeId)> ForEach<'_, F> {
    /// Enters a node: calls `func` if allowed at this level and returns
    /// whether its content may be visited. Pair with [`ForEach::leave`].
    fn enter(&mut self, doc: &Document, id: NodeId) -> bool {
        self.level += 1;
        let within = self.max == 0 || self.level <= self.max;
        if within && self.types.contains(&doc.item_type(id)) {
            (self.func)(doc, id);
        }
        self.max == 0 || self.level < self.max
    }

    fn leave(&mut self) {
        self.level -= 1;
    }

    fn leaf(&mut self, doc: &Document, id: NodeId) {
        self.enter(doc, id);
        self.leave();
    }
}

impl<F: FnMut(&Document, NodeId)> Visitor for ForEach<'_, F> {
    fn on_user_defined(&mut self, doc: &Document, id: NodeId) {
        self.leaf(doc, id);
    }

    fn on_text(&mut self, doc: &Document, id: NodeId, _text: &Text) {
        self.leaf(doc, id);
    }

    fn on_math(&mut self, doc: &Document, id: NodeId, _math: &Code) {
        self.leaf(doc, id);
    }

    fn on_line_break(&mut self, doc: &Document, id: NodeId, _text: &Text) {
        self.leaf(doc, id);
    }

    fn on_paragraph(&mut self, doc: &Document, id: NodeId, _wrap: bool, _skip_opening_wrap: bool) {
        if self.enter(doc, id) {
            walk_paragraph(self, doc, id);
        }
        self.leave();
    }

    fn on_heading(&mut self, doc: &Document, id: NodeId, heading: &Heading) {
        if self.enter(doc, id)
            && let Some(title) = heading.text
            && !doc.children(title).is_empty()
        {
            self.on_paragraph(doc, title, true, false);
        }
        self.leave();
    }

    fn on_code(&mut self, doc: &Document, id: NodeId, _code: &Code) {
        self.leaf(doc, id);
    }

    fn on_inline_code(&mut self, doc: &Document, id: NodeId, _code: &Code) {
        self.leaf(doc, id);
    }

    fn on_blockquote(&mut self, doc: &Document, id: NodeId) {
        if self.enter(doc, id) {
            walk_blocks(self, doc, id);
        }
        self.leave();
    }

    fn on_list(&mut self, doc: &Document, id: NodeId) {
        if self.enter(doc, id) {
            for &item in doc.children(id) {
                if let NodeKind::ListItem(li) = doc.kind(item) {
                    self.on_list_item(doc, item, li, true);
                }
            }
        }
        self.leave();
    }

    fn on_list_item(&mut self, doc: &Document, id: NodeId, _item: &ListItem, _first: bool) {
        if self.enter(doc, id) {
            walk_list_item(self, doc, id, false);
        }
        self.leave();
    }

    fn on_table(&mut self, doc: &Document, id: NodeId, table: &Table) {
        if self.enter(doc, id) && !doc.is_table_empty(id) {
            let columns = doc
                .children(id)
                .first()
                .map_or(table.columns_count(), |header| doc.children(*header).len());
            for &row in doc.children(id) {
                for &cell in doc.children(row).iter().take(columns) {
                    self.on_table_cell(doc, cell);
                }
            }
        }
        self.leave();
    }

    fn on_table_cell(&mut self, doc: &Document, id: NodeId) {
        walk_inlines(self, doc, id);
    }

    fn on_anchor(&mut self, doc: &Document, id: NodeId, _anchor: &Anchor) {
        self.leaf(doc, id);
    }

    fn on_raw_html(&mut self, doc: &Document, id: NodeId, _html: &RawHtml) {
        self.leaf(doc, id);
    }

    fn on_horizontal_line(&mut self, doc: &Document, id: NodeId) {
        self.leaf(doc, id);
    }

    fn on_link(&mut self, doc: &Document, id: NodeId, link: &Link) {
        if self.enter(doc, id) {
            if let Some(img) = link.img
                && let NodeKind::Image(image) = doc.kind(img)
            {
                self.on_image(doc, img, image);
            } else if let Some(p) = link.p
                && !doc.children(p).is_empty()
            {
                self.on_paragraph(doc, p, false, false);
            }
        }
        self.leave();
    }

    fn on_image(&mut self, doc: &Document, id: NodeId, _image: &Image) {
        self.leaf(doc, id);
    }

    fn on_footnote_ref(&mut self, doc: &Document, id: NodeId, _footnote_ref: &FootnoteRef) {
        self.leaf(doc, id);
    }

    fn on_footnote(&mut self, doc: &Document, id: NodeId, _footnote: &Footnote) {
        if self.enter(doc, id) {
            walk_blocks(self, doc, id);
        }
        self.leave();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn count(src: &str, types: &[ItemType], max: usize) -> usize {
        let doc = Parser::new().parse(src).unwrap();
        let mut n = 0;
        for_each(types, &doc, |_, _| n += 1, max);
        n
    }

    const NESTED: &str = "text\n\n> quote\n>\n> - item";

    #[rstest]
    #[case(0, 3)]
    #[case(1, 1)]
    #[case(2, 2)]
    #[case(3, 2)]
    #[case(4, 3)]
    fn paragraphs_by_depth(#[case] max: usize, #[case] expected: usize) {
        assert_eq!(count(NESTED, &[ItemType::Paragraph], max), expected);
    }

    #[test]
    fn several_kinds_at_once() {
        assert_eq!(count(NESTED, &[ItemType::Blockquote, ItemType::List], 0), 2);
    }

    #[test]
    fn footnotes_are_walked_after_the_document() {
        let doc = Parser::new().parse("a[^n]\n\n[^n]: *b*").unwrap();
        let mut texts = vec![];
        for_each(
            &[ItemType::Text],
            &doc,
            |doc, id| {
                if let NodeKind::Text(t) = doc.kind(id) {
                    texts.push(t.text.clone());
                }
            },
            0,
        );
        assert_eq!(texts, vec!["a", "b"]);
    }

    #[test]
    fn heading_titles_and_link_texts() {
        assert_eq!(count("# [x](y)", &[ItemType::Text], 0), 1);
        assert_eq!(count("# [x](y)", &[ItemType::Link], 2), 0);
        assert_eq!(count("# [x](y)", &[ItemType::Link], 3), 1);
        assert_eq!(count("# [x](y)", &[ItemType::Text], 4), 0);
    }
}
