//! # Visitor
//!
//! Double-dispatch walk over a [`Document`]. Leaf hooks are required;
//! container hooks default to the `walk_*` functions, which an implementor
//! may call from its own override to keep recursing.

use crate::doc::{
    Anchor, Code, Document, Footnote, FootnoteRef, Heading, Image, Link, ListItem, NodeId,
    NodeKind, RawHtml, Table, Text,
};

pub trait Visitor {
    /// Walks the whole document.
    fn process(&mut self, doc: &Document) {
        walk_document(self, doc);
    }

    /// Labels of the top-level anchors, reported before anything else.
    fn on_anchors(&mut self, _anchors: Vec<String>) {}

    /// Fires between inline items that do not share a source line.
    fn on_add_line_ending(&mut self) {}

    fn on_user_defined(&mut self, _doc: &Document, _id: NodeId) {}

    fn on_text(&mut self, doc: &Document, id: NodeId, text: &Text);
    fn on_math(&mut self, doc: &Document, id: NodeId, math: &Code);
    fn on_line_break(&mut self, doc: &Document, id: NodeId, text: &Text);
    fn on_heading(&mut self, doc: &Document, id: NodeId, heading: &Heading);
    fn on_code(&mut self, doc: &Document, id: NodeId, code: &Code);
    fn on_inline_code(&mut self, doc: &Document, id: NodeId, code: &Code);
    fn on_list(&mut self, doc: &Document, id: NodeId);
    fn on_table(&mut self, doc: &Document, id: NodeId, table: &Table);
    fn on_anchor(&mut self, doc: &Document, id: NodeId, anchor: &Anchor);
    fn on_raw_html(&mut self, doc: &Document, id: NodeId, html: &RawHtml);
    fn on_horizontal_line(&mut self, doc: &Document, id: NodeId);
    fn on_link(&mut self, doc: &Document, id: NodeId, link: &Link);
    fn on_image(&mut self, doc: &Document, id: NodeId, image: &Image);
    fn on_footnote_ref(&mut self, doc: &Document, id: NodeId, footnote_ref: &FootnoteRef);

    /// `wrap` asks for the paragraph's own markup; `skip_opening_wrap`
    /// suppresses just its opening part.
    fn on_paragraph(&mut self, doc: &Document, id: NodeId, _wrap: bool, _skip_opening_wrap: bool) {
        walk_paragraph(self, doc, id);
    }

    fn on_blockquote(&mut self, doc: &Document, id: NodeId) {
        walk_blocks(self, doc, id);
    }

    fn on_list_item(&mut self, doc: &Document, id: NodeId, _item: &ListItem, _first: bool) {
        walk_list_item(self, doc, id, false);
    }

    fn on_table_cell(&mut self, doc: &Document, id: NodeId) {
        walk_inlines(self, doc, id);
    }

    fn on_footnote(&mut self, doc: &Document, id: NodeId, _footnote: &Footnote) {
        walk_blocks(self, doc, id);
    }
}

/// Reports the anchors, then dispatches every top-level item.
pub fn walk_document<V: Visitor + ?Sized>(v: &mut V, doc: &Document) {
    let anchors = doc
        .items()
        .iter()
        .filter_map(|&id| match doc.kind(id) {
            NodeKind::Anchor(a) => Some(a.label.clone()),
            _ => None,
        })
        .collect();
    v.on_anchors(anchors);

    for &id in doc.items() {
        visit_block(v, doc, id, true, false);
    }
}

/// Dispatches one block-level item.
pub fn visit_block<V: Visitor + ?Sized>(
    v: &mut V,
    doc: &Document,
    id: NodeId,
    wrap: bool,
    skip_opening_wrap: bool,
) {
    match doc.kind(id) {
        NodeKind::Heading(h) => v.on_heading(doc, id, h),
        NodeKind::Paragraph => v.on_paragraph(doc, id, wrap, skip_opening_wrap),
        NodeKind::Code(c) => v.on_code(doc, id, c),
        NodeKind::Blockquote(_) => v.on_blockquote(doc, id),
        NodeKind::List => v.on_list(doc, id),
        NodeKind::Table(t) => v.on_table(doc, id, t),
        NodeKind::Anchor(a) => v.on_anchor(doc, id, a),
        NodeKind::RawHtml(h) => v.on_raw_html(doc, id, h),
        NodeKind::HorizontalLine => v.on_horizontal_line(doc, id),
        NodeKind::UserDefined(_) => v.on_user_defined(doc, id),
        _ => {}
    }
}

/// Dispatches one inline item.
pub fn visit_inline<V: Visitor + ?Sized>(v: &mut V, doc: &Document, id: NodeId) {
    match doc.kind(id) {
        NodeKind::Text(t) => v.on_text(doc, id, t),
        NodeKind::Code(c) => v.on_inline_code(doc, id, c),
        NodeKind::Link(l) => v.on_link(doc, id, l),
        NodeKind::Image(i) => v.on_image(doc, id, i),
        NodeKind::Math(m) => v.on_math(doc, id, m),
        NodeKind::LineBreak(t) => v.on_line_break(doc, id, t),
        NodeKind::FootnoteRef(f) => v.on_footnote_ref(doc, id, f),
        NodeKind::RawHtml(h) => v.on_raw_html(doc, id, h),
        _ => {}
    }
}

/// Inline children of a paragraph with line endings between source lines.
pub fn walk_paragraph<V: Visitor + ?Sized>(v: &mut V, doc: &Document, id: NodeId) {
    let children = doc.children(id);
    let mut line = children.first().map_or(-1, |c| doc.pos(*c).start_line);

    for &child in children {
        let pos = doc.pos(child);
        if pos.start_line != line {
            v.on_add_line_ending();
        }
        line = pos.end_line;
        visit_inline(v, doc, child);
    }
}

/// Inline children without line endings.
pub fn walk_inlines<V: Visitor + ?Sized>(v: &mut V, doc: &Document, id: NodeId) {
    for &child in doc.children(id) {
        visit_inline(v, doc, child);
    }
}

/// Block children, paragraphs wrapped.
pub fn walk_blocks<V: Visitor + ?Sized>(v: &mut V, doc: &Document, id: NodeId) {
    for &child in doc.children(id) {
        visit_block(v, doc, child, true, false);
    }
}

/// Block children of a list item; `skip_opening_wrap` applies to the first
/// child only.
pub fn walk_list_item<V: Visitor + ?Sized>(
    v: &mut V,
    doc: &Document,
    id: NodeId,
    skip_opening_wrap: bool,
) {
    let wrap = wrap_first_paragraph_in_list_item(doc, id);
    let mut skip = skip_opening_wrap;

    for &child in doc.children(id) {
        visit_block(v, doc, child, wrap, skip);
        skip = false;
    }
}

/// Paragraphs of an item get their own markup unless the item is a single
/// paragraph, optionally followed by a nested list.
pub fn wrap_first_paragraph_in_list_item(doc: &Document, item: NodeId) -> bool {
    let children = doc.children(item);
    children.len() > 1 && !matches!(doc.kind(children[1]), NodeKind::List)
}
