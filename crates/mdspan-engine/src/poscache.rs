//! # Position Cache
//!
//! Index of a document's nodes by source span, built by walking the tree.
//! [`PosCache::find_first_in_cache`] answers "which nodes are under this
//! position", outermost first.

use crate::doc::{
    Anchor, Code, Document, Footnote, FootnoteRef, Heading, Image, Link, ListItem, NodeId,
    NodeKind, Opts, RawHtml, Table, Text,
};
use crate::parsing::text::WithPosition;
use crate::visitor::{Visitor, walk_blocks, walk_inlines, walk_list_item, walk_paragraph};

/// A node's span and the spans nested in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosRange {
    pub pos: WithPosition,
    pub item: NodeId,
    pub children: Vec<PosRange>,
}

impl PosRange {
    pub fn new(pos: WithPosition, item: NodeId) -> Self {
        Self {
            pos,
            item,
            children: vec![],
        }
    }
}

/// True if the two spans share at least one character.
pub fn intersects(l: &WithPosition, r: &WithPosition) -> bool {
    let lines = l.start_line <= r.end_line && l.end_line >= r.start_line;
    if lines && l.start_line == r.end_line && l.end_line == r.start_line {
        return l.end_column >= r.start_column && l.start_column <= r.end_column;
    }
    lines
}

/// True if `l` ends before `r` starts.
pub fn precedes(l: &WithPosition, r: &WithPosition) -> bool {
    l.end_line < r.start_line || (l.end_line == r.start_line && l.end_column < r.start_column)
}

#[derive(Debug, Clone, Default)]
pub struct PosCache {
    cache: Vec<PosRange>,
    /// Paths of the open containers.
    stack: Vec<Vec<usize>>,
    sorted: bool,
}

impl PosCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `doc`, then its footnotes and reference definitions.
    pub fn initialize(&mut self, doc: &Document) {
        self.cache.clear();
        self.stack.clear();
        self.sorted = false;

        self.process(doc);

        self.sorted = true;
        for &id in doc.footnotes().values() {
            if let NodeKind::Footnote(footnote) = doc.kind(id) {
                self.on_footnote(doc, id, footnote);
            }
        }
        for &id in doc.labeled_links().values() {
            self.insert(PosRange::new(doc.pos(id), id));
        }
    }

    /// Top-level ranges.
    pub fn ranges(&self) -> &[PosRange] {
        &self.cache
    }

    /// Nodes whose span contains `pos`, from the outermost to the innermost.
    pub fn find_first_in_cache(&self, pos: &WithPosition) -> Vec<NodeId> {
        let mut out = vec![];
        let mut level = self.cache.as_slice();

        while let Some(range) = level.iter().find(|r| intersects(&r.pos, pos)) {
            out.push(range.item);
            level = &range.children;
        }

        out
    }

    fn at_path(&mut self, path: &[usize]) -> Option<&mut PosRange> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.cache.get_mut(first)?;
        for &i in rest {
            node = node.children.get_mut(i)?;
        }
        Some(node)
    }

    /// Adds `range` and returns its path.
    fn insert(&mut self, range: PosRange) -> Vec<usize> {
        if let Some(path) = self.stack.last().cloned() {
            if let Some(parent) = self.at_path(&path) {
                parent.children.push(range);
                let mut child = path;
                child.push(parent.children.len() - 1);
                return child;
            }
        }

        if !self.sorted {
            self.cache.push(range);
            return vec![self.cache.len() - 1];
        }

        let mut path = vec![];
        insert_sorted(&mut self.cache, range, &mut path);
        path
    }

    fn leaf(&mut self, pos: WithPosition, id: NodeId) {
        self.insert(PosRange::new(pos, id));
    }

    fn styled_leaf(&mut self, pos: WithPosition, opts: &Opts, id: NodeId) {
        self.leaf(widened(pos, opts), id);
    }

    /// Adds a container range and keeps it open while `f` runs.
    fn container(&mut self, pos: WithPosition, id: NodeId, f: impl FnOnce(&mut Self)) {
        let path = self.insert(PosRange::new(pos, id));
        self.stack.push(path);
        f(self);
        self.stack.pop();
    }
}

/// Inserts into the deepest range intersecting `range`, keeping siblings ordered.
fn insert_sorted(level: &mut Vec<PosRange>, range: PosRange, path: &mut Vec<usize>) {
    let lower = level.partition_point(|r| precedes(&r.pos, &range.pos));
    if let Some(hit) = level.get(lower)
        && intersects(&hit.pos, &range.pos)
    {
        path.push(lower);
        insert_sorted(&mut level[lower].children, range, path);
        return;
    }

    let upper = level.partition_point(|r| !precedes(&range.pos, &r.pos));
    level.insert(upper, range);
    path.push(upper);
}

/// Span grown to cover the first opening and the last closing style marker.
fn widened(pos: WithPosition, opts: &Opts) -> WithPosition {
    let mut pos = pos;
    if let Some(open) = opts.open_styles.first() {
        pos = pos.with_start_of(&open.pos);
    }
    if let Some(close) = opts.close_styles.last() {
        pos = pos.with_end_of(&close.pos);
    }
    pos
}

impl Visitor for PosCache {
    fn on_user_defined(&mut self, doc: &Document, id: NodeId) {
        self.leaf(doc.pos(id), id);
    }

    fn on_text(&mut self, doc: &Document, id: NodeId, text: &Text) {
        self.styled_leaf(doc.pos(id), &text.opts, id);
    }

    fn on_math(&mut self, _doc: &Document, id: NodeId, math: &Code) {
        let pos = math.start_delim.with_end_of(&math.end_delim);
        self.styled_leaf(pos, &math.opts, id);
    }

    fn on_line_break(&mut self, _doc: &Document, _id: NodeId, _text: &Text) {}

    fn on_paragraph(&mut self, doc: &Document, id: NodeId, _wrap: bool, _skip_opening_wrap: bool) {
        self.container(doc.pos(id), id, |c| walk_paragraph(c, doc, id));
    }

    fn on_heading(&mut self, doc: &Document, id: NodeId, heading: &Heading) {
        self.container(doc.pos(id), id, |c| {
            if let Some(title) = heading.text {
                c.on_paragraph(doc, title, false, false);
            }
        });
    }

    fn on_code(&mut self, doc: &Document, id: NodeId, code: &Code) {
        let mut pos = doc.pos(id);
        if code.is_fenced {
            pos = pos.with_start_of(&code.start_delim);
            if code.end_delim.is_valid() {
                pos = pos.with_end_of(&code.end_delim);
            }
        }
        self.leaf(pos, id);
    }

    fn on_inline_code(&mut self, _doc: &Document, id: NodeId, code: &Code) {
        let pos = code.start_delim.with_end_of(&code.end_delim);
        self.styled_leaf(pos, &code.opts, id);
    }

    fn on_blockquote(&mut self, doc: &Document, id: NodeId) {
        self.container(doc.pos(id), id, |c| walk_blocks(c, doc, id));
    }

    fn on_list(&mut self, doc: &Document, id: NodeId) {
        self.container(doc.pos(id), id, |c| {
            for (k, &item) in doc.children(id).iter().enumerate() {
                if let NodeKind::ListItem(li) = doc.kind(item) {
                    c.on_list_item(doc, item, li, k == 0);
                }
            }
        });
    }

    fn on_list_item(&mut self, doc: &Document, id: NodeId, _item: &ListItem, _first: bool) {
        self.container(doc.pos(id), id, |c| walk_list_item(c, doc, id, false));
    }

    fn on_table(&mut self, doc: &Document, id: NodeId, _table: &Table) {
        self.container(doc.pos(id), id, |c| {
            for &row in doc.children(id) {
                for &cell in doc.children(row) {
                    c.on_table_cell(doc, cell);
                }
            }
        });
    }

    fn on_table_cell(&mut self, doc: &Document, id: NodeId) {
        self.container(doc.pos(id), id, |c| walk_inlines(c, doc, id));
    }

    fn on_anchor(&mut self, _doc: &Document, _id: NodeId, _anchor: &Anchor) {}

    fn on_raw_html(&mut self, doc: &Document, id: NodeId, html: &RawHtml) {
        self.styled_leaf(doc.pos(id), &html.opts, id);
    }

    fn on_horizontal_line(&mut self, doc: &Document, id: NodeId) {
        self.leaf(doc.pos(id), id);
    }

    fn on_link(&mut self, doc: &Document, id: NodeId, link: &Link) {
        self.styled_leaf(doc.pos(id), &link.opts, id);
    }

    fn on_image(&mut self, doc: &Document, id: NodeId, image: &Image) {
        self.styled_leaf(doc.pos(id), &image.opts, id);
    }

    fn on_footnote_ref(&mut self, doc: &Document, id: NodeId, footnote_ref: &FootnoteRef) {
        self.styled_leaf(doc.pos(id), &footnote_ref.opts, id);
    }

    fn on_footnote(&mut self, doc: &Document, id: NodeId, _footnote: &Footnote) {
        self.container(doc.pos(id), id, |c| walk_blocks(c, doc, id));
    }
}
