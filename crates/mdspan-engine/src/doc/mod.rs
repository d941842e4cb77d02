//! # Document Model
//!
//! Arena-backed AST. Every node lives in [`Document`]'s node vector and is
//! addressed by [`NodeId`]; block nodes own an ordered list of child ids.
//!
//! ## Modules
//!
//! - **`node`**: node kinds, payload structs, `ItemType` and text styles
//!
//! ## Ownership
//!
//! - A child id belongs to exactly one parent's child list
//! - Heading titles, link texts and link images are detached nodes referenced by id
//! - Footnotes are detached and owned through [`Document::footnotes`]
//! - Label maps keep the first node registered for a label

pub mod node;

use std::collections::BTreeMap;

pub use node::{
    Alignment, Anchor, Blockquote, Code, Footnote, FootnoteRef, Heading, Image, ItemType, Link,
    ListItem, ListType, Node, NodeKind, OrderedState, Opts, RawHtml, StyleDelim, Table, Text,
    TextOptions, UserItem,
};

use crate::parsing::text::WithPosition;

/// Index of a node in its document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// A parsed Markdown document.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    footnotes: BTreeMap<String, NodeId>,
    labeled_links: BTreeMap<String, NodeId>,
    labeled_headings: BTreeMap<String, NodeId>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Document, WithPosition::default())],
            footnotes: BTreeMap::new(),
            labeled_links: BTreeMap::new(),
            labeled_headings: BTreeMap::new(),
        }
    }

    /// The root `Document` node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Top-level items.
    pub fn items(&self) -> &[NodeId] {
        self.children(self.root())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Allocates a detached node.
    pub fn add(&mut self, kind: NodeKind, pos: WithPosition) -> NodeId {
        self.nodes.push(Node::new(kind, pos));
        NodeId(self.nodes.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    pub fn pos(&self, id: NodeId) -> WithPosition {
        self.nodes[id.0].pos
    }

    pub fn item_type(&self, id: NodeId) -> ItemType {
        self.nodes[id.0].item_type()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// Inserts `child` at `index`, clamped to the end of the child list.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        let children = &mut self.nodes[parent.0].children;
        let index = index.min(children.len());
        children.insert(index, child);
    }

    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Option<NodeId> {
        let children = &mut self.nodes[parent.0].children;
        (index < children.len()).then(|| children.remove(index))
    }

    pub fn child_at(&self, parent: NodeId, index: usize) -> Option<NodeId> {
        self.nodes[parent.0].children.get(index).copied()
    }

    /// Replaces the child at `index` with `with`.
    pub fn splice_child(&mut self, parent: NodeId, index: usize, with: Vec<NodeId>) {
        let children = &mut self.nodes[parent.0].children;
        if index < children.len() {
            children.splice(index..=index, with);
        }
    }

    /// `true` when the table has no alignments or no rows.
    pub fn is_table_empty(&self, table: NodeId) -> bool {
        match self.kind(table) {
            NodeKind::Table(t) => t.alignments.is_empty() || self.children(table).is_empty(),
            _ => true,
        }
    }

    pub fn footnotes(&self) -> &BTreeMap<String, NodeId> {
        &self.footnotes
    }

    pub fn labeled_links(&self) -> &BTreeMap<String, NodeId> {
        &self.labeled_links
    }

    pub fn labeled_headings(&self) -> &BTreeMap<String, NodeId> {
        &self.labeled_headings
    }

    /// Registers a footnote; returns false when the label was already taken.
    pub fn insert_footnote(&mut self, label: &str, id: NodeId) -> bool {
        insert_first(&mut self.footnotes, label, id)
    }

    pub fn insert_labeled_link(&mut self, label: &str, id: NodeId) -> bool {
        insert_first(&mut self.labeled_links, label, id)
    }

    pub fn insert_labeled_heading(&mut self, label: &str, id: NodeId) -> bool {
        insert_first(&mut self.labeled_headings, label, id)
    }

    /// Registers every label variant of a heading.
    pub fn register_heading(&mut self, heading: NodeId) {
        let variants = match self.kind(heading) {
            NodeKind::Heading(h) => h.label_variants.clone(),
            _ => return,
        };
        for v in variants {
            self.insert_labeled_heading(&v, heading);
        }
    }

    /// Deep-copies the subtree rooted at `id` in `src` into this document.
    ///
    /// The copy is detached. Heading label variants and footnotes are
    /// registered against this document, and footnotes referenced from the
    /// copy are imported with it unless this document already has them.
    pub fn import_subtree(&mut self, src: &Document, id: NodeId) -> NodeId {
        let mut kind = src.kind(id).clone();

        match &mut kind {
            NodeKind::Heading(h) => {
                h.text = h.text.map(|t| self.import_subtree(src, t));
            }
            NodeKind::Link(l) => {
                l.p = l.p.map(|p| self.import_subtree(src, p));
                l.img = l.img.map(|i| self.import_subtree(src, i));
            }
            NodeKind::Image(i) => {
                i.p = i.p.map(|p| self.import_subtree(src, p));
            }
            _ => {}
        }

        let footnote_key = match &kind {
            NodeKind::Footnote(f) => Some(f.id.clone()),
            _ => None,
        };
        let referenced = match &kind {
            NodeKind::FootnoteRef(f) if !self.footnotes.contains_key(&f.id) => {
                src.footnotes.get(&f.id).copied()
            }
            _ => None,
        };
        let is_heading = matches!(kind, NodeKind::Heading(_));
        let new_id = self.add(kind, src.pos(id));

        // Registered before the body so self references stop here.
        if let Some(key) = footnote_key {
            self.insert_footnote(&key, new_id);
        }

        for &child in src.children(id) {
            let c = self.import_subtree(src, child);
            self.append_child(new_id, c);
        }

        if is_heading {
            self.register_heading(new_id);
        }
        if let Some(footnote) = referenced {
            self.import_subtree(src, footnote);
        }

        new_id
    }

    /// Depth-first ids under `id` including detached titles and link texts.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = vec![];
        let mut stack = vec![id];
        while let Some(n) = stack.pop() {
            out.push(n);
            let mut next: Vec<NodeId> = self.children(n).to_vec();
            match self.kind(n) {
                NodeKind::Heading(h) => next.extend(h.text),
                NodeKind::Link(l) => {
                    next.extend(l.p);
                    next.extend(l.img);
                }
                NodeKind::Image(i) => next.extend(i.p),
                _ => {}
            }
            stack.extend(next.into_iter().rev());
        }
        out
    }
}

fn insert_first(map: &mut BTreeMap<String, NodeId>, label: &str, id: NodeId) -> bool {
    if map.contains_key(label) {
        return false;
    }
    map.insert(label.to_string(), id);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(doc: &mut Document, s: &str) -> NodeId {
        doc.add(
            NodeKind::Text(Text {
                text: s.to_string(),
                ..Default::default()
            }),
            WithPosition::default(),
        )
    }

    #[test]
    fn index_based_child_editing() {
        let mut doc = Document::new();
        let p = doc.add(NodeKind::Paragraph, WithPosition::default());
        let a = text(&mut doc, "a");
        let b = text(&mut doc, "b");
        doc.append_child(p, b);
        doc.insert_child(p, 0, a);
        assert_eq!(doc.children(p), &[a, b]);
        assert_eq!(doc.child_at(p, 1), Some(b));
        assert_eq!(doc.remove_child(p, 0), Some(a));
        assert_eq!(doc.remove_child(p, 5), None);
        assert_eq!(doc.children(p), &[b]);
    }

    #[test]
    fn first_label_wins() {
        let mut doc = Document::new();
        let a = text(&mut doc, "a");
        let b = text(&mut doc, "b");
        assert!(doc.insert_labeled_link("#x", a));
        assert!(!doc.insert_labeled_link("#x", b));
        assert_eq!(doc.labeled_links()["#x"], a);
    }

    #[test]
    fn import_subtree_registers_heading_in_new_owner() {
        let mut src = Document::new();
        let title = src.add(NodeKind::Paragraph, WithPosition::default());
        let t = text(&mut src, "Intro");
        src.append_child(title, t);
        let h = src.add(
            NodeKind::Heading(Heading {
                text: Some(title),
                level: 1,
                label: "#intro".into(),
                label_variants: vec!["#Intro".into(), "#intro".into()],
                ..Default::default()
            }),
            WithPosition::new(0, 0, 6, 0),
        );
        src.register_heading(h);

        let mut dst = Document::new();
        let copy = dst.import_subtree(&src, h);
        let root = dst.root();
        dst.append_child(root, copy);

        assert_eq!(dst.labeled_headings()["#intro"], copy);
        assert_eq!(dst.labeled_headings()["#Intro"], copy);
        let NodeKind::Heading(hc) = dst.kind(copy) else {
            panic!("expected heading");
        };
        let title_copy = hc.text.expect("title");
        assert_eq!(dst.children(title_copy).len(), 1);
        // The source stays untouched.
        assert_eq!(src.labeled_headings()["#intro"], h);
    }

    #[test]
    fn import_subtree_brings_referenced_footnote() {
        let mut src = Document::new();
        let p = src.add(NodeKind::Paragraph, WithPosition::default());
        let r = src.add(
            NodeKind::FootnoteRef(FootnoteRef {
                id: "#n".into(),
                text: "[^n]".into(),
                ..Default::default()
            }),
            WithPosition::new(1, 0, 4, 0),
        );
        src.append_child(p, r);
        let note = src.add(
            NodeKind::Footnote(Footnote {
                id: "#n".into(),
                id_pos: WithPosition::default(),
            }),
            WithPosition::new(0, 2, 9, 2),
        );
        // The body refers back to its own footnote.
        let back = src.add(src.kind(r).clone(), WithPosition::default());
        src.append_child(note, back);
        src.insert_footnote("#n", note);

        let mut dst = Document::new();
        let copy = dst.import_subtree(&src, p);

        let imported = dst.footnotes()["#n"];
        assert_ne!(imported, note);
        assert_eq!(dst.item_type(imported), ItemType::Footnote);
        assert_eq!(dst.children(imported).len(), 1);
        assert_eq!(dst.item_type(dst.children(copy)[0]), ItemType::FootnoteRef);
        assert_eq!(dst.footnotes().len(), 1);
    }

    #[test]
    fn import_subtree_keeps_existing_footnote() {
        let mut src = Document::new();
        let r = src.add(
            NodeKind::FootnoteRef(FootnoteRef {
                id: "#n".into(),
                ..Default::default()
            }),
            WithPosition::default(),
        );
        let note = src.add(NodeKind::Footnote(Footnote::default()), WithPosition::default());
        src.insert_footnote("#n", note);

        let mut dst = Document::new();
        let mine = dst.add(NodeKind::Footnote(Footnote::default()), WithPosition::default());
        dst.insert_footnote("#n", mine);
        dst.import_subtree(&src, r);

        assert_eq!(dst.footnotes()["#n"], mine);
        assert_eq!(dst.len(), 3);
    }

    #[test]
    fn cloned_document_is_independent() {
        let mut doc = Document::new();
        let p = doc.add(NodeKind::Paragraph, WithPosition::default());
        let root = doc.root();
        doc.append_child(root, p);
        let copy = doc.clone();
        doc.remove_child(root, 0);
        assert!(doc.is_empty());
        assert_eq!(copy.items().len(), 1);
    }
}
