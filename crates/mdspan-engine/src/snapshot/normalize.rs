use std::fmt::Write;

use serde::Serialize;

use crate::doc::{Document, ListType, NodeId, NodeKind, TextOptions};
use crate::parsing::text::WithPosition;

/// Snapshot of a parsed document for testing with `insta`.
#[derive(Debug, Serialize)]
pub struct Snap {
    /// Top-level items in document order.
    pub items: Vec<NodeSnap>,
    /// Footnote bodies by key.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub footnotes: Vec<NodeSnap>,
}

/// Snapshot of one node.
#[derive(Debug, Serialize)]
pub struct NodeSnap {
    /// Kind with its key attributes, e.g. `Heading(2)` or `Link -> url`.
    pub kind: String,
    /// `(start_line, start_column, end_line, end_column)`; absent when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<(i64, i64, i64, i64)>,
    /// Leaf text, if the node has any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSnap>,
}

/// Converts a document into a serializable snapshot.
pub fn normalize(doc: &Document) -> Snap {
    Snap {
        items: doc.items().iter().map(|&id| node(doc, id)).collect(),
        footnotes: doc.footnotes().values().map(|&id| node(doc, id)).collect(),
    }
}

impl Snap {
    /// Indented one-node-per-line rendering.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for item in &self.items {
            item.write_outline(&mut out, 0);
        }
        if !self.footnotes.is_empty() {
            out.push_str("--- footnotes\n");
            for footnote in &self.footnotes {
                footnote.write_outline(&mut out, 0);
            }
        }
        out
    }
}

impl NodeSnap {
    fn write_outline(&self, out: &mut String, depth: usize) {
        let _ = write!(out, "{:indent$}{}", "", self.kind, indent = depth * 2);
        if let Some(text) = &self.text {
            let _ = write!(out, " {text:?}");
        }
        if let Some((sl, sc, el, ec)) = self.span {
            let _ = write!(out, " @{sl}:{sc}-{el}:{ec}");
        }
        out.push('\n');
        for child in &self.children {
            child.write_outline(out, depth + 1);
        }
    }
}

fn node(doc: &Document, id: NodeId) -> NodeSnap {
    let mut text = None;
    let mut children: Vec<NodeId> = doc.children(id).to_vec();

    let kind = match doc.kind(id) {
        NodeKind::Document => "Document".to_string(),
        NodeKind::Heading(h) => {
            children = h.text.map(|t| doc.children(t).to_vec()).unwrap_or_default();
            format!("Heading({})", h.level)
        }
        NodeKind::Text(t) => {
            text = Some(t.text.clone());
            styled("Text", t.opts.style)
        }
        NodeKind::Paragraph => "Paragraph".to_string(),
        NodeKind::LineBreak(_) => "LineBreak".to_string(),
        NodeKind::Blockquote(_) => "Blockquote".to_string(),
        NodeKind::ListItem(li) => {
            let mut kind = match li.list_type {
                ListType::Ordered => format!("ListItem(ordered {})", li.start_number),
                ListType::Unordered => "ListItem(unordered)".to_string(),
            };
            if li.is_task_list {
                kind.push_str(if li.is_checked { " [x]" } else { " [ ]" });
            }
            kind
        }
        NodeKind::List => "List".to_string(),
        NodeKind::Link(l) => {
            children = l.p.map(|p| doc.children(p).to_vec()).unwrap_or_default();
            if let Some(img) = l.img {
                children.insert(0, img);
            }
            styled(&format!("Link -> {}", l.url), l.opts.style)
        }
        NodeKind::Image(i) => {
            text = Some(i.text.clone());
            format!("Image -> {}", i.url)
        }
        NodeKind::Code(c) if c.is_inline => {
            text = Some(c.text.clone());
            styled("InlineCode", c.opts.style)
        }
        NodeKind::Code(c) => {
            text = Some(c.text.clone());
            match (c.is_fenced, c.syntax.is_empty()) {
                (true, true) => "Code(fenced)".to_string(),
                (true, false) => format!("Code(fenced {})", c.syntax),
                (false, _) => "Code(indented)".to_string(),
            }
        }
        NodeKind::Math(m) => {
            text = Some(m.text.clone());
            styled(if m.is_inline { "Math" } else { "Math(block)" }, m.opts.style)
        }
        NodeKind::TableCell => "TableCell".to_string(),
        NodeKind::TableRow => "TableRow".to_string(),
        NodeKind::Table(t) => format!("Table({})", t.columns_count()),
        NodeKind::FootnoteRef(f) => styled(&format!("FootnoteRef({})", f.id), f.opts.style),
        NodeKind::Footnote(f) => format!("Footnote({})", f.id),
        NodeKind::PageBreak => "PageBreak".to_string(),
        NodeKind::Anchor(a) => format!("Anchor({})", a.label),
        NodeKind::HorizontalLine => "HorizontalLine".to_string(),
        NodeKind::RawHtml(h) => {
            text = Some(h.text.clone());
            styled("RawHtml", h.opts.style)
        }
        NodeKind::UserDefined(u) => format!("UserDefined({})", u.user_type()),
    };

    NodeSnap {
        kind,
        span: span(doc.pos(id)),
        text,
        children: children.into_iter().map(|c| node(doc, c)).collect(),
    }
}

fn span(pos: WithPosition) -> Option<(i64, i64, i64, i64)> {
    pos.is_valid()
        .then_some((pos.start_line, pos.start_column, pos.end_line, pos.end_column))
}

/// `kind` followed by style names in brackets, e.g. `Text[BOLD|ITALIC]`.
fn styled(kind: &str, style: TextOptions) -> String {
    if style.is_empty() {
        return kind.to_string();
    }

    let mut names: Vec<String> = style.iter_names().map(|(n, _)| n.to_string()).collect();
    let extra = style.bits() & !TextOptions::all().bits();
    if extra != 0 {
        names.push(format!("{extra:#x}"));
    }
    format!("{kind}[{}]", names.join("|"))
}
