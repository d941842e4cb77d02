use std::collections::HashMap;

use super::flat::Flat;
use super::items::{Item, LinkItem, Marker, Piece, Run};
use super::zones::{Zone, ZoneKind};
use crate::doc::{
    Code, Document, FootnoteRef, Image, Link, NodeId, NodeKind, RawHtml, StyleDelim, Text,
    TextOptions,
};
use crate::parsing::text::chars::resolve_escapes;
use crate::parsing::text::{SourceLine, WithPosition};

/// Virgin column of every character of the text nodes emitted for a paragraph.
pub type Columns = HashMap<NodeId, Vec<i64>>;

/// Pending plain text; merged while contiguous and equally styled.
#[derive(Debug, Clone, Copy)]
struct Buffer {
    start: usize,
    end: usize,
    style: TextOptions,
}

/// Emission state of one block of inline content.
struct Sink {
    parent: NodeId,
    pending: Vec<StyleDelim>,
    buffer: Option<Buffer>,
    last_leaf: Option<NodeId>,
}

impl Sink {
    fn new(parent: NodeId) -> Self {
        Self {
            parent,
            pending: vec![],
            buffer: None,
            last_leaf: None,
        }
    }
}

/// Turns resolved items into nodes.
pub struct Emitter<'a> {
    doc: &'a mut Document,
    lines: &'a [SourceLine],
    flat: &'a Flat,
    columns: Columns,
}

impl<'a> Emitter<'a> {
    pub fn new(doc: &'a mut Document, lines: &'a [SourceLine], flat: &'a Flat) -> Self {
        Self {
            doc,
            lines,
            flat,
            columns: Columns::new(),
        }
    }

    /// Appends the nodes for `items` to `parent`.
    pub fn emit(mut self, items: Vec<Item>, parent: NodeId) -> Columns {
        let mut sink = Sink::new(parent);
        self.items(&mut sink, items);
        self.columns
    }

    fn items(&mut self, sink: &mut Sink, items: Vec<Item>) {
        for item in items {
            self.item(sink, item);
        }
        self.flush(sink);
    }

    fn item(&mut self, sink: &mut Sink, item: Item) {
        let style = item.style;

        match item.piece {
            Piece::Text { start, end } => self.text(sink, start, end, style),
            Piece::Bracket { start, len } => self.text(sink, start, start + len, style),
            Piece::Run(run) => self.run(sink, run, style),
            Piece::LineEnd(k) => self.line_end(sink, k, style),
            Piece::Zone(zone) => {
                self.flush(sink);
                let id = self.zone(zone);
                self.leaf(sink, id, style);
            }
            Piece::Link(link) => {
                self.flush(sink);
                let id = self.link(*link);
                self.leaf(sink, id, style);
            }
            Piece::FootnoteRef { start, end, key } => {
                self.flush(sink);
                let fref = FootnoteRef {
                    id: key,
                    id_pos: self.span(start + 2, end - 1),
                    text: self.flat.string(start, end),
                    ..Default::default()
                };
                let pos = self.span(start, end);
                let id = self.doc.add(NodeKind::FootnoteRef(fref), pos);
                self.leaf(sink, id, style);
            }
        }
    }

    fn text(&mut self, sink: &mut Sink, start: usize, end: usize, style: TextOptions) {
        if end <= start {
            return;
        }
        if let Some(b) = &mut sink.buffer
            && b.end == start
            && b.style == style
        {
            b.end = end;
            return;
        }
        self.flush(sink);
        sink.buffer = Some(Buffer { start, end, style });
    }

    fn run(&mut self, sink: &mut Sink, run: Run, style: TextOptions) {
        if !run.is_matched() {
            self.text(sink, run.start, run.start + run.len, style);
            return;
        }

        self.flush(sink);
        let closes = self.delims(&run.close_markers);
        match sink.last_leaf.and_then(|id| self.doc.node_mut(id).opts_mut()) {
            Some(opts) => opts.close_styles.extend(closes),
            None => sink.pending.retain(|p| !closes.iter().any(|c| c.style == p.style)),
        }

        let (from, to) = run.leftover();
        self.text(sink, from, to, style);

        if !run.open_markers.is_empty() {
            self.flush(sink);
            let opens = self.delims(&run.open_markers);
            sink.pending.extend(opens);
        }
    }

    fn line_end(&mut self, sink: &mut Sink, k: usize, style: TextOptions) {
        self.flush(sink);
        let Some(end) = self.flat.ends.get(k).filter(|e| e.hard).copied() else {
            return;
        };
        let line = &self.lines[k];
        let id = self.doc.add(
            NodeKind::LineBreak(Text {
                text: line.chars()[end.from..end.to].iter().collect(),
                ..Default::default()
            }),
            line.span(end.from, end.to),
        );
        self.leaf(sink, id, style);
    }

    fn zone(&mut self, zone: Zone) -> NodeId {
        let (a, b) = zone.content();
        let pos = self.span(zone.start, zone.end);
        let content_pos = self.span(a, b);
        let start_delim = self.span(zone.start, a);
        let end_delim = self.span(b, zone.end);

        match zone.kind {
            ZoneKind::Code => {
                let code = Code {
                    text: code_span_text(self.flat.slice(a, b)),
                    is_inline: true,
                    start_delim,
                    end_delim,
                    ..Default::default()
                };
                self.doc.add(NodeKind::Code(code), content_pos)
            }
            ZoneKind::Math => {
                let math = Code {
                    text: self.flat.string(a, b),
                    is_inline: zone.open_len == 1,
                    start_delim,
                    end_delim,
                    ..Default::default()
                };
                self.doc.add(NodeKind::Math(math), content_pos)
            }
            ZoneKind::Autolink { email } => {
                let text = self.flat.string(a, b);
                let text_pos = content_pos;
                let p = self.doc.add(NodeKind::Paragraph, text_pos);
                let t = self.doc.add(
                    NodeKind::Text(Text {
                        text: text.clone(),
                        ..Default::default()
                    }),
                    text_pos,
                );
                self.doc.append_child(p, t);
                let url = if email { format!("mailto:{text}") } else { text.clone() };
                self.doc.add(
                    NodeKind::Link(Link {
                        url,
                        text,
                        p: Some(p),
                        text_pos,
                        url_pos: text_pos,
                        ..Default::default()
                    }),
                    pos,
                )
            }
            ZoneKind::Html => {
                let html = RawHtml {
                    text: self.flat.string(zone.start, zone.end),
                    ..Default::default()
                };
                self.doc.add(NodeKind::RawHtml(html), pos)
            }
        }
    }

    fn link(&mut self, link: LinkItem) -> NodeId {
        let pos = self.span(link.start, link.end);
        let text_pos = self.span(link.text.0, link.text.1);
        let url_pos = link
            .url_range
            .map(|(a, b)| self.span(a, b))
            .unwrap_or_default();
        let text = self.flat.string(link.text.0, link.text.1);

        let p = self.doc.add(NodeKind::Paragraph, text_pos);
        let mut sink = Sink::new(p);
        self.items(&mut sink, link.children);

        if link.image {
            return self.doc.add(
                NodeKind::Image(Image {
                    url: link.url,
                    text,
                    title: link.title,
                    p: Some(p),
                    text_pos,
                    url_pos,
                    ..Default::default()
                }),
                pos,
            );
        }

        let only_image = match self.doc.children(p) {
            [one] if matches!(self.doc.kind(*one), NodeKind::Image(_)) => Some(*one),
            _ => None,
        };

        self.doc.add(
            NodeKind::Link(Link {
                url: link.url,
                text,
                title: link.title,
                p: if only_image.is_some() { None } else { Some(p) },
                img: only_image,
                text_pos,
                url_pos,
                ..Default::default()
            }),
            pos,
        )
    }

    fn flush(&mut self, sink: &mut Sink) {
        let Some(b) = sink.buffer.take() else {
            return;
        };
        let (text, offsets) = resolve_escapes(self.flat.slice(b.start, b.end));
        let columns = offsets
            .iter()
            .map(|o| self.flat.column(self.lines, b.start + o, false))
            .collect();
        let pos = self.span(b.start, b.end);
        let id = self.doc.add(
            NodeKind::Text(Text {
                text,
                ..Default::default()
            }),
            pos,
        );
        self.columns.insert(id, columns);
        self.leaf(sink, id, b.style);
    }

    fn leaf(&mut self, sink: &mut Sink, id: NodeId, style: TextOptions) {
        if let Some(opts) = self.doc.node_mut(id).opts_mut() {
            opts.style = style;
            opts.open_styles.append(&mut sink.pending);
        }
        self.doc.append_child(sink.parent, id);
        sink.last_leaf = Some(id);
    }

    fn delims(&self, markers: &[Marker]) -> Vec<StyleDelim> {
        markers
            .iter()
            .map(|m| StyleDelim {
                style: m.style,
                pos: self.span(m.start, m.end),
            })
            .collect()
    }

    fn span(&self, from: usize, to: usize) -> WithPosition {
        self.flat.span(self.lines, from, to)
    }
}

/// Line endings become spaces; one padding space is stripped from each side
/// unless the content is all spaces.
fn code_span_text(content: &[char]) -> String {
    let s: Vec<char> = content.iter().map(|c| if *c == '\n' { ' ' } else { *c }).collect();
    let padded = s.len() >= 2 && s[0] == ' ' && s[s.len() - 1] == ' ';
    if padded && !s.iter().all(|c| *c == ' ') {
        s[1..s.len() - 1].iter().collect()
    } else {
        s.iter().collect()
    }
}
