use std::collections::{BTreeMap, HashSet};

use super::ParseError;
use super::blocks::classify::CODE_INDENT;
use super::blocks::kinds::{
    AtxHeading, BlockQuote, CodeFence, FootnoteDef, MarkerKind, TableRow, ThematicBreak,
    pos_of_list_item, task_checkbox,
};
use super::blocks::strip::{footnote_content, item_content, quote_content};
use super::blocks::{BlockType, Fragment, RefDef, TextKind, collect, parse_definitions};
use super::inline::kinds::normalize_label;
use super::inline::{Columns, InlineEnv, parse_inline};
use super::links::LinkResolver;
use super::text::chars::{skip_spaces, unescape};
use super::text::{SourceLine, WithPosition, block_span};
use crate::doc::{
    Blockquote, Code, Document, Footnote, Heading, Link, ListItem, ListType, NodeId, NodeKind,
    OrderedState, RawHtml, Table,
};
use crate::plugins::{BlockPlugin, TextPluginContext, TextPluginEntry};

/// State of one parse of one source text into a shared document.
pub(crate) struct Context<'a> {
    doc: &'a mut Document,
    text_plugins: &'a BTreeMap<i32, TextPluginEntry>,
    block_plugins: &'a mut [Box<dyn BlockPlugin>],
    max_depth: usize,
    depth: usize,
    collecting: bool,
    resolver: LinkResolver,
    label_suffix: String,
    footnote_keys: HashSet<String>,
}

impl<'a> Context<'a> {
    pub fn new(
        doc: &'a mut Document,
        text_plugins: &'a BTreeMap<i32, TextPluginEntry>,
        block_plugins: &'a mut [Box<dyn BlockPlugin>],
        max_depth: usize,
        resolver: LinkResolver,
    ) -> Self {
        let label_suffix = resolver.label_suffix();
        Self {
            doc,
            text_plugins,
            block_plugins,
            max_depth,
            depth: 0,
            collecting: false,
            resolver,
            label_suffix,
            footnote_keys: HashSet::new(),
        }
    }

    /// Parses `lines` into the document root in two passes: the first only
    /// registers reference definitions and footnote ids, the second builds
    /// the tree.
    pub fn run(&mut self, lines: &[SourceLine]) -> Result<(), ParseError> {
        let root = self.doc.root();

        self.collecting = true;
        self.parse_lines(lines, root)?;

        self.collecting = false;
        self.parse_lines(lines, root)
    }

    /// Local Markdown files the parsed text links to.
    pub fn take_linked_files(&mut self) -> Vec<String> {
        self.resolver.take_linked_files()
    }

    fn nested(&mut self, lines: &[SourceLine], parent: NodeId) -> Result<(), ParseError> {
        if self.depth >= self.max_depth {
            let line = lines.first().map_or(-1, |l| l.line);
            log::warn!("Nesting deeper than {} levels at line {line}", self.max_depth);
            return Err(ParseError::TooDeeplyNested { line });
        }

        self.depth += 1;
        let result = self.parse_lines(lines, parent);
        self.depth -= 1;
        result
    }

    fn parse_lines(&mut self, lines: &[SourceLine], parent: NodeId) -> Result<(), ParseError> {
        let depth_left = self.max_depth.saturating_sub(self.depth);
        let fragments = collect(lines, self.block_plugins, depth_left)?;

        let mut i = 0;
        while i < fragments.len() {
            let f = &fragments[i];
            match f.kind {
                t if t.is_list() => {
                    let kind = marker_kind(f);
                    let mut j = i + 1;
                    while j < fragments.len()
                        && fragments[j].kind.is_list()
                        && marker_kind(&fragments[j]) == kind
                    {
                        j += 1;
                    }
                    self.list(&fragments[i..j], parent)?;
                    i = j;
                    continue;
                }
                BlockType::Heading => self.atx_heading(f, parent),
                BlockType::Code => self.fenced_code(f, parent),
                BlockType::CodeIndentedBySpaces => self.indented_code(f, parent),
                BlockType::Blockquote => self.blockquote(f, parent)?,
                BlockType::Footnote => self.footnote(f, parent)?,
                BlockType::UserDefined(id) => self.user_block(id, f, parent),
                _ => self.text(f, parent)?,
            }
            i += 1;
        }

        Ok(())
    }

    /// Attaches a new node to `parent`, or drops it while collecting.
    fn append(&mut self, parent: NodeId, kind: NodeKind, pos: WithPosition) -> Option<NodeId> {
        if self.collecting {
            return None;
        }
        let id = self.doc.add(kind, pos);
        self.doc.append_child(parent, id);
        Some(id)
    }

    fn user_block(&mut self, id: i32, f: &Fragment, parent: NodeId) {
        if let Some(plugin) = self.block_plugins.iter_mut().find(|p| p.id() == id) {
            plugin.process(&f.lines, parent, self.doc, self.collecting);
        }
    }

    fn atx_heading(&mut self, f: &Fragment, parent: NodeId) {
        if self.collecting {
            return;
        }
        let line = &f.lines[0];
        let Some(atx) = AtxHeading::parse(line.chars()) else {
            return;
        };

        let mut delims = vec![line.span(atx.open.0, atx.open.1)];
        if let Some((a, b)) = atx.close {
            delims.push(line.span(a, b));
        }

        let content = line.sub(atx.content.0, atx.content.1);
        self.heading(parent, block_span(&f.lines), atx.level, vec![content], delims);
    }

    /// Builds a heading whose title is `content`; an explicit `{#id}` at the
    /// end of the last content line becomes the label.
    fn heading(
        &mut self,
        parent: NodeId,
        pos: WithPosition,
        level: u8,
        mut content: Vec<SourceLine>,
        delims: Vec<WithPosition>,
    ) {
        let mut explicit = None;
        if let Some(last) = content.last_mut()
            && let Some((from, id_from, id_to)) = explicit_label(last.chars())
        {
            let id: String = last.chars()[id_from..id_to].iter().collect();
            explicit = Some((id, last.span(from, last.text.len())));
            let end = trim_end(last.chars(), from);
            *last = last.sub(0, end);
        }
        content.retain(|l| !l.is_blank());

        let title = self.doc.add(NodeKind::Paragraph, block_span(&content));
        if !content.is_empty() {
            let mut columns = self.inline(&content, title);
            self.run_text_plugins(title, &mut columns);
        }

        let (cased, label_pos) = match explicit {
            Some((id, p)) => (id, p),
            None => (slug(&plain_text(self.doc, title)), WithPosition::default()),
        };
        let label = format!("#{}{}", cased.to_lowercase(), self.label_suffix);
        let mut label_variants = vec![format!("#{cased}{}", self.label_suffix)];
        if !label_variants.contains(&label) {
            label_variants.push(label.clone());
        }

        let heading = Heading {
            text: Some(title),
            level,
            label,
            label_pos,
            delims,
            label_variants,
        };
        if let Some(id) = self.append(parent, NodeKind::Heading(heading), pos) {
            self.doc.register_heading(id);
        }
    }

    fn fenced_code(&mut self, f: &Fragment, parent: NodeId) {
        if self.collecting {
            return;
        }
        let first = &f.lines[0];
        let Some(open) = CodeFence::open(first.chars()) else {
            return;
        };

        let last = &f.lines[f.lines.len() - 1];
        let closed = f.lines.len() > 1 && CodeFence::closes(&open, last.chars());
        let body_end = if closed { f.lines.len() - 1 } else { f.lines.len() };
        let body: Vec<SourceLine> = f.lines[1..body_end]
            .iter()
            .map(|l| l.sliced(l.indent().min(open.indent)))
            .collect();

        let info: Vec<char> = first.chars()[open.info.0..open.info.1].to_vec();
        let word_end = info.iter().position(|c| c.is_whitespace()).unwrap_or(info.len());
        let syntax = unescape(&info[..word_end].iter().collect::<String>());
        let syntax_pos = if word_end == 0 {
            WithPosition::default()
        } else {
            first.span(open.info.0, open.info.0 + word_end)
        };

        let start_delim = first.span(open.indent, open.indent + open.len);
        let end_delim = if closed {
            let (a, b) = CodeFence::close_range(last.chars());
            last.span(a, b)
        } else {
            WithPosition::default()
        };

        let code = Code {
            text: join(&body),
            is_inline: false,
            is_fenced: true,
            syntax,
            syntax_pos,
            start_delim,
            end_delim,
            ..Default::default()
        };
        let pos = content_span(&body).unwrap_or(start_delim);
        self.append(parent, NodeKind::Code(code), pos);
    }

    fn indented_code(&mut self, f: &Fragment, parent: NodeId) {
        if self.collecting {
            return;
        }
        let body: Vec<SourceLine> = f
            .lines
            .iter()
            .map(|l| l.sliced(l.indent().min(CODE_INDENT)))
            .collect();

        let code = Code {
            text: join(&body),
            ..Default::default()
        };
        let pos = content_span(&body).unwrap_or_default();
        self.append(parent, NodeKind::Code(code), pos);
    }

    fn blockquote(&mut self, f: &Fragment, parent: NodeId) -> Result<(), ParseError> {
        let delims = f
            .lines
            .iter()
            .filter_map(|l| BlockQuote::strip(l).1.map(|m| l.span(m, m + 1)))
            .collect();
        let content = quote_content(&f.lines);

        let node = NodeKind::Blockquote(Blockquote { delims });
        let target = self.append(parent, node, block_span(&f.lines)).unwrap_or(parent);
        self.nested(&content, target)
    }

    fn list(&mut self, items: &[Fragment], parent: NodeId) -> Result<(), ParseError> {
        let pos = block_span(&items[0].lines).with_end_of(&block_span(&items[items.len() - 1].lines));
        let list = self.append(parent, NodeKind::List, pos).unwrap_or(parent);

        for (k, item) in items.iter().enumerate() {
            self.list_item(item, list, k == 0)?;
        }
        Ok(())
    }

    fn list_item(&mut self, f: &Fragment, list: NodeId, first_in_list: bool) -> Result<(), ParseError> {
        let first = &f.lines[0];
        let Some(marker) = pos_of_list_item(first.chars()) else {
            return Ok(());
        };

        let mut content = item_content(&f.lines, &marker);
        let checkbox = if marker.empty {
            None
        } else {
            task_checkbox(content[0].chars())
        };

        let mut task_delim = WithPosition::default();
        if checkbox.is_some() {
            task_delim = content[0].span(0, 3);
            let rest = skip_spaces(content[0].chars(), 3);
            content[0] = content[0].sliced(rest);
        }

        let item = ListItem {
            list_type: if marker.is_ordered() {
                ListType::Ordered
            } else {
                ListType::Unordered
            },
            ordered_state: if first_in_list {
                OrderedState::Start
            } else {
                OrderedState::Continue
            },
            start_number: marker.number,
            is_task_list: checkbox.is_some(),
            is_checked: checkbox.unwrap_or(false),
            marker_delim: first.span(marker.indent, marker.marker_end),
            task_delim,
        };

        let target = self
            .append(list, NodeKind::ListItem(item), block_span(&f.lines))
            .unwrap_or(list);
        self.nested(&content, target)
    }

    fn footnote(&mut self, f: &Fragment, parent: NodeId) -> Result<(), ParseError> {
        let first = &f.lines[0];
        let Some(def) = FootnoteDef::parse(first.chars()) else {
            return self.paragraph(&f.lines, TextKind::Paragraph, parent);
        };

        let id: String = first.chars()[def.id.0..def.id.1].iter().collect();
        let key = format!("#{id}{}", self.label_suffix);
        let content = footnote_content(&f.lines, &def);

        if self.collecting {
            self.footnote_keys.insert(key);
            return self.nested(&content, parent);
        }

        let footnote = Footnote {
            id: key.clone(),
            id_pos: first.span(def.id.0, def.id.1),
        };
        let node = self.doc.add(NodeKind::Footnote(footnote), block_span(&f.lines));
        self.nested(&content, node)?;
        if !self.doc.insert_footnote(&key, node) {
            log::debug!("Duplicate footnote {key} ignored");
        }
        Ok(())
    }

    fn text(&mut self, f: &Fragment, parent: NodeId) -> Result<(), ParseError> {
        match f.text {
            TextKind::HorizontalLine => {
                self.append(parent, NodeKind::HorizontalLine, block_span(&f.lines));
            }
            TextKind::Html(_) => {
                let text = f
                    .lines
                    .iter()
                    .map(|l| l.text.to_string())
                    .collect::<Vec<_>>()
                    .join("\n");
                let html = RawHtml {
                    text,
                    is_free_tag: true,
                    ..Default::default()
                };
                self.append(parent, NodeKind::RawHtml(html), block_span(&f.lines));
            }
            TextKind::Table => self.table(&f.lines, parent),
            kind => self.paragraph(&f.lines, kind, parent)?,
        }
        Ok(())
    }

    fn table(&mut self, lines: &[SourceLine], parent: NodeId) {
        if self.collecting {
            return;
        }
        let Some(alignments) = lines.get(1).and_then(|l| TableRow::delimiter_row(l.chars())) else {
            return;
        };
        let columns = alignments.len();

        let table = self.doc.add(NodeKind::Table(Table { alignments }), block_span(lines));
        self.doc.append_child(parent, table);

        for line in lines.iter().take(1).chain(lines.iter().skip(2)) {
            let row = self.doc.add(NodeKind::TableRow, block_span(std::slice::from_ref(line)));
            self.doc.append_child(table, row);

            for (from, to) in TableRow::cells(line.chars()).into_iter().take(columns) {
                let cell = self.doc.add(NodeKind::TableCell, line.span(from, to));
                self.doc.append_child(row, cell);
                if to > from {
                    let mut cols = self.inline(&[line.sub(from, to)], cell);
                    self.run_text_plugins(cell, &mut cols);
                }
            }
        }
    }

    /// Paragraph or setext heading, after leading reference definitions.
    fn paragraph(&mut self, lines: &[SourceLine], kind: TextKind, parent: NodeId) -> Result<(), ParseError> {
        let (content, underline) = match kind {
            TextKind::Setext(_) => lines.split_at(lines.len() - 1),
            _ => (lines, &[][..]),
        };

        let (defs, consumed) = parse_definitions(content);
        if self.collecting {
            for def in defs {
                self.register_definition(def);
            }
            return Ok(());
        }

        let rest = &content[consumed..];
        if rest.is_empty() {
            // The underline lost its paragraph.
            if let Some(line) = underline.first() {
                if ThematicBreak::is(line.chars()) {
                    self.append(parent, NodeKind::HorizontalLine, block_span(underline));
                } else {
                    self.plain_paragraph(underline, parent);
                }
            }
            return Ok(());
        }

        if let TextKind::Setext(level) = kind {
            let line = &underline[0];
            let start = line.indent();
            let end = trim_end(line.chars(), line.text.len());
            let delims = vec![line.span(start, end)];
            let pos = block_span(rest).with_end_of(&line.span(start, end));
            self.heading(parent, pos, level, rest.to_vec(), delims);
            return Ok(());
        }

        self.plain_paragraph(rest, parent);
        Ok(())
    }

    fn plain_paragraph(&mut self, lines: &[SourceLine], parent: NodeId) {
        let Some(p) = self.append(parent, NodeKind::Paragraph, block_span(lines)) else {
            return;
        };
        let mut columns = self.inline(lines, p);
        self.run_text_plugins(p, &mut columns);
    }

    fn register_definition(&mut self, def: RefDef) {
        let key = format!("#{}{}", normalize_label(&def.label), self.label_suffix);
        if self.doc.labeled_links().contains_key(&key) {
            return;
        }

        let link = Link {
            url: self.resolver.resolve(&def.url),
            text: def.label,
            title: def.title,
            text_pos: def.label_pos,
            url_pos: def.url_pos,
            ..Default::default()
        };
        let id = self.doc.add(NodeKind::Link(link), def.pos);
        self.doc.insert_labeled_link(&key, id);
    }

    fn inline(&mut self, lines: &[SourceLine], parent: NodeId) -> Columns {
        let mut env = InlineEnv {
            label_suffix: &self.label_suffix,
            footnotes: &self.footnote_keys,
            resolver: &mut self.resolver,
        };
        parse_inline(self.doc, lines, parent, &mut env)
    }

    /// Runs the text plugins on `paragraph` and on the texts of its links and images.
    fn run_text_plugins(&mut self, paragraph: NodeId, columns: &mut Columns) {
        self.run_text_plugins_on(paragraph, columns, false);

        let inner: Vec<NodeId> = self
            .doc
            .children(paragraph)
            .iter()
            .filter_map(|&c| match self.doc.kind(c) {
                NodeKind::Link(l) => l.p,
                NodeKind::Image(i) => i.p,
                _ => None,
            })
            .collect();
        for p in inner {
            self.run_text_plugins_on(p, columns, true);
        }
    }

    fn run_text_plugins_on(&mut self, paragraph: NodeId, columns: &mut Columns, in_link: bool) {
        let plugins = self.text_plugins;
        for entry in plugins.values() {
            if in_link && !entry.process_in_links {
                continue;
            }
            let mut ctx = TextPluginContext {
                columns: &mut *columns,
                collecting_ref_links: self.collecting,
                in_link,
            };
            (entry.func)(self.doc, paragraph, &mut ctx, &entry.options);
        }
    }
}

fn marker_kind(f: &Fragment) -> Option<MarkerKind> {
    pos_of_list_item(f.lines[0].chars()).map(|m| m.kind)
}

/// `(start of "{#", id start, id end)` of a trailing `{#id}`.
fn explicit_label(line: &[char]) -> Option<(usize, usize, usize)> {
    let end = trim_end(line, line.len());
    if end < 4 || line[end - 1] != '}' {
        return None;
    }
    let open = line[..end].iter().rposition(|c| *c == '{')?;
    if line.get(open + 1) != Some(&'#') || open + 2 >= end - 1 {
        return None;
    }
    let id = &line[open + 2..end - 1];
    if id.iter().any(|c| c.is_whitespace()) {
        return None;
    }
    Some((open, open + 2, end - 1))
}

fn trim_end(line: &[char], mut end: usize) -> usize {
    while end > 0 && line[end - 1] == ' ' {
        end -= 1;
    }
    end
}

/// Heading anchor: letters, digits, `-` and `_`; spaces become `-`.
fn slug(text: &str) -> String {
    text.trim()
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            c if c.is_alphanumeric() || c == '-' || c == '_' => Some(c),
            _ => None,
        })
        .collect()
}

/// Concatenated text of the inline content of `p`.
fn plain_text(doc: &Document, p: NodeId) -> String {
    let mut out = String::new();
    for &c in doc.children(p) {
        match doc.kind(c) {
            NodeKind::Text(t) => out.push_str(&t.text),
            NodeKind::Code(code) | NodeKind::Math(code) => out.push_str(&code.text),
            NodeKind::Link(l) => match l.p {
                Some(inner) => out.push_str(&plain_text(doc, inner)),
                None => out.push_str(&l.text),
            },
            NodeKind::Image(i) => out.push_str(&i.text),
            NodeKind::LineBreak(_) => out.push(' '),
            _ => {}
        }
    }
    out
}

fn join(lines: &[SourceLine]) -> String {
    lines
        .iter()
        .map(|l| l.text.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Span from the start of the first line to the end of the last one.
fn content_span(lines: &[SourceLine]) -> Option<WithPosition> {
    let (first, last) = (lines.first()?, lines.last()?);
    let start = first.span(0, 1);
    let end = last.span(last.text.len().saturating_sub(1), last.text.len());
    Some(start.with_end_of(&end))
}
