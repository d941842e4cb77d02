use std::any::Any;
use std::fmt;

use bitflags::bitflags;

use super::NodeId;
use crate::parsing::text::WithPosition;

bitflags! {
    /// Text styles applied to an inline leaf. Bits above the named ones are free
    /// for plugin-defined styles.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TextOptions: u32 {
        const BOLD = 1;
        const ITALIC = 2;
        const STRIKETHROUGH = 4;
    }
}

/// Discriminant of a node, as reported by [`Node::item_type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemType {
    Heading,
    Text,
    Paragraph,
    LineBreak,
    Blockquote,
    ListItem,
    List,
    Link,
    Image,
    Code,
    TableCell,
    TableRow,
    Table,
    FootnoteRef,
    Footnote,
    Document,
    PageBreak,
    Anchor,
    HorizontalLine,
    RawHtml,
    Math,
    UserDefined(i32),
}

impl ItemType {
    /// Numeric kind; user-defined kinds report `255 + n`.
    pub fn code(self) -> i32 {
        match self {
            ItemType::Heading => 0,
            ItemType::Text => 1,
            ItemType::Paragraph => 2,
            ItemType::LineBreak => 3,
            ItemType::Blockquote => 4,
            ItemType::ListItem => 5,
            ItemType::List => 6,
            ItemType::Link => 7,
            ItemType::Image => 8,
            ItemType::Code => 9,
            ItemType::TableCell => 10,
            ItemType::TableRow => 11,
            ItemType::Table => 12,
            ItemType::FootnoteRef => 13,
            ItemType::Footnote => 14,
            ItemType::Document => 15,
            ItemType::PageBreak => 16,
            ItemType::Anchor => 17,
            ItemType::HorizontalLine => 18,
            ItemType::RawHtml => 19,
            ItemType::Math => 20,
            ItemType::UserDefined(n) => 255 + n,
        }
    }
}

/// One emphasis marker that opened or closed at a leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StyleDelim {
    pub style: TextOptions,
    pub pos: WithPosition,
}

/// Styles of an inline leaf plus the markers that opened and closed at it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Opts {
    pub style: TextOptions,
    pub open_styles: Vec<StyleDelim>,
    pub close_styles: Vec<StyleDelim>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Text {
    pub text: String,
    pub opts: Opts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Heading {
    /// Title paragraph; not one of the heading's children.
    pub text: Option<NodeId>,
    pub level: u8,
    pub label: String,
    pub label_pos: WithPosition,
    /// `#` runs or the setext underline.
    pub delims: Vec<WithPosition>,
    pub label_variants: Vec<String>,
}

impl Heading {
    pub fn is_labeled(&self) -> bool {
        !self.label.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blockquote {
    /// Positions of the `>` markers.
    pub delims: Vec<WithPosition>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListType {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderedState {
    Start,
    Continue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListItem {
    pub list_type: ListType,
    pub ordered_state: OrderedState,
    pub start_number: u64,
    pub is_task_list: bool,
    pub is_checked: bool,
    pub marker_delim: WithPosition,
    pub task_delim: WithPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Link {
    pub url: String,
    /// Raw text between the brackets.
    pub text: String,
    pub title: String,
    /// Parsed link text; detached paragraph.
    pub p: Option<NodeId>,
    /// Set when the whole link text is a single image.
    pub img: Option<NodeId>,
    pub text_pos: WithPosition,
    pub url_pos: WithPosition,
    pub opts: Opts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Image {
    pub url: String,
    /// Raw alt text.
    pub text: String,
    pub title: String,
    pub p: Option<NodeId>,
    pub text_pos: WithPosition,
    pub url_pos: WithPosition,
    pub opts: Opts,
}

/// Code block, inline code span or math expression.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Code {
    pub text: String,
    pub is_inline: bool,
    pub is_fenced: bool,
    pub syntax: String,
    pub syntax_pos: WithPosition,
    pub start_delim: WithPosition,
    pub end_delim: WithPosition,
    pub opts: Opts,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    #[default]
    None,
    Left,
    Right,
    Center,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub alignments: Vec<Alignment>,
}

impl Table {
    pub fn column_alignment(&self, column: usize) -> Alignment {
        self.alignments.get(column).copied().unwrap_or_default()
    }

    pub fn columns_count(&self) -> usize {
        self.alignments.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FootnoteRef {
    /// Footnote label key.
    pub id: String,
    pub id_pos: WithPosition,
    /// Source text, rendered literally when the footnote is missing.
    pub text: String,
    pub opts: Opts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footnote {
    pub id: String,
    pub id_pos: WithPosition,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Anchor {
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawHtml {
    pub text: String,
    /// Block-level island rather than inline markup.
    pub is_free_tag: bool,
    pub opts: Opts,
}

/// Payload of a node produced by a block plugin.
pub trait UserItem: fmt::Debug {
    /// Plugin kind number `n`; the node reports `ItemType::UserDefined(n)`.
    fn user_type(&self) -> i32;
    fn clone_item(&self) -> Box<dyn UserItem>;
    fn as_any(&self) -> &dyn Any;
}

impl Clone for Box<dyn UserItem> {
    fn clone(&self) -> Self {
        self.clone_item()
    }
}

/// Payload of every node kind.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Document,
    Heading(Heading),
    Text(Text),
    Paragraph,
    LineBreak(Text),
    Blockquote(Blockquote),
    ListItem(ListItem),
    List,
    Link(Link),
    Image(Image),
    Code(Code),
    Math(Code),
    TableCell,
    TableRow,
    Table(Table),
    FootnoteRef(FootnoteRef),
    Footnote(Footnote),
    PageBreak,
    Anchor(Anchor),
    HorizontalLine,
    RawHtml(RawHtml),
    UserDefined(Box<dyn UserItem>),
}

/// A node in the document arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub pos: WithPosition,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind, pos: WithPosition) -> Self {
        Self {
            kind,
            pos,
            children: vec![],
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn item_type(&self) -> ItemType {
        match &self.kind {
            NodeKind::Document => ItemType::Document,
            NodeKind::Heading(_) => ItemType::Heading,
            NodeKind::Text(_) => ItemType::Text,
            NodeKind::Paragraph => ItemType::Paragraph,
            NodeKind::LineBreak(_) => ItemType::LineBreak,
            NodeKind::Blockquote(_) => ItemType::Blockquote,
            NodeKind::ListItem(_) => ItemType::ListItem,
            NodeKind::List => ItemType::List,
            NodeKind::Link(_) => ItemType::Link,
            NodeKind::Image(_) => ItemType::Image,
            NodeKind::Code(_) => ItemType::Code,
            NodeKind::Math(_) => ItemType::Math,
            NodeKind::TableCell => ItemType::TableCell,
            NodeKind::TableRow => ItemType::TableRow,
            NodeKind::Table(_) => ItemType::Table,
            NodeKind::FootnoteRef(_) => ItemType::FootnoteRef,
            NodeKind::Footnote(_) => ItemType::Footnote,
            NodeKind::PageBreak => ItemType::PageBreak,
            NodeKind::Anchor(_) => ItemType::Anchor,
            NodeKind::HorizontalLine => ItemType::HorizontalLine,
            NodeKind::RawHtml(_) => ItemType::RawHtml,
            NodeKind::UserDefined(u) => ItemType::UserDefined(u.user_type()),
        }
    }

    /// Style data of leaves that carry it.
    pub fn opts(&self) -> Option<&Opts> {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::LineBreak(t) => Some(&t.opts),
            NodeKind::Code(c) | NodeKind::Math(c) => Some(&c.opts),
            NodeKind::Link(l) => Some(&l.opts),
            NodeKind::Image(i) => Some(&i.opts),
            NodeKind::FootnoteRef(f) => Some(&f.opts),
            NodeKind::RawHtml(h) => Some(&h.opts),
            _ => None,
        }
    }

    pub fn opts_mut(&mut self) -> Option<&mut Opts> {
        match &mut self.kind {
            NodeKind::Text(t) | NodeKind::LineBreak(t) => Some(&mut t.opts),
            NodeKind::Code(c) | NodeKind::Math(c) => Some(&mut c.opts),
            NodeKind::Link(l) => Some(&mut l.opts),
            NodeKind::Image(i) => Some(&mut i.opts),
            NodeKind::FootnoteRef(f) => Some(&mut f.opts),
            NodeKind::RawHtml(h) => Some(&mut h.opts),
            _ => None,
        }
    }
}
