//! # Parser Plugins
//!
//! Two extension points hook into parsing:
//!
//! - **Text plugins** run on every finished paragraph, after emphasis and
//!   links are resolved. They are plain functions registered with an id;
//!   lower ids run first.
//! - **Block plugins** are asked at every fragment start whether the lines
//!   there belong to them, and build their own nodes when they do.
//!
//! ## Modules
//!
//! - **`autolink`**: bare `www.`/`http(s)://` URLs and e-mail addresses (text plugin)
//! - **`emphasis`**: emphasis with a custom delimiter character (text plugin)
//! - **`yaml`**: YAML front matter (block plugin)

pub mod autolink;
pub mod emphasis;
pub mod yaml;

pub use autolink::github_autolinks_plugin;
pub use emphasis::emphasis_template_plugin;
pub use yaml::{YamlBlockPlugin, YamlHeader};

use crate::doc::{Document, NodeId, NodeKind, Text};
use crate::parsing::inline::Columns;
use crate::parsing::text::{SourceLine, WithPosition};

/// Id the GitHub autolinks plugin is registered with by default.
pub const GITHUB_AUTOLINKS_PLUGIN_ID: i32 = 0;

/// Data a text plugin may read and must keep up to date.
pub struct TextPluginContext<'a> {
    /// Virgin column of every character of every text node in the paragraph.
    pub columns: &'a mut Columns,
    /// Set while the first parsing pass only collects definitions.
    pub collecting_ref_links: bool,
    /// Set when the paragraph is the text of a link or image.
    pub in_link: bool,
}

/// A text plugin: `(document, paragraph, context, options)`.
pub type TextPluginFunc = fn(&mut Document, NodeId, &mut TextPluginContext<'_>, &[String]);

/// A registered text plugin.
#[derive(Debug, Clone)]
pub struct TextPluginEntry {
    pub func: TextPluginFunc,
    /// Also run on the text of links and images.
    pub process_in_links: bool,
    pub options: Vec<String>,
}

/// A plugin that recognizes and builds whole blocks.
pub trait BlockPlugin {
    /// Block kind number `n`; its fragments are `BlockType::UserDefined(n)`.
    fn id(&self) -> i32;

    /// Returns true if a block of this plugin starts at `lines[index]`.
    ///
    /// `empty_lines_before` is true when only blank lines precede `index`.
    fn is_it_you(&mut self, lines: &[SourceLine], index: usize, empty_lines_before: bool) -> bool;

    /// Number of lines of the block last recognized by [`BlockPlugin::is_it_you`].
    fn lines_count_of_last_block(&self) -> usize;

    /// Builds the nodes for `lines` under `parent`.
    fn process(&mut self, lines: &[SourceLine], parent: NodeId, doc: &mut Document, collecting_ref_links: bool);
}

/// Span of the characters `from..to` of a single-line text node.
pub(crate) fn piece_pos(pos: WithPosition, columns: &[i64], from: usize, to: usize) -> WithPosition {
    let start = columns.get(from).copied().unwrap_or(pos.start_column);
    let end = match to.checked_sub(1).and_then(|i| columns.get(i)) {
        Some(&c) if to > from => c,
        _ => start,
    };
    WithPosition::new(start, pos.start_line, end, pos.start_line)
}

/// Creates a detached text node from the characters `from..to` of `src`.
///
/// The style is copied; open and close markers are not.
pub(crate) fn text_piece(doc: &mut Document, columns: &mut Columns, src: NodeId, from: usize, to: usize) -> NodeId {
    let NodeKind::Text(t) = doc.kind(src) else {
        return src;
    };
    let chars: Vec<char> = t.text.chars().collect();
    let text: String = chars[from.min(chars.len())..to.min(chars.len())].iter().collect();
    let style = t.opts.style;

    let src_columns = columns.get(&src).cloned().unwrap_or_default();
    let pos = piece_pos(doc.pos(src), &src_columns, from, to);
    let mut node = Text {
        text,
        ..Default::default()
    };
    node.opts.style = style;

    let id = doc.add(NodeKind::Text(node), pos);
    let piece_columns = src_columns
        .get(from.min(src_columns.len())..to.min(src_columns.len()))
        .map(<[i64]>::to_vec)
        .unwrap_or_default();
    columns.insert(id, piece_columns);
    id
}
