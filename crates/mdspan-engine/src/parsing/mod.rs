//! # Parsing
//!
//! Markdown text to [`Document`] in two passes over the lines: blocks first,
//! then the inline content of every text-bearing block.
//!
//! ## Modules
//!
//! - **`text`**: span-preserving strings, positions and character classes
//! - **`blocks`**: line classification and fragment collection
//! - **`inline`**: delimiters, links, emphasis and leaf emission
//! - **`links`**: link target rewriting for multi-file parses
//! - **`context`**: per-text parse state and the block handlers

pub mod blocks;
mod context;
pub mod inline;
pub mod links;
pub mod text;

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::doc::{Anchor, Document, NodeKind};
use crate::io::{self, IoError};
use crate::plugins::{
    BlockPlugin, GITHUB_AUTOLINKS_PLUGIN_ID, TextPluginEntry, TextPluginFunc,
    github_autolinks_plugin,
};
use context::Context;
use links::LinkResolver;
use text::{WithPosition, split_lines};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Containers nested too deeply at line {line}")]
    TooDeeplyNested { line: i64 },
    #[error(transparent)]
    Io(#[from] IoError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserOptions {
    /// Deepest allowed nesting of blockquotes, list items and footnotes.
    pub max_nesting_depth: usize,
    /// Extensions of linked files followed by recursive parses.
    pub extensions: Vec<String>,
}

impl ParserOptions {
    pub const DEFAULT_MAX_NESTING_DEPTH: usize = 256;
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            max_nesting_depth: Self::DEFAULT_MAX_NESTING_DEPTH,
            extensions: vec!["md".to_string(), "markdown".to_string()],
        }
    }
}

/// Markdown parser with its registered plugins.
pub struct Parser {
    options: ParserOptions,
    text_plugins: BTreeMap<i32, TextPluginEntry>,
    block_plugins: Vec<Box<dyn BlockPlugin>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl Parser {
    /// Parser with default options and the GitHub autolinks plugin.
    pub fn new() -> Self {
        Self::with_options(ParserOptions::default())
    }

    pub fn with_options(options: ParserOptions) -> Self {
        let mut parser = Self {
            options,
            text_plugins: BTreeMap::new(),
            block_plugins: vec![],
        };
        parser.add_text_plugin(GITHUB_AUTOLINKS_PLUGIN_ID, github_autolinks_plugin, false, vec![]);
        parser
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Registers a text plugin under `id`, replacing any plugin with that id.
    pub fn add_text_plugin(
        &mut self,
        id: i32,
        func: TextPluginFunc,
        process_in_links: bool,
        options: Vec<String>,
    ) {
        self.text_plugins.insert(
            id,
            TextPluginEntry {
                func,
                process_in_links,
                options,
            },
        );
    }

    pub fn remove_text_plugin(&mut self, id: i32) {
        self.text_plugins.remove(&id);
    }

    pub fn add_block_plugin(&mut self, plugin: Box<dyn BlockPlugin>) {
        self.block_plugins.push(plugin);
    }

    /// Parses in-memory text; link targets are kept as written.
    pub fn parse(&mut self, text: &str) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        self.parse_into(&mut doc, text, LinkResolver::default())?;
        Ok(doc)
    }

    /// Parses text as if read from `file_name` in `working_path`, so local
    /// links and labels get resolved against that location.
    pub fn parse_with_origin(
        &mut self,
        text: &str,
        working_path: &Path,
        file_name: &str,
    ) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        let resolver = LinkResolver::new(
            &working_path.to_string_lossy(),
            file_name,
            &self.options.extensions,
        );
        self.parse_into(&mut doc, text, resolver)?;
        Ok(doc)
    }

    /// Parses a file; with `recursive`, linked Markdown files are appended
    /// after it, each preceded by a page break and an anchor.
    pub fn parse_file(&mut self, path: &Path, recursive: bool) -> Result<Document, ParseError> {
        self.parse_file_with(path, recursive, |_| true)
    }

    /// Like [`Parser::parse_file`], following only linked files accepted by `follow`.
    pub fn parse_file_with(
        &mut self,
        path: &Path,
        recursive: bool,
        mut follow: impl FnMut(&Path) -> bool,
    ) -> Result<Document, ParseError> {
        let mut doc = Document::new();
        let mut queue = VecDeque::from([io::canonical_path(path)?]);
        let mut parsed: HashSet<PathBuf> = HashSet::new();

        while let Some(file) = queue.pop_front() {
            if !parsed.insert(file.clone()) {
                continue;
            }

            let text = match io::read_file(&file) {
                Ok(text) => text,
                Err(e) if parsed.len() == 1 => return Err(e.into()),
                Err(e) => {
                    log::warn!("Skipping linked file {}: {e}", file.display());
                    continue;
                }
            };
            log::debug!("Parsing {}", file.display());

            let root = doc.root();
            if !doc.is_empty() {
                let page_break = doc.add(NodeKind::PageBreak, WithPosition::default());
                doc.append_child(root, page_break);
            }
            let label = file.to_string_lossy().into_owned();
            let anchor = doc.add(NodeKind::Anchor(Anchor { label }), WithPosition::default());
            doc.append_child(root, anchor);

            let working_path = file
                .parent()
                .map(|p| p.to_string_lossy().into_owned())
                .unwrap_or_default();
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let resolver = LinkResolver::new(&working_path, &file_name, &self.options.extensions);

            let linked = self.parse_into(&mut doc, &text, resolver)?;
            if !recursive {
                continue;
            }

            for target in linked.into_iter().map(PathBuf::from) {
                if parsed.contains(&target) || queue.contains(&target) {
                    continue;
                }
                if !follow(&target) {
                    log::debug!("Not following excluded {}", target.display());
                    continue;
                }
                log::debug!("Queued {}", target.display());
                queue.push_back(target);
            }
        }

        Ok(doc)
    }

    /// Parses `text` into `doc`; returns the local Markdown files it links to.
    fn parse_into(
        &mut self,
        doc: &mut Document,
        text: &str,
        resolver: LinkResolver,
    ) -> Result<Vec<String>, ParseError> {
        let lines = split_lines(text);
        let mut ctx = Context::new(
            doc,
            &self.text_plugins,
            &mut self.block_plugins,
            self.options.max_nesting_depth,
            resolver,
        );
        ctx.run(&lines)?;
        Ok(ctx.take_linked_files())
    }
}
