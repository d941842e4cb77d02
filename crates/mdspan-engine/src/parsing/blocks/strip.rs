//! Container prefix removal. Every function maps the lines of a container
//! fragment to the lines of its content, keeping virgin columns intact.

use super::kinds::{BlockQuote, FootnoteDef, ListMarker};
use crate::parsing::text::SourceLine;

/// Removes one level of `>` markers; lazy lines pass through.
pub fn quote_content(lines: &[SourceLine]) -> Vec<SourceLine> {
    lines.iter().map(quote_line).collect()
}

pub fn quote_line(line: &SourceLine) -> SourceLine {
    BlockQuote::strip(line).0
}

/// Removes the list marker from the first line and the item indentation from the rest.
pub fn item_content(lines: &[SourceLine], marker: &ListMarker) -> Vec<SourceLine> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| item_line(l, i == 0, marker))
        .collect()
}

pub fn item_line(line: &SourceLine, first: bool, marker: &ListMarker) -> SourceLine {
    let cut = if first || line.is_blank() || line.indent() >= marker.content_indent {
        marker.content_indent.min(line.text.len())
    } else {
        line.indent()
    };
    line.sliced(cut)
}

/// Removes the `[^id]:` label and the continuation indentation.
pub fn footnote_content(lines: &[SourceLine], def: &FootnoteDef) -> Vec<SourceLine> {
    lines
        .iter()
        .enumerate()
        .map(|(i, l)| footnote_line(l, i == 0, def))
        .collect()
}

pub fn footnote_line(line: &SourceLine, first: bool, def: &FootnoteDef) -> SourceLine {
    let indent = FootnoteDef::CONTINUATION_INDENT;
    let cut = if first {
        def.content
    } else if line.is_blank() || line.indent() >= indent {
        indent.min(line.text.len())
    } else {
        line.indent()
    };
    line.sliced(cut)
}
