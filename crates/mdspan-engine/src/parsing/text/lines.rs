use super::internal::InternalString;
use super::position::WithPosition;

/// Tab stop width used when expanding tabs before classification.
pub const TAB_WIDTH: usize = 4;

/// One physical source line with its virgin line number.
#[derive(Debug, Clone)]
pub struct SourceLine {
    pub text: InternalString,
    pub line: i64,
}

impl SourceLine {
    pub fn new(text: InternalString, line: i64) -> Self {
        Self { text, line }
    }

    pub fn chars(&self) -> &[char] {
        self.text.as_chars()
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_blank()
    }

    pub fn indent(&self) -> usize {
        self.text.indent()
    }

    /// Same line with the working text replaced by a slice starting at `pos`.
    #[must_use]
    pub fn sliced(&self, pos: usize) -> Self {
        Self {
            text: self.text.sliced(pos, None),
            line: self.line,
        }
    }

    /// Same line reduced to the working range `from..to`.
    #[must_use]
    pub fn sub(&self, from: usize, to: usize) -> Self {
        Self {
            text: self.text.sliced(from, Some(to.saturating_sub(from))),
            line: self.line,
        }
    }

    /// Virgin column of working offset `pos`.
    pub fn column(&self, pos: usize, end: bool) -> i64 {
        self.text.virgin_pos(pos, end)
    }

    /// Virgin span of the working range `from..to`; an empty range maps to a point.
    pub fn span(&self, from: usize, to: usize) -> WithPosition {
        if to <= from {
            return WithPosition::point(self.column(from, false), self.line);
        }
        WithPosition::new(
            self.column(from, false),
            self.line,
            self.column(to - 1, true),
            self.line,
        )
    }
}

/// Span from the first non-space character of the first line to the end of the last line.
pub fn block_span(lines: &[SourceLine]) -> WithPosition {
    let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
        return WithPosition::default();
    };
    let start = first.span(first.indent(), first.indent() + 1);
    let end = last.span(last.indent(), last.text.len());
    start.with_end_of(&end)
}

/// Splits `text` into lines, treating `\r\n`, `\r` and `\n` as line endings.
///
/// A trailing line ending does not produce an extra empty line. Tabs are
/// expanded to the next multiple of [`TAB_WIDTH`] and NUL characters are
/// replaced with U+FFFD; both edits are recorded so columns stay virgin.
pub fn split_lines(text: &str) -> Vec<SourceLine> {
    let mut lines = vec![];
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    let mut number = 0;

    while let Some(c) = chars.next() {
        match c {
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(make_line(&current, number));
                current.clear();
                number += 1;
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        lines.push(make_line(&current, number));
    }

    lines
}

fn make_line(raw: &str, number: i64) -> SourceLine {
    let mut text = InternalString::new(raw);
    expand_tabs(&mut text);
    text.replace("\u{0}", "\u{FFFD}");
    SourceLine::new(text, number)
}

fn expand_tabs(text: &mut InternalString) {
    let mut pos = 0;

    while let Some(found) = text.index_of("\t", pos) {
        let spaces = TAB_WIDTH - found % TAB_WIDTH;
        text.replace_one(found, 1, &" ".repeat(spaces));
        pos = found + spaces;
    }
}
