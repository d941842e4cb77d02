use crate::parsing::inline::kinds::LinkParts;
use crate::parsing::text::chars::resolve_escapes;
use crate::parsing::text::{SourceLine, WithPosition};

/// A link reference definition `[label]: destination "title"`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefDef {
    /// Raw label text, not yet normalized.
    pub label: String,
    pub url: String,
    pub title: String,
    pub pos: WithPosition,
    pub label_pos: WithPosition,
    pub url_pos: WithPosition,
}

/// Paragraph lines joined with `\n` and leading spaces removed.
struct Joined {
    chars: Vec<char>,
    at: Vec<(usize, usize)>,
}

impl Joined {
    fn new(lines: &[SourceLine]) -> Self {
        let mut chars = vec![];
        let mut at = vec![];
        for (k, line) in lines.iter().enumerate() {
            let s = line.chars();
            for (col, c) in s.iter().enumerate().skip(line.indent()) {
                chars.push(*c);
                at.push((k, col));
            }
            if k + 1 < lines.len() {
                chars.push('\n');
                at.push((k, s.len()));
            }
        }
        Self { chars, at }
    }

    fn span(&self, lines: &[SourceLine], from: usize, to: usize) -> WithPosition {
        let (Some(&(sk, sc)), Some(&(ek, ec))) = (self.at.get(from), self.at.get(to.max(from + 1) - 1))
        else {
            return WithPosition::default();
        };
        WithPosition::new(
            lines[sk].column(sc, false),
            lines[sk].line,
            lines[ek].column(ec, to > from),
            lines[ek].line,
        )
    }
}

/// Parses the link reference definitions at the start of a paragraph.
///
/// Returns the definitions and the number of lines they take up.
pub fn parse_definitions(lines: &[SourceLine]) -> (Vec<RefDef>, usize) {
    let joined = Joined::new(lines);
    let s = &joined.chars;
    let mut defs = vec![];
    let mut pos = 0;

    while let Some((raw, next)) = definition(s, pos) {
        let text = |(a, b): (usize, usize)| resolve_escapes(&s[a..b]).0;
        defs.push(RefDef {
            label: s[raw.label.0..raw.label.1].iter().collect(),
            url: text(raw.dest),
            title: raw.title.map(text).unwrap_or_default(),
            pos: joined.span(lines, pos, raw.end),
            label_pos: joined.span(lines, raw.label.0, raw.label.1),
            url_pos: joined.span(lines, raw.dest.0, raw.dest.1),
        });
        pos = next;
        if pos >= s.len() {
            return (defs, lines.len());
        }
    }

    let consumed = s[..pos].iter().filter(|c| **c == '\n').count();
    (defs, consumed)
}

struct RawDef {
    label: (usize, usize),
    dest: (usize, usize),
    title: Option<(usize, usize)>,
    end: usize,
}

/// One definition at `from`; returns it with the start of the next line.
fn definition(s: &[char], from: usize) -> Option<(RawDef, usize)> {
    let (label, next) = LinkParts::label(s, from)?;
    if s[label.0..label.1].iter().all(|c| c.is_whitespace()) || s.get(next) != Some(&':') {
        return None;
    }

    let at = skip_ws(s, next + 1);
    let (dest, after_dest) = LinkParts::destination(s, at)?;
    if dest.0 == dest.1 && s.get(at) != Some(&'<') {
        return None;
    }

    let bare_end = line_end(s, after_dest);

    let title_at = skip_ws(s, after_dest);
    if title_at > after_dest
        && let Some((title, after_title)) = LinkParts::title(s, title_at)
        && let Some(end) = line_end(s, after_title)
    {
        let raw = RawDef {
            label,
            dest,
            title: Some(title),
            end: after_title,
        };
        return Some((raw, end));
    }

    bare_end.map(|end| {
        let raw = RawDef {
            label,
            dest,
            title: None,
            end: after_dest,
        };
        (raw, end)
    })
}

/// Start of the next line if only spaces follow `from` on this one.
fn line_end(s: &[char], from: usize) -> Option<usize> {
    let mut i = from;
    while i < s.len() && s[i] == ' ' {
        i += 1;
    }
    match s.get(i) {
        None => Some(s.len()),
        Some('\n') => Some(i + 1),
        _ => None,
    }
}

/// Skips spaces and at most one line ending.
fn skip_ws(s: &[char], from: usize) -> usize {
    let mut i = from;
    let mut newline = false;
    while let Some(&c) = s.get(i) {
        if c == '\n' {
            if newline {
                break;
            }
            newline = true;
        } else if c != ' ' {
            break;
        }
        i += 1;
    }
    i
}
