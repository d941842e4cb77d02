use crate::parsing::inline::cursor::Cursor;

/// Link destination, title and label grammar shared by inline links and
/// reference definitions. Ranges are half-open and exclude delimiters.
pub struct LinkParts;

/// Parts of an inline `(dest "title")` tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InlineTail {
    pub dest: (usize, usize),
    pub title: Option<(usize, usize)>,
    pub end: usize,
}

impl LinkParts {
    pub const MAX_LABEL: usize = 999;
    pub const MAX_PAREN_DEPTH: usize = 32;

    /// Destination at `from`, either `<...>` or a run without spaces and
    /// with balanced parentheses. Returns the range and the index after it.
    pub fn destination(s: &[char], from: usize) -> Option<((usize, usize), usize)> {
        let mut cur = Cursor::new(s, from);

        if cur.eat('<') {
            let start = cur.i;
            loop {
                match cur.bump()? {
                    '>' => return Some(((start, cur.i - 1), cur.i)),
                    '\n' | '<' => return None,
                    '\\' if cur.peek().is_some_and(|c| c != '\n') => {
                        cur.bump();
                    }
                    _ => {}
                }
            }
        }

        let start = cur.i;
        let mut depth = 0usize;
        while let Some(c) = cur.peek() {
            match c {
                '\\' if cur.peek_at(1).is_some_and(|n| !n.is_whitespace()) => cur.bump_n(2),
                '(' => {
                    depth += 1;
                    if depth > Self::MAX_PAREN_DEPTH {
                        return None;
                    }
                    cur.bump();
                }
                ')' if depth == 0 => break,
                ')' => {
                    depth -= 1;
                    cur.bump();
                }
                c if c.is_whitespace() || c.is_control() => break,
                _ => {
                    cur.bump();
                }
            }
        }

        (depth == 0).then_some(((start, cur.i), cur.i))
    }

    /// Title in `"..."`, `'...'` or `(...)` at `from`; may span lines but not a blank line.
    pub fn title(s: &[char], from: usize) -> Option<((usize, usize), usize)> {
        let mut cur = Cursor::new(s, from);
        let close = match cur.bump()? {
            '"' => '"',
            '\'' => '\'',
            '(' => ')',
            _ => return None,
        };
        let start = cur.i;
        let mut line_blank = false;

        loop {
            let c = cur.bump()?;
            match c {
                '\\' => {
                    cur.bump();
                }
                '(' if close == ')' => return None,
                '\n' if line_blank => return None,
                '\n' => line_blank = true,
                c if c == close => return Some(((start, cur.i - 1), cur.i)),
                c if !c.is_whitespace() => line_blank = false,
                _ => {}
            }
        }
    }

    /// Link label `[...]` at `from`. The range may be empty (`[]`).
    pub fn label(s: &[char], from: usize) -> Option<((usize, usize), usize)> {
        let mut cur = Cursor::new(s, from);
        if !cur.eat('[') {
            return None;
        }
        let start = cur.i;

        loop {
            match cur.bump()? {
                ']' => {
                    let end = cur.i - 1;
                    return (end - start <= Self::MAX_LABEL).then_some(((start, end), cur.i));
                }
                '[' => return None,
                '\\' => {
                    cur.bump();
                }
                _ => {}
            }
        }
    }

    /// Inline link tail `(dest "title")` starting at the `(` at `from`.
    pub fn inline_tail(s: &[char], from: usize) -> Option<InlineTail> {
        let mut cur = Cursor::new(s, from);
        if !cur.eat('(') {
            return None;
        }
        skip_ws(&mut cur);

        let (dest, next) = if cur.peek() == Some(')') {
            ((cur.i, cur.i), cur.i)
        } else {
            Self::destination(s, cur.i)?
        };
        cur.i = next;

        let ws = skip_ws(&mut cur);
        let mut title = None;
        if ws > 0
            && let Some((range, next)) = Self::title(s, cur.i)
        {
            title = Some(range);
            cur.i = next;
            skip_ws(&mut cur);
        }

        cur.eat(')').then_some(InlineTail {
            dest,
            title,
            end: cur.i,
        })
    }
}

/// Collapses whitespace and case-folds a link label.
pub fn normalize_label(label: &str) -> String {
    label
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
        .to_uppercase()
}

/// Skips spaces and at most one line ending.
fn skip_ws(cur: &mut Cursor<'_>) -> usize {
    let start = cur.i;
    let mut newline = false;
    while let Some(c) = cur.peek() {
        if c == '\n' {
            if newline {
                break;
            }
            newline = true;
        } else if !c.is_whitespace() {
            break;
        }
        cur.bump();
    }
    cur.i - start
}
