use crate::parsing::text::chars::{is_escapable, is_punctuation, is_space};

/// What a delimiter record stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterKind {
    /// `*` run.
    Emphasis1,
    /// `_` run.
    Emphasis2,
    /// `~` run.
    Strikethrough,
    SquareBracketsOpen,
    /// `![`
    ImageOpen,
    SquareBracketsClose,
    ParenthesesOpen,
    ParenthesesClose,
    Less,
    Greater,
    /// Backtick run.
    InlineCode,
    /// `$` or `$$`.
    Math,
}

/// One delimiter found in the flattened text of a paragraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delimiter {
    pub kind: DelimiterKind,
    /// Index of the source line within the paragraph.
    pub line: usize,
    /// Offset in the flattened text.
    pub pos: usize,
    pub len: usize,
    pub is_word_before: bool,
    pub backslashed: bool,
    pub left_flanking: bool,
    pub right_flanking: bool,
    /// Set once the delimiter falls inside a code span, math or HTML.
    pub skip: bool,
}

impl Delimiter {
    /// Emphasis character of a `*`, `_` or `~` run.
    pub fn emphasis_char(&self) -> Option<char> {
        match self.kind {
            DelimiterKind::Emphasis1 => Some('*'),
            DelimiterKind::Emphasis2 => Some('_'),
            DelimiterKind::Strikethrough => Some('~'),
            _ => None,
        }
    }
}

/// Tracks backslash escapes while characters are fed one by one.
#[derive(Debug, Default)]
pub struct ReverseSolidusHandler {
    pending: bool,
}

impl ReverseSolidusHandler {
    /// Feeds the next character; returns true if a backslash escapes it.
    pub fn process(&mut self, c: char) -> bool {
        let escaped = self.pending && is_escapable(c);
        self.pending = c == '\\' && !escaped;
        escaped
    }
}

/// Scans `s` (lines joined with `\n`) for delimiters.
pub fn scan(s: &[char]) -> Vec<Delimiter> {
    let mut out = vec![];
    let mut rs = ReverseSolidusHandler::default();
    let mut line = 0;
    let mut i = 0;

    while i < s.len() {
        let c = s[i];
        let escaped = rs.process(c);

        let kind = match c {
            '\n' => {
                line += 1;
                i += 1;
                continue;
            }
            '*' | '_' | '~' | '`' | '$' => {
                let mut j = i + 1;
                while j < s.len() && s[j] == c {
                    rs.process(c);
                    j += 1;
                }
                if let Some(d) = run(s, c, line, i, j, escaped) {
                    out.push(d);
                }
                i = j;
                continue;
            }
            '!' if !escaped && s.get(i + 1) == Some(&'[') => {
                rs.process('[');
                out.push(single(s, DelimiterKind::ImageOpen, line, i, 2, false));
                i += 2;
                continue;
            }
            '[' => DelimiterKind::SquareBracketsOpen,
            ']' => DelimiterKind::SquareBracketsClose,
            '(' => DelimiterKind::ParenthesesOpen,
            ')' => DelimiterKind::ParenthesesClose,
            '<' => DelimiterKind::Less,
            '>' => DelimiterKind::Greater,
            _ => {
                i += 1;
                continue;
            }
        };

        out.push(single(s, kind, line, i, 1, escaped));
        i += 1;
    }

    out
}

fn single(s: &[char], kind: DelimiterKind, line: usize, pos: usize, len: usize, backslashed: bool) -> Delimiter {
    Delimiter {
        kind,
        line,
        pos,
        len,
        is_word_before: pos > 0 && s[pos - 1].is_alphanumeric(),
        backslashed,
        left_flanking: false,
        right_flanking: false,
        skip: false,
    }
}

/// A run of `c` over `start..end`.
///
/// An escaped first character leaves the run, except for backticks, which
/// keep the full run flagged as backslashed so it can still close a span.
fn run(s: &[char], c: char, line: usize, start: usize, end: usize, escaped: bool) -> Option<Delimiter> {
    let kind = match c {
        '*' => DelimiterKind::Emphasis1,
        '_' => DelimiterKind::Emphasis2,
        '~' => DelimiterKind::Strikethrough,
        '`' => DelimiterKind::InlineCode,
        _ => DelimiterKind::Math,
    };

    let (pos, backslashed) = if escaped && c != '`' {
        (start + 1, false)
    } else {
        (start, escaped)
    };
    let len = end - pos;
    if len == 0 || (kind == DelimiterKind::Math && len > 2) {
        return None;
    }

    let before = pos.checked_sub(1).map(|p| s[p]);
    let after = s.get(end).copied();

    let left_flanking = !is_space(after)
        && (!after.is_some_and(is_punctuation) || is_space(before) || before.is_some_and(is_punctuation));
    let right_flanking = !is_space(before)
        && (!before.is_some_and(is_punctuation) || is_space(after) || after.is_some_and(is_punctuation));

    Some(Delimiter {
        left_flanking,
        right_flanking,
        ..single(s, kind, line, pos, len, backslashed)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan_str(s: &str) -> Vec<Delimiter> {
        let chars: Vec<char> = s.chars().collect();
        scan(&chars)
    }

    #[test]
    fn flanking_of_emphasis_runs() {
        let d = scan_str("**a*b***");
        assert_eq!(d.len(), 3);
        assert!(d[0].left_flanking && !d[0].right_flanking);
        assert!(d[1].left_flanking && d[1].right_flanking);
        assert_eq!((d[2].pos, d[2].len), (5, 3));
        assert!(!d[2].left_flanking && d[2].right_flanking);
    }

    #[test]
    fn escaped_first_character_shortens_run() {
        let d = scan_str("\\**a");
        assert_eq!((d[0].pos, d[0].len), (2, 1));
        assert!(!d[0].backslashed);
    }

    #[test]
    fn escaped_backtick_run_is_kept() {
        let d = scan_str("a\\``");
        assert_eq!((d[0].pos, d[0].len, d[0].backslashed), (2, 2, true));
    }

    #[test]
    fn escaped_brackets_are_flagged() {
        let d = scan_str("\\[a] ![b]");
        assert!(d[0].backslashed);
        assert_eq!(d[0].kind, DelimiterKind::SquareBracketsOpen);
        assert_eq!(d[2].kind, DelimiterKind::ImageOpen);
        assert_eq!(d[2].len, 2);
    }

    #[test]
    fn line_numbers_follow_newlines() {
        let d = scan_str("a\n*b*");
        assert_eq!(d[0].line, 1);
        assert!(!d[0].is_word_before);
    }

    #[test]
    fn double_backslash_does_not_escape() {
        let d = scan_str("\\\\*a*");
        assert_eq!(d[0].pos, 2);
        assert!(d[0].left_flanking);
    }

    #[test]
    fn long_dollar_runs_are_not_math() {
        assert!(scan_str("$$$").is_empty());
        assert_eq!(scan_str("$$x$$").len(), 2);
    }
}
