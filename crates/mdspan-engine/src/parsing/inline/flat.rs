use crate::parsing::text::{SourceLine, WithPosition};

/// End of one paragraph line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineEnd {
    pub hard: bool,
    /// Working columns of the break characters on that line.
    pub from: usize,
    pub to: usize,
}

/// Paragraph lines joined with `\n`, leading and trailing spaces removed.
///
/// Every character remembers its line and working column so spans can be
/// mapped back to virgin coordinates.
#[derive(Debug, Clone, Default)]
pub struct Flat {
    pub chars: Vec<char>,
    at: Vec<(usize, usize)>,
    /// One entry per line but the last.
    pub ends: Vec<LineEnd>,
}

impl Flat {
    pub fn new(lines: &[SourceLine]) -> Self {
        let mut flat = Self::default();

        for (k, line) in lines.iter().enumerate() {
            let s = line.chars();
            let last = k + 1 == lines.len();
            let start = s.iter().take_while(|c| **c == ' ').count();
            let mut end = s.len();
            while end > start && s[end - 1] == ' ' {
                end -= 1;
            }

            let mut brk = LineEnd {
                hard: s.len() - end >= 2,
                from: end,
                to: s.len(),
            };
            if !last && !brk.hard && ends_with_escaping_backslash(&s[start..end]) {
                end -= 1;
                brk = LineEnd {
                    hard: true,
                    from: end,
                    to: end + 1,
                };
            }

            for (col, c) in s.iter().enumerate().take(end).skip(start) {
                flat.chars.push(*c);
                flat.at.push((k, col));
            }

            if !last {
                flat.chars.push('\n');
                flat.at.push((k, end));
                flat.ends.push(brk);
            }
        }

        flat
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Line index of flat offset `i`.
    pub fn line_of(&self, i: usize) -> usize {
        self.at.get(i).or(self.at.last()).map_or(0, |a| a.0)
    }

    /// Virgin column of flat offset `i`.
    pub fn column(&self, lines: &[SourceLine], i: usize, end: bool) -> i64 {
        match self.at.get(i).or(self.at.last()) {
            Some(&(k, col)) => lines[k].column(col, end),
            None => -1,
        }
    }

    /// Virgin span of `from..to`; an empty range maps to a point.
    pub fn span(&self, lines: &[SourceLine], from: usize, to: usize) -> WithPosition {
        let last = if to > from { to - 1 } else { from };
        let start = self.at.get(from).or(self.at.last());
        let end = self.at.get(last).or(self.at.last());
        match (start, end) {
            (Some(&(sk, sc)), Some(&(ek, ec))) => WithPosition::new(
                lines[sk].column(sc, false),
                lines[sk].line,
                lines[ek].column(ec, to > from),
                lines[ek].line,
            ),
            _ => WithPosition::default(),
        }
    }

    /// Raw characters of `from..to`.
    pub fn slice(&self, from: usize, to: usize) -> &[char] {
        &self.chars[from.min(self.len())..to.min(self.len())]
    }

    pub fn string(&self, from: usize, to: usize) -> String {
        self.slice(from, to).iter().collect()
    }
}

fn ends_with_escaping_backslash(s: &[char]) -> bool {
    s.iter().rev().take_while(|c| **c == '\\').count() % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::text::split_lines;

    #[test]
    fn joins_lines_and_records_breaks() {
        let lines = split_lines("  a  \nb\\\nc ");
        let flat = Flat::new(&lines);
        assert_eq!(flat.string(0, flat.len()), "a\nb\nc");
        assert!(flat.ends[0].hard);
        assert!(flat.ends[1].hard);
        assert_eq!((flat.ends[1].from, flat.ends[1].to), (1, 2));
    }

    #[test]
    fn spans_map_to_virgin_columns() {
        let lines = split_lines("  ab\n cd");
        let flat = Flat::new(&lines);
        assert_eq!(flat.span(&lines, 0, 2), WithPosition::new(2, 0, 3, 0));
        assert_eq!(flat.span(&lines, 1, 5), WithPosition::new(3, 0, 2, 1));
        assert_eq!(flat.line_of(3), 1);
    }

    #[test]
    fn escaped_backslash_is_not_a_break() {
        let lines = split_lines("a\\\\\nb");
        let flat = Flat::new(&lines);
        assert!(!flat.ends[0].hard);
        assert_eq!(flat.string(0, 3), "a\\\\");
    }
}
