use crate::parsing::text::chars::skip_spaces;

/// An ATX heading line split into its parts. Ranges are half-open working offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtxHeading {
    pub level: u8,
    pub open: (usize, usize),
    pub content: (usize, usize),
    pub close: Option<(usize, usize)>,
}

impl AtxHeading {
    pub const MARKER: char = '#';
    pub const MAX_LEVEL: usize = 6;

    pub fn parse(line: &[char]) -> Option<Self> {
        let start = skip_spaces(line, 0);
        if start > 3 {
            return None;
        }

        let mut j = start;
        while line.get(j) == Some(&Self::MARKER) {
            j += 1;
        }

        let level = j - start;
        if level == 0 || level > Self::MAX_LEVEL {
            return None;
        }
        if j < line.len() && line[j] != ' ' {
            return None;
        }

        let content_start = skip_spaces(line, j);
        let mut end = trim_end(line, content_start, line.len());

        let mut k = end;
        while k > content_start && line[k - 1] == Self::MARKER {
            k -= 1;
        }

        let mut close = None;
        if k < end && (k == content_start || line[k - 1] == ' ') {
            close = Some((k, end));
            end = trim_end(line, content_start, k);
        }

        Some(Self {
            level: level as u8,
            open: (start, j),
            content: (content_start, end),
            close,
        })
    }
}

/// Setext underline (`===` or `---`).
pub struct SetextUnderline;

impl SetextUnderline {
    /// Heading level the underline produces.
    pub fn level(line: &[char]) -> Option<u8> {
        let start = skip_spaces(line, 0);
        if start > 3 {
            return None;
        }

        let marker = *line.get(start)?;
        let level = match marker {
            '=' => 1,
            '-' => 2,
            _ => return None,
        };

        let mut i = start;
        while line.get(i) == Some(&marker) {
            i += 1;
        }

        line[i..].iter().all(|c| *c == ' ').then_some(level)
    }
}

fn trim_end(line: &[char], from: usize, mut end: usize) -> usize {
    while end > from && line[end - 1] == ' ' {
        end -= 1;
    }
    end
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn atx_with_closing_sequence() {
        let h = AtxHeading::parse(&chars("## Title ##  ")).unwrap();
        assert_eq!(h.level, 2);
        assert_eq!(h.open, (0, 2));
        assert_eq!(h.content, (3, 8));
        assert_eq!(h.close, Some((9, 11)));
    }

    #[test]
    fn closing_hashes_need_a_space() {
        let h = AtxHeading::parse(&chars("# foo#")).unwrap();
        assert_eq!(h.content, (2, 6));
        assert_eq!(h.close, None);
    }

    #[test]
    fn empty_heading() {
        let h = AtxHeading::parse(&chars("#")).unwrap();
        assert_eq!(h.content, (1, 1));
    }

    #[rstest]
    #[case("#hashtag")]
    #[case("####### seven")]
    #[case("    # indented")]
    fn not_headings(#[case] line: &str) {
        assert!(AtxHeading::parse(&chars(line)).is_none());
    }

    #[rstest]
    #[case("===", Some(1))]
    #[case("  ---  ", Some(2))]
    #[case("= =", None)]
    #[case("    ===", None)]
    fn setext_levels(#[case] line: &str, #[case] expected: Option<u8>) {
        assert_eq!(SetextUnderline::level(&chars(line)), expected);
    }
}
