use crate::parsing::text::{SourceLine, chars::skip_spaces};

/// Blockquote prefix knowledge.
pub struct BlockQuote;

impl BlockQuote {
    /// The blockquote prefix character.
    pub const PREFIX: char = '>';

    /// Offset of the `>` marker when the line starts a quote.
    pub fn marker(line: &[char]) -> Option<usize> {
        let i = skip_spaces(line, 0);
        (i <= 3 && line.get(i) == Some(&Self::PREFIX)).then_some(i)
    }

    /// Strips the marker and one following space.
    ///
    /// Returns the inner line and the marker offset, or the unchanged line for
    /// lazy continuation lines.
    pub fn strip(line: &SourceLine) -> (SourceLine, Option<usize>) {
        match Self::marker(line.chars()) {
            Some(m) => {
                let mut cut = m + 1;
                if line.chars().get(cut) == Some(&' ') {
                    cut += 1;
                }
                (line.sliced(cut), Some(m))
            }
            None => (line.clone(), None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::text::split_lines;

    #[test]
    fn strip_single_quote() {
        let lines = split_lines("> hello");
        let (inner, marker) = BlockQuote::strip(&lines[0]);
        assert_eq!(marker, Some(0));
        assert_eq!(inner.text.to_string(), "hello");
        assert_eq!(inner.column(0, false), 2);
    }

    #[test]
    fn strip_nested_quote_one_level() {
        let lines = split_lines(">> hello");
        let (inner, _) = BlockQuote::strip(&lines[0]);
        assert_eq!(inner.text.to_string(), "> hello");
        let (inner, marker) = BlockQuote::strip(&inner);
        assert_eq!(marker, Some(0));
        assert_eq!(inner.column(0, false), 3);
    }

    #[test]
    fn lazy_line_is_unchanged() {
        let lines = split_lines("plain");
        let (inner, marker) = BlockQuote::strip(&lines[0]);
        assert_eq!(marker, None);
        assert_eq!(inner.text.to_string(), "plain");
    }

    #[test]
    fn too_indented_is_not_a_quote() {
        assert_eq!(BlockQuote::marker(&"    > x".chars().collect::<Vec<_>>()), None);
    }
}
