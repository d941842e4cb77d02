use crate::parsing::text::chars::skip_spaces;

/// Footnote definition opener `[^id]:`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootnoteDef {
    /// Half-open range of the id, without `^`.
    pub id: (usize, usize),
    /// Offset of the first content character.
    pub content: usize,
}

impl FootnoteDef {
    pub const OPEN: &'static str = "[^";
    pub const CLOSE: &'static str = "]:";
    /// Indentation that continues a footnote body.
    pub const CONTINUATION_INDENT: usize = 4;

    pub fn parse(line: &[char]) -> Option<Self> {
        let start = skip_spaces(line, 0);
        if start > 3 || line.get(start) != Some(&'[') || line.get(start + 1) != Some(&'^') {
            return None;
        }

        let id_start = start + 2;
        let mut i = id_start;
        while i < line.len() && line[i] != ']' {
            if line[i].is_whitespace() || line[i] == '[' {
                return None;
            }
            i += 1;
        }

        if i == id_start || line.get(i + 1) != Some(&':') {
            return None;
        }

        Some(Self {
            id: (id_start, i),
            content: skip_spaces(line, i + 2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn parses_definition() {
        let d = FootnoteDef::parse(&chars("[^note]: body")).unwrap();
        assert_eq!(d.id, (2, 6));
        assert_eq!(d.content, 9);
    }

    #[test]
    fn rejects_non_definitions() {
        assert!(FootnoteDef::parse(&chars("[^]: x")).is_none());
        assert!(FootnoteDef::parse(&chars("[^a b]: x")).is_none());
        assert!(FootnoteDef::parse(&chars("[^a] x")).is_none());
        assert!(FootnoteDef::parse(&chars("[a]: x")).is_none());
    }
}
