use crate::parsing::text::chars::skip_spaces;

/// Thematic break (`***`, `---`, `___`).
pub struct ThematicBreak;

impl ThematicBreak {
    pub const MARKERS: [char; 3] = ['*', '-', '_'];
    pub const MIN_COUNT: usize = 3;

    /// Returns true if the whole line is a thematic break.
    pub fn is(line: &[char]) -> bool {
        let i = skip_spaces(line, 0);
        if i > 3 {
            return false;
        }

        let Some(&marker) = line.get(i) else {
            return false;
        };
        if !Self::MARKERS.contains(&marker) {
            return false;
        }

        let mut count = 0;
        for &c in &line[i..] {
            if c == marker {
                count += 1;
            } else if c != ' ' {
                return false;
            }
        }

        count >= Self::MIN_COUNT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[rstest]
    #[case("***", true)]
    #[case(" - - -", true)]
    #[case("___   ", true)]
    #[case("--", false)]
    #[case("    ---", false)]
    #[case("-*-", false)]
    #[case("--- a", false)]
    fn detects_breaks(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(ThematicBreak::is(&chars(line)), expected);
    }
}
