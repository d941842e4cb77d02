use crate::parsing::text::chars::skip_spaces;

/// An opening code fence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FenceOpen {
    pub indent: usize,
    pub ch: char,
    pub len: usize,
    /// Half-open range of the trimmed info string.
    pub info: (usize, usize),
}

pub struct CodeFence;

impl CodeFence {
    pub const BACKTICK: char = '`';
    pub const TILDE: char = '~';
    pub const MIN_LEN: usize = 3;

    pub fn open(line: &[char]) -> Option<FenceOpen> {
        let indent = skip_spaces(line, 0);
        if indent > 3 {
            return None;
        }

        let ch = *line.get(indent)?;
        if ch != Self::BACKTICK && ch != Self::TILDE {
            return None;
        }

        let mut i = indent;
        while line.get(i) == Some(&ch) {
            i += 1;
        }

        let len = i - indent;
        if len < Self::MIN_LEN {
            return None;
        }

        let info_start = skip_spaces(line, i);
        let mut info_end = line.len();
        while info_end > info_start && line[info_end - 1] == ' ' {
            info_end -= 1;
        }

        if ch == Self::BACKTICK && line[info_start..info_end].contains(&Self::BACKTICK) {
            return None;
        }

        Some(FenceOpen {
            indent,
            ch,
            len,
            info: (info_start, info_end),
        })
    }

    /// Returns true if `line` closes the fence opened by `open`.
    pub fn closes(open: &FenceOpen, line: &[char]) -> bool {
        let indent = skip_spaces(line, 0);
        if indent > 3 {
            return false;
        }

        let mut i = indent;
        while line.get(i) == Some(&open.ch) {
            i += 1;
        }

        i - indent >= open.len && line[i..].iter().all(|c| *c == ' ')
    }

    /// Range of the closing fence run in `line`.
    pub fn close_range(line: &[char]) -> (usize, usize) {
        let start = skip_spaces(line, 0);
        let mut end = start;
        while end < line.len() && line[end] != ' ' {
            end += 1;
        }
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn detect_backtick_fence_with_info() {
        let f = CodeFence::open(&chars("```rust  ")).unwrap();
        assert_eq!(f.ch, '`');
        assert_eq!(f.len, 3);
        assert_eq!(f.info, (3, 7));
    }

    #[test]
    fn detect_tilde_fence() {
        assert_eq!(CodeFence::open(&chars("~~~~")).unwrap().len, 4);
    }

    #[test]
    fn no_fence() {
        assert!(CodeFence::open(&chars("``")).is_none());
        assert!(CodeFence::open(&chars("hello")).is_none());
        assert!(CodeFence::open(&chars("``` a`b")).is_none());
    }

    #[test]
    fn closes_matching_fence() {
        let f = CodeFence::open(&chars("````")).unwrap();
        assert!(CodeFence::closes(&f, &chars("`````")));
        assert!(CodeFence::closes(&f, &chars("   ````  ")));
    }

    #[test]
    fn does_not_close_mismatched_fence() {
        let f = CodeFence::open(&chars("````")).unwrap();
        assert!(!CodeFence::closes(&f, &chars("```")));
        assert!(!CodeFence::closes(&f, &chars("~~~~")));
        assert!(!CodeFence::closes(&f, &chars("```` x")));
    }
}
