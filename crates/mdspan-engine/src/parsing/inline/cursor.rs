/// A cursor for character-by-character inline parsing.
///
/// Operates over the flattened characters of a paragraph; `i` is the index of
/// the next character.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The characters being parsed.
    pub s: &'a [char],
    /// Current index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    /// Creates a cursor at `i`.
    pub fn new(s: &'a [char], i: usize) -> Self {
        Self { s, i }
    }

    /// Returns true if at end of input.
    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current character without advancing.
    pub fn peek(&self) -> Option<char> {
        self.s.get(self.i).copied()
    }

    /// Peeks `n` characters ahead.
    pub fn peek_at(&self, n: usize) -> Option<char> {
        self.s.get(self.i + n).copied()
    }

    /// Checks if the remaining input starts with `pat`.
    pub fn starts_with(&self, pat: &str) -> bool {
        let mut j = self.i;
        for c in pat.chars() {
            if self.s.get(j) != Some(&c) {
                return false;
            }
            j += 1;
        }
        true
    }

    /// Same as [`Cursor::starts_with`] ignoring ASCII case.
    pub fn starts_with_ignore_case(&self, pat: &str) -> bool {
        let mut j = self.i;
        for c in pat.chars() {
            match self.s.get(j) {
                Some(x) if x.eq_ignore_ascii_case(&c) => j += 1,
                _ => return false,
            }
        }
        true
    }

    /// Advances by one character, returning it.
    pub fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.i += 1;
        Some(c)
    }

    /// Advances by `n` characters.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Consumes `c` if it is next.
    pub fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.i += 1;
            true
        } else {
            false
        }
    }

    /// Consumes characters while `pred` holds, returning how many.
    pub fn eat_while(&mut self, pred: impl Fn(char) -> bool) -> usize {
        let start = self.i;
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.i += 1;
        }
        self.i - start
    }

    /// Finds `pat` at or after the cursor, returning the index of its first character.
    pub fn find(&self, pat: &str) -> Option<usize> {
        let mut ahead = self.clone();
        while !ahead.eof() {
            if ahead.starts_with(pat) {
                return Some(ahead.i);
            }
            ahead.i += 1;
        }
        None
    }
}
