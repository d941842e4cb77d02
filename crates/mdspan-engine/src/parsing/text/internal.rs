use std::fmt;
use std::rc::Rc;

/// One edit inside a transform: `old_len` characters at `pos` became `len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Edit {
    pos: i64,
    old_len: i64,
    len: i64,
}

/// A single transformation step applied to the working string.
///
/// `first_pos` is the offset of the new string inside the old one (non-zero for
/// slices) and `length` is the length of the old string.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Transform {
    first_pos: i64,
    length: i64,
    edits: Vec<Edit>,
}

impl Transform {
    fn whole(length: usize) -> Self {
        Self {
            first_pos: 0,
            length: length as i64,
            edits: vec![],
        }
    }

    fn virgin_pos(&self, mut pos: i64, end: bool) -> i64 {
        for c in &self.edits {
            let start = c.pos;
            let last = start + c.len - 1;

            if pos >= start && pos <= last {
                let old_last = start + c.old_len - 1;

                return if pos > old_last || end {
                    old_last + self.first_pos
                } else {
                    pos + self.first_pos
                };
            } else if pos > last {
                pos += c.old_len - c.len;
            } else {
                break;
            }
        }

        pos += self.first_pos;

        pos.min(self.length)
    }
}

/// A working string that remembers how it was derived from its source text.
///
/// Parsing strips markers, removes escapes and expands tabs in place. Every such
/// operation appends a [`Transform`] so that [`InternalString::virgin_pos`] can
/// map any working offset back to the untouched source line.
#[derive(Debug, Clone, Default)]
pub struct InternalString {
    s: Vec<char>,
    virgin: Rc<[char]>,
    log: Vec<Transform>,
}

impl InternalString {
    pub fn new(s: &str) -> Self {
        let chars: Vec<char> = s.chars().collect();
        Self {
            virgin: Rc::from(chars.clone()),
            s: chars,
            log: vec![],
        }
    }

    /// The working characters.
    pub fn as_chars(&self) -> &[char] {
        &self.s
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.s.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.s.is_empty()
    }

    /// Character at `pos` in the working string.
    pub fn at(&self, pos: usize) -> Option<char> {
        self.s.get(pos).copied()
    }

    /// Returns the untouched source text.
    pub fn full_virgin_string(&self) -> String {
        self.virgin.iter().collect()
    }

    /// Number of leading spaces in the working string.
    pub fn indent(&self) -> usize {
        self.s.iter().take_while(|c| **c == ' ').count()
    }

    /// Returns true when the working string is empty or whitespace only.
    pub fn is_blank(&self) -> bool {
        self.s.iter().all(|c| c.is_whitespace())
    }

    /// Maps a working offset to an offset in the source text.
    ///
    /// With `end` set, a position inside a range that used to be longer maps to
    /// the last source offset of that range.
    pub fn virgin_pos(&self, pos: usize, end: bool) -> i64 {
        let mut p = pos as i64;

        for t in self.log.iter().rev() {
            p = t.virgin_pos(p, end);
        }

        p.clamp(0, self.virgin.len() as i64)
    }

    /// Source text covering `len` working characters starting at `pos`.
    ///
    /// A range that starts or ends inside an expanded tab yields the covered
    /// spaces instead of the whole tab.
    pub fn virgin_sub_string(&self, pos: usize, len: Option<usize>) -> String {
        let length = self.len();
        let pos = pos.min(length);
        let len = match len {
            Some(l) if pos + l <= length => l,
            _ => length - pos,
        };

        if len == 0 {
            return if self.is_empty() {
                self.full_virgin_string()
            } else {
                String::new()
            };
        }

        let mut start = self.virgin_pos(pos, false);
        let mut start_str = String::new();
        let mut end_str = String::new();

        if self.virgin.get(start as usize) == Some(&'\t') {
            let spaces = self.count_of_spaces_for_tab(start);

            for i in 1..spaces.max(1) {
                if self.virgin_pos(pos + i as usize, false) != start {
                    start_str = " ".repeat(i as usize);
                    start += 1;
                    break;
                }
            }
        }

        let last = pos + len - 1;
        let mut end = self.virgin_pos(last, true);

        if self.virgin.get(end as usize) == Some(&'\t') {
            let spaces = self.count_of_spaces_for_tab(end);

            for i in 1..spaces.max(1) {
                let i = i as usize;
                if i <= last && self.virgin_pos(last - i, false) != end {
                    end_str = " ".repeat(i);
                    end -= 1;
                    break;
                }
            }
        }

        let end = end.min(self.virgin.len() as i64 - 1);
        let middle: String = if end >= start {
            self.virgin[start as usize..=end as usize].iter().collect()
        } else {
            String::new()
        };

        start_str + &middle + &end_str
    }

    /// Replaces `size` characters at `pos` with `with`.
    pub fn replace_one(&mut self, pos: usize, size: usize, with: &str) -> &mut Self {
        let len = self.len();
        let pos = pos.min(len);
        let size = size.min(len - pos);
        let with: Vec<char> = with.chars().collect();
        let with_len = with.len();

        self.s.splice(pos..pos + size, with);

        if with_len != size {
            let mut t = Transform::whole(len);
            t.edits.push(Edit {
                pos: pos as i64,
                old_len: size as i64,
                len: with_len as i64,
            });
            self.log.push(t);
        }

        self
    }

    /// Position of the first occurrence of `what` at or after `from`.
    pub fn index_of(&self, what: &str, from: usize) -> Option<usize> {
        if from >= self.len() {
            return None;
        }

        let what: Vec<char> = what.chars().collect();

        if what.is_empty() {
            return Some(from);
        }

        if what.len() > self.len() {
            return None;
        }

        (from..=self.len() - what.len()).find(|&i| self.s[i..i + what.len()] == what[..])
    }

    pub fn contains(&self, what: &str) -> bool {
        self.index_of(what, 0).is_some()
    }

    pub fn starts_with(&self, what: &str) -> bool {
        let what: Vec<char> = what.chars().collect();
        self.s.starts_with(&what)
    }

    pub fn ends_with(&self, what: &str) -> bool {
        let what: Vec<char> = what.chars().collect();
        self.s.ends_with(&what)
    }

    /// Replaces every occurrence of `what` with `with`.
    pub fn replace(&mut self, what: &str, with: &str) -> &mut Self {
        if what.is_empty() {
            return self;
        }

        let what_len = what.chars().count();
        let with_len = with.chars().count();
        let mut pos = 0;

        while let Some(found) = self.index_of(what, pos) {
            self.replace_one(found, what_len, with);
            pos = found + with_len;
        }

        self
    }

    /// Removes `size` characters at `pos`.
    pub fn remove(&mut self, pos: usize, size: usize) -> &mut Self {
        let len = self.len();
        let pos = pos.min(len);
        let size = size.min(len - pos);

        self.s.drain(pos..pos + size);

        let mut t = Transform::whole(len);
        t.edits.push(Edit {
            pos: pos as i64,
            old_len: size as i64,
            len: 0,
        });
        self.log.push(t);

        self
    }

    /// Inserts `s` before the character at `pos`.
    pub fn insert(&mut self, pos: usize, s: &str) -> &mut Self {
        let len = self.len();
        let pos = pos.min(len);
        let ins: Vec<char> = s.chars().collect();
        let ilen = ins.len() as i64;

        self.s.splice(pos..pos, ins);

        let mut t = Transform::whole(len);
        t.edits.push(Edit {
            pos: pos as i64,
            old_len: 1,
            len: ilen + 1,
        });
        self.log.push(t);

        self
    }

    /// Collapses whitespace runs to a single space and trims both ends.
    #[must_use]
    pub fn simplified(&self) -> Self {
        if self.is_empty() {
            return self.clone();
        }

        let len = self.len();
        let mut result = self.clone();
        let mut out: Vec<char> = Vec::with_capacity(len);
        let mut record: Option<Transform> = None;

        let mut i = 0;
        let mut first = true;
        let mut spaces;

        loop {
            let run_start = i;

            while i < len && self.s[i].is_whitespace() {
                i += 1;
            }

            spaces = i - run_start;

            if spaces > 0 {
                let t = record.get_or_insert_with(|| Transform::whole(len));

                if spaces > 1 || first {
                    t.edits.push(Edit {
                        pos: run_start as i64,
                        old_len: spaces as i64,
                        len: if first { 0 } else { 1 },
                    });
                }
            }

            first = false;

            while i != len && !self.s[i].is_whitespace() {
                out.push(self.s[i]);
                i += 1;
            }

            if i == len {
                break;
            }

            out.push(' ');
        }

        if out.last() == Some(&' ') {
            out.pop();

            if let Some(t) = record.as_mut() {
                if spaces > 1 {
                    if let Some(e) = t.edits.last_mut() {
                        e.len = 0;
                    }
                } else if spaces == 1 {
                    t.edits.push(Edit {
                        pos: (len - spaces) as i64,
                        old_len: spaces as i64,
                        len: 0,
                    });
                }
            }
        }

        if let Some(t) = record {
            result.log.push(t);
        }
        result.s = out;

        result
    }

    /// Splits on `sep`, skipping empty pieces. An empty separator yields single characters.
    pub fn split(&self, sep: &str) -> Vec<Self> {
        let len = self.len();

        if sep.is_empty() {
            return (0..len)
                .map(|i| {
                    let mut piece = self.clone();
                    piece.s = vec![self.s[i]];
                    piece.log.push(Transform {
                        first_pos: i as i64,
                        length: len as i64,
                        edits: vec![],
                    });
                    piece
                })
                .collect();
        }

        let sep_len = sep.chars().count();
        let mut result = vec![];
        let mut pos = 0;

        while let Some(found) = self.index_of(sep, pos) {
            if found > pos {
                result.push(self.sliced(pos, Some(found - pos)));
            }
            pos = found + sep_len;
        }

        if pos < len {
            result.push(self.sliced(pos, Some(len - pos)));
        }

        result
    }

    /// Sub-string of `len` characters at `pos` (to the end when `len` is `None`).
    #[must_use]
    pub fn sliced(&self, pos: usize, len: Option<usize>) -> Self {
        let old_len = self.len();
        let pos = pos.min(old_len);
        let len = len.map_or(old_len - pos, |l| l.min(old_len - pos));

        let mut tmp = self.clone();
        tmp.s = self.s[pos..pos + len].to_vec();

        let mut t = Transform {
            first_pos: pos as i64,
            length: old_len as i64,
            edits: vec![],
        };

        if len < old_len - pos {
            t.edits.push(Edit {
                pos: (pos + len) as i64,
                old_len: (old_len - pos - len) as i64,
                len: 0,
            });
        }

        tmp.log.push(t);

        tmp
    }

    /// The `n` rightmost characters.
    #[must_use]
    pub fn right(&self, n: usize) -> Self {
        let n = n.min(self.len());
        self.sliced(self.len() - n, Some(n))
    }

    /// Slice without leading and trailing whitespace.
    #[must_use]
    pub fn trimmed(&self) -> Self {
        let start = self.s.iter().take_while(|c| c.is_whitespace()).count();

        if start == self.len() {
            return self.sliced(self.len(), None);
        }

        let end = self.len() - self.s.iter().rev().take_while(|c| c.is_whitespace()).count();

        self.sliced(start, Some(end - start))
    }

    fn count_of_spaces_for_tab(&self, virgin_pos: i64) -> i64 {
        let mut virgin_pos = virgin_pos;
        let mut p = 0;

        for t in &self.log {
            p += t.first_pos;

            if virgin_pos < p {
                break;
            }

            for c in &t.edits {
                if c.pos + p == virgin_pos {
                    return c.len;
                }

                virgin_pos += if virgin_pos > c.pos { c.len - c.old_len } else { 0 };
            }
        }

        -1
    }
}

impl fmt::Display for InternalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.s {
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

impl PartialEq<&str> for InternalString {
    fn eq(&self, other: &&str) -> bool {
        self.s.iter().copied().eq(other.chars())
    }
}
