use super::InlineEnv;
use super::emphasis::{MAX_STRIKE_LEN, process_emphasis};
use super::flat::Flat;
use super::items::{Item, LinkItem, Piece, Run};
use super::kinds::{LinkParts, normalize_label};
use super::scanner::{Delimiter, DelimiterKind};
use super::zones::Zone;
use crate::doc::{Document, NodeKind};
use crate::parsing::text::chars::{is_punctuation, resolve_escapes};

/// An open `[` or `![` waiting for its `]`.
#[derive(Debug, Clone, Copy)]
struct Bracket {
    /// Index of the bracket piece in `items`.
    index: usize,
    pos: usize,
    image: bool,
    active: bool,
}

/// Where a resolved link points.
struct Target {
    url: String,
    title: String,
    end: usize,
    url_range: Option<(usize, usize)>,
}

/// Turns the flattened text into items, resolving links as their `]` is
/// reached and emphasis once everything is in place.
pub struct Tokenizer<'a, 'e> {
    s: &'a [char],
    delims: &'a [Delimiter],
    zones: &'a [Zone],
    doc: &'a Document,
    env: &'a mut InlineEnv<'e>,
    items: Vec<Item>,
    brackets: Vec<Bracket>,
}

impl<'a, 'e> Tokenizer<'a, 'e> {
    pub fn new(
        flat: &'a Flat,
        delims: &'a [Delimiter],
        zones: &'a [Zone],
        doc: &'a Document,
        env: &'a mut InlineEnv<'e>,
    ) -> Self {
        Self {
            s: &flat.chars,
            delims,
            zones,
            doc,
            env,
            items: vec![],
            brackets: vec![],
        }
    }

    pub fn run(mut self) -> Vec<Item> {
        let s = self.s;
        let mut i = 0;
        let mut d = 0;
        let mut z = 0;
        let mut text_start = 0;
        let mut line = 0;

        while i < s.len() {
            while d < self.delims.len() && self.delims[d].pos < i {
                d += 1;
            }
            while z < self.zones.len() && self.zones[z].start < i {
                z += 1;
            }

            if s[i] == '\n' {
                self.text(text_start, i);
                self.items.push(Item::new(Piece::LineEnd(line)));
                line += 1;
                i += 1;
                text_start = i;
                continue;
            }

            if let Some(zone) = self.zones.get(z).copied().filter(|zn| zn.start == i) {
                self.text(text_start, i);
                line += s[zone.start..zone.end].iter().filter(|c| **c == '\n').count();
                self.items.push(Item::new(Piece::Zone(zone)));
                i = zone.end;
                text_start = i;
                continue;
            }

            let Some(del) = self.delims.get(d).filter(|x| x.pos == i && !x.skip).copied() else {
                i += 1;
                continue;
            };

            match del.kind {
                DelimiterKind::Emphasis1 | DelimiterKind::Emphasis2 | DelimiterKind::Strikethrough => {
                    self.text(text_start, i);
                    self.items.push(Item::new(Piece::Run(self.run_of(&del))));
                    i += del.len;
                    text_start = i;
                }
                DelimiterKind::SquareBracketsOpen | DelimiterKind::ImageOpen if !del.backslashed => {
                    self.text(text_start, i);
                    self.brackets.push(Bracket {
                        index: self.items.len(),
                        pos: i,
                        image: del.kind == DelimiterKind::ImageOpen,
                        active: true,
                    });
                    self.items.push(Item::new(Piece::Bracket {
                        start: i,
                        len: del.len,
                    }));
                    i += del.len;
                    text_start = i;
                }
                DelimiterKind::SquareBracketsClose if !del.backslashed => {
                    self.text(text_start, i);
                    text_start = i;
                    match self.close_bracket(i) {
                        Some(end) => {
                            line += s[i..end].iter().filter(|c| **c == '\n').count();
                            i = end;
                            text_start = end;
                        }
                        None => i += 1,
                    }
                }
                _ => i += 1,
            }
        }

        self.text(text_start, s.len());
        process_emphasis(&mut self.items);
        self.items
    }

    fn text(&mut self, start: usize, end: usize) {
        if end > start {
            self.items.push(Item::new(Piece::Text { start, end }));
        }
    }

    fn run_of(&self, del: &Delimiter) -> Run {
        let ch = del.emphasis_char().unwrap_or('*');
        let before_punct = del.pos > 0 && is_punctuation(self.s[del.pos - 1]);
        let after_punct = self.s.get(del.pos + del.len).is_some_and(|c| is_punctuation(*c));
        let (lf, rf) = (del.left_flanking, del.right_flanking);

        let (can_open, can_close) = match ch {
            '_' => (lf && (!rf || before_punct), rf && (!lf || after_punct)),
            '~' if del.len > MAX_STRIKE_LEN => (false, false),
            _ => (lf, rf),
        };

        Run {
            ch,
            start: del.pos,
            len: del.len,
            left: 0,
            right: 0,
            can_open,
            can_close,
            open_markers: vec![],
            close_markers: vec![],
        }
    }

    /// Resolves the `]` at `pos`; returns the end of the construct on success.
    fn close_bracket(&mut self, pos: usize) -> Option<usize> {
        let b = self.brackets.pop()?;
        if !b.active {
            return None;
        }

        let text = (b.pos + if b.image { 2 } else { 1 }, pos);

        if !b.image
            && let Some(key) = self.footnote_key(text)
        {
            self.items.truncate(b.index);
            self.items.push(Item::new(Piece::FootnoteRef {
                start: b.pos,
                end: pos + 1,
                key,
            }));
            return Some(pos + 1);
        }

        let target = self.inline_target(pos + 1).or_else(|| self.reference_target(text, pos + 1))?;

        let mut children = self.items.split_off(b.index + 1);
        self.items.pop();
        process_emphasis(&mut children);

        let end = target.end;
        self.items.push(Item::new(Piece::Link(Box::new(LinkItem {
            image: b.image,
            url: target.url,
            title: target.title,
            children,
            start: b.pos,
            end,
            text,
            url_range: target.url_range,
        }))));

        if !b.image {
            for br in self.brackets.iter_mut().filter(|br| !br.image) {
                br.active = false;
            }
        }

        Some(end)
    }

    fn footnote_key(&self, (from, to): (usize, usize)) -> Option<String> {
        if self.s.get(from) != Some(&'^') || to <= from + 1 {
            return None;
        }
        let id = &self.s[from + 1..to];
        if id.iter().any(|c| c.is_whitespace()) {
            return None;
        }

        let key = format!("#{}{}", id.iter().collect::<String>(), self.env.label_suffix);
        (self.env.footnotes.contains(&key) || self.doc.footnotes().contains_key(&key)).then_some(key)
    }

    fn inline_target(&mut self, at: usize) -> Option<Target> {
        let paren = self
            .delims
            .binary_search_by_key(&at, |d| d.pos)
            .ok()
            .map(|i| self.delims[i])
            .is_some_and(|d| d.kind == DelimiterKind::ParenthesesOpen && !d.backslashed);
        if !paren {
            return None;
        }

        let tail = LinkParts::inline_tail(self.s, at)?;
        let url = resolve_escapes(&self.s[tail.dest.0..tail.dest.1]).0;
        let title = tail
            .title
            .map(|(a, b)| resolve_escapes(&self.s[a..b]).0)
            .unwrap_or_default();

        Some(Target {
            url: self.env.resolver.resolve(&url),
            title,
            end: tail.end,
            url_range: Some(tail.dest),
        })
    }

    /// Full `[text][label]`, collapsed `[text][]` or shortcut `[text]` reference.
    fn reference_target(&self, text: (usize, usize), after: usize) -> Option<Target> {
        let (label, end) = match LinkParts::label(self.s, after) {
            Some(((a, b), next)) if b > a => ((a, b), next),
            Some((_, next)) => (text, next),
            None => (text, after),
        };
        if label.1 - label.0 > LinkParts::MAX_LABEL {
            return None;
        }

        let raw: String = self.s[label.0..label.1].iter().collect();
        let key = format!("#{}{}", normalize_label(&raw), self.env.label_suffix);
        let id = self.doc.labeled_links().get(&key)?;
        let NodeKind::Link(def) = self.doc.kind(*id) else {
            return None;
        };

        Some(Target {
            url: def.url.clone(),
            title: def.title.clone(),
            end,
            url_range: None,
        })
    }
}
