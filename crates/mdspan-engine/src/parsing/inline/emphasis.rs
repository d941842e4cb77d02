use std::collections::HashMap;

use super::items::{Item, Marker};
use crate::doc::TextOptions;

/// Maximum length of a `~` run that forms strikethrough.
pub const MAX_STRIKE_LEN: usize = 2;

/// Resolves emphasis among the runs in `items`.
///
/// Closers are visited left to right; each searches backwards for the
/// nearest compatible opener. Matched markers are recorded on the runs and
/// the style is applied to everything between them. `openers_bottom`
/// remembers, per `(char, can_open, len % 3)`, below which index a search
/// already failed.
pub fn process_emphasis(items: &mut [Item]) {
    let mut openers_bottom: HashMap<(char, bool, usize), usize> = HashMap::new();
    let mut c = 0;

    while c < items.len() {
        let Some(closer) = items[c].run().filter(|r| r.can_close && r.remaining() > 0) else {
            c += 1;
            continue;
        };
        let (ch, closer_len, closer_opens, closer_remaining) =
            (closer.ch, closer.len, closer.can_open, closer.remaining());
        let key = (ch, closer_opens, closer_len % 3);
        let bottom = openers_bottom.get(&key).copied().unwrap_or(0);

        let mut found = None;
        let mut o = c;
        while o > bottom {
            o -= 1;
            let Some(opener) = items[o].run() else {
                continue;
            };
            if opener.ch != ch || !opener.can_open || opener.remaining() == 0 {
                continue;
            }

            let odd_match = (closer_opens || opener.can_close)
                && (opener.len + closer_len) % 3 == 0
                && !(opener.len % 3 == 0 && closer_len % 3 == 0);
            let strike_ok = ch != '~'
                || (opener.remaining() == closer_remaining && closer_remaining <= MAX_STRIKE_LEN);

            if !odd_match && strike_ok {
                found = Some(o);
                break;
            }
        }

        let Some(o) = found else {
            openers_bottom.insert(key, c);
            c += 1;
            continue;
        };

        let opener_remaining = items[o].run().map_or(0, |r| r.remaining());
        let (used, style) = if ch == '~' {
            (closer_remaining, TextOptions::STRIKETHROUGH)
        } else if opener_remaining >= 2 && closer_remaining >= 2 {
            (2, TextOptions::BOLD)
        } else {
            (1, TextOptions::ITALIC)
        };

        if let Some(opener) = items[o].run_mut() {
            let end = opener.start + opener.len - opener.right;
            opener.open_markers.insert(0, Marker {
                style,
                start: end - used,
                end,
            });
            opener.right += used;
        }
        if let Some(closer) = items[c].run_mut() {
            let start = closer.start + closer.left;
            closer.close_markers.push(Marker {
                style,
                start,
                end: start + used,
            });
            closer.left += used;
        }

        for item in &mut items[o + 1..c] {
            item.style |= style;
            if let Some(r) = item.run_mut() {
                r.can_open = false;
                r.can_close = false;
            }
        }

        if items[c].run().is_some_and(|r| r.remaining() == 0) {
            c += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::inline::items::{Piece, Run};

    fn run(ch: char, start: usize, len: usize, can_open: bool, can_close: bool) -> Item {
        Item::new(Piece::Run(Run {
            ch,
            start,
            len,
            left: 0,
            right: 0,
            can_open,
            can_close,
            open_markers: vec![],
            close_markers: vec![],
        }))
    }

    fn text(start: usize, end: usize) -> Item {
        Item::new(Piece::Text { start, end })
    }

    #[test]
    fn rule_of_three_nests_italic_inside_bold() {
        // **a*b***
        let mut items = vec![
            run('*', 0, 2, true, false),
            text(2, 3),
            run('*', 3, 1, true, true),
            text(4, 5),
            run('*', 5, 3, false, true),
        ];
        process_emphasis(&mut items);

        assert_eq!(items[1].style, TextOptions::BOLD);
        assert_eq!(items[3].style, TextOptions::BOLD | TextOptions::ITALIC);

        let last = items[4].run().unwrap();
        let styles: Vec<_> = last.close_markers.iter().map(|m| m.style).collect();
        assert_eq!(styles, vec![TextOptions::ITALIC, TextOptions::BOLD]);
        assert_eq!(last.remaining(), 0);
        assert_eq!(items[2].run().unwrap().open_markers[0].start, 3);
    }

    #[test]
    fn triple_run_opens_italic_outside_bold() {
        // ***a***
        let mut items = vec![run('*', 0, 3, true, false), text(3, 4), run('*', 4, 3, false, true)];
        process_emphasis(&mut items);

        let first = items[0].run().unwrap();
        let opens: Vec<_> = first.open_markers.iter().map(|m| (m.style, m.start)).collect();
        assert_eq!(opens, vec![(TextOptions::ITALIC, 0), (TextOptions::BOLD, 1)]);
        assert_eq!(items[1].style, TextOptions::BOLD | TextOptions::ITALIC);
    }

    #[test]
    fn unmatched_runs_stay_literal() {
        let mut items = vec![run('*', 0, 1, true, false), text(1, 2), run('_', 2, 1, false, true)];
        process_emphasis(&mut items);
        assert!(!items[0].run().unwrap().is_matched());
        assert!(items[1].style.is_empty());
    }

    #[test]
    fn strikethrough_lengths_must_match() {
        let mut items = vec![run('~', 0, 2, true, false), text(2, 3), run('~', 3, 1, false, true)];
        process_emphasis(&mut items);
        assert!(items[1].style.is_empty());

        let mut items = vec![run('~', 0, 2, true, false), text(2, 3), run('~', 3, 2, false, true)];
        process_emphasis(&mut items);
        assert_eq!(items[1].style, TextOptions::STRIKETHROUGH);
    }

    #[test]
    fn leftover_of_unequal_runs() {
        // ***a*
        let mut items = vec![run('*', 0, 3, true, false), text(3, 4), run('*', 4, 1, false, true)];
        process_emphasis(&mut items);
        assert_eq!(items[0].run().unwrap().leftover(), (0, 2));
        assert_eq!(items[1].style, TextOptions::ITALIC);
    }
}
