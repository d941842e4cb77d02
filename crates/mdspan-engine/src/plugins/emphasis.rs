use super::{TextPluginContext, piece_pos, text_piece};
use crate::doc::{Document, NodeId, NodeKind, StyleDelim, TextOptions};
use crate::parsing::text::chars::{is_punctuation, is_space};

/// A run of delimiter characters inside one text child.
#[derive(Debug, Clone)]
struct Run {
    child: usize,
    from: usize,
    /// Characters still available to openers, taken from the end.
    open_len: usize,
    /// Characters already used by closers, taken from the start.
    close_used: usize,
    len: usize,
    can_open: bool,
    can_close: bool,
}

/// A matched pair; ranges are `(child, from, to)`.
#[derive(Debug, Clone, Copy)]
struct Pair {
    open: (usize, usize, usize),
    close: (usize, usize, usize),
}

/// Emphasis with a custom delimiter.
///
/// `options[0]` holds the delimiter character and `options[1]` the style
/// bits to apply, e.g. `["=", "8"]` for `==marked==` text.
pub fn emphasis_template_plugin(
    doc: &mut Document,
    paragraph: NodeId,
    ctx: &mut TextPluginContext<'_>,
    options: &[String],
) {
    if ctx.collecting_ref_links {
        return;
    }
    let Some(delim) = options.first().and_then(|o| o.chars().next()) else {
        return;
    };
    let Some(style) = options.get(1).and_then(|o| o.trim().parse::<u32>().ok()) else {
        return;
    };
    let style = TextOptions::from_bits_retain(style);

    let children = doc.children(paragraph).to_vec();
    let texts: Vec<Option<Vec<char>>> = children
        .iter()
        .map(|&c| match doc.kind(c) {
            NodeKind::Text(t) => Some(t.text.chars().collect()),
            _ => None,
        })
        .collect();

    let pairs = match_runs(find_runs(&texts, delim));
    if pairs.is_empty() {
        return;
    }

    // Per-character extra style and removal marks.
    let mut extra: Vec<Vec<TextOptions>> = texts
        .iter()
        .map(|t| vec![TextOptions::empty(); t.as_ref().map_or(0, Vec::len)])
        .collect();
    let mut removed: Vec<Vec<bool>> = texts
        .iter()
        .map(|t| vec![false; t.as_ref().map_or(0, Vec::len)])
        .collect();

    for pair in &pairs {
        let (oc, of, ot) = pair.open;
        let (cc, cf, ct) = pair.close;
        removed[oc][of..ot].fill(true);
        removed[cc][cf..ct].fill(true);

        for child in oc..=cc {
            if texts[child].is_none() {
                if child > oc && child < cc
                    && let Some(opts) = doc.node_mut(children[child]).opts_mut()
                {
                    opts.style |= style;
                }
                continue;
            }
            let from = if child == oc { ot } else { 0 };
            let to = if child == cc { cf } else { extra[child].len() };
            for e in extra[child].iter_mut().take(to).skip(from) {
                *e |= style;
            }
        }
    }

    rebuild(doc, paragraph, ctx, &children, &extra, &removed, &pairs, style);
}

fn find_runs(texts: &[Option<Vec<char>>], delim: char) -> Vec<Run> {
    let mut runs = vec![];
    for (child, chars) in texts.iter().enumerate() {
        let Some(chars) = chars else {
            continue;
        };
        let mut i = 0;
        while i < chars.len() {
            if chars[i] != delim || (i > 0 && chars[i - 1] == '\\') {
                i += 1;
                continue;
            }
            let from = i;
            while i < chars.len() && chars[i] == delim {
                i += 1;
            }
            let before = from.checked_sub(1).map(|b| chars[b]);
            let after = chars.get(i).copied();
            let left = !is_space(after)
                && (!after.is_some_and(is_punctuation) || is_space(before) || before.is_some_and(is_punctuation));
            let right = !is_space(before)
                && (!before.is_some_and(is_punctuation) || is_space(after) || after.is_some_and(is_punctuation));
            runs.push(Run {
                child,
                from,
                open_len: i - from,
                close_used: 0,
                len: i - from,
                can_open: left,
                can_close: right,
            });
        }
    }
    runs
}

fn match_runs(mut runs: Vec<Run>) -> Vec<Pair> {
    let mut pairs = vec![];
    let mut stack: Vec<usize> = vec![];

    for idx in 0..runs.len() {
        if runs[idx].can_close {
            while runs[idx].close_used < runs[idx].len
                && let Some(&top) = stack.last()
            {
                let closer_left = runs[idx].len - runs[idx].close_used;
                let used = runs[top].open_len.min(closer_left);

                let o = &mut runs[top];
                o.open_len -= used;
                let open = (o.child, o.from + o.open_len, o.from + o.open_len + used);
                if o.open_len == 0 {
                    stack.pop();
                }

                let c = &mut runs[idx];
                let close = (c.child, c.from + c.close_used, c.from + c.close_used + used);
                c.close_used += used;
                pairs.push(Pair { open, close });
            }
        }

        let r = &mut runs[idx];
        if r.can_open && r.close_used == 0 {
            stack.push(idx);
        }
    }

    pairs
}

/// Replaces the text children with their styled, marker-free pieces.
#[allow(clippy::too_many_arguments)]
fn rebuild(
    doc: &mut Document,
    paragraph: NodeId,
    ctx: &mut TextPluginContext<'_>,
    children: &[NodeId],
    extra: &[Vec<TextOptions>],
    removed: &[Vec<bool>],
    pairs: &[Pair],
    style: TextOptions,
) {
    let markers: Vec<_> = pairs
        .iter()
        .map(|pair| {
            let (oc, of, ot) = pair.open;
            let (cc, cf, ct) = pair.close;
            (
                marker_pos(doc, ctx, children[oc], of, ot),
                marker_pos(doc, ctx, children[cc], cf, ct),
            )
        })
        .collect();

    // New leaves with their first and last source key.
    let mut leaves: Vec<(NodeId, (usize, usize), (usize, usize))> = vec![];

    for (ci, &child) in children.iter().enumerate() {
        if !matches!(doc.kind(child), NodeKind::Text(_)) {
            leaves.push((child, (ci, 0), (ci, 0)));
            continue;
        }

        let (open, close) = match doc.node(child).opts() {
            Some(o) => (o.open_styles.clone(), o.close_styles.clone()),
            None => (vec![], vec![]),
        };
        let first_leaf = leaves.len();

        let mut i = 0;
        let len = removed[ci].len();
        while i < len {
            if removed[ci][i] {
                i += 1;
                continue;
            }
            let from = i;
            while i < len && !removed[ci][i] && extra[ci][i] == extra[ci][from] {
                i += 1;
            }
            let piece = text_piece(doc, ctx.columns, child, from, i);
            if let Some(opts) = doc.node_mut(piece).opts_mut() {
                opts.style |= extra[ci][from];
            }
            leaves.push((piece, (ci, from), (ci, i - 1)));
        }

        if leaves.len() > first_leaf {
            if let Some(o) = doc.node_mut(leaves[first_leaf].0).opts_mut() {
                o.open_styles.splice(0..0, open);
            }
            if let Some(o) = leaves.last().and_then(|l| doc.node_mut(l.0).opts_mut()) {
                o.close_styles.extend(close);
            }
        } else if let Some(o) = leaves.last().and_then(|l| doc.node_mut(l.0).opts_mut()) {
            o.close_styles.extend(open.into_iter().chain(close));
        }
        ctx.columns.remove(&child);
    }

    for (pair, (open_pos, close_pos)) in pairs.iter().zip(markers) {
        let (oc, _, ot) = pair.open;
        let (cc, cf, _) = pair.close;

        if let Some(leaf) = leaves.iter().find(|l| l.1 > (oc, ot - 1))
            && let Some(o) = doc.node_mut(leaf.0).opts_mut()
        {
            o.open_styles.push(StyleDelim { style, pos: open_pos });
        }
        if let Some(leaf) = leaves.iter().rev().find(|l| l.2 < (cc, cf))
            && let Some(o) = doc.node_mut(leaf.0).opts_mut()
        {
            o.close_styles.push(StyleDelim { style, pos: close_pos });
        }
    }

    let new_children: Vec<NodeId> = leaves.into_iter().map(|l| l.0).collect();
    for _ in 0..children.len() {
        doc.remove_child(paragraph, 0);
    }
    for id in new_children {
        doc.append_child(paragraph, id);
    }
}

fn marker_pos(
    doc: &Document,
    ctx: &TextPluginContext<'_>,
    id: NodeId,
    from: usize,
    to: usize,
) -> crate::parsing::text::WithPosition {
    let columns = ctx.columns.get(&id).map(Vec::as_slice).unwrap_or_default();
    piece_pos(doc.pos(id), columns, from, to)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::inline::Columns;
    use crate::parsing::text::WithPosition;
    use pretty_assertions::assert_eq;

    const MARK: u32 = 8;

    fn paragraph(doc: &mut Document, columns: &mut Columns, text: &str) -> NodeId {
        let p = doc.add(NodeKind::Paragraph, WithPosition::default());
        let len = text.chars().count() as i64;
        let t = doc.add(
            NodeKind::Text(crate::doc::Text {
                text: text.to_string(),
                ..Default::default()
            }),
            WithPosition::new(0, 0, len - 1, 0),
        );
        doc.append_child(p, t);
        columns.insert(t, (0..len).collect());
        p
    }

    fn run(text: &str) -> (Document, NodeId) {
        let mut doc = Document::new();
        let mut columns = Columns::new();
        let p = paragraph(&mut doc, &mut columns, text);
        let mut ctx = TextPluginContext {
            columns: &mut columns,
            collecting_ref_links: false,
            in_link: false,
        };
        emphasis_template_plugin(&mut doc, p, &mut ctx, &["=".to_string(), MARK.to_string()]);
        (doc, p)
    }

    fn texts(doc: &Document, p: NodeId) -> Vec<(String, u32)> {
        doc.children(p)
            .iter()
            .filter_map(|&c| match doc.kind(c) {
                NodeKind::Text(t) => Some((t.text.clone(), t.opts.style.bits())),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn marks_text_between_delimiters() {
        let (doc, p) = run("a ==b== c");
        assert_eq!(texts(&doc, p), vec![
            ("a ".to_string(), 0),
            ("b".to_string(), MARK),
            (" c".to_string(), 0),
        ]);

        let b = doc.children(p)[1];
        let opts = doc.node(b).opts().expect("text opts");
        assert_eq!(opts.open_styles[0].pos, WithPosition::new(2, 0, 3, 0));
        assert_eq!(opts.close_styles[0].pos, WithPosition::new(5, 0, 6, 0));
    }

    #[test]
    fn unflanked_delimiters_stay_literal() {
        let (doc, p) = run("a == b == c");
        assert_eq!(texts(&doc, p), vec![("a == b == c".to_string(), 0)]);
    }

    #[test]
    fn missing_options_do_nothing() {
        let mut doc = Document::new();
        let mut columns = Columns::new();
        let p = paragraph(&mut doc, &mut columns, "==x==");
        let mut ctx = TextPluginContext {
            columns: &mut columns,
            collecting_ref_links: false,
            in_link: false,
        };
        emphasis_template_plugin(&mut doc, p, &mut ctx, &[]);
        assert_eq!(texts(&doc, p), vec![("==x==".to_string(), 0)]);
    }
}
