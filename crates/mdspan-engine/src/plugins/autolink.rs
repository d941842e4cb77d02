use std::sync::OnceLock;

use regex::Regex;

use super::{TextPluginContext, piece_pos, text_piece};
use crate::doc::{Document, Link, NodeId, NodeKind, Text};

static URL_REGEX: OnceLock<Regex> = OnceLock::new();
static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn url_regex() -> &'static Regex {
    URL_REGEX.get_or_init(|| {
        Regex::new(r"(?i)(?:https?://|www\.)[a-z0-9_-]+(?:\.[a-z0-9_-]+)*[^\s<]*")
            .expect("Invalid URL regex")
    })
}

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"[A-Za-z0-9._+-]+@[A-Za-z0-9_-]+(?:\.[A-Za-z0-9_-]+)+")
            .expect("Invalid email regex")
    })
}

/// A bare link found in text, as a char range plus its target.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Found {
    from: usize,
    to: usize,
    url: String,
}

/// Turns bare `www.`, `http://`, `https://` URLs and e-mail addresses in text
/// into links, the way GitHub does.
pub fn github_autolinks_plugin(
    doc: &mut Document,
    paragraph: NodeId,
    ctx: &mut TextPluginContext<'_>,
    _options: &[String],
) {
    if ctx.collecting_ref_links || ctx.in_link {
        return;
    }

    let mut i = 0;
    while i < doc.children(paragraph).len() {
        let id = doc.children(paragraph)[i];
        let Some(found) = (match doc.kind(id) {
            NodeKind::Text(t) => find_autolink(&t.text),
            _ => None,
        }) else {
            i += 1;
            continue;
        };

        // Scanning resumes at the text after the link.
        let link_index = usize::from(found.from > 0);
        let replacement = split_around(doc, ctx, id, &found);
        doc.splice_child(paragraph, i, replacement);
        i += link_index + 1;
    }
}

/// Replaces text node `id` with the text before the link, the link and the
/// text after it.
fn split_around(doc: &mut Document, ctx: &mut TextPluginContext<'_>, id: NodeId, found: &Found) -> Vec<NodeId> {
    let len = char_len(doc, id);
    let (style, open, close) = match doc.node(id).opts() {
        Some(o) => (o.style, o.open_styles.clone(), o.close_styles.clone()),
        None => return vec![id],
    };
    let columns = ctx.columns.get(&id).cloned().unwrap_or_default();
    let pos = doc.pos(id);

    let mut out = vec![];
    if found.from > 0 {
        out.push(text_piece(doc, ctx.columns, id, 0, found.from));
    }

    let link_pos = piece_pos(pos, &columns, found.from, found.to);
    let text: String = chars_of(doc, id)[found.from..found.to].iter().collect();
    let p = doc.add(NodeKind::Paragraph, link_pos);
    let t = doc.add(
        NodeKind::Text(Text {
            text: text.clone(),
            ..Default::default()
        }),
        link_pos,
    );
    doc.append_child(p, t);
    let mut link = Link {
        url: found.url.clone(),
        text,
        p: Some(p),
        text_pos: link_pos,
        url_pos: link_pos,
        ..Default::default()
    };
    link.opts.style = style;
    out.push(doc.add(NodeKind::Link(link), link_pos));

    if found.to < len {
        out.push(text_piece(doc, ctx.columns, id, found.to, len));
    }

    if let Some(first) = out.first().and_then(|f| doc.node_mut(*f).opts_mut()) {
        first.open_styles = open;
    }
    if let Some(last) = out.last().and_then(|l| doc.node_mut(*l).opts_mut()) {
        last.close_styles = close;
    }
    ctx.columns.remove(&id);
    out
}

fn chars_of(doc: &Document, id: NodeId) -> Vec<char> {
    match doc.kind(id) {
        NodeKind::Text(t) => t.text.chars().collect(),
        _ => vec![],
    }
}

fn char_len(doc: &Document, id: NodeId) -> usize {
    chars_of(doc, id).len()
}

/// First bare link in `text`.
fn find_autolink(text: &str) -> Option<Found> {
    let url = url_regex()
        .find_iter(text)
        .filter(|m| at_boundary(text, m.start()))
        .find_map(|m| {
            let raw = trim_trailing(m.as_str());
            let host = raw.split_once("://").map_or(raw, |(_, rest)| rest);
            let domain = host.split(['/', '?', '#']).next().unwrap_or_default();
            let domain_ok = domain.contains('.') && !domain.ends_with('.');
            domain_ok.then(|| {
                let url = if raw.to_ascii_lowercase().starts_with("www.") {
                    format!("http://{raw}")
                } else {
                    raw.to_string()
                };
                (m.start(), m.start() + raw.len(), url)
            })
        });

    let email = email_regex()
        .find_iter(text)
        .find(|m| at_boundary(text, m.start()) && !m.as_str().ends_with(['-', '_']))
        .map(|m| (m.start(), m.end(), format!("mailto:{}", m.as_str())));

    let (start, end, url) = match (url, email) {
        (Some(u), Some(e)) => {
            if e.0 < u.0 {
                e
            } else {
                u
            }
        }
        (Some(u), None) => u,
        (None, Some(e)) => e,
        (None, None) => return None,
    };

    Some(Found {
        from: text[..start].chars().count(),
        to: text[..end].chars().count(),
        url,
    })
}

/// Bare links start a word or follow `*`, `_`, `~` or `(`.
fn at_boundary(text: &str, byte: usize) -> bool {
    text[..byte]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || matches!(c, '*' | '_' | '~' | '('))
}

/// Drops trailing punctuation and unbalanced closing parentheses.
fn trim_trailing(s: &str) -> &str {
    let mut end = s.len();
    loop {
        let cur = &s[..end];
        let Some(last) = cur.chars().next_back() else {
            return cur;
        };
        let drop = match last {
            '?' | '!' | '.' | ',' | ':' | '*' | '_' | '~' | '\'' | '"' => true,
            ')' => cur.matches(')').count() > cur.matches('(').count(),
            _ => false,
        };
        if !drop {
            return cur;
        }
        end -= last.len_utf8();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("see www.commonmark.org.", Some((4, 22, "http://www.commonmark.org")))]
    #[case("go https://a.b/c?d=1!", Some((3, 20, "https://a.b/c?d=1")))]
    #[case("(http://x.y/a_(b))", Some((1, 17, "http://x.y/a_(b)")))]
    #[case("mail foo@bar.baz now", Some((5, 16, "mailto:foo@bar.baz")))]
    #[case("nowww.x.y", None)]
    #[case("plain text", None)]
    #[case("http://localhost/x", None)]
    #[case("http://localhost/x www.example.com", Some((19, 34, "http://www.example.com")))]
    fn finds_bare_links(#[case] text: &str, #[case] expected: Option<(usize, usize, &str)>) {
        let found = find_autolink(text).map(|f| (f.from, f.to, f.url));
        assert_eq!(found, expected.map(|(a, b, u)| (a, b, u.to_string())));
    }
}
