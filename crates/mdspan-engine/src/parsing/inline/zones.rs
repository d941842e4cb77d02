use super::kinds::{Autolink, RawHtml};
use super::scanner::{Delimiter, DelimiterKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneKind {
    Code,
    Math,
    Autolink { email: bool },
    Html,
}

/// A span of inline text whose content is taken literally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zone {
    pub kind: ZoneKind,
    pub start: usize,
    pub end: usize,
    pub open_len: usize,
    pub close_len: usize,
}

impl Zone {
    /// Range between the delimiters.
    pub fn content(&self) -> (usize, usize) {
        (self.start + self.open_len, self.end - self.close_len)
    }
}

/// Finds code spans, math, autolinks and raw HTML left to right and marks
/// the delimiters they cover as skipped.
pub fn find_zones(s: &[char], delims: &mut [Delimiter]) -> Vec<Zone> {
    let mut zones = vec![];
    let mut covered = 0;

    for idx in 0..delims.len() {
        let d = delims[idx];
        if d.pos < covered {
            delims[idx].skip = true;
            continue;
        }

        let zone = match d.kind {
            DelimiterKind::InlineCode => code_span(delims, idx),
            DelimiterKind::Math => math(delims, idx),
            DelimiterKind::Less if !d.backslashed => angle(s, delims, idx),
            _ => None,
        };

        if let Some(z) = zone {
            covered = z.end;
            zones.push(z);
        }
    }

    zones
}

fn code_span(delims: &[Delimiter], idx: usize) -> Option<Zone> {
    let d = delims[idx];
    let (start, len) = if d.backslashed {
        (d.pos + 1, d.len - 1)
    } else {
        (d.pos, d.len)
    };
    if len == 0 {
        return None;
    }

    delims[idx + 1..]
        .iter()
        .find(|e| e.kind == DelimiterKind::InlineCode && e.len == len)
        .map(|e| Zone {
            kind: ZoneKind::Code,
            start,
            end: e.pos + e.len,
            open_len: len,
            close_len: len,
        })
}

fn math(delims: &[Delimiter], idx: usize) -> Option<Zone> {
    let d = delims[idx];

    delims[idx + 1..]
        .iter()
        .find(|e| e.kind == DelimiterKind::Math && e.len == d.len)
        .filter(|e| e.pos > d.pos + d.len)
        .map(|e| Zone {
            kind: ZoneKind::Math,
            start: d.pos,
            end: e.pos + e.len,
            open_len: d.len,
            close_len: d.len,
        })
}

fn angle(s: &[char], delims: &[Delimiter], idx: usize) -> Option<Zone> {
    let d = delims[idx];

    let autolink = delims[idx + 1..]
        .iter()
        .find(|e| matches!(e.kind, DelimiterKind::Greater | DelimiterKind::Less))
        .filter(|e| e.kind == DelimiterKind::Greater)
        .and_then(|e| {
            let content = &s[d.pos + 1..e.pos];
            let kind = if Autolink::is_uri(content) {
                ZoneKind::Autolink { email: false }
            } else if Autolink::is_email(content) {
                ZoneKind::Autolink { email: true }
            } else {
                return None;
            };
            Some(Zone {
                kind,
                start: d.pos,
                end: e.pos + 1,
                open_len: 1,
                close_len: 1,
            })
        });

    autolink.or_else(|| {
        RawHtml::parse(s, d.pos).map(|end| Zone {
            kind: ZoneKind::Html,
            start: d.pos,
            end,
            open_len: 0,
            close_len: 0,
        })
    })
}
