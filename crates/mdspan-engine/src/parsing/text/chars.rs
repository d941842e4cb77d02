/// Characters that may be backslash-escaped.
pub const CAN_BE_ESCAPED: &str = "!\"#$%&'()*+,-./:;<=>?@[\\]^_`{|}~";

/// Returns true if `c` may follow a backslash escape.
pub fn is_escapable(c: char) -> bool {
    CAN_BE_ESCAPED.contains(c)
}

/// ASCII punctuation plus non-alphanumeric, non-space Unicode symbols.
pub fn is_punctuation(c: char) -> bool {
    c.is_ascii_punctuation()
        || (!c.is_ascii() && !c.is_alphanumeric() && !c.is_whitespace() && !c.is_control())
}

/// Unicode whitespace; a missing neighbour counts as whitespace for flanking.
pub fn is_space(c: Option<char>) -> bool {
    c.is_none_or(char::is_whitespace)
}

/// Count of spaces starting at `from`.
pub fn skip_spaces(s: &[char], from: usize) -> usize {
    let mut i = from;
    while i < s.len() && s[i] == ' ' {
        i += 1;
    }
    i
}

/// Prefixes every escapable character with a backslash.
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if is_escapable(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Removes backslashes that escape an escapable character.
pub fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\'
            && let Some(&next) = chars.peek()
            && is_escapable(next)
        {
            out.push(next);
            chars.next();
            continue;
        }
        out.push(c);
    }
    out
}

/// Decodes HTML entity and numeric character references.
pub fn decode_entities(s: &str) -> String {
    html_escape::decode_html_entities(s).into_owned()
}

/// Escapes exactly `&`, `<` and `>`.
pub fn escape_html(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Resolves backslash escapes and entity references in inline text.
///
/// Returns the text and, for every output character, the offset in `s` of
/// the source character it came from.
pub fn resolve_escapes(s: &[char]) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(s.len());
    let mut offsets = Vec::with_capacity(s.len());
    let mut i = 0;

    while i < s.len() {
        if s[i] == '\\'
            && let Some(&next) = s.get(i + 1)
            && is_escapable(next)
        {
            out.push(next);
            offsets.push(i + 1);
            i += 2;
            continue;
        }

        if let Some(len) = entity_len(s, i) {
            let raw: String = s[i..i + len].iter().collect();
            for c in decode_entities(&raw).chars() {
                out.push(c);
                offsets.push(i);
            }
            i += len;
            continue;
        }

        out.push(s[i]);
        offsets.push(i);
        i += 1;
    }

    (out, offsets)
}

/// Length of an entity reference (`&name;`, `&#123;`, `&#x1F;`) starting at `from`.
pub fn entity_len(s: &[char], from: usize) -> Option<usize> {
    if s.get(from) != Some(&'&') {
        return None;
    }

    let mut i = from + 1;
    let numeric = s.get(i) == Some(&'#');
    if numeric {
        i += 1;
    }
    let hex = numeric && matches!(s.get(i), Some('x') | Some('X'));
    if hex {
        i += 1;
    }

    let start = i;
    while i < s.len() && i - start < 32 {
        let c = s[i];
        let ok = if hex {
            c.is_ascii_hexdigit()
        } else if numeric {
            c.is_ascii_digit()
        } else {
            c.is_ascii_alphanumeric()
        };
        if !ok {
            break;
        }
        i += 1;
    }

    if i == start || s.get(i) != Some(&';') {
        return None;
    }
    if numeric && i - start > if hex { 6 } else { 7 } {
        return None;
    }

    let len = i + 1 - from;
    let raw: String = s[from..from + len].iter().collect();

    // Named references html_escape doesn't know stay literal.
    if decode_entities(&raw) == raw {
        return None;
    }

    Some(len)
}
