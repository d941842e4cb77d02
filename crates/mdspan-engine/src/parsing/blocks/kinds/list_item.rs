use crate::parsing::text::chars::skip_spaces;

/// Bullet character or ordered-list delimiter of a list marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerKind {
    Bullet(char),
    Ordered(char),
}

/// A list item marker found at the start of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListMarker {
    pub kind: MarkerKind,
    pub number: u64,
    /// Column of the marker's first character.
    pub indent: usize,
    /// Column just past the marker.
    pub marker_end: usize,
    /// Column where the item's content starts.
    pub content_indent: usize,
    /// Nothing follows the marker on this line.
    pub empty: bool,
}

impl ListMarker {
    pub fn is_ordered(&self) -> bool {
        matches!(self.kind, MarkerKind::Ordered(_))
    }
}

pub struct ListItemMarker;

impl ListItemMarker {
    pub const BULLETS: [char; 3] = ['-', '+', '*'];
    pub const ORDERED_DELIMS: [char; 2] = ['.', ')'];
    pub const MAX_DIGITS: usize = 9;
}

/// Finds the list marker of `line` and the column where its content starts.
pub fn pos_of_list_item(line: &[char]) -> Option<ListMarker> {
    let indent = skip_spaces(line, 0);
    if indent > 3 {
        return None;
    }

    let first = *line.get(indent)?;
    let (kind, number, marker_end) = if ListItemMarker::BULLETS.contains(&first) {
        (MarkerKind::Bullet(first), 0, indent + 1)
    } else if first.is_ascii_digit() {
        let mut i = indent;
        while i < line.len() && line[i].is_ascii_digit() {
            i += 1;
        }
        if i - indent > ListItemMarker::MAX_DIGITS {
            return None;
        }
        let delim = *line.get(i)?;
        if !ListItemMarker::ORDERED_DELIMS.contains(&delim) {
            return None;
        }
        let number = line[indent..i]
            .iter()
            .collect::<String>()
            .parse::<u64>()
            .ok()?;
        (MarkerKind::Ordered(delim), number, i + 1)
    } else {
        return None;
    };

    if marker_end < line.len() && line[marker_end] != ' ' {
        return None;
    }

    let content = skip_spaces(line, marker_end);
    let empty = content == line.len();
    let spaces = content - marker_end;
    let content_indent = if empty || spaces > 4 {
        marker_end + 1
    } else {
        content
    };

    Some(ListMarker {
        kind,
        number,
        indent,
        marker_end,
        content_indent,
        empty,
    })
}

/// Task checkbox (`[ ]`, `[x]`) at the start of item content; returns whether it is checked.
pub fn task_checkbox(content: &[char]) -> Option<bool> {
    if content.len() < 3 || content[0] != '[' || content[2] != ']' {
        return None;
    }
    let checked = match content[1] {
        ' ' => false,
        'x' | 'X' => true,
        _ => return None,
    };
    match content.get(3) {
        Some(' ') => Some(checked),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[test]
    fn bullet_marker() {
        let m = pos_of_list_item(&chars("-  item")).unwrap();
        assert_eq!(m.kind, MarkerKind::Bullet('-'));
        assert_eq!(m.content_indent, 3);
        assert!(!m.empty);
    }

    #[test]
    fn ordered_marker() {
        let m = pos_of_list_item(&chars(" 12) item")).unwrap();
        assert_eq!(m.kind, MarkerKind::Ordered(')'));
        assert_eq!(m.number, 12);
        assert_eq!(m.indent, 1);
        assert_eq!(m.content_indent, 5);
    }

    #[test]
    fn indented_code_after_marker_uses_one_space() {
        let m = pos_of_list_item(&chars("-      code")).unwrap();
        assert_eq!(m.content_indent, 2);
    }

    #[test]
    fn empty_item() {
        let m = pos_of_list_item(&chars("*")).unwrap();
        assert!(m.empty);
        assert_eq!(m.content_indent, 2);
    }

    #[test]
    fn not_markers() {
        assert!(pos_of_list_item(&chars("-item")).is_none());
        assert!(pos_of_list_item(&chars("1234567890. x")).is_none());
        assert!(pos_of_list_item(&chars("    - x")).is_none());
        assert!(pos_of_list_item(&chars("a. x")).is_none());
    }

    #[test]
    fn task_checkboxes() {
        assert_eq!(task_checkbox(&chars("[ ] todo")), Some(false));
        assert_eq!(task_checkbox(&chars("[x] done")), Some(true));
        assert_eq!(task_checkbox(&chars("[x]")), None);
        assert_eq!(task_checkbox(&chars("[y] no")), None);
    }
}
