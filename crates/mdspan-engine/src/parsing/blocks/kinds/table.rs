use crate::doc::Alignment;

/// Pipe table syntax.
pub struct TableRow;

impl TableRow {
    pub const PIPE: char = '|';

    /// Half-open ranges of the trimmed cells of a row.
    ///
    /// Leading and trailing pipes are optional; escaped pipes do not split.
    pub fn cells(line: &[char]) -> Vec<(usize, usize)> {
        let mut start = 0;
        let mut end = line.len();
        while start < end && line[start] == ' ' {
            start += 1;
        }
        while end > start && line[end - 1] == ' ' {
            end -= 1;
        }
        if start < end && line[start] == Self::PIPE {
            start += 1;
        }
        if end > start && line[end - 1] == Self::PIPE && !is_escaped(line, end - 1) {
            end -= 1;
        }

        let mut cells = vec![];
        let mut cell_start = start;
        let mut i = start;
        while i < end {
            if line[i] == '\\' {
                i += 2;
                continue;
            }
            if line[i] == Self::PIPE {
                cells.push(trim(line, cell_start, i));
                cell_start = i + 1;
            }
            i += 1;
        }
        cells.push(trim(line, cell_start, end));

        cells
    }

    /// Column alignments when `line` is a delimiter row.
    pub fn delimiter_row(line: &[char]) -> Option<Vec<Alignment>> {
        if !line.contains(&Self::PIPE) {
            return None;
        }

        Self::cells(line)
            .into_iter()
            .map(|(s, e)| alignment(&line[s..e]))
            .collect()
    }

    /// Returns true if `line` is a header row matching `columns`.
    pub fn is_header(line: &[char], columns: usize) -> bool {
        line.contains(&Self::PIPE) && Self::cells(line).len() == columns
    }
}

fn alignment(cell: &[char]) -> Option<Alignment> {
    let left = cell.first() == Some(&':');
    let right = cell.len() > 1 && cell.last() == Some(&':');
    let dashes = &cell[usize::from(left)..cell.len() - usize::from(right)];

    if dashes.is_empty() || !dashes.iter().all(|c| *c == '-') {
        return None;
    }

    Some(match (left, right) {
        (true, true) => Alignment::Center,
        (true, false) => Alignment::Left,
        (false, true) => Alignment::Right,
        (false, false) => Alignment::None,
    })
}

fn is_escaped(line: &[char], pos: usize) -> bool {
    let mut n = 0;
    let mut i = pos;
    while i > 0 && line[i - 1] == '\\' {
        n += 1;
        i -= 1;
    }
    n % 2 == 1
}

fn trim(line: &[char], mut start: usize, mut end: usize) -> (usize, usize) {
    while start < end && line[start] == ' ' {
        start += 1;
    }
    while end > start && line[end - 1] == ' ' {
        end -= 1;
    }
    (start, end)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    fn texts(line: &str) -> Vec<String> {
        let c = chars(line);
        TableRow::cells(&c)
            .into_iter()
            .map(|(s, e)| c[s..e].iter().collect())
            .collect()
    }

    #[test]
    fn splits_with_and_without_outer_pipes() {
        assert_eq!(texts("| a | b |"), vec!["a", "b"]);
        assert_eq!(texts("a | b"), vec!["a", "b"]);
        assert_eq!(texts("| a |  |"), vec!["a", ""]);
    }

    #[test]
    fn escaped_pipe_does_not_split() {
        assert_eq!(texts("| a \\| b | c |"), vec!["a \\| b", "c"]);
    }

    #[test]
    fn delimiter_row_alignments() {
        assert_eq!(
            TableRow::delimiter_row(&chars("|:--|--:|:-:|---|")),
            Some(vec![
                Alignment::Left,
                Alignment::Right,
                Alignment::Center,
                Alignment::None
            ])
        );
    }

    #[test]
    fn invalid_delimiter_rows() {
        assert_eq!(TableRow::delimiter_row(&chars("---")), None);
        assert_eq!(TableRow::delimiter_row(&chars("| -x- |")), None);
        assert_eq!(TableRow::delimiter_row(&chars("| : |")), None);
    }
}
