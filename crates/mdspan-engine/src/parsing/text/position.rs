/// Source span in virgin coordinates.
///
/// Columns are character offsets into the original source line and the end
/// column is inclusive. Every field is `-1` until the span is set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WithPosition {
    pub start_column: i64,
    pub start_line: i64,
    pub end_column: i64,
    pub end_line: i64,
}

impl Default for WithPosition {
    fn default() -> Self {
        Self {
            start_column: -1,
            start_line: -1,
            end_column: -1,
            end_line: -1,
        }
    }
}

impl WithPosition {
    /// Creates a span from start and end coordinates (column first, as in the fields).
    pub const fn new(start_column: i64, start_line: i64, end_column: i64, end_line: i64) -> Self {
        Self {
            start_column,
            start_line,
            end_column,
            end_line,
        }
    }

    /// A span covering a single source character.
    pub const fn point(column: i64, line: i64) -> Self {
        Self::new(column, line, column, line)
    }

    /// Returns true when every coordinate has been set.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.start_column >= 0 && self.start_line >= 0 && self.end_column >= 0 && self.end_line >= 0
    }

    /// Returns a copy whose start is `other`'s start.
    #[must_use]
    pub fn with_start_of(&self, other: &WithPosition) -> Self {
        Self::new(other.start_column, other.start_line, self.end_column, self.end_line)
    }

    /// Returns a copy whose end is `other`'s end.
    #[must_use]
    pub fn with_end_of(&self, other: &WithPosition) -> Self {
        Self::new(self.start_column, self.start_line, other.end_column, other.end_line)
    }
}
