use crate::parsing::text::SourceLine;

/// Classification of a line, and of the fragment it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockType {
    EmptyLine,
    Text,
    List,
    /// List item whose marker is followed by nothing.
    ListWithFirstEmptyLine,
    CodeIndentedBySpaces,
    Code,
    Blockquote,
    Heading,
    /// Line indented into the content of an open list item.
    SomethingInList,
    /// Line inside a fence opened within a list item.
    FencedCodeInList,
    Footnote,
    UserDefined(i32),
}

impl BlockType {
    pub fn is_list(self) -> bool {
        matches!(self, BlockType::List | BlockType::ListWithFirstEmptyLine)
    }
}

/// What a `Text` fragment turned out to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextKind {
    Paragraph,
    HorizontalLine,
    /// HTML block with its start rule.
    Html(u8),
    Table,
    /// Paragraph closed by a setext underline of the given level.
    Setext(u8),
}

/// Consecutive lines that form one block.
#[derive(Debug, Clone)]
pub struct Fragment {
    pub kind: BlockType,
    pub text: TextKind,
    pub lines: Vec<SourceLine>,
}

impl Fragment {
    pub fn new(kind: BlockType, lines: &[SourceLine]) -> Self {
        Self {
            kind,
            text: TextKind::Paragraph,
            lines: lines.to_vec(),
        }
    }

    pub fn text(text: TextKind, lines: &[SourceLine]) -> Self {
        Self {
            kind: BlockType::Text,
            text,
            lines: lines.to_vec(),
        }
    }
}
