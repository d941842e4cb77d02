use super::kinds::{
    AtxHeading, BlockQuote, CodeFence, FenceOpen, FootnoteDef, HtmlBlock, ListMarker,
    ThematicBreak, pos_of_list_item,
};
use super::types::BlockType;
use crate::parsing::text::SourceLine;

/// Indentation from which a line is indented code.
pub const CODE_INDENT: usize = 4;

/// Classifies a line that starts outside of any open block.
///
/// Thematic breaks and HTML starts report `Text`; the text collector tells
/// them apart.
pub fn classify(line: &[char]) -> BlockType {
    if line.iter().all(|c| c.is_whitespace()) {
        return BlockType::EmptyLine;
    }
    if line.iter().take_while(|c| **c == ' ').count() >= CODE_INDENT {
        return BlockType::CodeIndentedBySpaces;
    }
    if CodeFence::open(line).is_some() {
        return BlockType::Code;
    }
    if AtxHeading::parse(line).is_some() {
        return BlockType::Heading;
    }
    if BlockQuote::marker(line).is_some() {
        return BlockType::Blockquote;
    }
    if ThematicBreak::is(line) {
        return BlockType::Text;
    }
    if FootnoteDef::parse(line).is_some() {
        return BlockType::Footnote;
    }
    match pos_of_list_item(line) {
        Some(m) if m.empty => BlockType::ListWithFirstEmptyLine,
        Some(_) => BlockType::List,
        None => BlockType::Text,
    }
}

/// Classifies a line following the first line of a list item.
pub fn classify_in_item(line: &SourceLine, item: &ListMarker, fence: Option<&FenceOpen>) -> BlockType {
    if line.is_blank() {
        return BlockType::EmptyLine;
    }
    if line.indent() >= item.content_indent {
        return if fence.is_some() {
            BlockType::FencedCodeInList
        } else {
            BlockType::SomethingInList
        };
    }
    classify(line.chars())
}

/// Returns true if `line` may interrupt an open paragraph.
pub fn interrupts_paragraph(line: &[char]) -> bool {
    AtxHeading::parse(line).is_some()
        || CodeFence::open(line).is_some()
        || BlockQuote::marker(line).is_some()
        || ThematicBreak::is(line)
        || FootnoteDef::parse(line).is_some()
        || HtmlBlock::start_rule(line).is_some_and(|r| r <= 6)
        || pos_of_list_item(line).is_some_and(|m| !m.empty && (!m.is_ordered() || m.number == 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::text::split_lines;
    use rstest::rstest;

    fn chars(s: &str) -> Vec<char> {
        s.chars().collect()
    }

    #[rstest]
    #[case("", BlockType::EmptyLine)]
    #[case("   ", BlockType::EmptyLine)]
    #[case("    code", BlockType::CodeIndentedBySpaces)]
    #[case("```", BlockType::Code)]
    #[case("## h", BlockType::Heading)]
    #[case("> q", BlockType::Blockquote)]
    #[case("- - -", BlockType::Text)]
    #[case("- item", BlockType::List)]
    #[case("1.", BlockType::ListWithFirstEmptyLine)]
    #[case("[^1]: note", BlockType::Footnote)]
    #[case("plain", BlockType::Text)]
    fn line_classes(#[case] line: &str, #[case] expected: BlockType) {
        assert_eq!(classify(&chars(line)), expected);
    }

    #[rstest]
    #[case("# h", true)]
    #[case("2. second", false)]
    #[case("1. first", true)]
    #[case("-", false)]
    #[case("<div>", true)]
    #[case("<custom>", false)]
    #[case("    code", false)]
    fn paragraph_interruption(#[case] line: &str, #[case] expected: bool) {
        assert_eq!(interrupts_paragraph(&chars(line)), expected);
    }

    #[test]
    fn lines_inside_item_content() {
        let lines = split_lines("-  a\n   b\n  c");
        let marker = pos_of_list_item(lines[0].chars()).unwrap();
        assert_eq!(classify_in_item(&lines[1], &marker, None), BlockType::SomethingInList);
        assert_eq!(classify_in_item(&lines[2], &marker, None), BlockType::Text);
        let fence = CodeFence::open(&chars("```")).unwrap();
        assert_eq!(classify_in_item(&lines[1], &marker, Some(&fence)), BlockType::FencedCodeInList);
    }
}
