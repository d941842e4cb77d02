use super::classify::{classify, classify_in_item, interrupts_paragraph};
use super::kinds::{
    BlockQuote, CodeFence, FenceOpen, FootnoteDef, HtmlBlock, SetextUnderline, TableRow, ThematicBreak,
    pos_of_list_item,
};
use super::strip::{footnote_content, footnote_line, item_content, item_line, quote_content, quote_line};
use super::types::{BlockType, Fragment, TextKind};
use crate::parsing::ParseError;
use crate::parsing::text::SourceLine;
use crate::plugins::BlockPlugin;

/// Groups `lines` into typed fragments.
///
/// Blank lines separate fragments and are dropped, except inside fenced code
/// and between the paragraphs of a container, which keep them. Block plugins
/// are asked first at every fragment start.
///
/// `depth_left` is how many more container levels may open below these
/// lines. Deciding a lazy continuation that needs to look deeper fails with
/// [`ParseError::TooDeeplyNested`].
pub fn collect(
    lines: &[SourceLine],
    plugins: &mut [Box<dyn BlockPlugin>],
    depth_left: usize,
) -> Result<Vec<Fragment>, ParseError> {
    let mut out = vec![];
    let mut i = 0;
    let mut seen_content = false;

    while i < lines.len() {
        if lines[i].is_blank() {
            i += 1;
            continue;
        }

        if let Some((id, count)) = plugin_block(plugins, lines, i, !seen_content) {
            let count = count.clamp(1, lines.len() - i);
            out.push(Fragment::new(BlockType::UserDefined(id), &lines[i..i + count]));
            i += count;
            seen_content = true;
            continue;
        }

        i = match classify(lines[i].chars()) {
            BlockType::CodeIndentedBySpaces => indented_code(lines, i, &mut out),
            BlockType::Code => fenced_code(lines, i, &mut out),
            BlockType::Heading => {
                out.push(Fragment::new(BlockType::Heading, &lines[i..=i]));
                i + 1
            }
            BlockType::Blockquote => blockquote(lines, i, &mut out, depth_left)?,
            BlockType::Footnote => footnote(lines, i, &mut out, depth_left)?,
            t if t.is_list() => list_item(lines, i, t, &mut out, depth_left)?,
            _ => text(lines, i, &mut out),
        };
        seen_content = true;
    }

    Ok(out)
}

fn plugin_block(
    plugins: &mut [Box<dyn BlockPlugin>],
    lines: &[SourceLine],
    index: usize,
    empty_lines_before: bool,
) -> Option<(i32, usize)> {
    for p in plugins.iter_mut() {
        if p.is_it_you(lines, index, empty_lines_before) {
            return Some((p.id(), p.lines_count_of_last_block()));
        }
    }
    None
}

/// What is known about the last fragment of a container's content.
#[derive(Debug)]
enum Tail {
    Unknown,
    /// A plain paragraph of this many lines, still open.
    Paragraph(usize),
    /// A block quote, followed through its own content.
    Quote(Box<OpenParagraph>),
}

/// Follows the content of a container as its lines are accepted and tells
/// whether it ends inside a paragraph, so that a following non-matching line
/// may continue it lazily.
///
/// Appending lines only changes the last fragment, so a check collects from
/// where that fragment starts. Open paragraphs and trailing quotes are
/// followed line by line without collecting at all.
#[derive(Debug)]
struct OpenParagraph {
    content: Vec<SourceLine>,
    /// Start of the last fragment in `content`.
    tail_start: usize,
    tail: Tail,
    /// Answer of the last check, until the next line arrives.
    known: Option<bool>,
    depth_left: usize,
}

impl OpenParagraph {
    fn new(depth_left: usize) -> Self {
        Self {
            content: vec![],
            tail_start: 0,
            tail: Tail::Unknown,
            known: None,
            depth_left,
        }
    }

    fn with_content(content: Vec<SourceLine>, depth_left: usize) -> Self {
        Self {
            content,
            ..Self::new(depth_left)
        }
    }

    fn push(&mut self, line: SourceLine) -> Result<(), ParseError> {
        let chars = line.chars();
        self.tail = match std::mem::replace(&mut self.tail, Tail::Unknown) {
            Tail::Paragraph(count) if continues_paragraph(chars, count) => Tail::Paragraph(count + 1),
            Tail::Quote(mut inner) => {
                let joins = BlockQuote::marker(chars).is_some()
                    || (!line.is_blank() && is_lazy(chars) && inner.ends_open()?);
                if joins {
                    inner.push(quote_line(&line))?;
                    Tail::Quote(inner)
                } else {
                    Tail::Unknown
                }
            }
            _ => Tail::Unknown,
        };
        self.known = None;
        self.content.push(line);
        Ok(())
    }

    fn ends_open(&mut self) -> Result<bool, ParseError> {
        if let Some(known) = self.known {
            return Ok(known);
        }
        let open = self.check()?;
        self.known = Some(open);
        Ok(open)
    }

    fn check(&mut self) -> Result<bool, ParseError> {
        let Some(first_line) = self.content.first().map(|l| l.line) else {
            return Ok(false);
        };
        if self.content.last().is_none_or(SourceLine::is_blank) {
            return Ok(false);
        }

        match &mut self.tail {
            Tail::Paragraph(_) => return Ok(true),
            Tail::Quote(inner) => return inner.ends_open(),
            Tail::Unknown => {}
        }

        if self.depth_left == 0 {
            return Err(ParseError::TooDeeplyNested { line: first_line });
        }
        let inner_depth = self.depth_left - 1;

        let rest = &self.content[self.tail_start..];
        let fragments = collect(rest, &mut [], inner_depth)?;
        let Some(last) = fragments.last() else {
            return Ok(false);
        };
        if let Some(offset) = rest.iter().position(|l| l.line == last.lines[0].line) {
            self.tail_start += offset;
        }

        match last.kind {
            BlockType::Text if last.text == TextKind::Paragraph => {
                self.tail = Tail::Paragraph(last.lines.len());
                Ok(true)
            }
            BlockType::Blockquote => {
                let mut inner = OpenParagraph::with_content(quote_content(&last.lines), inner_depth);
                let open = inner.ends_open()?;
                self.tail = Tail::Quote(Box::new(inner));
                Ok(open)
            }
            BlockType::Footnote => match FootnoteDef::parse(last.lines[0].chars()) {
                Some(def) => {
                    OpenParagraph::with_content(footnote_content(&last.lines, &def), inner_depth).ends_open()
                }
                None => Ok(false),
            },
            t if t.is_list() => match pos_of_list_item(last.lines[0].chars()) {
                Some(marker) => {
                    OpenParagraph::with_content(item_content(&last.lines, &marker), inner_depth).ends_open()
                }
                None => Ok(false),
            },
            _ => Ok(false),
        }
    }
}

/// A line that keeps a plain paragraph of `count` lines open.
fn continues_paragraph(line: &[char], count: usize) -> bool {
    !line.iter().all(|c| c.is_whitespace())
        && is_lazy(line)
        && !(count == 1 && TableRow::delimiter_row(line).is_some())
}

/// A line that may continue a paragraph it does not belong to.
fn is_lazy(line: &[char]) -> bool {
    !interrupts_paragraph(line) && SetextUnderline::level(line).is_none()
}

fn indented_code(lines: &[SourceLine], start: usize, out: &mut Vec<Fragment>) -> usize {
    let mut end = start + 1;
    let mut j = start + 1;

    while j < lines.len() && (lines[j].is_blank() || lines[j].indent() >= 4) {
        j += 1;
        if !lines[j - 1].is_blank() {
            end = j;
        }
    }

    out.push(Fragment::new(BlockType::CodeIndentedBySpaces, &lines[start..end]));
    end
}

fn fenced_code(lines: &[SourceLine], start: usize, out: &mut Vec<Fragment>) -> usize {
    let Some(open) = CodeFence::open(lines[start].chars()) else {
        return text(lines, start, out);
    };

    let mut j = start + 1;
    while j < lines.len() {
        j += 1;
        if CodeFence::closes(&open, lines[j - 1].chars()) {
            break;
        }
    }

    out.push(Fragment::new(BlockType::Code, &lines[start..j]));
    j
}

fn blockquote(
    lines: &[SourceLine],
    start: usize,
    out: &mut Vec<Fragment>,
    depth_left: usize,
) -> Result<usize, ParseError> {
    let mut content = OpenParagraph::new(depth_left);
    content.push(quote_line(&lines[start]))?;
    let mut j = start + 1;

    while j < lines.len() {
        let line = &lines[j];
        let quoted = BlockQuote::marker(line.chars()).is_some();
        if !quoted && (line.is_blank() || !is_lazy(line.chars()) || !content.ends_open()?) {
            break;
        }
        content.push(quote_line(line))?;
        j += 1;
    }

    out.push(Fragment::new(BlockType::Blockquote, &lines[start..j]));
    Ok(j)
}

fn footnote(
    lines: &[SourceLine],
    start: usize,
    out: &mut Vec<Fragment>,
    depth_left: usize,
) -> Result<usize, ParseError> {
    let Some(def) = FootnoteDef::parse(lines[start].chars()) else {
        return Ok(text(lines, start, out));
    };

    let mut content = OpenParagraph::new(depth_left);
    content.push(footnote_line(&lines[start], true, &def))?;
    let mut end = start + 1;
    let mut j = start + 1;
    let mut blank_before = false;

    while j < lines.len() {
        let line = &lines[j];
        if line.is_blank() {
            blank_before = true;
            j += 1;
            continue;
        }

        let continues = line.indent() >= FootnoteDef::CONTINUATION_INDENT
            || (!blank_before && is_lazy(line.chars()) && content.ends_open()?);
        if !continues {
            break;
        }

        for l in &lines[end..=j] {
            content.push(footnote_line(l, false, &def))?;
        }
        blank_before = false;
        j += 1;
        end = j;
    }

    out.push(Fragment::new(BlockType::Footnote, &lines[start..end]));
    Ok(end)
}

fn list_item(
    lines: &[SourceLine],
    start: usize,
    kind: BlockType,
    out: &mut Vec<Fragment>,
    depth_left: usize,
) -> Result<usize, ParseError> {
    let Some(marker) = pos_of_list_item(lines[start].chars()) else {
        return Ok(text(lines, start, out));
    };

    let content_of = |l: &SourceLine| -> Vec<char> {
        l.chars()[marker.content_indent.min(l.text.len())..].to_vec()
    };

    let mut fence: Option<FenceOpen> = if marker.empty {
        None
    } else {
        CodeFence::open(&content_of(&lines[start]))
    };
    let mut content = OpenParagraph::new(depth_left);
    content.push(item_line(&lines[start], true, &marker))?;
    let mut end = start + 1;
    let mut j = start + 1;
    let mut blank_before = false;

    while j < lines.len() {
        let line = &lines[j];
        match classify_in_item(line, &marker, fence.as_ref()) {
            BlockType::EmptyLine => {
                if marker.empty && j == start + 1 {
                    break;
                }
                blank_before = true;
                j += 1;
                continue;
            }
            BlockType::FencedCodeInList => {
                if fence.is_some_and(|f| CodeFence::closes(&f, &content_of(line))) {
                    fence = None;
                }
            }
            BlockType::SomethingInList => {
                fence = CodeFence::open(&content_of(line));
            }
            t => {
                let lazy = !blank_before
                    && fence.is_none()
                    && !t.is_list()
                    && is_lazy(line.chars())
                    && content.ends_open()?;
                if !lazy {
                    break;
                }
            }
        }

        for l in &lines[end..=j] {
            content.push(item_line(l, false, &marker))?;
        }
        blank_before = false;
        j += 1;
        end = j;
    }

    out.push(Fragment::new(kind, &lines[start..end]));
    Ok(end)
}

fn text(lines: &[SourceLine], start: usize, out: &mut Vec<Fragment>) -> usize {
    let first = lines[start].chars();

    if ThematicBreak::is(first) {
        out.push(Fragment::text(TextKind::HorizontalLine, &lines[start..=start]));
        return start + 1;
    }

    let underline_next = lines
        .get(start + 1)
        .is_some_and(|l| SetextUnderline::level(l.chars()).is_some());

    if let Some(rule) = HtmlBlock::start_rule(first)
        && !underline_next
    {
        let mut j = start;
        if HtmlBlock::ends_at_blank(rule) {
            while j < lines.len() && !lines[j].is_blank() {
                j += 1;
            }
        } else {
            while j < lines.len() && !HtmlBlock::ends(rule, lines[j].chars()) {
                j += 1;
            }
            j = (j + 1).min(lines.len());
        }
        out.push(Fragment::text(TextKind::Html(rule), &lines[start..j]));
        return j;
    }

    if let Some(alignments) = lines
        .get(start + 1)
        .and_then(|l| TableRow::delimiter_row(l.chars()))
        && TableRow::is_header(first, alignments.len())
    {
        let mut j = start + 2;
        while j < lines.len() && !lines[j].is_blank() && !interrupts_paragraph(lines[j].chars()) {
            j += 1;
        }
        out.push(Fragment::text(TextKind::Table, &lines[start..j]));
        return j;
    }

    let mut j = start + 1;
    while j < lines.len() {
        let line = lines[j].chars();
        if lines[j].is_blank() {
            break;
        }
        if let Some(level) = SetextUnderline::level(line) {
            out.push(Fragment::text(TextKind::Setext(level), &lines[start..=j]));
            return j + 1;
        }
        if interrupts_paragraph(line) {
            break;
        }
        j += 1;
    }

    out.push(Fragment::text(TextKind::Paragraph, &lines[start..j]));
    j
}
