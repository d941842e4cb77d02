use crate::parsing::inline::{cursor::Cursor, kinds::RawHtml};
use crate::parsing::text::chars::skip_spaces;

/// HTML block start and end conditions, numbered as in CommonMark.
pub struct HtmlBlock;

impl HtmlBlock {
    /// Raw-content tags of rule 1.
    pub const RAW_TAGS: [&'static str; 4] = ["pre", "script", "style", "textarea"];

    /// Known block-level tag names of rule 6.
    pub const BLOCK_TAGS: [&'static str; 62] = [
        "address", "article", "aside", "base", "basefont", "blockquote", "body", "caption",
        "center", "col", "colgroup", "dd", "details", "dialog", "dir", "div", "dl", "dt",
        "fieldset", "figcaption", "figure", "footer", "form", "frame", "frameset", "h1", "h2",
        "h3", "h4", "h5", "h6", "head", "header", "hr", "html", "iframe", "legend", "li", "link",
        "main", "menu", "menuitem", "nav", "noframes", "ol", "optgroup", "option", "p", "param",
        "search", "section", "summary", "table", "tbody", "td", "tfoot", "th", "thead", "title",
        "tr", "track", "ul",
    ];

    /// Rule number whose start condition `line` meets.
    pub fn start_rule(line: &[char]) -> Option<u8> {
        let start = skip_spaces(line, 0);
        if start > 3 {
            return None;
        }

        let cur = Cursor::new(line, start);
        if cur.peek() != Some('<') {
            return None;
        }

        if let Some(name) = Self::RAW_TAGS
            .iter()
            .find(|t| cur.starts_with_ignore_case(&format!("<{t}")))
        {
            let after = line.get(start + name.len() + 1);
            if after.is_none_or(|c| *c == ' ' || *c == '>') {
                return Some(1);
            }
        }
        if cur.starts_with("<!--") {
            return Some(2);
        }
        if cur.starts_with("<?") {
            return Some(3);
        }
        if cur.starts_with("<![CDATA[") {
            return Some(5);
        }
        if cur.starts_with("<!") && cur.peek_at(2).is_some_and(|c| c.is_ascii_alphabetic()) {
            return Some(4);
        }

        if let Some(name) = RawHtml::tag_name_at(line, start) {
            let mut ahead = Cursor::new(line, start + 1);
            ahead.eat('/');
            ahead.bump_n(name.len());
            let boundary = ahead.eof()
                || ahead.starts_with(" ")
                || ahead.starts_with(">")
                || ahead.starts_with("/>");
            if Self::BLOCK_TAGS.contains(&name.as_str()) && boundary {
                return Some(6);
            }

            if !Self::RAW_TAGS.contains(&name.as_str()) {
                let end = RawHtml::open_tag(line, start).or_else(|| RawHtml::closing_tag(line, start));
                if end.is_some_and(|e| line[e..].iter().all(|c| c.is_whitespace())) {
                    return Some(7);
                }
            }
        }

        None
    }

    /// Returns true if `line` meets the end condition of rules 1 to 5.
    pub fn ends(rule: u8, line: &[char]) -> bool {
        let lower: String = line.iter().collect::<String>().to_ascii_lowercase();
        match rule {
            1 => Self::RAW_TAGS.iter().any(|t| lower.contains(&format!("</{t}>"))),
            2 => lower.contains("-->"),
            3 => lower.contains("?>"),
            4 => lower.contains('>'),
            5 => lower.contains("]]>"),
            _ => false,
        }
    }

    /// Rules 6 and 7 end at a blank line.
    pub fn ends_at_blank(rule: u8) -> bool {
        rule >= 6
    }
}
