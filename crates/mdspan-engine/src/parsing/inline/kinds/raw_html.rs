use crate::parsing::inline::cursor::Cursor;

/// Inline HTML grammar: tags, comments, processing instructions,
/// declarations and CDATA sections.
pub struct RawHtml;

impl RawHtml {
    pub const OPEN: char = '<';

    /// End (exclusive) of an HTML construct starting at `from`.
    pub fn parse(s: &[char], from: usize) -> Option<usize> {
        let cur = Cursor::new(s, from);
        if cur.peek() != Some(Self::OPEN) {
            return None;
        }

        if cur.starts_with("<!--") {
            return comment(cur);
        }
        if cur.starts_with("<?") {
            return cur.find("?>").map(|i| i + 2);
        }
        if cur.starts_with("<![CDATA[") {
            return cur.find("]]>").map(|i| i + 3);
        }
        if cur.starts_with("<!") && cur.peek_at(2).is_some_and(|c| c.is_ascii_alphabetic()) {
            return cur.find(">").map(|i| i + 1);
        }
        if cur.starts_with("</") {
            return Self::closing_tag(s, from);
        }

        Self::open_tag(s, from)
    }

    /// `<name attr="v" ... />`
    pub fn open_tag(s: &[char], from: usize) -> Option<usize> {
        let mut cur = Cursor::new(s, from);
        if !cur.eat('<') || !tag_name(&mut cur) {
            return None;
        }

        loop {
            let ws = cur.eat_while(char::is_whitespace);
            match cur.peek()? {
                '>' => return Some(cur.i + 1),
                '/' => return (cur.peek_at(1) == Some('>')).then_some(cur.i + 2),
                _ if ws > 0 => attribute(&mut cur)?,
                _ => return None,
            }
        }
    }

    /// `</name >`
    pub fn closing_tag(s: &[char], from: usize) -> Option<usize> {
        let mut cur = Cursor::new(s, from);
        if !cur.starts_with("</") {
            return None;
        }
        cur.bump_n(2);
        if !tag_name(&mut cur) {
            return None;
        }
        cur.eat_while(char::is_whitespace);
        cur.eat('>').then_some(cur.i)
    }

    /// Tag name of an open or closing tag at `from`, lowercased.
    pub fn tag_name_at(s: &[char], from: usize) -> Option<String> {
        let mut cur = Cursor::new(s, from);
        cur.eat('<');
        cur.eat('/');
        let start = cur.i;
        if !tag_name(&mut cur) {
            return None;
        }
        Some(s[start..cur.i].iter().collect::<String>().to_ascii_lowercase())
    }
}

fn comment(mut cur: Cursor<'_>) -> Option<usize> {
    cur.bump_n(4);
    if cur.starts_with(">") {
        return Some(cur.i + 1);
    }
    if cur.starts_with("->") {
        return Some(cur.i + 2);
    }
    cur.find("-->").map(|i| i + 3)
}

fn tag_name(cur: &mut Cursor<'_>) -> bool {
    if !cur.peek().is_some_and(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    cur.eat_while(|c| c.is_ascii_alphanumeric() || c == '-');
    true
}

fn attribute(cur: &mut Cursor<'_>) -> Option<()> {
    if !cur
        .peek()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == ':')
    {
        return None;
    }
    cur.eat_while(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | ':' | '-'));

    let save = cur.i;
    cur.eat_while(char::is_whitespace);
    if !cur.eat('=') {
        cur.i = save;
        return Some(());
    }
    cur.eat_while(char::is_whitespace);

    match cur.peek()? {
        q @ ('"' | '\'') => {
            cur.bump();
            cur.eat_while(|c| c != q);
            cur.eat(q).then_some(())
        }
        _ => {
            let n = cur.eat_while(|c| !c.is_whitespace() && !matches!(c, '"' | '\'' | '=' | '<' | '>' | '`'));
            (n > 0).then_some(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn end_of(s: &str) -> Option<usize> {
        let c: Vec<char> = s.chars().collect();
        RawHtml::parse(&c, 0)
    }

    #[rstest]
    #[case("<a>", Some(3))]
    #[case("<a href=\"x\" target=_blank>rest", Some(26))]
    #[case("<br/>", Some(5))]
    #[case("<img\nsrc='x' />", Some(15))]
    #[case("</div >", Some(7))]
    #[case("<!-- c -->x", Some(10))]
    #[case("<!-->", Some(5))]
    #[case("<?php x ?>", Some(10))]
    #[case("<!DOCTYPE html>", Some(15))]
    #[case("<![CDATA[x]]>", Some(13))]
    fn valid_html(#[case] input: &str, #[case] expected: Option<usize>) {
        assert_eq!(end_of(input), expected);
    }

    #[rstest]
    #[case("<33>")]
    #[case("<a href=\"x>")]
    #[case("<a/ >")]
    #[case("< a>")]
    #[case("<a b=>")]
    fn invalid_html(#[case] input: &str) {
        assert_eq!(end_of(input), None);
    }

    #[test]
    fn tag_names_are_lowercased() {
        let c: Vec<char> = "</DIV>".chars().collect();
        assert_eq!(RawHtml::tag_name_at(&c, 0).as_deref(), Some("div"));
    }
}
