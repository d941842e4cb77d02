//! # HTML Renderer
//!
//! A [`Visitor`] that writes GitHub-flavoured HTML for a [`Document`].
//! Footnotes are numbered by first reference and rendered in a trailing
//! `<section class="footnotes">`.

use std::collections::HashMap;

use crate::doc::{
    Alignment, Anchor, Code, Document, Footnote, FootnoteRef, Heading, Image, Link, ListItem,
    ListType, NodeId, NodeKind, RawHtml, StyleDelim, Table, Text, TextOptions,
};
use crate::parsing::text::chars::escape_html;
use crate::visitor::{
    Visitor, walk_blocks, walk_inlines, walk_list_item, walk_paragraph,
    wrap_first_paragraph_in_list_item,
};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlOptions {
    /// Emit a complete `<html>` page.
    pub wrap_in_body: bool,
    /// Wrap the content in `<article class="markdown-body">`; required for anchors.
    pub wrap_in_article: bool,
    /// Image used for footnote back-references; none when empty.
    pub back_ref_image: String,
    /// Extra `id` attributes keyed by node.
    pub ids: HashMap<NodeId, String>,
}

/// Renders `doc` to HTML.
pub fn to_html(doc: &Document, options: &HtmlOptions) -> String {
    HtmlVisitor::new(options).render(doc)
}

/// A footnote with the number of references rendered so far.
#[derive(Debug, Clone)]
struct FootnoteUse {
    key: String,
    count: usize,
}

pub struct HtmlVisitor<'o> {
    options: &'o HtmlOptions,
    html: String,
    anchors: Vec<String>,
    footnotes: Vec<FootnoteUse>,
    just_collect: bool,
    dont_increment: bool,
}

impl<'o> HtmlVisitor<'o> {
    pub fn new(options: &'o HtmlOptions) -> Self {
        Self {
            options,
            html: String::new(),
            anchors: vec![],
            footnotes: vec![],
            just_collect: false,
            dont_increment: false,
        }
    }

    pub fn render(mut self, doc: &Document) -> String {
        if self.options.wrap_in_body {
            self.html.push_str("<!DOCTYPE html>\n<html><head></head><body>\n");
        }
        if self.options.wrap_in_article {
            self.html.push_str("<article class=\"markdown-body\">");
        }

        self.process(doc);
        self.footnotes_section(doc);

        if self.options.wrap_in_article {
            self.html.push_str("</article>\n");
        }
        if self.options.wrap_in_body {
            self.html.push_str("</body></html>\n");
        }
        self.html
    }

    fn footnotes_section(&mut self, doc: &Document) {
        if self.footnotes.is_empty() {
            return;
        }
        self.html.push_str("<section class=\"footnotes\"><ol dir=\"auto\">");

        // References inside footnote bodies get their numbers first.
        let saved = std::mem::take(&mut self.html);
        self.just_collect = true;
        let mut i = 0;
        while i < self.footnotes.len() {
            if let Some(&f) = doc.footnotes().get(&self.footnotes[i].key)
                && let NodeKind::Footnote(footnote) = doc.kind(f)
            {
                self.on_footnote(doc, f, footnote);
            }
            i += 1;
        }
        self.just_collect = false;
        self.html = saved;

        self.dont_increment = true;
        for i in 0..self.footnotes.len() {
            let FootnoteUse { key, count } = self.footnotes[i].clone();
            let Some(&f) = doc.footnotes().get(&key) else {
                continue;
            };
            let NodeKind::Footnote(footnote) = doc.kind(f) else {
                continue;
            };
            let id = footnote_id(&key);
            self.html.push_str(&format!("<li id=\"{id}\">"));

            let saved = std::mem::take(&mut self.html);
            self.on_footnote(doc, f, footnote);
            let mut body = std::mem::replace(&mut self.html, saved);

            if !self.options.back_ref_image.is_empty() {
                let back_refs: String = (1..=count)
                    .map(|n| {
                        format!(
                            "<a href=\"#ref-{id}-{n}\"><img src=\"{}\" /></a>",
                            self.options.back_ref_image
                        )
                    })
                    .collect();
                match body.strip_suffix("</p>") {
                    Some(rest) => body = format!("{rest}{back_refs}</p>"),
                    None => body.push_str(&back_refs),
                }
            }

            self.html.push_str(&body);
            self.html.push_str("</li>");
        }
        self.dont_increment = false;

        self.html.push_str("</ol></section>\n");
    }

    fn id_attr(&self, id: NodeId) -> String {
        self.options
            .ids
            .get(&id)
            .map(|s| format!(" id=\"{s}\""))
            .unwrap_or_default()
    }

    /// Resolves a link target to a reference, an anchor or a heading label.
    fn link_target(&self, doc: &Document, url: &str) -> String {
        let mut url = match doc.labeled_links().get(url).map(|&l| doc.kind(l)) {
            Some(NodeKind::Link(def)) => def.url.clone(),
            _ => url.to_string(),
        };

        if self.anchors.contains(&url) {
            return format!("#{url}");
        }

        if url.starts_with('#') {
            match doc.labeled_headings().get(&url).map(|&h| doc.kind(h)) {
                Some(NodeKind::Heading(h)) => url = h.label.clone(),
                _ => {
                    if let Some(&first) = doc.items().first()
                        && let NodeKind::Anchor(a) = doc.kind(first)
                        && let Some((dir, _)) = a.label.rsplit_once('/')
                        && !dir.is_empty()
                        && let Some(at) = url.find(dir)
                        && at > 0
                    {
                        url.truncate(at);
                    }
                }
            }
        }

        url
    }
}

fn footnote_id(key: &str) -> &str {
    key.strip_prefix('#').unwrap_or(key)
}

fn style_tag(style: TextOptions) -> Option<&'static str> {
    if style.contains(TextOptions::BOLD) {
        Some("strong")
    } else if style.contains(TextOptions::ITALIC) {
        Some("em")
    } else if style.contains(TextOptions::STRIKETHROUGH) {
        Some("del")
    } else {
        None
    }
}

fn open_style(styles: &[StyleDelim]) -> String {
    styles
        .iter()
        .filter_map(|s| style_tag(s.style))
        .map(|t| format!("<{t}>"))
        .collect()
}

fn close_style(styles: &[StyleDelim]) -> String {
    styles
        .iter()
        .filter_map(|s| style_tag(s.style))
        .map(|t| format!("</{t}>"))
        .collect()
}

fn align_attr(alignment: Alignment) -> &'static str {
    match alignment {
        Alignment::None => "",
        Alignment::Left => " align=\"left\"",
        Alignment::Center => " align=\"center\"",
        Alignment::Right => " align=\"right\"",
    }
}

impl Visitor for HtmlVisitor<'_> {
    fn on_anchors(&mut self, anchors: Vec<String>) {
        self.anchors = anchors;
    }

    fn on_add_line_ending(&mut self) {
        self.html.push('\n');
    }

    fn on_text(&mut self, _doc: &Document, _id: NodeId, text: &Text) {
        self.html.push_str(&open_style(&text.opts.open_styles));
        self.html.push_str(&escape_html(&text.text));
        self.html.push_str(&close_style(&text.opts.close_styles));
    }

    fn on_math(&mut self, _doc: &Document, _id: NodeId, math: &Code) {
        let delim = if math.is_inline { "$" } else { "$$" };
        self.html.push_str(&open_style(&math.opts.open_styles));
        self.html.push_str(delim);
        self.html.push_str(&escape_html(&math.text));
        self.html.push_str(delim);
        self.html.push_str(&close_style(&math.opts.close_styles));
    }

    fn on_line_break(&mut self, _doc: &Document, _id: NodeId, _text: &Text) {
        self.html.push_str("<br />");
    }

    fn on_paragraph(&mut self, doc: &Document, id: NodeId, wrap: bool, skip_opening_wrap: bool) {
        if wrap && !skip_opening_wrap {
            self.html.push_str(&format!("<p dir=\"auto\"{}>", self.id_attr(id)));
        }
        walk_paragraph(self, doc, id);
        if wrap {
            self.html.push_str("</p>");
        }
    }

    fn on_heading(&mut self, doc: &Document, id: NodeId, heading: &Heading) {
        let level = heading.level;
        let id_attr = if heading.is_labeled() {
            format!(" id=\"{}\"", footnote_id(&heading.label))
        } else {
            self.id_attr(id)
        };
        self.html.push_str(&format!("\n<h{level}{id_attr} dir=\"auto\">"));
        if let Some(title) = heading.text {
            self.on_paragraph(doc, title, false, false);
        }
        self.html.push_str(&format!("</h{level}>\n"));
    }

    fn on_code(&mut self, _doc: &Document, id: NodeId, code: &Code) {
        self.html.push_str(&format!("\n<pre{}><code", self.id_attr(id)));
        if !code.syntax.is_empty() {
            self.html.push_str(&format!(" class=\"language-{}\"", code.syntax));
        }
        self.html.push('>');
        self.html.push_str(&escape_html(&code.text));
        self.html.push_str("</code></pre>\n");
    }

    fn on_inline_code(&mut self, _doc: &Document, id: NodeId, code: &Code) {
        self.html.push_str(&open_style(&code.opts.open_styles));
        self.html.push_str(&format!("<code{}>", self.id_attr(id)));
        self.html.push_str(&escape_html(&code.text));
        self.html.push_str("</code>");
        self.html.push_str(&close_style(&code.opts.close_styles));
    }

    fn on_blockquote(&mut self, doc: &Document, id: NodeId) {
        self.html.push_str(&format!("\n<blockquote{}>", self.id_attr(id)));
        walk_blocks(self, doc, id);
        self.html.push_str("</blockquote>\n");
    }

    fn on_list(&mut self, doc: &Document, id: NodeId) {
        let mut ordered = false;

        for (k, &child) in doc.children(id).iter().enumerate() {
            let NodeKind::ListItem(item) = doc.kind(child) else {
                continue;
            };
            if k == 0 {
                ordered = item.list_type == ListType::Ordered;
                let tag = if ordered { "ol" } else { "ul" };
                let task = if item.is_task_list {
                    " class=\"contains-task-list\""
                } else {
                    ""
                };
                self.html
                    .push_str(&format!("\n<{tag}{}{task} dir=\"auto\">\n", self.id_attr(id)));
            }
            self.on_list_item(doc, child, item, k == 0);
        }

        if !doc.children(id).is_empty() {
            self.html.push_str(if ordered { "</ol>\n" } else { "</ul>\n" });
        }
    }

    fn on_list_item(&mut self, doc: &Document, id: NodeId, item: &ListItem, first: bool) {
        self.html.push_str(&format!("<li{}", self.id_attr(id)));

        let mut skip = false;
        if item.is_task_list {
            skip = wrap_first_paragraph_in_list_item(doc, id);
            self.html.push_str(" class=\"task-list-item\">");
            let first_is_paragraph = doc
                .children(id)
                .first()
                .is_some_and(|&c| matches!(doc.kind(c), NodeKind::Paragraph));
            if skip && first_is_paragraph {
                self.html.push_str("<p dir=\"auto\">");
            }
            self.html.push_str(
                "<input type=\"checkbox\" id=\"\" disabled=\"\" class=\"task-list-item-checkbox\"",
            );
            if item.is_checked {
                self.html.push_str(" checked=\"\"");
            }
        }

        if item.list_type == ListType::Ordered && first {
            self.html.push_str(&format!(" value=\"{}\"", item.start_number));
        }

        self.html.push_str(">\n");
        walk_list_item(self, doc, id, skip);
        self.html.push_str("</li>\n");
    }

    fn on_table(&mut self, doc: &Document, id: NodeId, table: &Table) {
        self.html.push('\n');

        if !doc.is_table_empty(id) {
            let columns = table.columns_count();
            self.html.push_str(&format!("<table{}><thead><tr>\n", self.id_attr(id)));

            let rows = doc.children(id);
            for (i, &cell) in doc.children(rows[0]).iter().enumerate() {
                let align = align_attr(table.column_alignment(i));
                self.html.push_str(&format!("<th{align} dir=\"auto\">\n"));
                self.on_table_cell(doc, cell);
                self.html.push_str("\n</th>\n");
            }
            self.html.push_str("</tr></thead><tbody>\n");

            for &row in &rows[1..] {
                self.html.push_str("<tr>\n");
                let cells = doc.children(row);
                for (i, &cell) in cells.iter().take(columns).enumerate() {
                    let align = align_attr(table.column_alignment(i));
                    self.html.push_str(&format!("\n<td{align} dir=\"auto\">\n"));
                    self.on_table_cell(doc, cell);
                    self.html.push_str("\n</td>\n");
                }
                for _ in cells.len()..columns {
                    self.html.push_str("<td dir=\"auto\"></td>");
                }
                self.html.push_str("\n</tr>\n");
            }

            self.html.push_str("</tbody></table>");
        }

        self.html.push('\n');
    }

    fn on_table_cell(&mut self, doc: &Document, id: NodeId) {
        walk_inlines(self, doc, id);
    }

    fn on_anchor(&mut self, _doc: &Document, _id: NodeId, anchor: &Anchor) {
        if self.options.wrap_in_article {
            self.html
                .push_str(&format!("\n<div id=\"{}\"></div>\n", anchor.label));
        }
    }

    fn on_raw_html(&mut self, _doc: &Document, _id: NodeId, html: &RawHtml) {
        self.html.push_str(&open_style(&html.opts.open_styles));
        self.html.push_str(&html.text);
        self.html.push_str(&close_style(&html.opts.close_styles));
    }

    fn on_horizontal_line(&mut self, _doc: &Document, _id: NodeId) {
        self.html.push_str("<hr />");
    }

    fn on_link(&mut self, doc: &Document, id: NodeId, link: &Link) {
        let url = self.link_target(doc, &link.url);

        self.html.push_str(&open_style(&link.opts.open_styles));
        self.html
            .push_str(&format!("<a href=\"{url}\"{}>", self.id_attr(id)));

        let paragraph = link.p.filter(|&p| !doc.children(p).is_empty());
        if let Some(p) = paragraph {
            self.on_paragraph(doc, p, false, false);
        } else if let Some(img) = link.img
            && let NodeKind::Image(image) = doc.kind(img)
        {
            self.on_image(doc, img, image);
        } else if !link.text.is_empty() {
            self.html.push_str(&escape_html(&link.text));
        } else {
            self.html.push_str(&escape_html(&link.url));
        }

        self.html.push_str("</a>");
        self.html.push_str(&close_style(&link.opts.close_styles));
    }

    fn on_image(&mut self, _doc: &Document, id: NodeId, image: &Image) {
        self.html.push_str(&open_style(&image.opts.open_styles));
        self.html.push_str(&format!(
            "<img src=\"{}\" alt=\"{}\" style=\"max-width:100%;\"{} />",
            image.url,
            escape_html(&image.text),
            self.id_attr(id)
        ));
        self.html.push_str(&close_style(&image.opts.close_styles));
    }

    fn on_footnote_ref(&mut self, doc: &Document, id: NodeId, footnote_ref: &FootnoteRef) {
        if !doc.footnotes().contains_key(&footnote_ref.id) {
            let text = Text {
                text: footnote_ref.text.clone(),
                opts: footnote_ref.opts.clone(),
            };
            self.on_text(doc, id, &text);
            return;
        }

        let index = match self.footnotes.iter().position(|f| f.key == footnote_ref.id) {
            Some(i) => i,
            None => {
                self.footnotes.push(FootnoteUse {
                    key: footnote_ref.id.clone(),
                    count: 0,
                });
                self.footnotes.len() - 1
            }
        };
        if !self.dont_increment {
            self.footnotes[index].count += 1;
        }
        if self.just_collect {
            return;
        }

        let fid = footnote_id(&footnote_ref.id);
        let n = self.footnotes[index].count;
        self.html.push_str(&open_style(&footnote_ref.opts.open_styles));
        self.html.push_str(&format!(
            "<sup><a href=\"#{fid}\" id=\"ref-{fid}-{n}\">{}</a></sup>",
            index + 1
        ));
        self.html.push_str(&close_style(&footnote_ref.opts.close_styles));
    }

    fn on_footnote(&mut self, doc: &Document, id: NodeId, _footnote: &Footnote) {
        walk_blocks(self, doc, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Parser;
    use pretty_assertions::assert_eq;

    fn html(src: &str) -> String {
        to_html(&Parser::new().parse(src).unwrap(), &HtmlOptions::default())
    }

    #[test]
    fn rule_of_three_output() {
        assert_eq!(html("**a*b***"), "<p dir=\"auto\"><strong>a<em>b</em></strong></p>");
    }

    #[test]
    fn text_escapes_three_characters() {
        assert_eq!(html("a & \"b\" 'c'"), "<p dir=\"auto\">a &amp; \"b\" 'c'</p>");
    }

    #[test]
    fn missing_table_cells_are_padded() {
        assert_eq!(
            html("a|b|c\n-|:-:|-:\n1"),
            "\n<table><thead><tr>\n\
             <th dir=\"auto\">\na\n</th>\n\
             <th align=\"center\" dir=\"auto\">\nb\n</th>\n\
             <th align=\"right\" dir=\"auto\">\nc\n</th>\n\
             </tr></thead><tbody>\n\
             <tr>\n\n<td dir=\"auto\">\n1\n</td>\n\
             <td dir=\"auto\"></td><td dir=\"auto\"></td>\n</tr>\n\
             </tbody></table>\n"
        );
    }

    #[test]
    fn repeated_footnote_references_share_a_number() {
        let options = HtmlOptions {
            back_ref_image: "back.png".into(),
            ..Default::default()
        };
        let doc = Parser::new().parse("a[^x] b[^x]\n\n[^x]: note").unwrap();
        assert_eq!(
            to_html(&doc, &options),
            "<p dir=\"auto\">a<sup><a href=\"#x\" id=\"ref-x-1\">1</a></sup> \
             b<sup><a href=\"#x\" id=\"ref-x-2\">1</a></sup></p>\
             <section class=\"footnotes\"><ol dir=\"auto\"><li id=\"x\">\
             <p dir=\"auto\">note\
             <a href=\"#ref-x-1\"><img src=\"back.png\" /></a>\
             <a href=\"#ref-x-2\"><img src=\"back.png\" /></a></p>\
             </li></ol></section>\n"
        );
    }

    #[test]
    fn unknown_footnote_is_literal() {
        assert_eq!(html("a [^nope]"), "<p dir=\"auto\">a [^nope]</p>");
    }

    #[test]
    fn ordered_task_list() {
        assert_eq!(
            html("3. [x] done"),
            "\n<ol class=\"contains-task-list\" dir=\"auto\">\n\
             <li class=\"task-list-item\"><input type=\"checkbox\" id=\"\" disabled=\"\" \
             class=\"task-list-item-checkbox\" checked=\"\" value=\"3\">\ndone</li>\n</ol>\n"
        );
    }

    #[test]
    fn heading_link_and_code() {
        assert_eq!(
            html("# Hello World\n\n[go](#Hello-World)\n\n```rust\nlet a = 1 < 2;\n```"),
            "\n<h1 id=\"hello-world\" dir=\"auto\">Hello World</h1>\n\
             <p dir=\"auto\"><a href=\"#hello-world\">go</a></p>\
             \n<pre><code class=\"language-rust\">let a = 1 &lt; 2;</code></pre>\n"
        );
    }

    #[test]
    fn link_to_later_heading() {
        assert_eq!(
            html("[go](#Later)\n\n## Later"),
            "<p dir=\"auto\"><a href=\"#later\">go</a></p>\
             \n<h2 id=\"later\" dir=\"auto\">Later</h2>\n"
        );
    }

    #[test]
    fn body_and_article_wrapping() {
        let options = HtmlOptions {
            wrap_in_body: true,
            wrap_in_article: true,
            ..Default::default()
        };
        let doc = Parser::new().parse("x").unwrap();
        assert_eq!(
            to_html(&doc, &options),
            "<!DOCTYPE html>\n<html><head></head><body>\n\
             <article class=\"markdown-body\"><p dir=\"auto\">x</p></article>\n</body></html>\n"
        );
    }

    #[test]
    fn ids_map_adds_attributes() {
        let doc = Parser::new().parse("x").unwrap();
        let p = doc.items()[0];
        let options = HtmlOptions {
            ids: HashMap::from([(p, "first".to_string())]),
            ..Default::default()
        };
        assert_eq!(to_html(&doc, &options), "<p dir=\"auto\" id=\"first\">x</p>");
    }
}
