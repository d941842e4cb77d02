use mdspan_engine::doc::ItemType;
use mdspan_engine::{HtmlOptions, Parser, PosCache, snapshot, to_html};
use mdspan_engine::parsing::text::WithPosition;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn fixture(name: &str) -> String {
    std::fs::read_to_string(format!(
        "{}/tests/fixtures/{name}.md",
        env!("CARGO_MANIFEST_DIR")
    ))
    .unwrap()
}

fn render(md: &str) -> String {
    let doc = Parser::new().parse(md).unwrap();
    to_html(&doc, &HtmlOptions::default())
}

#[rstest]
#[case("blocks")]
#[case("front_matter")]
#[case("mixed")]
#[case("inline")]
fn fixtures_hold_invariants(#[case] name: &str) {
    let md = fixture(name);
    let doc = Parser::new().parse(&md).unwrap();
    snapshot::invariants(&doc, &md);
}

#[test]
fn fixture_blocks_html() {
    assert_eq!(
        render(&fixture("blocks")),
        "\n<h1 id=\"title\" dir=\"auto\">Title</h1>\n\
         <p dir=\"auto\">Some <em>emphasis</em> and <strong>strong</strong> text.</p>\
         \n<blockquote><p dir=\"auto\">quoted\nlazy line</p></blockquote>\n\
         \n<ul dir=\"auto\">\n<li>\none</li>\n<li>\ntwo</li>\n</ul>\n"
    );
}

#[test]
fn fixture_blocks_outline() {
    let doc = Parser::new().parse(&fixture("blocks")).unwrap();
    let outline = snapshot::normalize(&doc).outline();
    insta::assert_snapshot!(outline.trim_end(), @r#"
    Heading(1) @0:0-0:6
      Text "Title" @0:2-0:6
    Paragraph @2:0-2:35
      Text "Some " @2:0-2:4
      Text[ITALIC] "emphasis" @2:6-2:13
      Text " and " @2:15-2:19
      Text[BOLD] "strong" @2:22-2:27
      Text " text." @2:30-2:35
    Blockquote @4:0-5:8
      Paragraph @4:2-5:8
        Text "quoted" @4:2-4:7
        Text "lazy line" @5:0-5:8
    List @7:0-8:4
      ListItem(unordered) @7:0-7:4
        Paragraph @7:2-7:4
          Text "one" @7:2-7:4
      ListItem(unordered) @8:0-8:4
        Paragraph @8:2-8:4
          Text "two" @8:2-8:4
    "#);
}

#[test]
fn fixture_mixed_html_parts() {
    let html = render(&fixture("mixed"));

    assert!(html.starts_with(
        "<p dir=\"auto\">Intro with a note<sup><a href=\"#n\" id=\"ref-n-1\">1</a></sup> \
         and a <a href=\"https://example.com\">reference</a>.</p>"
    ));
    assert!(html.contains("<th align=\"left\" dir=\"auto\">\nName\n</th>"));
    assert!(html.contains("<td align=\"right\" dir=\"auto\">\n2\n</td>"));
    assert!(html.contains("\n<td align=\"left\" dir=\"auto\">\nmilk\n</td>\n<td dir=\"auto\"></td>\n</tr>"));
    assert!(html.contains("<ol class=\"contains-task-list\" dir=\"auto\">"));
    assert!(html.contains("<pre><code class=\"language-rust\">fn main() {}</code></pre>"));
    assert!(html.ends_with(
        "<section class=\"footnotes\"><ol dir=\"auto\"><li id=\"n\">\
         <p dir=\"auto\">Footnote <em>body</em>.</p></li></ol></section>\n"
    ));
}

#[test]
fn fixture_inline_html_parts() {
    let html = render(&fixture("inline"));

    assert!(html.starts_with(
        "<p dir=\"auto\">Visit <a href=\"http://www.example.com\">www.example.com</a> \
         or mail <a href=\"mailto:me@example.org\">me@example.org</a>.</p>"
    ));
    assert!(html.contains("<pre><code>indented code</code></pre>"));
    assert!(html.contains("<hr />"));
    assert!(html.contains("<div>\nraw block\n</div>"));
    assert!(html.ends_with("<p dir=\"auto\">line one<br />\nline two</p>"));
}

#[rstest]
#[case("**a*b***", "<p dir=\"auto\"><strong>a<em>b</em></strong></p>")]
#[case("*a **b** c*", "<p dir=\"auto\"><em>a <strong>b</strong> c</em></p>")]
#[case("~~gone~~", "<p dir=\"auto\"><del>gone</del></p>")]
#[case("*open only", "<p dir=\"auto\">*open only</p>")]
#[case("`a < b`", "<p dir=\"auto\"><code>a &lt; b</code></p>")]
#[case("\\*not em\\*", "<p dir=\"auto\">*not em*</p>")]
fn inline_rendering(#[case] md: &str, #[case] expected: &str) {
    assert_eq!(render(md), expected);
}

#[test]
fn blockquote_lazy_continuation_is_one_paragraph() {
    let doc = Parser::new().parse("> a\nb").unwrap();
    let quote = doc.items()[0];
    assert_eq!(doc.item_type(quote), ItemType::Blockquote);
    assert_eq!(doc.children(quote).len(), 1);

    let p = doc.children(quote)[0];
    assert_eq!(doc.item_type(p), ItemType::Paragraph);
    assert_eq!(doc.pos(p).start_line, 0);
    assert_eq!(doc.pos(p).end_line, 1);
}

#[rstest]
#[case("- a\n\n  b", 1)]
#[case("- a\n\n b", 2)]
fn list_item_indentation_boundary(#[case] md: &str, #[case] top_level: usize) {
    let doc = Parser::new().parse(md).unwrap();
    assert_eq!(doc.items().len(), top_level);
    assert_eq!(doc.item_type(doc.items()[0]), ItemType::List);
}

#[test]
fn position_cache_finds_table_cell_text() {
    let md = fixture("mixed");
    let doc = Parser::new().parse(&md).unwrap();
    let mut cache = PosCache::new();
    cache.initialize(&doc);

    let chain: Vec<ItemType> = cache
        .find_first_in_cache(&WithPosition::point(3, 4))
        .into_iter()
        .map(|id| doc.item_type(id))
        .collect();
    assert_eq!(chain, vec![ItemType::Table, ItemType::TableCell, ItemType::Text]);
}
