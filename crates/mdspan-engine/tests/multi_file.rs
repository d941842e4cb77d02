use std::fs;

use mdspan_engine::doc::{ItemType, NodeKind};
use mdspan_engine::io::IoError;
use mdspan_engine::{Document, HtmlOptions, ParseError, Parser, to_html};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn kinds(doc: &Document) -> Vec<ItemType> {
    doc.items().iter().map(|&id| doc.item_type(id)).collect()
}

fn anchors(doc: &Document) -> Vec<String> {
    doc.items()
        .iter()
        .filter_map(|&id| match doc.kind(id) {
            NodeKind::Anchor(a) => Some(a.label.clone()),
            _ => None,
        })
        .collect()
}

/// `a.md` links to `b.md`, which links back and to a missing file.
fn notes() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.md"), "# A\n\nSee [b](b.md).").unwrap();
    fs::write(dir.path().join("b.md"), "# B\n\n[back](a.md) [gone](c.md)").unwrap();
    dir
}

#[test]
fn single_file_gets_an_anchor() {
    let dir = notes();
    let a = dir.path().join("a.md");
    let doc = Parser::new().parse_file(&a, false).unwrap();

    assert_eq!(kinds(&doc), vec![ItemType::Anchor, ItemType::Heading, ItemType::Paragraph]);
    let expected = fs::canonicalize(&a).unwrap().to_string_lossy().into_owned();
    assert_eq!(anchors(&doc), vec![expected]);
}

#[test]
fn recursive_parse_follows_links_once() {
    let dir = notes();
    let doc = Parser::new().parse_file(&dir.path().join("a.md"), true).unwrap();

    assert_eq!(kinds(&doc), vec![
        ItemType::Anchor,
        ItemType::Heading,
        ItemType::Paragraph,
        ItemType::PageBreak,
        ItemType::Anchor,
        ItemType::Heading,
        ItemType::Paragraph,
    ]);
    assert_eq!(anchors(&doc).len(), 2);
}

#[test]
fn links_to_parsed_files_point_at_their_anchors() {
    let dir = notes();
    let doc = Parser::new().parse_file(&dir.path().join("a.md"), true).unwrap();
    let b = fs::canonicalize(dir.path().join("b.md")).unwrap();
    let b = b.to_string_lossy();

    let options = HtmlOptions {
        wrap_in_article: true,
        ..Default::default()
    };
    let html = to_html(&doc, &options);
    assert!(html.contains(&format!("<div id=\"{b}\"></div>")));
    assert!(html.contains(&format!("<a href=\"#{b}\">b</a>")));
}

#[test]
fn follow_filter_excludes_files() {
    let dir = notes();
    let doc = Parser::new()
        .parse_file_with(&dir.path().join("a.md"), true, |p| !p.ends_with("b.md"))
        .unwrap();
    assert_eq!(anchors(&doc).len(), 1);
}

#[test]
fn missing_root_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let result = Parser::new().parse_file(&dir.path().join("nope.md"), true);
    assert!(matches!(result, Err(ParseError::Io(IoError::NotFound(_)))));
}

#[test]
fn heading_labels_carry_the_file_suffix() {
    let dir = notes();
    let a = dir.path().join("a.md");
    let doc = Parser::new().parse_file(&a, false).unwrap();
    let a = fs::canonicalize(&a).unwrap();
    let label = format!("#a/{}", a.to_string_lossy().trim_start_matches('/'));
    assert!(doc.labeled_headings().contains_key(&label));
}
