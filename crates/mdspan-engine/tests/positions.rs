use mdspan_engine::doc::{Document, ItemType, NodeId};
use mdspan_engine::parsing::ParseError;
use mdspan_engine::{Parser, ParserOptions, snapshot};
use pretty_assertions::assert_eq;
use rstest::rstest;

/// Deterministic generator so the random documents are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: usize) -> usize {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        ((self.0 >> 33) as usize) % bound
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.next(items.len())]
    }
}

const PREFIXES: [&str; 7] = ["", "", "> ", "- ", "1. ", "  ", "> > "];
const BODIES: [&str; 9] = [
    "plain words",
    "some *emphasis* here",
    "a **strong** word",
    "with `code` inside",
    "a [link](http://example.com) here",
    "# Heading",
    "---",
    "lazy continuation",
    "",
];

fn random_document(rng: &mut Lcg) -> String {
    (0..12)
        .map(|_| {
            let body = rng.pick(&BODIES);
            if body.is_empty() {
                String::new()
            } else {
                format!("{}{body}", rng.pick(&PREFIXES))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Start positions of `parent`'s children in order.
fn starts(doc: &Document, parent: NodeId, out: &mut Vec<(i64, i64)>) {
    for &child in doc.children(parent) {
        let pos = doc.pos(child);
        if pos.is_valid() {
            out.push((pos.start_line, pos.start_column));
        }
    }
}

#[test]
fn random_documents_keep_positions_ordered() {
    for seed in 0..150 {
        let mut rng = Lcg(seed);
        let md = random_document(&mut rng);
        let doc = Parser::new().parse(&md).unwrap_or_else(|e| panic!("seed {seed}: {e}"));

        snapshot::invariants(&doc, &md);

        let mut top = vec![];
        starts(&doc, doc.root(), &mut top);
        let mut sorted = top.clone();
        sorted.sort();
        assert_eq!(top, sorted, "seed {seed}: {md:?}");
    }
}

#[rstest]
#[case("> > a\nb\n> > c\nd")]
#[case("- > a\nb\n  > c\nd")]
#[case("> - a\nb\n> - c\nd")]
fn nested_lazy_lines_stay_inside(#[case] md: &str) {
    let doc = Parser::new().parse(md).unwrap();
    snapshot::invariants(&doc, md);
    assert_eq!(doc.items().len(), 1);
    assert_eq!(doc.pos(doc.items()[0]).end_line, 3);
}

#[test]
fn nested_quotes_with_lazy_lines_hit_the_cap() {
    let options = ParserOptions {
        max_nesting_depth: 8,
        ..Default::default()
    };
    let md = format!("{} a\nb\nc", "> ".repeat(9));
    let result = Parser::with_options(options.clone()).parse(&md);
    assert!(matches!(result, Err(ParseError::TooDeeplyNested { line: 0 })));

    let md = format!("{} a\nb\nc", "> ".repeat(8));
    let doc = Parser::with_options(options).parse(&md).unwrap();
    snapshot::invariants(&doc, &md);

    let mut node = doc.items()[0];
    let mut depth = 0;
    while doc.item_type(node) == ItemType::Blockquote {
        assert_eq!(doc.pos(node).end_line, 2);
        node = doc.children(node)[0];
        depth += 1;
    }
    assert_eq!(depth, 8);
    assert_eq!(doc.item_type(node), ItemType::Paragraph);
}
