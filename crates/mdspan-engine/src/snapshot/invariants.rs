use crate::doc::{Document, NodeId, NodeKind};
use crate::parsing::text::WithPosition;

/// Validates parser output invariants.
///
/// Asserts that:
/// - Every set span starts no later than it ends and lies inside `source`
/// - Siblings with set spans appear in source order
/// - Children of block containers lie inside their parent's span
///
/// # Panics
/// Panics with a descriptive message if any invariant is violated.
pub fn check(doc: &Document, source: &str) {
    let widths: Vec<i64> = source
        .split('\n')
        .map(|l| l.trim_end_matches('\r').chars().count() as i64)
        .collect();

    check_children(doc, doc.root(), &widths, false);
    for &id in doc.footnotes().values() {
        check_node(doc, id, &widths);
        check_children(doc, id, &widths, true);
    }
}

fn check_node(doc: &Document, id: NodeId, widths: &[i64]) {
    let pos = doc.pos(id);
    if !pos.is_valid() {
        return;
    }

    assert!(
        (pos.start_line, pos.start_column) <= (pos.end_line, pos.end_column),
        "span ends before it starts: {pos:?} ({:?})",
        doc.item_type(id)
    );
    for (line, column) in [(pos.start_line, pos.start_column), (pos.end_line, pos.end_column)] {
        let width = widths.get(line as usize).copied();
        assert!(
            width.is_some_and(|w| column <= w),
            "span outside source: {pos:?} ({:?}), line width {width:?}",
            doc.item_type(id)
        );
    }
}

fn check_children(doc: &Document, parent: NodeId, widths: &[i64], contained: bool) {
    let outer = doc.pos(parent);
    let mut previous: Option<WithPosition> = None;

    for &child in doc.children(parent) {
        check_node(doc, child, widths);
        let pos = doc.pos(child);

        if pos.is_valid() {
            if let Some(prev) = previous {
                assert!(
                    (prev.end_line, prev.end_column) < (pos.start_line, pos.start_column),
                    "siblings out of order: {prev:?} then {pos:?} ({:?})",
                    doc.item_type(child)
                );
            }
            previous = Some(pos);

            if contained && outer.is_valid() {
                assert!(
                    (outer.start_line, outer.start_column) <= (pos.start_line, pos.start_column)
                        && (pos.end_line, pos.end_column) <= (outer.end_line, outer.end_column),
                    "child {pos:?} ({:?}) outside parent {outer:?}",
                    doc.item_type(child)
                );
            }
        }

        let block_container = matches!(
            doc.kind(child),
            NodeKind::Blockquote(_) | NodeKind::List | NodeKind::ListItem(_)
        );
        check_children(doc, child, widths, block_container);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsing::Parser;

    #[test]
    fn parsed_documents_hold() {
        let src = "# T\n\n> q\n> - a\n>   b\n\n| x | y |\n|---|---|\n| 1 | 2 |\n\ntext[^f]\n\n[^f]: note";
        let doc = Parser::new().parse(src).unwrap();
        check(&doc, src);
    }

    #[test]
    #[should_panic(expected = "span outside source")]
    fn out_of_bounds_span_panics() {
        let mut doc = Document::new();
        let root = doc.root();
        let p = doc.add(NodeKind::Paragraph, WithPosition::new(0, 5, 1, 5));
        doc.append_child(root, p);
        check(&doc, "one line");
    }

    #[test]
    #[should_panic(expected = "siblings out of order")]
    fn reversed_siblings_panic() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.add(NodeKind::HorizontalLine, WithPosition::new(0, 1, 2, 1));
        let b = doc.add(NodeKind::HorizontalLine, WithPosition::new(0, 0, 2, 0));
        doc.append_child(root, a);
        doc.append_child(root, b);
        check(&doc, "---\n---");
    }
}
