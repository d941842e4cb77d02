use std::any::Any;

use super::BlockPlugin;
use crate::doc::{Document, NodeId, NodeKind, UserItem};
use crate::parsing::text::{SourceLine, WithPosition};

/// YAML front matter: the lines between an opening `---` and a closing
/// `---` or `...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct YamlHeader {
    /// Inner lines, each terminated by `\n`.
    pub yaml: String,
    pub start_delim: WithPosition,
    pub end_delim: WithPosition,
}

impl YamlHeader {
    /// User item kind reported by front matter nodes.
    pub const USER_TYPE: i32 = 1;
}

impl UserItem for YamlHeader {
    fn user_type(&self) -> i32 {
        Self::USER_TYPE
    }

    fn clone_item(&self) -> Box<dyn UserItem> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Recognizes front matter at the top of a document.
#[derive(Debug, Default)]
pub struct YamlBlockPlugin {
    last_count: usize,
}

impl YamlBlockPlugin {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_open(line: &SourceLine) -> bool {
        line.indent() == 0 && line.column(0, false) == 0 && line.text.to_string().trim() == "---"
    }

    fn is_close(line: &SourceLine) -> bool {
        if line.indent() != 0 || line.column(0, false) != 0 {
            return false;
        }
        let text = line.text.to_string();
        let text = text.trim_end();
        text == "---" || text == "..."
    }
}

impl BlockPlugin for YamlBlockPlugin {
    fn id(&self) -> i32 {
        YamlHeader::USER_TYPE
    }

    fn is_it_you(&mut self, lines: &[SourceLine], index: usize, empty_lines_before: bool) -> bool {
        self.last_count = 0;

        if !empty_lines_before || !lines.get(index).is_some_and(Self::is_open) {
            return false;
        }

        let Some(close) = lines[index + 1..].iter().position(Self::is_close) else {
            return false;
        };

        self.last_count = close + 2;
        true
    }

    fn lines_count_of_last_block(&self) -> usize {
        self.last_count
    }

    fn process(&mut self, lines: &[SourceLine], parent: NodeId, doc: &mut Document, collecting_ref_links: bool) {
        if collecting_ref_links {
            return;
        }
        let (Some(first), Some(last)) = (lines.first(), lines.last()) else {
            return;
        };
        if lines.len() < 2 {
            return;
        }

        let yaml: String = lines[1..lines.len() - 1]
            .iter()
            .map(|l| format!("{}\n", l.text))
            .collect();

        let header = YamlHeader {
            yaml,
            start_delim: first.span(0, first.text.len()),
            end_delim: last.span(0, last.text.len()),
        };
        let pos = header.start_delim.with_end_of(&header.end_delim);
        let id = doc.add(NodeKind::UserDefined(Box::new(header)), pos);
        doc.append_child(parent, id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::ItemType;
    use crate::parsing::text::split_lines;
    use rstest::rstest;

    #[rstest]
    #[case("---\na: 1\n---\ntext", 0, true, Some(3))]
    #[case("\n---\na: 1\n...\n", 1, true, Some(3))]
    #[case("---\n---", 0, true, Some(2))]
    #[case("---\na: 1", 0, true, None)]
    #[case("text\n---\na\n---", 1, false, None)]
    #[case(" ---\na\n---", 0, true, None)]
    fn recognizes_front_matter(
        #[case] text: &str,
        #[case] index: usize,
        #[case] empty_before: bool,
        #[case] expected: Option<usize>,
    ) {
        let lines = split_lines(text);
        let mut plugin = YamlBlockPlugin::new();
        let found = plugin.is_it_you(&lines, index, empty_before);
        assert_eq!(found.then(|| plugin.lines_count_of_last_block()), expected);
    }

    #[test]
    fn builds_header_node() {
        let lines = split_lines("---\ntitle: x\nlist: [1]\n---");
        let mut doc = Document::new();
        let root = doc.root();
        YamlBlockPlugin::new().process(&lines, root, &mut doc, false);

        let id = doc.items()[0];
        assert_eq!(doc.item_type(id), ItemType::UserDefined(1));
        let NodeKind::UserDefined(item) = doc.kind(id) else {
            panic!("expected user item");
        };
        let header = item.as_any().downcast_ref::<YamlHeader>().expect("yaml header");
        assert_eq!(header.yaml, "title: x\nlist: [1]\n");
        assert_eq!(header.start_delim, WithPosition::new(0, 0, 2, 0));
        assert_eq!(header.end_delim, WithPosition::new(0, 3, 2, 3));
        assert_eq!(doc.pos(id), WithPosition::new(0, 0, 2, 3));
    }

    #[test]
    fn collecting_pass_builds_nothing() {
        let lines = split_lines("---\na\n---");
        let mut doc = Document::new();
        let root = doc.root();
        YamlBlockPlugin::new().process(&lines, root, &mut doc, true);
        assert!(doc.is_empty());
    }
}
