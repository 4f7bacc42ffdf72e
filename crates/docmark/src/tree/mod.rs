//! The format-neutral intermediate tree and its rendering dispatch.

mod builder;
mod simplify;

pub use builder::TreeBuilder;
pub use simplify::simplify;

use ecow::EcoString;
use indexmap::IndexMap;

use crate::writer::Writer;

/// Element attributes, in insertion order.
pub type Attributes = IndexMap<EcoString, EcoString>;

/// A node of the intermediate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// An element with its children.
    Element(ElementNode),
    /// Literal text, escaped by the writer.
    Text(EcoString),
    /// A MathML formula.
    MathMl(EcoString),
    /// Marks its parent as worth keeping even when it has no other content.
    ForceWrite,
}

/// An element of the intermediate tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    /// The tag name.
    pub tag: EcoString,
    /// The element attributes.
    pub attributes: Attributes,
    /// Child nodes; always empty for void elements.
    pub children: Vec<Node>,
}

impl ElementNode {
    /// An element without children.
    pub fn new(tag: impl Into<EcoString>, attributes: Attributes) -> Self {
        Self {
            tag: tag.into(),
            attributes,
            children: Vec::new(),
        }
    }

    /// Whether the element is void, i.e. always self-closing and childless.
    pub fn is_void(&self) -> bool {
        is_void_tag(&self.tag)
    }
}

/// Whether the tag names a void element.
pub fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

/// Renders nodes to a writer, depth-first.
pub fn write(writer: &mut dyn Writer, nodes: &[Node]) {
    for node in nodes {
        write_node(writer, node);
    }
}

fn write_node(writer: &mut dyn Writer, node: &Node) {
    match node {
        Node::Element(element) if element.is_void() => {
            writer.self_closing(&element.tag, &element.attributes)
        }
        Node::Element(element) => {
            writer.open(&element.tag, &element.attributes);
            write(writer, &element.children);
            writer.close(&element.tag);
        }
        Node::Text(value) => writer.text(value),
        Node::MathMl(value) => writer.mathml(value),
        Node::ForceWrite => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records writer calls as a flat event log.
    #[derive(Default)]
    struct EventLog(Vec<String>);

    impl Writer for EventLog {
        fn open(&mut self, tag: &str, attributes: &Attributes) {
            self.0.push(format!("open {tag} {}", attributes.len()));
        }

        fn close(&mut self, tag: &str) {
            self.0.push(format!("close {tag}"));
        }

        fn self_closing(&mut self, tag: &str, _attributes: &Attributes) {
            self.0.push(format!("void {tag}"));
        }

        fn text(&mut self, value: &str) {
            self.0.push(format!("text {value}"));
        }

        fn mathml(&mut self, value: &str) {
            self.0.push(format!("math {value}"));
        }

        fn as_string(&self) -> String {
            self.0.join("\n")
        }
    }

    #[test]
    fn dispatch_follows_node_kinds() {
        let mut paragraph = ElementNode::new("p", Attributes::new());
        paragraph.children = vec![
            Node::Text("a".into()),
            Node::Element(ElementNode::new("br", Attributes::new())),
            Node::ForceWrite,
            Node::MathMl("<math/>".into()),
        ];

        let mut log = EventLog::default();
        write(&mut log, &[Node::Element(paragraph)]);

        assert_eq!(
            log.as_string(),
            "open p 0\ntext a\nvoid br\nmath <math/>\nclose p"
        );
    }

    #[test]
    fn void_tags() {
        assert!(is_void_tag("img"));
        assert!(is_void_tag("br"));
        assert!(!is_void_tag("p"));
        assert!(!is_void_tag("td"));
    }
}
