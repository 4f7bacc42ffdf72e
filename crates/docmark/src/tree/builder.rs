use ecow::EcoString;
use log::debug;

use super::{Attributes, ElementNode, Node};
use crate::style::InsertionPath;
use crate::writer::Writer;

/// Builds an intermediate tree incrementally.
///
/// Open elements are kept detached on a stack and attached to their parent
/// when they are closed, so the finished nodes are always well formed.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    nodes: Vec<Node>,
    open: Vec<ElementNode>,
}

impl TreeBuilder {
    /// An empty builder with nothing open.
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Opens an element. Void elements are appended instead, since they
    /// cannot take children.
    pub fn open(&mut self, tag: impl Into<EcoString>, attributes: Attributes) {
        let element = ElementNode::new(tag, attributes);
        if element.is_void() {
            debug!("treating open of void element <{}> as self-closing", element.tag);
            self.container().push(Node::Element(element));
        } else {
            self.open.push(element);
        }
    }

    /// Closes the most recently opened element.
    pub fn close(&mut self) {
        if let Some(element) = self.open.pop() {
            self.container().push(Node::Element(element));
        }
    }

    /// Closes every open element.
    pub fn close_all(&mut self) {
        while !self.open.is_empty() {
            self.close();
        }
    }

    /// Appends a text leaf.
    pub fn text(&mut self, value: impl Into<EcoString>) {
        let value = value.into();
        if !value.is_empty() {
            self.container().push(Node::Text(value));
        }
    }

    /// Appends a MathML leaf.
    pub fn math(&mut self, value: impl Into<EcoString>) {
        self.container().push(Node::MathMl(value.into()));
    }

    /// Appends a childless element.
    pub fn self_closing(&mut self, tag: impl Into<EcoString>, attributes: Attributes) {
        self.container()
            .push(Node::Element(ElementNode::new(tag, attributes)));
    }

    /// Appends a force-write marker.
    pub fn force_write(&mut self) {
        self.container().push(Node::ForceWrite);
    }

    /// Closes `other` and splices its nodes in at the current position as a
    /// single unit.
    pub fn append(&mut self, mut other: TreeBuilder) {
        other.close_all();
        self.container().extend(other.nodes);
    }

    /// Makes the open chain match `path`.
    ///
    /// Open elements matching the reusable prefix of the path are kept;
    /// everything below them is closed and the rest of the path is opened.
    pub fn satisfy_path(&mut self, path: &InsertionPath) {
        let elements = path.elements();
        let reusable = path.reusable_prefix();
        let common = elements[..reusable]
            .iter()
            .zip(&self.open)
            .take_while(|(want, open)| want.matches(&open.tag, &open.attributes))
            .count();

        while self.open.len() > common {
            self.close();
        }
        for element in &elements[common..] {
            self.open(element.tag.clone(), element.attributes.clone());
        }
    }

    /// Closes everything and returns the finished nodes.
    pub fn finish(mut self) -> Vec<Node> {
        self.close_all();
        self.nodes
    }

    /// Renders the finished tree with `writer`.
    pub fn as_string(self, writer: &mut dyn Writer) -> String {
        super::write(writer, &self.finish());
        writer.as_string()
    }

    fn container(&mut self) -> &mut Vec<Node> {
        match self.open.last_mut() {
            Some(element) => &mut element.children,
            None => &mut self.nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::PathElement;

    fn element(tag: &str, children: Vec<Node>) -> Node {
        Node::Element(ElementNode {
            tag: tag.into(),
            attributes: Attributes::new(),
            children,
        })
    }

    fn text(value: &str) -> Node {
        Node::Text(value.into())
    }

    #[test]
    fn reusable_path_opens_each_tag_once() {
        let path = InsertionPath::new(vec![PathElement::new("blockquote"), PathElement::new("p")]);
        let mut builder = TreeBuilder::new();
        builder.satisfy_path(&path);
        builder.text("a");
        builder.satisfy_path(&path);
        builder.text("b");

        assert_eq!(
            builder.finish(),
            vec![element("blockquote", vec![element("p", vec![text("a"), text("b")])])]
        );
    }

    #[test]
    fn fresh_suffix_is_reopened() {
        let path: InsertionPath = "ul > li:fresh".parse().unwrap();
        let mut builder = TreeBuilder::new();
        builder.satisfy_path(&path);
        builder.text("one");
        builder.satisfy_path(&path);
        builder.text("two");

        assert_eq!(
            builder.finish(),
            vec![element(
                "ul",
                vec![element("li", vec![text("one")]), element("li", vec![text("two")])]
            )]
        );
    }

    #[test]
    fn diverging_path_closes_previous_branch() {
        let mut builder = TreeBuilder::new();
        builder.satisfy_path(&"ul > li:fresh".parse().unwrap());
        builder.text("item");
        builder.satisfy_path(&InsertionPath::top_level("p"));
        builder.text("after");

        assert_eq!(
            builder.finish(),
            vec![
                element("ul", vec![element("li", vec![text("item")])]),
                element("p", vec![text("after")]),
            ]
        );
    }

    #[test]
    fn appended_subtree_is_a_closed_unit() {
        let mut builder = TreeBuilder::new();
        builder.open("p", Attributes::new());

        let mut run = TreeBuilder::new();
        run.open("strong", Attributes::new());
        run.text("bold");
        builder.append(run);
        builder.text(" plain");

        assert_eq!(
            builder.finish(),
            vec![element(
                "p",
                vec![element("strong", vec![text("bold")]), text(" plain")]
            )]
        );
    }

    #[test]
    fn void_elements_never_take_children() {
        let mut builder = TreeBuilder::new();
        builder.open("img", Attributes::new());
        builder.text("caption");

        assert_eq!(builder.finish(), vec![element("img", vec![]), text("caption")]);
    }

    #[test]
    fn close_without_open_element_is_ignored() {
        let mut builder = TreeBuilder::new();
        builder.close();
        builder.text("x");
        assert_eq!(builder.depth(), 0);
        assert_eq!(builder.finish(), vec![text("x")]);
    }
}
