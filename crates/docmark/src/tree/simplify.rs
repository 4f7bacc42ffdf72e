use super::Node;

/// Removes elements that have nothing to render.
///
/// An element survives when it is void, or when it still has children after
/// its own children were simplified. Force-write markers count as children.
pub fn simplify(nodes: Vec<Node>) -> Vec<Node> {
    nodes.into_iter().filter_map(simplify_node).collect()
}

fn simplify_node(node: Node) -> Option<Node> {
    match node {
        Node::Element(element) if element.is_void() => Some(Node::Element(element)),
        Node::Element(mut element) => {
            element.children = simplify(element.children);
            (!element.children.is_empty()).then_some(Node::Element(element))
        }
        Node::Text(value) if value.is_empty() => None,
        other => Some(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Attributes, ElementNode};

    fn element(tag: &str, children: Vec<Node>) -> Node {
        let mut element = ElementNode::new(tag, Attributes::new());
        element.children = children;
        Node::Element(element)
    }

    #[test]
    fn removes_nested_empty_elements() {
        let nodes = vec![
            element("p", vec![element("strong", vec![element("em", vec![])])]),
            element("p", vec![Node::Text("kept".into())]),
        ];

        assert_eq!(
            simplify(nodes),
            vec![element("p", vec![Node::Text("kept".into())])]
        );
    }

    #[test]
    fn keeps_void_and_force_written_elements() {
        let nodes = vec![
            element("td", vec![Node::ForceWrite]),
            element("br", vec![]),
        ];

        assert_eq!(simplify(nodes.clone()), nodes);
    }
}
