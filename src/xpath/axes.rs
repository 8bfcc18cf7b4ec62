//! XPath Axes
//!
//! Each axis returns its nodes in proximity order: forward axes in document
//! order, reverse axes nearest first. The attribute axis is handled by the
//! evaluator since attributes are not arena nodes.

use super::parser::{Axis, NodeTest};
use crate::dom::{DocumentAccess, NodeId, NodeKind};

/// Navigate along an axis from a context node
pub fn navigate<D: DocumentAccess + ?Sized>(doc: &D, context: NodeId, axis: Axis) -> Vec<NodeId> {
    match axis {
        Axis::Child => doc.children_vec(context),
        Axis::Descendant => doc.descendants_vec(context),
        Axis::DescendantOrSelf => {
            let mut result = vec![context];
            result.extend(doc.descendants_vec(context));
            result
        }
        Axis::Parent => doc.parent_of(context).into_iter().collect(),
        Axis::Ancestor => ancestors(doc, context),
        Axis::AncestorOrSelf => {
            let mut result = vec![context];
            result.extend(ancestors(doc, context));
            result
        }
        Axis::FollowingSibling => walk(context, |id| doc.next_sibling_of(id)),
        Axis::PrecedingSibling => walk(context, |id| doc.prev_sibling_of(id)),
        Axis::Self_ => vec![context],
        Axis::Attribute => Vec::new(),
    }
}

fn ancestors<D: DocumentAccess + ?Sized>(doc: &D, context: NodeId) -> Vec<NodeId> {
    walk(context, |id| doc.parent_of(id))
}

fn walk(start: NodeId, step: impl Fn(NodeId) -> Option<NodeId>) -> Vec<NodeId> {
    let mut result = Vec::new();
    let mut current = step(start);
    while let Some(id) = current {
        result.push(id);
        current = step(id);
    }
    result
}

/// Check if a node matches a node test
///
/// Name tests on non-attribute axes only match elements.
pub fn matches_node_test<D: DocumentAccess + ?Sized>(doc: &D, node_id: NodeId, test: &NodeTest) -> bool {
    let kind = match doc.node_kind_of(node_id) {
        Some(kind) => kind,
        None => return false,
    };

    match test {
        NodeTest::Node => true,
        NodeTest::Any => kind == NodeKind::Element,
        NodeTest::Name(name) => kind == NodeKind::Element && doc.node_name(node_id) == Some(name.as_str()),
        NodeTest::PrefixWildcard(prefix) => {
            kind == NodeKind::Element
                && doc
                    .node_name(node_id)
                    .and_then(|n| n.split_once(':'))
                    .map_or(false, |(p, _)| p == prefix)
        }
        NodeTest::Text => matches!(kind, NodeKind::Text | NodeKind::CData),
        NodeTest::Comment => kind == NodeKind::Comment,
        NodeTest::ProcessingInstruction(target) => {
            kind == NodeKind::ProcessingInstruction
                && target
                    .as_deref()
                    .map_or(true, |t| doc.node_name(node_id) == Some(t))
        }
    }
}

/// Whether an attribute name satisfies a node test on the attribute axis
pub fn matches_attribute_test(name: &str, test: &NodeTest) -> bool {
    match test {
        NodeTest::Any | NodeTest::Node => true,
        NodeTest::Name(expected) => name == expected,
        NodeTest::PrefixWildcard(prefix) => name.split_once(':').map_or(false, |(p, _)| p == prefix),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlDocument;

    #[test]
    fn test_child_axis() {
        let doc = XmlDocument::parse(b"<root><a/><b/></root>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(navigate(&doc, root, Axis::Child).len(), 2);
    }

    #[test]
    fn test_descendant_or_self_starts_with_context() {
        let doc = XmlDocument::parse(b"<root><a><b/></a><c/></root>");
        let root = doc.root_element_id().unwrap();
        let nodes = navigate(&doc, root, Axis::DescendantOrSelf);
        assert_eq!(nodes.len(), 4);
        assert_eq!(nodes[0], root);
    }

    #[test]
    fn test_reverse_axes_nearest_first() {
        let doc = XmlDocument::parse(b"<root><a><b/></a><c/><d/></root>");
        let b = doc.elements_by_tag_name("b")[0];
        let a = doc.elements_by_tag_name("a")[0];
        let root = doc.root_element_id().unwrap();
        assert_eq!(navigate(&doc, b, Axis::Ancestor), vec![a, root, 0]);

        let d = doc.elements_by_tag_name("d")[0];
        let c = doc.elements_by_tag_name("c")[0];
        assert_eq!(navigate(&doc, d, Axis::PrecedingSibling), vec![c, a]);
    }

    #[test]
    fn test_node_tests() {
        let doc = XmlDocument::parse(b"<root>t<!--c--><p:x/><?pi data?></root>");
        let root = doc.root_element_id().unwrap();
        let kids = doc.children_vec(root);
        assert!(matches_node_test(&doc, kids[0], &NodeTest::Text));
        assert!(matches_node_test(&doc, kids[1], &NodeTest::Comment));
        assert!(matches_node_test(&doc, kids[2], &NodeTest::PrefixWildcard("p".into())));
        assert!(!matches_node_test(&doc, kids[2], &NodeTest::Name("x".into())));
        assert!(matches_node_test(&doc, kids[3], &NodeTest::ProcessingInstruction(Some("pi".into()))));
        assert!(!matches_node_test(&doc, kids[0], &NodeTest::Any));
    }
}
