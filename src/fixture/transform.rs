//! Tree-to-map transformation
//!
//! Leaf elements (no element children) become scalars, container elements
//! become maps of their element children, and same-named siblings fold into
//! groups. Attributes never change that shape: a leaf with attributes is an
//! [`Value::Attributed`] scalar and a container keeps them under
//! [`ATTRIBUTES_KEY`].

use super::reference::ReferenceResolver;
use super::value::{insert_value, Attributes, ResultMap, Value, ATTRIBUTES_KEY};
use crate::dom::{DocumentAccess, NodeId, XmlNode};
use tracing::debug;

/// Transform every element named `root_tag` into one map
///
/// Matches are taken from the whole (visible) document in document order.
/// A single leaf match goes through [`leaf_entry`] instead.
pub fn transform<D: DocumentAccess + ?Sized>(doc: &D, root_tag: &str, resolver: &ReferenceResolver<'_>) -> ResultMap {
    let matches = doc.elements_by_tag_name(root_tag);
    debug!(root = root_tag, matches = matches.len(), "Reading XML elements");

    if let [single] = matches.as_slice() {
        if doc.element_children(*single).is_empty() {
            return leaf_entry(doc, *single);
        }
    }

    let mut map = ResultMap::new();
    transform_into(doc, &matches, &mut map, resolver);
    map
}

/// Single-entry map for a lone leaf match
///
/// The raw trimmed text is used: attributes are not captured and pointers
/// are not followed.
pub fn leaf_entry<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> ResultMap {
    let mut map = ResultMap::new();
    if let Some(name) = doc.node_name(node) {
        map.insert(name.to_string(), Value::Scalar(leaf_text(doc, node)));
    }
    map
}

/// Transform a list of sibling elements into entries of `map`
pub fn transform_into<D: DocumentAccess + ?Sized>(
    doc: &D,
    nodes: &[NodeId],
    map: &mut ResultMap,
    resolver: &ReferenceResolver<'_>,
) {
    for &node in nodes {
        let Some(name) = doc.node_name(node) else {
            continue;
        };
        let children = doc.element_children(node);
        let value = if children.is_empty() {
            leaf_value(doc, node, resolver)
        } else {
            container_value(doc, node, &children, resolver)
        };
        insert_value(map, name, value);
    }
}

fn leaf_value<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId, resolver: &ReferenceResolver<'_>) -> Value {
    let value = resolver.resolve(&leaf_text(doc, node));
    let attributes = attributes_of(doc, node);
    if attributes.is_empty() {
        Value::Scalar(value)
    } else {
        Value::Attributed { value, attributes }
    }
}

fn container_value<D: DocumentAccess + ?Sized>(
    doc: &D,
    node: NodeId,
    children: &[NodeId],
    resolver: &ReferenceResolver<'_>,
) -> Value {
    let mut map = ResultMap::new();
    let attributes = attributes_of(doc, node);
    if !attributes.is_empty() {
        map.insert(ATTRIBUTES_KEY.to_string(), Value::Attributes(attributes));
    }
    transform_into(doc, children, &mut map, resolver);
    Value::Map(map)
}

/// Direct text and CDATA content of an element, trimmed
fn leaf_text<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> String {
    let text: String = doc
        .children_vec(node)
        .into_iter()
        .filter(|&child| doc.get_node(child).map_or(false, XmlNode::is_text))
        .filter_map(|child| doc.text_content(child))
        .collect();
    text.trim().to_string()
}

fn attributes_of<D: DocumentAccess + ?Sized>(doc: &D, node: NodeId) -> Attributes {
    doc.get_attribute_values(node)
        .into_iter()
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::XmlDocument;
    use crate::xpath::XPathCache;

    fn build(xml: &[u8], root_tag: &str) -> ResultMap {
        let doc = XmlDocument::parse(xml);
        let cache = XPathCache::new(8);
        let resolver = ReferenceResolver::new(&doc, &cache);
        transform(&doc, root_tag, &resolver)
    }

    #[test]
    fn test_repeated_cases_become_group() {
        let map = build(
            b"<Root><Case name=\"A\"><k>v1</k></Case><Case name=\"A\"><k>v2</k></Case></Root>",
            "Case",
        );
        let group = map["Case"].as_group().unwrap();
        assert_eq!(group.len(), 2);
        for (case, expected) in group.iter().zip(["v1", "v2"]) {
            assert_eq!(case.child("k").unwrap().as_str(), Some(expected));
            assert_eq!(case.attribute("name"), Some("A"));
        }
    }

    #[test]
    fn test_single_sibling_not_grouped() {
        let map = build(b"<Root><Case><k>v</k><j>w</j></Case></Root>", "Root");
        let case = map["Root"].child("Case").unwrap();
        assert!(case.as_map().is_some());
        assert_eq!(case.child("j").unwrap().as_str(), Some("w"));
    }

    #[test]
    fn test_attributed_leaf_keeps_scalar_shape() {
        let map = build(b"<Root><k id=\"7\" lang=\"en\"> text </k><k2/></Root>", "Root");
        let root = &map["Root"];
        match root.child("k").unwrap().as_ref() {
            Value::Attributed { value, attributes } => {
                assert_eq!(value, "text");
                assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["id", "lang"]);
            }
            other => panic!("unexpected {:?}", other),
        }
        // empty leaf contributes an empty string, not a missing key
        assert_eq!(root.child("k2").unwrap().as_str(), Some(""));
    }

    #[test]
    fn test_container_attributes_first() {
        let map = build(b"<Root><Case id=\"1\"><k>v</k></Case><Other/></Root>", "Root");
        let case = map["Root"].child("Case").unwrap();
        let keys = case.keys();
        assert_eq!(keys, vec![ATTRIBUTES_KEY, "k"]);
    }

    #[test]
    fn test_nested_containers_always_recursed() {
        let map = build(b"<Root><a><b><c>deep</c></b></a></Root>", "Root");
        let c = map["Root"].child("a").unwrap().into_owned();
        let c = c.child("b").unwrap().into_owned();
        assert_eq!(c.child("c").unwrap().as_str(), Some("deep"));
    }

    #[test]
    fn test_mixed_content_uses_direct_text() {
        let map = build(b"<Root><k>a<!--note-->b<![CDATA[<c>]]></k></Root>", "Root");
        assert_eq!(map["Root"].child("k").unwrap().as_str(), Some("ab<c>"));
    }

    #[test]
    fn test_pointer_leaf_resolved() {
        let map = build(
            b"<Root><ref>//Root/Other/val</ref><Other><val>42</val></Other></Root>",
            "Root",
        );
        assert_eq!(map["Root"].child("ref").unwrap().as_str(), Some("42"));
    }

    #[test]
    fn test_single_leaf_match_short_circuits() {
        let map = build(b"<Root><greeting lang=\"en\"> //Root/x </greeting><x>no</x></Root>", "greeting");
        assert_eq!(map.len(), 1);
        // raw text: no attribute wrapping, no pointer resolution
        assert_eq!(map["greeting"], Value::from("//Root/x"));
    }

    #[test]
    fn test_repeated_leaf_matches_do_not_short_circuit() {
        let map = build(b"<Root><x>1</x><x>2</x></Root>", "x");
        assert_eq!(map["x"], Value::Group(vec!["1".into(), "2".into()]));
    }

    #[test]
    fn test_no_match_is_empty() {
        assert!(build(b"<Root/>", "Missing").is_empty());
    }
}
