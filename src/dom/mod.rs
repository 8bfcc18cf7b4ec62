//! DOM Module - Arena-based XML Document
//!
//! Implements an efficient DOM representation using:
//! - Arena allocation for nodes
//! - NodeId (u32) indices for cache-friendly traversal
//! - String interning for names and character data

pub mod document;
pub mod node;
pub mod strings;

pub use document::{ParseOptions, XmlDocument};
pub use node::{NodeId, NodeKind, XmlAttribute, XmlNode};
pub use strings::StringPool;

/// Read access to an arena document
///
/// Implemented by [`XmlDocument`] and by views that hide part of one.
/// Traversal methods skip nodes for which [`is_visible`](Self::is_visible)
/// returns false, so a hidden node's whole subtree disappears from
/// child, sibling and descendant walks.
pub trait DocumentAccess {
    /// Get a node by ID
    fn get_node(&self, id: NodeId) -> Option<&XmlNode>;

    /// Get the attribute slice of an element
    fn attributes(&self, id: NodeId) -> &[XmlAttribute];

    /// Get the string pool for direct access
    fn strings(&self) -> &StringPool;

    /// Get root element ID
    fn root_element_id(&self) -> Option<NodeId>;

    fn is_visible(&self, _id: NodeId) -> bool {
        true
    }

    /// The document node is always the first arena slot
    fn document_node_id(&self) -> NodeId {
        0
    }

    fn node_kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.get_node(id).map(|n| n.kind)
    }

    fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.parent
    }

    fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        first_visible(self, self.get_node(id)?.first_child, |n| n.next_sibling)
    }

    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        first_visible(self, self.get_node(id)?.next_sibling, |n| n.next_sibling)
    }

    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        first_visible(self, self.get_node(id)?.prev_sibling, |n| n.prev_sibling)
    }

    /// Name of an element or target of a processing instruction
    fn node_name(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Element | NodeKind::ProcessingInstruction => self.strings().get_str(node.name_id),
            _ => None,
        }
    }

    /// Node name without any prefix
    fn node_local_name(&self, id: NodeId) -> Option<&str> {
        let name = self.node_name(id)?;
        Some(name.rsplit_once(':').map_or(name, |(_, local)| local))
    }

    /// Content of a text, CDATA or comment node
    fn text_content(&self, id: NodeId) -> Option<&str> {
        let node = self.get_node(id)?;
        match node.kind {
            NodeKind::Text | NodeKind::CData | NodeKind::Comment => self.strings().get_str(node.name_id),
            _ => None,
        }
    }

    /// Get attribute value by name
    fn get_attribute(&self, node_id: NodeId, name: &str) -> Option<&str> {
        let strings = self.strings();
        self.attributes(node_id)
            .iter()
            .find(|attr| strings.get_str(attr.name_id) == Some(name))
            .and_then(|attr| strings.get_str(attr.value_id))
    }

    /// All attribute names and values in document order
    fn get_attribute_values(&self, node_id: NodeId) -> Vec<(&str, &str)> {
        let strings = self.strings();
        self.attributes(node_id)
            .iter()
            .filter_map(|attr| Some((strings.get_str(attr.name_id)?, strings.get_str(attr.value_id)?)))
            .collect()
    }

    fn children_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut child = self.first_child_of(id);
        while let Some(cid) = child {
            result.push(cid);
            child = self.next_sibling_of(cid);
        }
        result
    }

    /// Element children only, in document order
    fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children_vec(id)
            .into_iter()
            .filter(|&cid| self.node_kind_of(cid) == Some(NodeKind::Element))
            .collect()
    }

    /// All descendants in document order (pre-order, context excluded)
    fn descendants_vec(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children_vec(id).into_iter().rev().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children_vec(current).into_iter().rev());
        }
        result
    }

    /// Every element named `name`, in document order
    fn elements_by_tag_name(&self, name: &str) -> Vec<NodeId> {
        self.descendants_vec(self.document_node_id())
            .into_iter()
            .filter(|&id| self.node_kind_of(id) == Some(NodeKind::Element) && self.node_name(id) == Some(name))
            .collect()
    }
}

fn first_visible<D: DocumentAccess + ?Sized>(
    doc: &D,
    mut current: Option<NodeId>,
    step: impl Fn(&XmlNode) -> Option<NodeId>,
) -> Option<NodeId> {
    while let Some(id) = current {
        if doc.is_visible(id) {
            return Some(id);
        }
        current = doc.get_node(id).and_then(&step);
    }
    None
}

/// XPath string-value of a node
///
/// Elements and the document node yield the concatenation of all
/// descendant text and CDATA in document order. Comments yield their
/// content. Processing instructions yield the empty string.
pub fn node_string_value<D: DocumentAccess + ?Sized>(doc: &D, id: NodeId) -> String {
    match doc.node_kind_of(id) {
        Some(NodeKind::Element) | Some(NodeKind::Document) => {
            let mut out = String::new();
            for desc in doc.descendants_vec(id) {
                if doc.get_node(desc).map_or(false, XmlNode::is_text) {
                    out.push_str(doc.text_content(desc).unwrap_or(""));
                }
            }
            out
        }
        Some(NodeKind::Text) | Some(NodeKind::CData) | Some(NodeKind::Comment) => {
            doc.text_content(id).unwrap_or("").to_string()
        }
        _ => String::new(),
    }
}
