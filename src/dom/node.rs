//! XML Node representation
//!
//! Uses NodeId (u32) for compact, cache-friendly node references.

/// Compact node identifier (index into arena)
pub type NodeId = u32;

/// Type of XML node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Document root
    Document,
    /// Element node
    Element,
    /// Text content
    Text,
    /// CDATA section
    CData,
    /// Comment
    Comment,
    /// Processing instruction
    ProcessingInstruction,
}

/// An XML node in the arena
#[derive(Debug, Clone)]
pub struct XmlNode {
    pub kind: NodeKind,
    /// Parent node (None for document root)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    /// String id of the name (elements, PIs) or the content (text, CDATA, comments)
    pub name_id: u32,
    /// Start of attributes in the attribute arena (elements only)
    pub attr_start: u32,
    /// Number of attributes
    pub attr_count: u32,
    /// Depth in document tree (document node is 0)
    pub depth: u16,
}

impl XmlNode {
    fn new(kind: NodeKind, name_id: u32, parent: Option<NodeId>, depth: u16) -> Self {
        XmlNode {
            kind,
            parent,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
            name_id,
            attr_start: 0,
            attr_count: 0,
            depth,
        }
    }

    /// Create the document root node
    pub fn document() -> Self {
        Self::new(NodeKind::Document, 0, None, 0)
    }

    /// Create an element node
    pub fn element(name_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::new(NodeKind::Element, name_id, Some(parent), depth)
    }

    /// Create a character data node (text, CDATA or comment) holding `content_id`
    pub fn character_data(kind: NodeKind, content_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::new(kind, content_id, Some(parent), depth)
    }

    /// Create a processing instruction node
    pub fn processing_instruction(target_id: u32, parent: NodeId, depth: u16) -> Self {
        Self::new(NodeKind::ProcessingInstruction, target_id, Some(parent), depth)
    }

    #[inline]
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    /// Text or CDATA: the nodes whose content counts toward an element's text
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.kind, NodeKind::Text | NodeKind::CData)
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }
}

/// Stored attribute
#[derive(Debug, Clone, Copy)]
pub struct XmlAttribute {
    pub name_id: u32,
    pub value_id: u32,
}

impl XmlAttribute {
    pub fn new(name_id: u32, value_id: u32) -> Self {
        XmlAttribute { name_id, value_id }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let doc = XmlNode::document();
        assert_eq!(doc.kind, NodeKind::Document);
        assert!(doc.parent.is_none());
        assert_eq!(doc.depth, 0);
    }

    #[test]
    fn test_element_node() {
        let elem = XmlNode::element(1, 0, 1);
        assert!(elem.is_element());
        assert_eq!(elem.parent, Some(0));
        assert_eq!(elem.name_id, 1);
        assert!(!elem.has_children());
    }

    #[test]
    fn test_cdata_counts_as_text() {
        let node = XmlNode::character_data(NodeKind::CData, 3, 1, 2);
        assert!(node.is_text());
        let comment = XmlNode::character_data(NodeKind::Comment, 3, 1, 2);
        assert!(!comment.is_text());
    }
}
