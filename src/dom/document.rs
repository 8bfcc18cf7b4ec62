//! XML Document - Arena-based DOM representation
//!
//! Nodes live in a single arena and are addressed by [`NodeId`]. Node ids
//! are assigned in document order, so sorting ids sorts nodes.

use super::node::{NodeId, NodeKind, XmlAttribute, XmlNode};
use super::strings::StringPool;
use super::DocumentAccess;
use crate::core::tokenizer::ParseError;
use crate::reader::events::{StartElement, XmlEvent};
use crate::reader::slice::SliceReader;

/// Default limit on element nesting
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// Options for [`XmlDocument::parse_with`]
#[derive(Debug, Clone, Copy)]
pub struct ParseOptions {
    /// Reject documents that are not well-formed
    pub strict: bool,
    /// Keep text nodes made only of XML whitespace
    pub keep_blank_text: bool,
    /// Deepest element nesting accepted, the root element being level 1
    ///
    /// Strict parsing fails beyond it; lenient parsing stops there.
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict: false,
            keep_blank_text: true,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// An XML document stored in arena format
///
/// The document owns all of its strings, so it has no tie to the input
/// buffer and can be shared across threads.
#[derive(Debug)]
pub struct XmlDocument {
    nodes: Vec<XmlNode>,
    attributes: Vec<XmlAttribute>,
    strings: StringPool,
    root_element: Option<NodeId>,
}

impl XmlDocument {
    fn empty() -> Self {
        XmlDocument {
            nodes: vec![XmlNode::document()],
            attributes: Vec::with_capacity(64),
            strings: StringPool::new(),
            root_element: None,
        }
    }

    /// Parse an XML document from a byte slice (lenient mode)
    ///
    /// Never fails: parsing stops at the first unreadable construct and
    /// unclosed elements are closed implicitly.
    pub fn parse(input: &[u8]) -> Self {
        let mut doc = Self::empty();
        let _ = doc.build_from_events(SliceReader::new(input), ParseOptions::default());
        doc
    }

    /// Parse an XML document in strict mode
    ///
    /// Returns Err if the document is not well-formed.
    pub fn parse_strict(input: &[u8]) -> Result<Self, ParseError> {
        Self::parse_with(
            input,
            ParseOptions {
                strict: true,
                ..ParseOptions::default()
            },
        )
    }

    /// Parse with explicit options
    ///
    /// In lenient mode this never returns Err.
    pub fn parse_with(input: &[u8], options: ParseOptions) -> Result<Self, ParseError> {
        let reader = if options.strict {
            SliceReader::new_strict(input)
        } else {
            SliceReader::new(input)
        };
        let mut doc = Self::empty();
        doc.build_from_events(reader, options)?;
        Ok(doc)
    }

    fn build_from_events(&mut self, mut reader: SliceReader<'_>, options: ParseOptions) -> Result<(), ParseError> {
        let strict = options.strict;
        // Open elements; the document node sits at the bottom
        let mut stack: Vec<NodeId> = vec![0];

        while let Some(event) = reader.next_event() {
            let at_document_level = stack.len() == 1;
            let parent = stack.last().copied().unwrap_or(0);

            let opens_element = matches!(event, XmlEvent::StartElement(_) | XmlEvent::EmptyElement(_));
            if opens_element && stack.len() > options.max_depth {
                if strict {
                    return Err(ParseError::new(
                        format!("Element nesting exceeds {} levels", options.max_depth),
                        reader.position(),
                    ));
                }
                break;
            }

            match event {
                XmlEvent::StartElement(elem) => {
                    if at_document_level && self.root_element.is_some() && strict {
                        return Err(ParseError::new("Document has multiple root elements", reader.position()));
                    }
                    let id = self.push_element(&elem, parent, stack.len());
                    stack.push(id);
                }

                XmlEvent::EmptyElement(elem) => {
                    if at_document_level && self.root_element.is_some() && strict {
                        return Err(ParseError::new("Document has multiple root elements", reader.position()));
                    }
                    self.push_element(&elem, parent, stack.len());
                }

                XmlEvent::EndElement(end) => {
                    if at_document_level {
                        if strict {
                            let name = String::from_utf8_lossy(end.name);
                            return Err(ParseError::new(
                                format!("Unexpected end tag: </{}> without matching start tag", name),
                                reader.position(),
                            ));
                        }
                        continue;
                    }

                    let open_name = self.nodes[parent as usize].name_id;
                    if strict && self.strings.get(open_name) != Some(end.name) {
                        let open = String::from_utf8_lossy(self.strings.get(open_name).unwrap_or(b""));
                        let close = String::from_utf8_lossy(end.name);
                        return Err(ParseError::new(
                            format!("Tag mismatch: <{}> closed with </{}>", open, close),
                            reader.position(),
                        ));
                    }
                    stack.pop();
                }

                XmlEvent::Text(content) => {
                    let blank = content.iter().all(|&b| matches!(b, b' ' | b'\t' | b'\n' | b'\r'));
                    if at_document_level {
                        if strict && !blank {
                            return Err(ParseError::new("Text content not allowed at document level", reader.position()));
                        }
                        continue;
                    }
                    if blank && !options.keep_blank_text {
                        continue;
                    }
                    self.push_character_data(NodeKind::Text, &content, parent, stack.len());
                }

                XmlEvent::CData(content) => {
                    if at_document_level {
                        if strict {
                            return Err(ParseError::new("CDATA section not allowed at document level", reader.position()));
                        }
                        continue;
                    }
                    self.push_character_data(NodeKind::CData, &content, parent, stack.len());
                }

                XmlEvent::Comment(content) => {
                    self.push_character_data(NodeKind::Comment, &content, parent, stack.len());
                }

                XmlEvent::ProcessingInstruction { target, .. } => {
                    let target_id = self.strings.intern(target);
                    let node = XmlNode::processing_instruction(target_id, parent, depth(stack.len()));
                    self.push_node(node, parent);
                }

                XmlEvent::DocType(_) => {
                    if strict && (self.root_element.is_some() || !at_document_level) {
                        return Err(ParseError::new("DOCTYPE must come before root element", reader.position()));
                    }
                }

                XmlEvent::XmlDeclaration { .. } => {}

                XmlEvent::EndDocument => break,
            }
        }

        if !strict {
            return Ok(());
        }

        if let Some(err) = reader.take_error() {
            return Err(err);
        }
        if stack.len() > 1 {
            let unclosed = stack[1];
            let name = self.node_name(unclosed).unwrap_or("?");
            return Err(ParseError::new(format!("Unclosed tag: <{}>", name), reader.position()));
        }
        if self.root_element.is_none() {
            return Err(ParseError::new("Document has no root element", reader.position()));
        }
        Ok(())
    }

    fn push_element(&mut self, elem: &StartElement<'_>, parent: NodeId, stack_len: usize) -> NodeId {
        let name_id = self.strings.intern(elem.name);
        let mut node = XmlNode::element(name_id, parent, depth(stack_len));

        node.attr_start = self.attributes.len() as u32;
        node.attr_count = elem.attributes.len() as u32;
        for attr in &elem.attributes {
            let name_id = self.strings.intern(attr.name.as_ref());
            let value_id = self.strings.intern(attr.value.as_ref());
            self.attributes.push(XmlAttribute::new(name_id, value_id));
        }

        let id = self.push_node(node, parent);
        if parent == 0 && self.root_element.is_none() {
            self.root_element = Some(id);
        }
        id
    }

    fn push_character_data(&mut self, kind: NodeKind, content: &[u8], parent: NodeId, stack_len: usize) {
        let content_id = self.strings.intern(content);
        let node = XmlNode::character_data(kind, content_id, parent, depth(stack_len));
        self.push_node(node, parent);
    }

    /// Append a node to the arena and link it as the parent's last child
    fn push_node(&mut self, mut node: XmlNode, parent: NodeId) -> NodeId {
        let id = self.nodes.len() as NodeId;
        let prev = self.nodes[parent as usize].last_child;
        node.prev_sibling = prev;
        self.nodes.push(node);

        match prev {
            Some(prev_id) => self.nodes[prev_id as usize].next_sibling = Some(id),
            None => self.nodes[parent as usize].first_child = Some(id),
        }
        self.nodes[parent as usize].last_child = Some(id);
        id
    }

    /// Get the root element name
    pub fn root_name(&self) -> Option<&str> {
        self.node_name(self.root_element?)
    }

    /// Total number of nodes, the document node included
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

#[inline]
fn depth(stack_len: usize) -> u16 {
    stack_len.min(u16::MAX as usize) as u16
}

impl DocumentAccess for XmlDocument {
    fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.nodes.get(id as usize)
    }

    fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.get_node(id)
            .and_then(|node| {
                let start = node.attr_start as usize;
                self.attributes.get(start..start + node.attr_count as usize)
            })
            .unwrap_or(&[])
    }

    fn strings(&self) -> &StringPool {
        &self.strings
    }

    fn root_element_id(&self) -> Option<NodeId> {
        self.root_element
    }

    // Nothing is ever hidden in the document itself, so walk the raw links
    fn first_child_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.first_child
    }

    fn next_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.next_sibling
    }

    fn prev_sibling_of(&self, id: NodeId) -> Option<NodeId> {
        self.get_node(id)?.prev_sibling
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let doc = XmlDocument::parse(b"<root>hello</root>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.root_name(), Some("root"));
        let text = doc.first_child_of(root).unwrap();
        assert_eq!(doc.text_content(text), Some("hello"));
    }

    #[test]
    fn test_siblings_and_parents() {
        let doc = XmlDocument::parse(b"<root><a/><b/><c/></root>");
        let root = doc.root_element_id().unwrap();
        let children = doc.children_vec(root);
        assert_eq!(children.len(), 3);
        assert_eq!(doc.prev_sibling_of(children[0]), None);
        assert_eq!(doc.next_sibling_of(children[0]), Some(children[1]));
        assert_eq!(doc.parent_of(children[2]), Some(root));
        assert_eq!(doc.parent_of(root), Some(0));
    }

    #[test]
    fn test_descendants_document_order() {
        let doc = XmlDocument::parse(b"<root><a><b/></a><c/></root>");
        let root = doc.root_element_id().unwrap();
        let names: Vec<_> = doc
            .descendants_vec(root)
            .into_iter()
            .filter_map(|id| doc.node_name(id))
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_attributes_stored_in_order() {
        let doc = XmlDocument::parse(b"<Case name=\"A\" env=\"qa\"/>");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.get_attribute_values(root), vec![("name", "A"), ("env", "qa")]);
        assert_eq!(doc.get_attribute(root, "env"), Some("qa"));
        assert_eq!(doc.get_attribute(root, "missing"), None);
    }

    #[test]
    fn test_document_level_whitespace_dropped() {
        let doc = XmlDocument::parse_strict(b"<?xml version=\"1.0\"?>\n<r/>\n").unwrap();
        assert_eq!(doc.children_vec(0).len(), 1);
    }

    #[test]
    fn test_strict_rejects_malformed() {
        for input in [
            &b"<a><b></a>"[..],
            b"<a>",
            b"<a/><b/>",
            b"</a>",
            b"text<a/>",
            b"",
            b"<a x=\"1\" x=\"2\"/>",
            b"<a>&bogus;</a>",
        ] {
            assert!(
                XmlDocument::parse_strict(input).is_err(),
                "expected error for {:?}",
                String::from_utf8_lossy(input)
            );
        }
    }

    #[test]
    fn test_blank_text_dropped_on_request() {
        let input = b"<r>\n  <a> x </a>\n  <b>\t</b>\n</r>";
        let kept = XmlDocument::parse_strict(input).unwrap();
        let root = kept.root_element_id().unwrap();
        assert_eq!(kept.children_vec(root).len(), 5);

        let options = ParseOptions {
            strict: true,
            keep_blank_text: false,
            ..ParseOptions::default()
        };
        let dropped = XmlDocument::parse_with(input, options).unwrap();
        assert!(dropped.node_count() < kept.node_count());
        let root = dropped.root_element_id().unwrap();
        assert_eq!(dropped.children_vec(root).len(), 2);
        let a = dropped.element_children(root)[0];
        assert_eq!(dropped.children_vec(a).len(), 1);
        let b = dropped.element_children(root)[1];
        assert!(dropped.children_vec(b).is_empty());
    }

    fn nested(levels: usize) -> Vec<u8> {
        let mut xml = "<b>".repeat(levels);
        xml.push('x');
        xml.push_str(&"</b>".repeat(levels));
        xml.into_bytes()
    }

    #[test]
    fn test_nesting_limit() {
        let options = ParseOptions {
            strict: true,
            max_depth: 8,
            ..ParseOptions::default()
        };
        assert!(XmlDocument::parse_with(&nested(8), options).is_ok());
        let err = XmlDocument::parse_with(&nested(9), options).unwrap_err();
        assert!(err.to_string().contains("nesting"), "{}", err);
        // empty elements count as a level too
        assert!(XmlDocument::parse_with(b"<a><b><c/></b></a>", ParseOptions { max_depth: 2, ..options }).is_err());

        assert!(XmlDocument::parse_strict(&nested(DEFAULT_MAX_DEPTH)).is_ok());
        assert!(XmlDocument::parse_strict(&nested(DEFAULT_MAX_DEPTH + 1)).is_err());
    }

    #[test]
    fn test_lenient_stops_at_nesting_limit() {
        let doc = XmlDocument::parse(&nested(5000));
        let deepest = doc.descendants_vec(0).into_iter().map(|id| doc.nodes[id as usize].depth).max();
        assert_eq!(deepest, Some(DEFAULT_MAX_DEPTH as u16));
    }

    #[test]
    fn test_lenient_closes_open_elements() {
        let doc = XmlDocument::parse(b"<a><b>text");
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.element_children(root).len(), 1);
    }
}
