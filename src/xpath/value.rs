//! XPath Value Types
//!
//! XPath 1.0 has four data types: node-set, boolean, number, and string.
//! Attributes are not arena nodes, so an attribute step yields their
//! values directly as [`XPathValue::AttrValues`].

use crate::dom::{node_string_value, DocumentAccess, NodeId};

/// XPath value types
#[derive(Debug, Clone, PartialEq)]
#[must_use]
pub enum XPathValue {
    /// A set of nodes in document order, no duplicates
    NodeSet(Vec<NodeId>),
    Boolean(bool),
    Number(f64),
    String(String),
    /// Values selected by an attribute step, in document order
    AttrValues(Vec<String>),
}

impl XPathValue {
    pub fn empty_nodeset() -> Self {
        XPathValue::NodeSet(Vec::new())
    }

    pub fn single_node(id: NodeId) -> Self {
        XPathValue::NodeSet(vec![id])
    }

    /// Convert to boolean (XPath boolean() function semantics)
    pub fn to_boolean(&self) -> bool {
        match self {
            XPathValue::NodeSet(nodes) => !nodes.is_empty(),
            XPathValue::Boolean(b) => *b,
            XPathValue::Number(n) => *n != 0.0 && !n.is_nan(),
            XPathValue::String(s) => !s.is_empty(),
            XPathValue::AttrValues(values) => !values.is_empty(),
        }
    }

    /// Convert to number (XPath number() function semantics)
    pub fn to_number<D: DocumentAccess + ?Sized>(&self, doc: &D) -> f64 {
        match self {
            XPathValue::Boolean(true) => 1.0,
            XPathValue::Boolean(false) => 0.0,
            XPathValue::Number(n) => *n,
            other => parse_number(&other.to_string_value(doc)),
        }
    }

    /// Convert to string (XPath string() function semantics)
    ///
    /// A node-set converts to the string-value of its first node.
    pub fn to_string_value<D: DocumentAccess + ?Sized>(&self, doc: &D) -> String {
        match self {
            XPathValue::NodeSet(nodes) => nodes
                .first()
                .map(|&id| node_string_value(doc, id))
                .unwrap_or_default(),
            XPathValue::Boolean(b) => b.to_string(),
            XPathValue::Number(n) => format_number(*n),
            XPathValue::String(s) => s.clone(),
            XPathValue::AttrValues(values) => values.first().cloned().unwrap_or_default(),
        }
    }

    /// Individual string values of a node-set or attribute selection
    ///
    /// Returns None for scalar values.
    pub fn member_strings<D: DocumentAccess + ?Sized>(&self, doc: &D) -> Option<Vec<String>> {
        match self {
            XPathValue::NodeSet(nodes) => Some(nodes.iter().map(|&id| node_string_value(doc, id)).collect()),
            XPathValue::AttrValues(values) => Some(values.clone()),
            _ => None,
        }
    }

    pub fn is_nodeset(&self) -> bool {
        matches!(self, XPathValue::NodeSet(_))
    }

    pub fn as_nodeset(&self) -> Option<&[NodeId]> {
        match self {
            XPathValue::NodeSet(nodes) => Some(nodes),
            _ => None,
        }
    }
}

impl Default for XPathValue {
    fn default() -> Self {
        XPathValue::empty_nodeset()
    }
}

impl From<bool> for XPathValue {
    fn from(b: bool) -> Self {
        XPathValue::Boolean(b)
    }
}

impl From<f64> for XPathValue {
    fn from(n: f64) -> Self {
        XPathValue::Number(n)
    }
}

impl From<String> for XPathValue {
    fn from(s: String) -> Self {
        XPathValue::String(s)
    }
}

/// XPath number parsing: optional surrounding whitespace, optional minus,
/// digits with an optional fraction. Anything else is NaN.
pub fn parse_number(s: &str) -> f64 {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    let well_formed = !digits.is_empty()
        && digits != "."
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if well_formed {
        trimmed.parse().unwrap_or(f64::NAN)
    } else {
        f64::NAN
    }
}

/// Format a number the way XPath string() does
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == n.trunc() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}
