//! Scope filter
//!
//! A document may hold several environment subtrees side by side, such as
//! `<APP_QA>` and `<APP_PROD>`. Scoping keeps the first element named by
//! the scope tag and hides its element siblings, so only one environment
//! is visible to a run. The document itself is never modified.

use crate::dom::{DocumentAccess, NodeId, StringPool, XmlAttribute, XmlDocument, XmlNode};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A document with the sibling scopes of one scope element hidden
#[derive(Debug)]
pub struct ScopedView<'a> {
    doc: &'a XmlDocument,
    scope_node: Option<NodeId>,
    hidden: HashSet<NodeId>,
}

impl<'a> ScopedView<'a> {
    /// View that hides nothing
    pub fn unscoped(doc: &'a XmlDocument) -> Self {
        ScopedView {
            doc,
            scope_node: None,
            hidden: HashSet::new(),
        }
    }

    /// The element the view is scoped to, if the scope tag was found
    pub fn scope_node(&self) -> Option<NodeId> {
        self.scope_node
    }

    /// The underlying, unfiltered document
    pub fn document(&self) -> &'a XmlDocument {
        self.doc
    }

    pub fn hidden_count(&self) -> usize {
        self.hidden.len()
    }
}

/// Restrict `doc` to the subtree of the first element named `scope_tag`
///
/// Element siblings of that element are hidden unless their name equals
/// the scope tag ignoring ASCII case; text, comment and processing
/// instruction siblings stay. An empty tag leaves the document as is. A
/// tag that does not occur is logged as a warning and the whole document
/// stays visible.
pub fn apply_scope<'a>(doc: &'a XmlDocument, scope_tag: &str) -> ScopedView<'a> {
    let mut view = ScopedView::unscoped(doc);
    if scope_tag.is_empty() {
        return view;
    }

    let Some(scope_node) = doc.elements_by_tag_name(scope_tag).first().copied() else {
        warn!(scope = scope_tag, "Failed to find the scope node in the test data, using the whole document");
        return view;
    };

    let parent = doc.parent_of(scope_node).unwrap_or_else(|| doc.document_node_id());
    view.hidden = doc
        .element_children(parent)
        .into_iter()
        .filter(|&sibling| {
            !doc.node_name(sibling)
                .map_or(false, |name| name.eq_ignore_ascii_case(scope_tag))
        })
        .collect();
    view.scope_node = Some(scope_node);

    debug!(scope = scope_tag, hidden = view.hidden.len(), "Applied test data scope");
    view
}

impl DocumentAccess for ScopedView<'_> {
    fn get_node(&self, id: NodeId) -> Option<&XmlNode> {
        self.doc.get_node(id)
    }

    fn attributes(&self, id: NodeId) -> &[XmlAttribute] {
        self.doc.attributes(id)
    }

    fn strings(&self) -> &StringPool {
        self.doc.strings()
    }

    fn root_element_id(&self) -> Option<NodeId> {
        self.doc.root_element_id()
    }

    fn is_visible(&self, id: NodeId) -> bool {
        !self.hidden.contains(&id)
    }
}
