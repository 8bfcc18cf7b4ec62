//! Pointer values
//!
//! A leaf whose text starts with `//` is a pointer to another node of the
//! same document, e.g. `<ref>//Root/Other/val</ref>`. The pointer is
//! evaluated as `<pointer>/text()` against the whole loaded document, not
//! the scoped view, so shared values can live outside every scope.

use crate::dom::XmlDocument;
use crate::xpath::{evaluate_string, XPathCache};
use std::collections::HashSet;
use tracing::debug;

/// Marker that turns leaf text into a pointer
pub const POINTER_MARKER: &str = "//";

/// Longest chain of pointers followed before giving up
pub const MAX_POINTER_DEPTH: usize = 16;

pub fn is_pointer(text: &str) -> bool {
    text.starts_with(POINTER_MARKER)
}

/// Resolves pointer values against one document
pub struct ReferenceResolver<'a> {
    doc: &'a XmlDocument,
    xpath: &'a XPathCache,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(doc: &'a XmlDocument, xpath: &'a XPathCache) -> Self {
        ReferenceResolver { doc, xpath }
    }

    /// Effective value of leaf text
    ///
    /// Non-pointer text comes back trimmed. Pointers are followed until a
    /// non-pointer value is reached; a pointer that matches nothing, does
    /// not compile, loops, or chains deeper than [`MAX_POINTER_DEPTH`]
    /// resolves to the empty string.
    pub fn resolve(&self, text: &str) -> String {
        let mut current = text.trim().to_string();
        let mut seen = HashSet::new();

        while is_pointer(&current) {
            if seen.len() == MAX_POINTER_DEPTH {
                debug!(pointer = %current, "Pointer chain too deep, using blank value");
                return String::new();
            }
            if !seen.insert(current.clone()) {
                debug!(pointer = %current, "Pointer cycle, using blank value");
                return String::new();
            }
            current = self.evaluate(&current);
        }

        current
    }

    /// Text of the first node a single pointer addresses
    fn evaluate(&self, pointer: &str) -> String {
        let normalized = if pointer.contains('\\') {
            debug!(pointer, "Replacing \\ with / in pointer");
            pointer.replace('\\', "/")
        } else {
            pointer.to_string()
        };
        let expr = format!("{}/text()", normalized);

        let result = self
            .xpath
            .get_or_compile(&expr)
            .and_then(|compiled| evaluate_string(self.doc, &compiled));
        match result {
            Ok(value) => {
                debug!(pointer = %normalized, value = %value, "Evaluated pointer");
                value.trim().to_string()
            }
            Err(e) => {
                debug!(pointer = %normalized, error = %e, "Pointer did not evaluate, using blank value");
                String::new()
            }
        }
    }
}
