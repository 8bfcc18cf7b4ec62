//! Fixture Engine
//!
//! Turns an XML test data document into nested lookups:
//! - `loader`: find, read and strictly parse the resource
//! - `scope`: hide sibling environment scopes
//! - `transform`: build the [`ResultMap`] for a root tag
//! - `reference`: follow `//` pointer values
//! - `navigate`: walk a built map along a slash-delimited path

pub mod loader;
pub mod navigate;
pub mod reference;
pub mod scope;
pub mod transform;
pub mod value;

pub use loader::{load_document, parse_document, resolve_resource};
pub use navigate::{count_keys_starting_with, navigate, split_path};
pub use reference::{is_pointer, ReferenceResolver};
pub use scope::{apply_scope, ScopedView};
pub use transform::transform;
pub use value::{insert_value, Attributes, ResultMap, Value, ATTRIBUTES_KEY, VALUE_KEY};

use crate::dom::XmlDocument;
use crate::error::Result;
use crate::xpath::XPathCache;
use std::path::PathBuf;

/// Build the fixture of `root_tag` from an already loaded document
///
/// The transform runs on the scoped view; pointers resolve against the
/// whole document.
pub fn build_from_document(doc: &XmlDocument, scope_tag: &str, root_tag: &str, xpath: &XPathCache) -> ResultMap {
    let view = apply_scope(doc, scope_tag);
    let resolver = ReferenceResolver::new(doc, xpath);
    transform(&view, root_tag, &resolver)
}

/// Load `resource` and build the fixture of `root_tag`
pub fn build_fixture(
    resource: &str,
    roots: &[PathBuf],
    scope_tag: &str,
    root_tag: &str,
    xpath: &XPathCache,
) -> Result<ResultMap> {
    let doc = load_document(resource, roots)?;
    Ok(build_from_document(&doc, scope_tag, root_tag, xpath))
}
