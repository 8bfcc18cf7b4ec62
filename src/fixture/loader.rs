//! Tree loader: resource lookup, decoding and strict parsing

use crate::core::encoding::convert_to_utf8;
use crate::dom::{ParseOptions, XmlDocument};
use crate::error::{Error, Result};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find a resource by name
///
/// Absolute names are used as given. Relative names are tried against each
/// root in order and the first existing file wins.
pub fn resolve_resource(name: &str, roots: &[PathBuf]) -> Result<PathBuf> {
    let not_found = || Error::ResourceNotFound { name: name.to_string() };
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(not_found());
    }

    let candidate = Path::new(trimmed);
    if candidate.is_absolute() {
        return if candidate.is_file() {
            Ok(candidate.to_path_buf())
        } else {
            Err(not_found())
        };
    }

    roots
        .iter()
        .map(|root| root.join(candidate))
        .find(|path| path.is_file())
        .ok_or_else(not_found)
}

/// Read a resource and parse it into a document
///
/// Whitespace-only text nodes are dropped. Any well-formedness problem,
/// undecodable text encoding included, is a `MalformedDocument` error.
pub fn load_document(name: &str, roots: &[PathBuf]) -> Result<XmlDocument> {
    let path = resolve_resource(name, roots)?;
    debug!(resource = %path.display(), "Reading test data file");

    let bytes = {
        let mut file = File::open(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::ResourceNotFound { name: name.to_string() },
            _ => Error::Io(e),
        })?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;
        bytes
    };

    parse_document(name, bytes)
}

/// Parse raw document bytes, naming `resource` in errors
pub fn parse_document(resource: &str, bytes: Vec<u8>) -> Result<XmlDocument> {
    let malformed = |message: String| Error::MalformedDocument {
        resource: resource.to_string(),
        message,
    };

    let utf8 = convert_to_utf8(bytes).map_err(malformed)?;
    if let Err(e) = std::str::from_utf8(&utf8) {
        return Err(malformed(format!("invalid UTF-8 at byte {}", e.valid_up_to())));
    }

    let options = ParseOptions {
        strict: true,
        keep_blank_text: false,
        ..ParseOptions::default()
    };
    XmlDocument::parse_with(&utf8, options).map_err(|e| malformed(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::DocumentAccess;
    use std::fs;

    #[test]
    fn test_resolve_searches_roots_in_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        fs::write(second.path().join("data.xml"), "<r/>").unwrap();

        let roots = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        assert_eq!(
            resolve_resource("data.xml", &roots).unwrap(),
            second.path().join("data.xml")
        );

        fs::write(first.path().join("data.xml"), "<r/>").unwrap();
        assert_eq!(
            resolve_resource("data.xml", &roots).unwrap(),
            first.path().join("data.xml")
        );
    }

    #[test]
    fn test_missing_resource() {
        let dir = tempfile::tempdir().unwrap();
        let roots = vec![dir.path().to_path_buf()];
        for name in ["absent.xml", "", "   "] {
            assert!(matches!(
                load_document(name, &roots),
                Err(Error::ResourceNotFound { .. })
            ));
        }
    }

    #[test]
    fn test_absolute_path_ignores_roots() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("abs.xml");
        fs::write(&path, "<r><a>1</a></r>").unwrap();
        let doc = load_document(path.to_str().unwrap(), &[]).unwrap();
        assert_eq!(doc.root_name(), Some("r"));
    }

    #[test]
    fn test_malformed_documents() {
        for bytes in [
            &b"<r><a></r>"[..],
            b"<r>",
            b"",
            b"<r>\xff\xfe</r>",
            b"<a/><b/>",
        ] {
            assert!(
                matches!(
                    parse_document("bad.xml", bytes.to_vec()),
                    Err(Error::MalformedDocument { .. })
                ),
                "expected malformed for {:?}",
                String::from_utf8_lossy(bytes)
            );
        }
    }

    #[test]
    fn test_deep_nesting_is_malformed() {
        let levels = 2000;
        let xml = format!("<r>{}x{}</r>", "<b>".repeat(levels), "</b>".repeat(levels));
        match parse_document("deep.xml", xml.into_bytes()) {
            Err(Error::MalformedDocument { resource, message }) => {
                assert_eq!(resource, "deep.xml");
                assert!(message.contains("nesting"), "{}", message);
            }
            other => panic!("unexpected {:?}", other.map(|doc| doc.node_count())),
        }
    }

    #[test]
    fn test_blank_text_is_dropped() {
        let doc = parse_document("t.xml", b"<r>\n  <a>1</a>\n</r>".to_vec()).unwrap();
        let root = doc.root_element_id().unwrap();
        assert_eq!(doc.children_vec(root).len(), 1);
    }

    #[test]
    fn test_utf16_input() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "<r>é</r>".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let doc = parse_document("u16.xml", bytes).unwrap();
        let root = doc.root_element_id().unwrap();
        let text = doc.first_child_of(root).unwrap();
        assert_eq!(doc.text_content(text), Some("é"));
    }
}
