//! XML Attribute Parsing
//!
//! Parses XML attributes from tag content.

use super::entities::{decode_text, decode_text_strict};
use super::scanner::{is_name_char, is_name_start_char, is_whitespace};
use std::borrow::Cow;

/// A parsed XML attribute
#[derive(Debug, Clone)]
pub struct Attribute<'a> {
    /// Attribute name as written (a prefix, if any, is kept)
    pub name: Cow<'a, [u8]>,
    /// Attribute value (entities decoded)
    pub value: Cow<'a, [u8]>,
}

impl<'a> Attribute<'a> {
    /// Create a new attribute
    pub fn new(name: &'a [u8], value: Cow<'a, [u8]>) -> Self {
        Attribute {
            name: Cow::Borrowed(name),
            value,
        }
    }

    /// Get the name as a string
    pub fn name_str(&self) -> Option<&str> {
        std::str::from_utf8(self.name.as_ref()).ok()
    }

    /// Get the value as a string
    pub fn value_str(&self) -> Option<&str> {
        std::str::from_utf8(self.value.as_ref()).ok()
    }
}

/// Parse attributes from raw tag content (after the element name)
///
/// Input should be the content between element name and '>' or '/>'
pub fn parse_attributes(input: &[u8]) -> Vec<Attribute<'_>> {
    parse_attributes_with_validation(input, false).0
}

/// Parse attributes, failing on the first well-formedness violation
pub fn parse_attributes_strict(input: &[u8]) -> Result<Vec<Attribute<'_>>, &'static str> {
    let (attrs, error) = parse_attributes_with_validation(input, true);
    match error {
        Some(msg) => Err(msg),
        None => Ok(attrs),
    }
}

fn parse_attributes_with_validation(
    input: &[u8],
    strict: bool,
) -> (Vec<Attribute<'_>>, Option<&'static str>) {
    let mut attrs: Vec<Attribute<'_>> = Vec::new();
    let mut pos = 0;

    loop {
        let had_space = pos < input.len() && is_whitespace(input[pos]);
        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() || input[pos] == b'/' || input[pos] == b'>' {
            break;
        }

        if strict && !had_space {
            return (attrs, Some("Whitespace required between attributes"));
        }

        if !is_name_start_char(input[pos]) {
            if strict {
                return (attrs, Some("Attribute name must start with letter, underscore, or colon"));
            }
            pos += 1;
            continue;
        }

        let name_start = pos;
        while pos < input.len() && is_name_char(input[pos]) {
            pos += 1;
        }
        let name = &input[name_start..pos];

        if strict && attrs.iter().any(|a| a.name.as_ref() == name) {
            return (attrs, Some("Duplicate attribute"));
        }

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }

        if pos >= input.len() || input[pos] != b'=' {
            if strict {
                return (attrs, Some("Attribute value required"));
            }
            // Attribute without value (like HTML boolean attributes)
            attrs.push(Attribute::new(name, Cow::Borrowed(b"")));
            continue;
        }
        pos += 1;

        while pos < input.len() && is_whitespace(input[pos]) {
            pos += 1;
        }
        if pos >= input.len() {
            if strict {
                return (attrs, Some("Attribute value required"));
            }
            break;
        }

        let quote = input[pos];
        if quote != b'"' && quote != b'\'' {
            if strict {
                return (attrs, Some("Attribute value must be quoted"));
            }
            // Unquoted value (non-standard but handle it)
            let value_start = pos;
            while pos < input.len() && !is_whitespace(input[pos]) && input[pos] != b'/' && input[pos] != b'>' {
                pos += 1;
            }
            attrs.push(Attribute::new(name, decode_text(&input[value_start..pos])));
            continue;
        }

        pos += 1;
        let value_start = pos;
        while pos < input.len() && input[pos] != quote {
            pos += 1;
        }

        if pos >= input.len() && strict {
            return (attrs, Some("Attribute value has mismatched quotes"));
        }

        let raw = &input[value_start..pos];
        let value = if strict {
            if memchr::memchr(b'<', raw).is_some() {
                return (attrs, Some("Attribute value cannot contain '<'"));
            }
            match decode_text_strict(raw) {
                Ok(v) => v,
                Err(msg) => return (attrs, Some(msg)),
            }
        } else {
            decode_text(raw)
        };
        attrs.push(Attribute::new(name, value));

        if pos < input.len() {
            pos += 1; // Skip closing quote
        }
    }

    (attrs, None)
}
