//! XML Entity Decoding
//!
//! Handles decoding of XML entities:
//! - Built-in entities: &lt; &gt; &amp; &quot; &apos;
//! - Numeric character references: &#123; &#x7B;
//!
//! Uses Cow for zero-copy when no entities are present.

use memchr::memchr;
use std::borrow::Cow;

/// Decode text content, handling entity references
///
/// Returns Borrowed if no entities present (zero-copy),
/// returns Owned if entities were decoded. Unknown or unterminated
/// references are kept as written.
#[inline]
pub fn decode_text(input: &[u8]) -> Cow<'_, [u8]> {
    if memchr(b'&', input).is_none() {
        return Cow::Borrowed(input);
    }
    match decode_entities(input, false) {
        Ok(decoded) => Cow::Owned(decoded),
        // Lenient decoding never reports errors
        Err(_) => Cow::Borrowed(input),
    }
}

/// Decode text content in strict mode
///
/// Without a DTD only the predefined entities exist, so a bare '&',
/// an unknown entity or a reference to a non-XML character is an error.
pub fn decode_text_strict(input: &[u8]) -> Result<Cow<'_, [u8]>, &'static str> {
    if input.iter().any(|&b| !is_valid_xml_byte(b)) {
        return Err("Invalid XML character in content");
    }

    if memchr(b'&', input).is_none() {
        return Ok(Cow::Borrowed(input));
    }
    decode_entities(input, true).map(Cow::Owned)
}

fn decode_entities(input: &[u8], strict: bool) -> Result<Vec<u8>, &'static str> {
    let mut result = Vec::with_capacity(input.len());
    let mut pos = 0;

    while let Some(amp_offset) = memchr(b'&', &input[pos..]) {
        result.extend_from_slice(&input[pos..pos + amp_offset]);
        pos += amp_offset;

        let decoded = memchr(b';', &input[pos..]).and_then(|semi_offset| {
            decode_entity(&input[pos + 1..pos + semi_offset], strict).map(|c| (c, semi_offset))
        });

        match decoded {
            Some((c, semi_offset)) => {
                let mut buf = [0u8; 4];
                result.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                pos += semi_offset + 1;
            }
            None if strict => return Err("Bare '&' or undeclared entity reference"),
            None => {
                result.push(b'&');
                pos += 1;
            }
        }
    }

    result.extend_from_slice(&input[pos..]);
    Ok(result)
}

/// Decode a single entity (without & and ;)
fn decode_entity(entity: &[u8], strict: bool) -> Option<char> {
    match entity {
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"amp" => Some('&'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', rest @ ..] => decode_numeric_entity(rest, strict),
        _ => None,
    }
}

/// Decode a numeric character reference with optional strict XML character validation
fn decode_numeric_entity(entity: &[u8], strict: bool) -> Option<char> {
    let codepoint = match entity {
        [b'x', hex @ ..] | [b'X', hex @ ..] => {
            u32::from_str_radix(std::str::from_utf8(hex).ok()?, 16).ok()?
        }
        _ => std::str::from_utf8(entity).ok()?.parse::<u32>().ok()?,
    };

    if strict && !is_valid_xml_char(codepoint) {
        return None;
    }
    char::from_u32(codepoint)
}

/// Check if a code point is a valid XML 1.0 Char
/// Char ::= #x9 | #xA | #xD | [#x20-#xD7FF] | [#xE000-#xFFFD] | [#x10000-#x10FFFF]
#[inline]
pub fn is_valid_xml_char(codepoint: u32) -> bool {
    matches!(codepoint,
        0x9 | 0xA | 0xD |
        0x20..=0xD7FF |
        0xE000..=0xFFFD |
        0x10000..=0x10FFFF
    )
}

/// Check if a byte is a valid XML Char (for single-byte content validation)
#[inline]
pub fn is_valid_xml_byte(b: u8) -> bool {
    // Bytes 0x80+ are potentially valid UTF-8 sequences, checked later as UTF-8
    matches!(b, 0x9 | 0xA | 0xD | 0x20..=0x7F) || b >= 0x80
}
