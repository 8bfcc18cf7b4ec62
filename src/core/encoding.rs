//! Encoding detection for fixture documents
//!
//! Fixture files are usually UTF-8, but editors on Windows like to save
//! them as UTF-16 with a BOM. Everything past this module works on UTF-8.

const UTF8_BOM: [u8; 3] = [0xEF, 0xBB, 0xBF];

/// Byte encoding of an input document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XmlEncoding {
    Utf8,
    Utf16Le,
    Utf16Be,
}

impl XmlEncoding {
    /// Detect encoding from the byte order mark or the first bytes of `<`
    pub fn detect(input: &[u8]) -> Self {
        match input {
            [0xFF, 0xFE, ..] | [b'<', 0x00, ..] => XmlEncoding::Utf16Le,
            [0xFE, 0xFF, ..] | [0x00, b'<', ..] => XmlEncoding::Utf16Be,
            _ => XmlEncoding::Utf8,
        }
    }
}

/// Convert raw file bytes to UTF-8
///
/// A UTF-8 BOM is stripped. UTF-16 input is transcoded. UTF-8 validity
/// itself is checked later, by whoever turns the bytes into a `str`.
pub fn convert_to_utf8(mut input: Vec<u8>) -> Result<Vec<u8>, String> {
    match XmlEncoding::detect(&input) {
        XmlEncoding::Utf8 => {
            if input.starts_with(&UTF8_BOM) {
                input.drain(..UTF8_BOM.len());
            }
            Ok(input)
        }
        XmlEncoding::Utf16Le => decode_utf16(&input, [0xFF, 0xFE], "LE", u16::from_le_bytes),
        XmlEncoding::Utf16Be => decode_utf16(&input, [0xFE, 0xFF], "BE", u16::from_be_bytes),
    }
}

fn decode_utf16(
    input: &[u8],
    bom: [u8; 2],
    label: &str,
    unit: fn([u8; 2]) -> u16,
) -> Result<Vec<u8>, String> {
    let bytes = input.strip_prefix(&bom[..]).unwrap_or(input);
    if bytes.len() % 2 != 0 {
        return Err(format!("Invalid UTF-16 {}: odd number of bytes", label));
    }

    let units = bytes.chunks_exact(2).map(|pair| unit([pair[0], pair[1]]));
    char::decode_utf16(units)
        .collect::<Result<String, _>>()
        .map(String::into_bytes)
        .map_err(|e| format!("Invalid UTF-16 {}: {}", label, e))
}
