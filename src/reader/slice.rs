//! Zero-Copy Slice Parser
//!
//! Turns tokenizer output into [`XmlEvent`]s. Names and undecoded text
//! borrow from the input slice.

use super::events::{EndElement, StartElement, XmlEvent};
use crate::core::attributes::{parse_attributes, parse_attributes_strict, Attribute};
use crate::core::scanner::is_whitespace;
use crate::core::tokenizer::{ParseError, Token, TokenKind, Tokenizer};
use std::borrow::Cow;

/// Zero-copy XML reader from a byte slice
pub struct SliceReader<'a> {
    input: &'a [u8],
    tokenizer: Tokenizer<'a>,
    strict: bool,
    attr_error: Option<ParseError>,
}

impl<'a> SliceReader<'a> {
    /// Create a new slice reader (lenient mode)
    pub fn new(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new(input),
            strict: false,
            attr_error: None,
        }
    }

    /// Create a new slice reader in strict mode
    pub fn new_strict(input: &'a [u8]) -> Self {
        SliceReader {
            input,
            tokenizer: Tokenizer::new_strict(input),
            strict: true,
            attr_error: None,
        }
    }

    /// Get parse error (strict mode only)
    pub fn error(&self) -> Option<&ParseError> {
        self.attr_error.as_ref().or_else(|| self.tokenizer.error())
    }

    /// Take ownership of the parse error, if any
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.attr_error.take().or_else(|| self.tokenizer.take_error())
    }

    /// Byte offset of the next unread token
    pub fn position(&self) -> usize {
        self.tokenizer.position()
    }

    /// Get the next XML event
    pub fn next_event(&mut self) -> Option<XmlEvent<'a>> {
        if self.attr_error.is_some() {
            return None;
        }

        loop {
            let token = self.tokenizer.next_token()?;

            match token.kind {
                TokenKind::Eof => return Some(XmlEvent::EndDocument),

                TokenKind::StartTag | TokenKind::EmptyTag => {
                    let name = token.name?;
                    let attrs = self.parse_tag_attributes(&token, name.len())?;
                    let elem = StartElement::new(name, attrs);
                    return Some(if token.kind == TokenKind::EmptyTag {
                        XmlEvent::EmptyElement(elem)
                    } else {
                        XmlEvent::StartElement(elem)
                    });
                }

                TokenKind::EndTag => {
                    return Some(XmlEvent::EndElement(EndElement::new(token.name?)));
                }

                TokenKind::Text => {
                    if let Some(content) = token.content {
                        if !content.is_empty() {
                            return Some(XmlEvent::Text(content));
                        }
                    }
                }

                TokenKind::CData => return Some(XmlEvent::CData(token.content?)),

                TokenKind::Comment => return Some(XmlEvent::Comment(token.content?)),

                TokenKind::ProcessingInstruction => {
                    return Some(XmlEvent::ProcessingInstruction {
                        target: token.name?,
                        data: token.content,
                    });
                }

                TokenKind::XmlDeclaration => {
                    let name_len = token.name.map_or(0, |n| n.len());
                    let attrs = self.parse_tag_attributes(&token, name_len)?;
                    let find = |key: &[u8]| {
                        attrs
                            .iter()
                            .find(|a| a.name.as_ref() == key)
                            .map(|a| a.value.clone())
                    };
                    let version = find(&b"version"[..]).unwrap_or(Cow::Borrowed(b"1.0"));
                    let encoding = find(&b"encoding"[..]);
                    return Some(XmlEvent::XmlDeclaration { version, encoding });
                }

                TokenKind::DocType => {
                    let (start, end) = token.span;
                    return Some(XmlEvent::DocType(&self.input[start..end]));
                }
            }
        }
    }

    /// Parse the attribute region of a tag token
    ///
    /// Returns `None` (and records the error) when strict parsing fails.
    fn parse_tag_attributes(&mut self, token: &Token<'a>, name_len: usize) -> Option<Vec<Attribute<'a>>> {
        let (start, end) = token.span;
        let tag = &self.input[start..end];

        // '<' or '<?' plus the name
        let prefix = if tag.get(1) == Some(&b'?') { 2 } else { 1 };
        let attr_start = prefix + name_len;

        let mut attr_end = tag.len();
        if tag.ends_with(b"/>") || tag.ends_with(b"?>") {
            attr_end -= 2;
        } else if tag.ends_with(b">") {
            attr_end -= 1;
        }

        if attr_start >= attr_end {
            return Some(Vec::new());
        }
        let attr_content = &tag[attr_start..attr_end];

        if !self.strict {
            return Some(parse_attributes(attr_content));
        }

        if !is_whitespace(attr_content[0]) {
            self.attr_error = Some(ParseError::new("Whitespace required after element name", start));
            return None;
        }
        match parse_attributes_strict(attr_content) {
            Ok(attrs) => Some(attrs),
            Err(msg) => {
                self.attr_error = Some(ParseError::new(msg, start));
                None
            }
        }
    }
}

impl<'a> Iterator for SliceReader<'a> {
    type Item = XmlEvent<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_event()? {
            XmlEvent::EndDocument => None,
            event => Some(event),
        }
    }
}
