//! XML Tokenizer - pull parser over markup and text
//!
//! Extracts one token per call:
//! - Element start/end/empty tags
//! - Text content (entities decoded)
//! - CDATA sections
//! - Comments
//! - Processing instructions and the XML declaration
//! - DOCTYPE (skipped over, internal subset included)
//!
//! Lenient mode stops quietly at the first construct it cannot read.
//! Strict mode records a [`ParseError`] instead.

use super::entities::{decode_text, decode_text_strict};
use super::scanner::{is_whitespace, Scanner};
use std::borrow::Cow;
use std::fmt;

/// Type of XML token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Element start tag: <element>
    StartTag,
    /// Element end tag: </element>
    EndTag,
    /// Empty element: <element/>
    EmptyTag,
    /// Text content
    Text,
    /// CDATA section: <![CDATA[...]]>
    CData,
    /// Comment: <!--...-->
    Comment,
    /// Processing instruction: <?target ...?>
    ProcessingInstruction,
    /// XML declaration: <?xml ...?>
    XmlDeclaration,
    /// DOCTYPE declaration
    DocType,
    /// End of input
    Eof,
}

/// A parsed XML token
#[derive(Debug, Clone)]
pub struct Token<'a> {
    pub kind: TokenKind,
    /// Raw span in input (start, end)
    pub span: (usize, usize),
    /// Element name or PI target
    pub name: Option<&'a [u8]>,
    /// Text, CDATA, comment or PI data
    pub content: Option<Cow<'a, [u8]>>,
}

impl<'a> Token<'a> {
    fn new(kind: TokenKind, span: (usize, usize)) -> Self {
        Token {
            kind,
            span,
            name: None,
            content: None,
        }
    }

    fn with_name(mut self, name: &'a [u8]) -> Self {
        self.name = Some(name);
        self
    }

    fn with_content(mut self, content: Cow<'a, [u8]>) -> Self {
        self.content = Some(content);
        self
    }
}

/// Well-formedness error with the byte offset where it was detected
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub message: String,
    pub position: usize,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        ParseError {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at byte {}", self.message, self.position)
    }
}

impl std::error::Error for ParseError {}

/// XML tokenizer implementing a pull-parser pattern
pub struct Tokenizer<'a> {
    scanner: Scanner<'a>,
    strict: bool,
    started: bool,
    done: bool,
    error: Option<ParseError>,
}

impl<'a> Tokenizer<'a> {
    /// Create a new tokenizer for the given input (lenient mode)
    pub fn new(input: &'a [u8]) -> Self {
        Tokenizer {
            scanner: Scanner::new(input),
            strict: false,
            started: false,
            done: false,
            error: None,
        }
    }

    /// Create a new tokenizer in strict mode
    pub fn new_strict(input: &'a [u8]) -> Self {
        Tokenizer {
            strict: true,
            ..Tokenizer::new(input)
        }
    }

    /// Get the parse error, if one was recorded (strict mode only)
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    /// Take ownership of the recorded parse error
    pub fn take_error(&mut self) -> Option<ParseError> {
        self.error.take()
    }

    /// Get the current position in the input
    pub fn position(&self) -> usize {
        self.scanner.position()
    }

    /// Record an error at `position` and stop. Returns `None` for `?` chaining.
    fn fail<T>(&mut self, message: &str, position: usize) -> Option<T> {
        if self.strict && self.error.is_none() {
            self.error = Some(ParseError::new(message, position));
        }
        self.done = true;
        None
    }

    /// Get the next token, or None once input is exhausted or unreadable
    pub fn next_token(&mut self) -> Option<Token<'a>> {
        if self.done {
            return None;
        }

        if !self.started {
            self.started = true;
            if !self.strict {
                self.scanner.skip_whitespace();
            }
        }

        let pos = self.scanner.position();
        match self.scanner.peek() {
            None => {
                self.done = true;
                Some(Token::new(TokenKind::Eof, (pos, pos)))
            }
            Some(b'<') => self.parse_markup(),
            Some(_) => self.parse_text(),
        }
    }

    fn parse_markup(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        self.scanner.advance(1);

        match self.scanner.peek() {
            Some(b'/') => self.parse_end_tag(start),
            Some(b'!') => self.parse_bang_markup(start),
            Some(b'?') => self.parse_pi(start),
            Some(_) => self.parse_start_tag(start),
            None => self.fail("Unexpected end of input after '<'", start),
        }
    }

    fn parse_start_tag(&mut self, start: usize) -> Option<Token<'a>> {
        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => {
                return self.fail(
                    "Invalid element name: must start with letter, underscore, or colon",
                    start,
                )
            }
        };

        let end = match self.scanner.find_tag_end_quoted() {
            Some(end) => end,
            None => return self.fail("Unterminated start tag", start),
        };

        let is_empty = self.scanner.slice(end - 1, end) == b"/";
        self.scanner.set_position(end + 1);

        let kind = if is_empty { TokenKind::EmptyTag } else { TokenKind::StartTag };
        Some(Token::new(kind, (start, end + 1)).with_name(name))
    }

    fn parse_end_tag(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '/'

        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return self.fail("Invalid element name in end tag", start),
        };

        self.scanner.skip_whitespace();
        if self.scanner.peek() != Some(b'>') {
            if self.strict || self.scanner.is_eof() {
                return self.fail("End tag cannot have attributes or other content", start);
            }
            match self.scanner.find_tag_end_quoted() {
                Some(end) => self.scanner.set_position(end),
                None => return self.fail("Unterminated end tag", start),
            }
        }
        self.scanner.advance(1);

        Some(Token::new(TokenKind::EndTag, (start, self.scanner.position())).with_name(name))
    }

    fn parse_bang_markup(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '!'

        if self.scanner.starts_with(b"--") {
            self.parse_comment(start)
        } else if self.scanner.starts_with(b"[CDATA[") {
            self.parse_cdata(start)
        } else if self.scanner.starts_with(b"DOCTYPE") {
            self.parse_doctype(start)
        } else {
            self.fail("Invalid declaration - expected comment, CDATA, or DOCTYPE", start)
        }
    }

    fn parse_comment(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(2); // Skip '--'
        let content_start = self.scanner.position();

        let end = match self.scanner.find_sequence(b"-->") {
            Some(end) => end,
            None => return self.fail("Unterminated comment", start),
        };
        let content = self.scanner.slice(content_start, end);

        if self.strict && (memchr::memmem::find(content, b"--").is_some() || content.ends_with(b"-")) {
            return self.fail("Comment cannot contain '--'", content_start);
        }

        self.scanner.set_position(end + 3);
        Some(
            Token::new(TokenKind::Comment, (start, self.scanner.position()))
                .with_content(Cow::Borrowed(content)),
        )
    }

    fn parse_cdata(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(7); // Skip '[CDATA['
        let content_start = self.scanner.position();

        let end = match self.scanner.find_sequence(b"]]>") {
            Some(end) => end,
            None => return self.fail("Unterminated CDATA section", start),
        };
        let content = self.scanner.slice(content_start, end);

        self.scanner.set_position(end + 3);
        Some(
            Token::new(TokenKind::CData, (start, self.scanner.position()))
                .with_content(Cow::Borrowed(content)),
        )
    }

    /// Skip a DOCTYPE declaration, including any bracketed internal subset
    fn parse_doctype(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(7); // Skip 'DOCTYPE'

        let mut depth = 0usize;
        let mut quote: Option<u8> = None;
        while let Some(b) = self.scanner.peek() {
            self.scanner.advance(1);
            match (quote, b) {
                (Some(q), _) if q == b => quote = None,
                (Some(_), _) => {}
                (None, b'"') | (None, b'\'') => quote = Some(b),
                (None, b'[') => depth += 1,
                (None, b']') => depth = depth.saturating_sub(1),
                (None, b'>') if depth == 0 => {
                    return Some(Token::new(TokenKind::DocType, (start, self.scanner.position())));
                }
                _ => {}
            }
        }
        self.fail("Unterminated DOCTYPE declaration", start)
    }

    fn parse_pi(&mut self, start: usize) -> Option<Token<'a>> {
        self.scanner.advance(1); // Skip '?'

        let name = match self.scanner.read_name() {
            Some(name) => name,
            None => return self.fail("Invalid processing instruction target", start),
        };

        let is_xml_decl = name == b"xml";
        if self.strict {
            if !is_xml_decl && name.eq_ignore_ascii_case(b"xml") {
                return self.fail("Processing instruction target 'xml' is reserved", start);
            }
            if is_xml_decl && start != 0 {
                return self.fail("XML declaration must be at the very start of the document", start);
            }
        }

        let data_start = self.scanner.position();
        let end = match self.scanner.find_sequence(b"?>") {
            Some(end) => end,
            None => return self.fail("Unterminated processing instruction", start),
        };

        let data = self.scanner.slice(data_start, end);
        let data_trimmed = match data.iter().position(|&b| !is_whitespace(b)) {
            Some(offset) => &data[offset..],
            None => &data[data.len()..],
        };

        self.scanner.set_position(end + 2);
        let kind = if is_xml_decl { TokenKind::XmlDeclaration } else { TokenKind::ProcessingInstruction };
        Some(
            Token::new(kind, (start, self.scanner.position()))
                .with_name(name)
                .with_content(Cow::Borrowed(data_trimmed)),
        )
    }

    fn parse_text(&mut self) -> Option<Token<'a>> {
        let start = self.scanner.position();
        let end = self
            .scanner
            .find_tag_start()
            .unwrap_or(start + self.scanner.remaining().len());
        let raw = self.scanner.slice(start, end);

        let content = if self.strict {
            if memchr::memmem::find(raw, b"]]>").is_some() {
                return self.fail("Text cannot contain ']]>'", start);
            }
            match decode_text_strict(raw) {
                Ok(content) => content,
                Err(msg) => return self.fail(msg, start),
            }
        } else {
            decode_text(raw)
        };

        self.scanner.set_position(end);
        Some(Token::new(TokenKind::Text, (start, end)).with_content(content))
    }
}

/// Iterator adapter for tokenizer
impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token()?;
        if token.kind == TokenKind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        Tokenizer::new(input).map(|t| t.kind).collect()
    }

    #[test]
    fn test_basic_tokens() {
        assert_eq!(
            kinds(b"<a x=\"1\">hi<b/></a>"),
            vec![
                TokenKind::StartTag,
                TokenKind::Text,
                TokenKind::EmptyTag,
                TokenKind::EndTag
            ]
        );
    }

    #[test]
    fn test_comment_cdata_pi() {
        let tokens: Vec<_> = Tokenizer::new(b"<?xml version=\"1.0\"?><r><!-- c --><![CDATA[<x>]]><?app go?></r>").collect();
        assert_eq!(tokens[0].kind, TokenKind::XmlDeclaration);
        assert_eq!(tokens[2].kind, TokenKind::Comment);
        assert_eq!(tokens[3].kind, TokenKind::CData);
        assert_eq!(tokens[3].content.as_deref(), Some(b"<x>" as &[u8]));
        assert_eq!(tokens[4].kind, TokenKind::ProcessingInstruction);
        assert_eq!(tokens[4].name, Some(b"app" as &[u8]));
        assert_eq!(tokens[4].content.as_deref(), Some(b"go" as &[u8]));
    }

    #[test]
    fn test_doctype_with_internal_subset() {
        let tokens: Vec<_> = Tokenizer::new(b"<!DOCTYPE r [<!ELEMENT r (#PCDATA)>]><r/>").collect();
        assert_eq!(tokens[0].kind, TokenKind::DocType);
        assert_eq!(tokens[1].kind, TokenKind::EmptyTag);
    }

    #[test]
    fn test_text_entities_decoded() {
        let tokens: Vec<_> = Tokenizer::new(b"<r>a &amp; b</r>").collect();
        assert_eq!(tokens[1].content.as_deref(), Some(b"a & b" as &[u8]));
    }

    #[test]
    fn test_strict_unterminated_comment() {
        let mut tok = Tokenizer::new_strict(b"<r><!-- oops</r>");
        while tok.next_token().is_some() {}
        assert!(tok.error().is_some());
    }

    #[test]
    fn test_strict_double_dash_in_comment() {
        let mut tok = Tokenizer::new_strict(b"<r><!-- a -- b --></r>");
        while tok.next_token().is_some() {}
        assert!(tok.error().is_some());
    }

    #[test]
    fn test_strict_declaration_not_first() {
        let mut tok = Tokenizer::new_strict(b" <?xml version=\"1.0\"?><r/>");
        while tok.next_token().is_some() {}
        assert!(tok.error().is_some());
    }

    #[test]
    fn test_strict_bad_name() {
        let mut tok = Tokenizer::new_strict(b"<1r/>");
        assert!(tok.next_token().is_none());
        assert!(tok.error().is_some());
    }

    #[test]
    fn test_lenient_stops_without_error() {
        let mut tok = Tokenizer::new(b"<r><!-- oops");
        while tok.next_token().is_some() {}
        assert!(tok.error().is_none());
    }
}
