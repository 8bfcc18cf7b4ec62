//! XPath Lexer
//!
//! Tokenizes XPath expressions into tokens.

/// XPath token types
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Operators
    Slash,       // /
    DoubleSlash, // //
    Dot,         // .
    DoubleDot,   // ..
    At,          // @
    Pipe,        // |
    Plus,        // +
    Minus,       // -
    Star,        // *
    Eq,          // =
    NotEq,       // !=
    Lt,          // <
    LtEq,        // <=
    Gt,          // >
    GtEq,        // >=
    And,         // and
    Or,          // or
    Mod,         // mod
    Div,         // div

    // Brackets
    LeftParen,    // (
    RightParen,   // )
    LeftBracket,  // [
    RightBracket, // ]

    // Literals
    Number(f64),
    String(String),

    /// Element, attribute or function name, prefix included (`p:name`)
    Name(String),
    /// `prefix:*`
    PrefixWildcard(String),
    /// node(), text(), comment(), processing-instruction()
    NodeType(String),
    /// Axis name; the trailing `::` is consumed with it
    Axis(String),

    Comma,

    Eof,
}

/// XPath lexer
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    /// Whether the previous token can end an operand; decides if `*` and
    /// `and`/`or`/`mod`/`div` are operators or name tests
    after_operand: bool,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            input,
            pos: 0,
            after_operand: false,
        }
    }

    fn remaining(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.remaining().chars().next()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.remaining().chars().nth(offset)
    }

    fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.advance(c.len_utf8());
        }
    }

    /// Get the next token
    pub fn next_token(&mut self) -> Result<Token, String> {
        let token = self.scan()?;
        self.after_operand = match token {
            // `*` after an operand is multiplication, otherwise a name test
            Token::Star => !self.after_operand,
            Token::Name(_)
            | Token::PrefixWildcard(_)
            | Token::Number(_)
            | Token::String(_)
            | Token::RightParen
            | Token::RightBracket
            | Token::Dot
            | Token::DoubleDot => true,
            _ => false,
        };
        Ok(token)
    }

    fn scan(&mut self) -> Result<Token, String> {
        self.skip_whitespace();

        let c = match self.peek() {
            Some(c) => c,
            None => return Ok(Token::Eof),
        };

        let two = |lexer: &mut Self, next: char, long: Token, short: Token| {
            lexer.advance(1);
            if lexer.peek() == Some(next) {
                lexer.advance(1);
                long
            } else {
                short
            }
        };

        let token = match c {
            '/' => two(self, '/', Token::DoubleSlash, Token::Slash),
            '.' if self.peek_at(1).map_or(false, |d| d.is_ascii_digit()) => self.read_number(),
            '.' => two(self, '.', Token::DoubleDot, Token::Dot),
            '<' => two(self, '=', Token::LtEq, Token::Lt),
            '>' => two(self, '=', Token::GtEq, Token::Gt),
            '!' if self.peek_at(1) == Some('=') => {
                self.advance(2);
                Token::NotEq
            }
            '"' | '\'' => self.read_string()?,
            '0'..='9' => self.read_number(),
            '$' => return Err("Variable references are not supported".to_string()),
            _ if is_name_start_char(c) => self.read_name_or_keyword(),
            _ => {
                let single = match c {
                    '@' => Token::At,
                    '|' => Token::Pipe,
                    '+' => Token::Plus,
                    '-' => Token::Minus,
                    '*' => Token::Star,
                    '=' => Token::Eq,
                    '(' => Token::LeftParen,
                    ')' => Token::RightParen,
                    '[' => Token::LeftBracket,
                    ']' => Token::RightBracket,
                    ',' => Token::Comma,
                    _ => return Err(format!("Unexpected character '{}' at offset {}", c, self.pos)),
                };
                self.advance(1);
                single
            }
        };
        Ok(token)
    }

    fn read_number(&mut self) -> Token {
        let start = self.pos;
        while self.peek().map_or(false, |c| c.is_ascii_digit()) {
            self.advance(1);
        }
        if self.peek() == Some('.') {
            self.advance(1);
            while self.peek().map_or(false, |c| c.is_ascii_digit()) {
                self.advance(1);
            }
        }
        Token::Number(self.input[start..self.pos].parse().unwrap_or(f64::NAN))
    }

    fn read_string(&mut self) -> Result<Token, String> {
        let quote_at = self.pos;
        let quote = &self.input[quote_at..quote_at + 1];
        self.advance(1);

        match self.remaining().find(quote) {
            Some(len) => {
                let value = self.remaining()[..len].to_string();
                self.advance(len + 1);
                Ok(Token::String(value))
            }
            None => Err(format!("Unterminated string literal at offset {}", quote_at)),
        }
    }

    fn read_ncname(&mut self) -> &'a str {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !is_name_char(c) {
                break;
            }
            self.advance(c.len_utf8());
        }
        &self.input[start..self.pos]
    }

    fn read_name_or_keyword(&mut self) -> Token {
        let name = self.read_ncname();

        if self.after_operand {
            match name {
                "and" => return Token::And,
                "or" => return Token::Or,
                "mod" => return Token::Mod,
                "div" => return Token::Div,
                _ => {}
            }
        }

        // prefix:local or prefix:*
        if self.peek() == Some(':') && self.peek_at(1) != Some(':') {
            if self.peek_at(1) == Some('*') {
                self.advance(2);
                return Token::PrefixWildcard(name.to_string());
            }
            if self.peek_at(1).map_or(false, is_name_start_char) {
                self.advance(1);
                let local = self.read_ncname();
                return Token::Name(format!("{}:{}", name, local));
            }
        }

        let save = self.pos;
        self.skip_whitespace();
        if self.remaining().starts_with("::") {
            self.advance(2);
            return Token::Axis(name.to_string());
        }
        if self.peek() == Some('(')
            && matches!(name, "node" | "text" | "comment" | "processing-instruction")
        {
            return Token::NodeType(name.to_string());
        }
        self.pos = save;
        Token::Name(name.to_string())
    }

    /// Tokenize entire input
    pub fn tokenize(&mut self) -> Result<Vec<Token>, String> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }
}

fn is_name_start_char(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}
