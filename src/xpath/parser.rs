//! XPath Parser
//!
//! Recursive descent parser for XPath 1.0 expressions.

use super::lexer::{Lexer, Token};

/// XPath expression AST node
#[derive(Debug, Clone)]
pub enum Expr {
    /// The document node (`/`)
    Root,
    /// The context node, start of a relative location path
    ContextNode,
    /// A location step applied to every node of the base expression
    Path(Box<Expr>, Step),
    /// Filter expression with predicate
    Filter(Box<Expr>, Box<Expr>),
    /// Union of two expressions (|)
    Union(Box<Expr>, Box<Expr>),
    /// Function call
    Function(String, Vec<Expr>),
    /// Binary operation
    Binary(Box<Expr>, BinaryOp, Box<Expr>),
    /// Unary negation
    Negate(Box<Expr>),
    /// Literal number
    Number(f64),
    /// Literal string
    String(String),
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// Location step in a path
#[derive(Debug, Clone)]
pub struct Step {
    pub axis: Axis,
    pub node_test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    fn bare(axis: Axis, node_test: NodeTest) -> Self {
        Step {
            axis,
            node_test,
            predicates: Vec::new(),
        }
    }
}

/// Supported XPath axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Child,
    Descendant,
    DescendantOrSelf,
    Parent,
    Ancestor,
    AncestorOrSelf,
    FollowingSibling,
    PrecedingSibling,
    Self_,
    Attribute,
}

impl Axis {
    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "child" => Some(Axis::Child),
            "descendant" => Some(Axis::Descendant),
            "descendant-or-self" => Some(Axis::DescendantOrSelf),
            "parent" => Some(Axis::Parent),
            "ancestor" => Some(Axis::Ancestor),
            "ancestor-or-self" => Some(Axis::AncestorOrSelf),
            "following-sibling" => Some(Axis::FollowingSibling),
            "preceding-sibling" => Some(Axis::PrecedingSibling),
            "self" => Some(Axis::Self_),
            "attribute" => Some(Axis::Attribute),
            _ => None,
        }
    }
}

/// Node test in a location step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeTest {
    /// `*`
    Any,
    /// Elements (or attributes) with this exact name
    Name(String),
    /// `prefix:*`
    PrefixWildcard(String),
    /// node() - matches any node
    Node,
    /// text() - matches text and CDATA nodes
    Text,
    /// comment()
    Comment,
    /// processing-instruction() with an optional target
    ProcessingInstruction(Option<String>),
}

/// XPath parser
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current: Token,
    peeked: Option<Token>,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Result<Self, String> {
        let mut lexer = Lexer::new(input);
        let current = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current,
            peeked: None,
        })
    }

    /// Parse a complete XPath expression
    pub fn parse(&mut self) -> Result<Expr, String> {
        let expr = self.parse_or_expr()?;
        if self.current != Token::Eof {
            return Err(format!("Unexpected token: {:?}", self.current));
        }
        Ok(expr)
    }

    fn advance(&mut self) -> Result<(), String> {
        self.current = match self.peeked.take() {
            Some(t) => t,
            None => self.lexer.next_token()?,
        };
        Ok(())
    }

    fn peek(&mut self) -> Result<&Token, String> {
        if self.peeked.is_none() {
            self.peeked = Some(self.lexer.next_token()?);
        }
        Ok(self.peeked.get_or_insert(Token::Eof))
    }

    fn expect(&mut self, token: Token) -> Result<(), String> {
        if self.current != token {
            return Err(format!("Expected {:?}, got {:?}", token, self.current));
        }
        self.advance()
    }

    /// Parse one left-associative precedence level
    fn parse_level(
        &mut self,
        operator: fn(&Token) -> Option<BinaryOp>,
        operand: fn(&mut Self) -> Result<Expr, String>,
    ) -> Result<Expr, String> {
        let mut left = operand(self)?;
        while let Some(op) = operator(&self.current) {
            self.advance()?;
            let right = operand(self)?;
            left = Expr::Binary(Box::new(left), op, Box::new(right));
        }
        Ok(left)
    }

    fn parse_or_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| matches!(t, Token::Or).then_some(BinaryOp::Or),
            Self::parse_and_expr,
        )
    }

    fn parse_and_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| matches!(t, Token::And).then_some(BinaryOp::And),
            Self::parse_equality_expr,
        )
    }

    fn parse_equality_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| match t {
                Token::Eq => Some(BinaryOp::Eq),
                Token::NotEq => Some(BinaryOp::NotEq),
                _ => None,
            },
            Self::parse_relational_expr,
        )
    }

    fn parse_relational_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| match t {
                Token::Lt => Some(BinaryOp::Lt),
                Token::LtEq => Some(BinaryOp::LtEq),
                Token::Gt => Some(BinaryOp::Gt),
                Token::GtEq => Some(BinaryOp::GtEq),
                _ => None,
            },
            Self::parse_additive_expr,
        )
    }

    fn parse_additive_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| match t {
                Token::Plus => Some(BinaryOp::Add),
                Token::Minus => Some(BinaryOp::Sub),
                _ => None,
            },
            Self::parse_multiplicative_expr,
        )
    }

    fn parse_multiplicative_expr(&mut self) -> Result<Expr, String> {
        self.parse_level(
            |t| match t {
                Token::Star => Some(BinaryOp::Mul),
                Token::Div => Some(BinaryOp::Div),
                Token::Mod => Some(BinaryOp::Mod),
                _ => None,
            },
            Self::parse_unary_expr,
        )
    }

    fn parse_unary_expr(&mut self) -> Result<Expr, String> {
        if self.current == Token::Minus {
            self.advance()?;
            let expr = self.parse_unary_expr()?;
            return Ok(Expr::Negate(Box::new(expr)));
        }
        self.parse_union_expr()
    }

    fn parse_union_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.parse_path_expr()?;
        while self.current == Token::Pipe {
            self.advance()?;
            let right = self.parse_path_expr()?;
            left = Expr::Union(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_path_expr(&mut self) -> Result<Expr, String> {
        let primary = self.at_primary_start()?;
        match self.current {
            Token::Slash => {
                self.advance()?;
                if !self.at_step_start() {
                    return Ok(Expr::Root);
                }
                let step = self.parse_step()?;
                self.parse_relative_path(Expr::Path(Box::new(Expr::Root), step))
            }
            Token::DoubleSlash => {
                self.advance()?;
                self.parse_descendant_step(Expr::Root)
            }
            _ if primary => {
                let mut expr = self.parse_primary_expr()?;
                while self.current == Token::LeftBracket {
                    let pred = self.parse_predicate()?;
                    expr = Expr::Filter(Box::new(expr), Box::new(pred));
                }
                self.parse_relative_path(expr)
            }
            _ => {
                let step = self.parse_step()?;
                self.parse_relative_path(Expr::Path(Box::new(Expr::ContextNode), step))
            }
        }
    }

    /// `base//step` is `base/descendant-or-self::node()/step`
    fn parse_descendant_step(&mut self, base: Expr) -> Result<Expr, String> {
        let desc = Expr::Path(Box::new(base), Step::bare(Axis::DescendantOrSelf, NodeTest::Node));
        let step = self.parse_step()?;
        self.parse_relative_path(Expr::Path(Box::new(desc), step))
    }

    /// Continue a path with any further `/step` or `//step`
    fn parse_relative_path(&mut self, mut expr: Expr) -> Result<Expr, String> {
        loop {
            match self.current {
                Token::Slash => {
                    self.advance()?;
                    let step = self.parse_step()?;
                    expr = Expr::Path(Box::new(expr), step);
                }
                Token::DoubleSlash => {
                    self.advance()?;
                    return self.parse_descendant_step(expr);
                }
                _ => return Ok(expr),
            }
        }
    }

    fn at_step_start(&self) -> bool {
        matches!(
            self.current,
            Token::Name(_)
                | Token::PrefixWildcard(_)
                | Token::Star
                | Token::NodeType(_)
                | Token::At
                | Token::Axis(_)
                | Token::Dot
                | Token::DoubleDot
        )
    }

    fn at_primary_start(&mut self) -> Result<bool, String> {
        Ok(match self.current {
            Token::Number(_) | Token::String(_) | Token::LeftParen => true,
            Token::Name(_) => matches!(self.peek()?, Token::LeftParen),
            _ => false,
        })
    }

    fn parse_primary_expr(&mut self) -> Result<Expr, String> {
        match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Number(n) => {
                self.advance()?;
                Ok(Expr::Number(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::LeftParen => {
                self.advance()?;
                let expr = self.parse_or_expr()?;
                self.expect(Token::RightParen)?;
                Ok(expr)
            }
            Token::Name(name) => {
                self.advance()?; // name
                self.advance()?; // (
                let args = self.parse_function_args()?;
                Ok(Expr::Function(name, args))
            }
            other => Err(format!("Unexpected token: {:?}", other)),
        }
    }

    fn parse_function_args(&mut self) -> Result<Vec<Expr>, String> {
        let mut args = Vec::new();
        if self.current != Token::RightParen {
            args.push(self.parse_or_expr()?);
            while self.current == Token::Comma {
                self.advance()?;
                args.push(self.parse_or_expr()?);
            }
        }
        self.expect(Token::RightParen)?;
        Ok(args)
    }

    fn parse_predicate(&mut self) -> Result<Expr, String> {
        self.expect(Token::LeftBracket)?;
        let pred = self.parse_or_expr()?;
        self.expect(Token::RightBracket)?;
        Ok(pred)
    }

    /// Parse a location step, including the `.`, `..` and `@` abbreviations
    fn parse_step(&mut self) -> Result<Step, String> {
        match self.current {
            Token::Dot => {
                self.advance()?;
                return Ok(Step::bare(Axis::Self_, NodeTest::Node));
            }
            Token::DoubleDot => {
                self.advance()?;
                return Ok(Step::bare(Axis::Parent, NodeTest::Node));
            }
            _ => {}
        }

        let axis = match &self.current {
            Token::At => {
                self.advance()?;
                Axis::Attribute
            }
            Token::Axis(name) => {
                let axis = Axis::from_name(name).ok_or_else(|| format!("Unsupported axis: {}", name))?;
                self.advance()?;
                axis
            }
            _ => Axis::Child,
        };

        let node_test = match std::mem::replace(&mut self.current, Token::Eof) {
            Token::Star => NodeTest::Any,
            Token::Name(name) => NodeTest::Name(name),
            Token::PrefixWildcard(prefix) => NodeTest::PrefixWildcard(prefix),
            Token::NodeType(kind) => {
                self.advance()?; // node type name
                self.expect(Token::LeftParen)?;
                let target = match &self.current {
                    Token::String(s) if kind == "processing-instruction" => Some(s.clone()),
                    _ => None,
                };
                if target.is_some() {
                    self.advance()?;
                }
                if self.current != Token::RightParen {
                    return Err("Expected ) after node type".to_string());
                }
                match kind.as_str() {
                    "node" => NodeTest::Node,
                    "text" => NodeTest::Text,
                    "comment" => NodeTest::Comment,
                    _ => NodeTest::ProcessingInstruction(target),
                }
            }
            other => return Err(format!("Expected node test, got {:?}", other)),
        };
        self.advance()?;

        let mut predicates = Vec::new();
        while self.current == Token::LeftBracket {
            predicates.push(self.parse_predicate()?);
        }

        Ok(Step {
            axis,
            node_test,
            predicates,
        })
    }
}

/// Parse an XPath expression string
pub fn parse(input: &str) -> Result<Expr, String> {
    Parser::new(input)?.parse()
}
