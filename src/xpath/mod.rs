//! XPath 1.0 Engine
//!
//! Location paths over ten axes, predicates, the core string, number and
//! boolean functions, and an LRU cache of compiled expressions. Used by
//! the fixture engine to resolve pointer values.

pub mod axes;
pub mod compiler;
pub mod eval;
pub mod functions;
pub mod lexer;
pub mod parser;
pub mod value;

pub use compiler::{compile, CompiledExpr, XPathCache};
pub use eval::{evaluate, evaluate_compiled, evaluate_from_node, evaluate_string, EvalContext};
pub use value::XPathValue;
