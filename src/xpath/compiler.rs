//! XPath Expression Compiler
//!
//! Flattens the parsed AST into a postfix op list for the stack evaluator,
//! and keeps recently compiled expressions in an LRU cache.

use super::parser::{Axis, BinaryOp, Expr, NodeTest, Step};
use lru::LruCache;
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Compiled XPath expression
#[derive(Debug, Clone)]
pub struct CompiledExpr {
    pub ops: Vec<Op>,
}

/// Compiled operation
#[derive(Debug, Clone)]
pub enum Op {
    /// Push the document node
    Root,
    /// Push the context node
    Context,
    /// Replace the node-set on top of the stack with the result of one step
    Step {
        axis: Axis,
        test: NodeTest,
        predicates: Vec<CompiledExpr>,
    },
    /// Filter the node-set on top of the stack
    Filter(CompiledExpr),
    /// Union two node sets
    Union,
    /// Push literal number
    Number(f64),
    /// Push literal string
    String(String),
    /// Call function: name, arg count
    Call(String, usize),
    Binary(BinaryOp),
    Negate,
}

impl CompiledExpr {
    pub fn compile(expr: &Expr) -> Self {
        let mut ops = Vec::new();
        compile_expr(expr, &mut ops);
        CompiledExpr { ops }
    }
}

fn compile_expr(expr: &Expr, ops: &mut Vec<Op>) {
    match expr {
        Expr::Root => ops.push(Op::Root),
        Expr::ContextNode => ops.push(Op::Context),
        Expr::Number(n) => ops.push(Op::Number(*n)),
        Expr::String(s) => ops.push(Op::String(s.clone())),
        Expr::Negate(inner) => {
            compile_expr(inner, ops);
            ops.push(Op::Negate);
        }
        Expr::Binary(left, op, right) => {
            compile_expr(left, ops);
            compile_expr(right, ops);
            ops.push(Op::Binary(*op));
        }
        Expr::Union(left, right) => {
            compile_expr(left, ops);
            compile_expr(right, ops);
            ops.push(Op::Union);
        }
        Expr::Path(base, step) => {
            compile_expr(base, ops);
            ops.push(compile_step(step));
        }
        Expr::Filter(base, pred) => {
            compile_expr(base, ops);
            ops.push(Op::Filter(CompiledExpr::compile(pred)));
        }
        Expr::Function(name, args) => {
            for arg in args {
                compile_expr(arg, ops);
            }
            ops.push(Op::Call(name.clone(), args.len()));
        }
    }
}

fn compile_step(step: &Step) -> Op {
    Op::Step {
        axis: step.axis,
        test: step.node_test.clone(),
        predicates: step.predicates.iter().map(CompiledExpr::compile).collect(),
    }
}

/// Compile an XPath expression string
pub fn compile(xpath: &str) -> Result<CompiledExpr, String> {
    let expr = super::parser::parse(xpath)?;
    Ok(CompiledExpr::compile(&expr))
}

/// Thread-safe LRU cache of compiled expressions, keyed by source text
pub struct XPathCache {
    compiled: Mutex<LruCache<String, Arc<CompiledExpr>>>,
}

impl XPathCache {
    /// A capacity of 0 is treated as 1
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        XPathCache {
            compiled: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return the cached compilation of `xpath`, compiling it on a miss
    ///
    /// Compile errors are not cached.
    pub fn get_or_compile(&self, xpath: &str) -> Result<Arc<CompiledExpr>, String> {
        if let Some(hit) = self.compiled.lock().get(xpath) {
            return Ok(Arc::clone(hit));
        }

        let compiled = Arc::new(compile(xpath)?);
        self.compiled.lock().put(xpath.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn len(&self) -> usize {
        self.compiled.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.lock().is_empty()
    }

    pub fn clear(&self) {
        self.compiled.lock().clear();
    }
}

impl Default for XPathCache {
    fn default() -> Self {
        XPathCache::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_absolute_path() {
        let compiled = compile("/Root/Other").unwrap();
        assert!(matches!(compiled.ops[0], Op::Root));
        assert_eq!(compiled.ops.len(), 3);
    }

    #[test]
    fn test_compile_step_predicates() {
        let compiled = compile("Case[1][@name='A']").unwrap();
        match &compiled.ops[1] {
            Op::Step { predicates, .. } => assert_eq!(predicates.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cache_reuses_compilation() {
        let cache = XPathCache::new(2);
        let first = cache.get_or_compile("//a").unwrap();
        let second = cache.get_or_compile("//a").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_evicts_least_recent() {
        let cache = XPathCache::new(2);
        let a = cache.get_or_compile("//a").unwrap();
        cache.get_or_compile("//b").unwrap();
        cache.get_or_compile("//c").unwrap();
        assert_eq!(cache.len(), 2);
        let a_again = cache.get_or_compile("//a").unwrap();
        assert!(!Arc::ptr_eq(&a, &a_again));
    }

    #[test]
    fn test_cache_skips_errors() {
        let cache = XPathCache::new(4);
        assert!(cache.get_or_compile("//[").is_err());
        assert!(cache.is_empty());
    }
}
