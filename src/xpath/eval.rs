//! XPath Evaluation Engine
//!
//! Evaluates compiled XPath expressions against any [`DocumentAccess`]
//! implementation with a value stack.

use super::axes::{matches_attribute_test, matches_node_test, navigate};
use super::compiler::{CompiledExpr, Op};
use super::functions;
use super::parser::{Axis, BinaryOp};
use super::value::{parse_number, XPathValue};
use crate::dom::{DocumentAccess, NodeId};
use std::collections::HashSet;

/// Evaluation context: document, context node, position and size
pub struct EvalContext<'a, D: DocumentAccess + ?Sized> {
    pub doc: &'a D,
    pub context_node: NodeId,
    pub context_position: usize,
    pub context_size: usize,
}

impl<'a, D: DocumentAccess + ?Sized> EvalContext<'a, D> {
    pub fn new(doc: &'a D, context_node: NodeId) -> Self {
        EvalContext {
            doc,
            context_node,
            context_position: 1,
            context_size: 1,
        }
    }
}

/// Evaluate an XPath expression with the document node as context
#[must_use = "XPath evaluation result should be used"]
pub fn evaluate<D: DocumentAccess + ?Sized>(doc: &D, xpath: &str) -> Result<XPathValue, String> {
    evaluate_from_node(doc, doc.document_node_id(), xpath)
}

/// Evaluate an XPath expression from a specific context node
#[must_use = "XPath evaluation result should be used"]
pub fn evaluate_from_node<D: DocumentAccess + ?Sized>(
    doc: &D,
    context_node: NodeId,
    xpath: &str,
) -> Result<XPathValue, String> {
    let compiled = super::compiler::compile(xpath)?;
    evaluate_compiled(&compiled, &EvalContext::new(doc, context_node))
}

/// Evaluate a compiled expression from the document node and convert the
/// result with string() semantics
pub fn evaluate_string<D: DocumentAccess + ?Sized>(doc: &D, expr: &CompiledExpr) -> Result<String, String> {
    let value = evaluate_compiled(expr, &EvalContext::new(doc, doc.document_node_id()))?;
    Ok(value.to_string_value(doc))
}

fn pop(stack: &mut Vec<XPathValue>) -> Result<XPathValue, String> {
    stack
        .pop()
        .ok_or_else(|| "Malformed expression: operand stack underflow".to_string())
}

fn pop_nodeset(stack: &mut Vec<XPathValue>, what: &str) -> Result<Vec<NodeId>, String> {
    match pop(stack)? {
        XPathValue::NodeSet(nodes) => Ok(nodes),
        other => Err(format!("{} requires a node-set, got {:?}", what, other)),
    }
}

/// Evaluate a compiled expression
pub fn evaluate_compiled<D: DocumentAccess + ?Sized>(
    expr: &CompiledExpr,
    ctx: &EvalContext<'_, D>,
) -> Result<XPathValue, String> {
    let mut stack: Vec<XPathValue> = Vec::with_capacity(4);

    for op in &expr.ops {
        match op {
            Op::Root => stack.push(XPathValue::single_node(ctx.doc.document_node_id())),

            Op::Context => stack.push(XPathValue::single_node(ctx.context_node)),

            Op::Step {
                axis: Axis::Attribute,
                test,
                predicates,
            } => {
                if !predicates.is_empty() {
                    return Err("Predicates on the attribute axis are not supported".to_string());
                }
                let nodes = pop_nodeset(&mut stack, "Attribute step")?;
                let values = nodes
                    .into_iter()
                    .flat_map(|node| ctx.doc.get_attribute_values(node))
                    .filter(|(name, _)| matches_attribute_test(name, test))
                    .map(|(_, value)| value.to_string())
                    .collect();
                stack.push(XPathValue::AttrValues(values));
            }

            Op::Step { axis, test, predicates } => {
                let nodes = pop_nodeset(&mut stack, "Location step")?;
                let mut seen = HashSet::with_capacity(nodes.len());
                let mut result = Vec::with_capacity(nodes.len());

                for node in nodes {
                    let mut candidates: Vec<NodeId> = navigate(ctx.doc, node, *axis)
                        .into_iter()
                        .filter(|&candidate| matches_node_test(ctx.doc, candidate, test))
                        .collect();
                    for predicate in predicates {
                        candidates = apply_predicate(ctx.doc, predicate, candidates)?;
                    }
                    result.extend(candidates.into_iter().filter(|&c| seen.insert(c)));
                }

                // Ids are assigned in document order
                result.sort_unstable();
                stack.push(XPathValue::NodeSet(result));
            }

            Op::Filter(predicate) => {
                let nodes = pop_nodeset(&mut stack, "Predicate")?;
                stack.push(XPathValue::NodeSet(apply_predicate(ctx.doc, predicate, nodes)?));
            }

            Op::Union => {
                let right = pop_nodeset(&mut stack, "Union")?;
                let mut result = pop_nodeset(&mut stack, "Union")?;
                let mut seen: HashSet<NodeId> = result.iter().copied().collect();
                result.extend(right.into_iter().filter(|&id| seen.insert(id)));
                result.sort_unstable();
                stack.push(XPathValue::NodeSet(result));
            }

            Op::Number(n) => stack.push(XPathValue::Number(*n)),

            Op::String(s) => stack.push(XPathValue::String(s.clone())),

            Op::Negate => {
                let value = pop(&mut stack)?;
                stack.push(XPathValue::Number(-value.to_number(ctx.doc)));
            }

            Op::Binary(op) => {
                let right = pop(&mut stack)?;
                let left = pop(&mut stack)?;
                stack.push(binary(ctx.doc, *op, &left, &right));
            }

            Op::Call(name, arg_count) => {
                if stack.len() < *arg_count {
                    return Err(format!("Malformed call to {}()", name));
                }
                let args = stack.split_off(stack.len() - arg_count);
                stack.push(functions::call(name, args, ctx)?);
            }
        }
    }

    pop(&mut stack)
}

/// Keep the nodes for which the predicate holds
///
/// Nodes are numbered 1..=n in the order given; a numeric predicate result
/// selects by position.
fn apply_predicate<D: DocumentAccess + ?Sized>(
    doc: &D,
    predicate: &CompiledExpr,
    nodes: Vec<NodeId>,
) -> Result<Vec<NodeId>, String> {
    let size = nodes.len();
    let mut kept = Vec::with_capacity(size);

    for (i, node) in nodes.into_iter().enumerate() {
        let pred_ctx = EvalContext {
            doc,
            context_node: node,
            context_position: i + 1,
            context_size: size,
        };
        let include = match evaluate_compiled(predicate, &pred_ctx)? {
            XPathValue::Number(n) => n == (i + 1) as f64,
            other => other.to_boolean(),
        };
        if include {
            kept.push(node);
        }
    }

    Ok(kept)
}

fn binary<D: DocumentAccess + ?Sized>(doc: &D, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> XPathValue {
    let arithmetic = |f: fn(f64, f64) -> f64| XPathValue::Number(f(left.to_number(doc), right.to_number(doc)));
    match op {
        BinaryOp::Or => XPathValue::Boolean(left.to_boolean() || right.to_boolean()),
        BinaryOp::And => XPathValue::Boolean(left.to_boolean() && right.to_boolean()),
        BinaryOp::Add => arithmetic(|a, b| a + b),
        BinaryOp::Sub => arithmetic(|a, b| a - b),
        BinaryOp::Mul => arithmetic(|a, b| a * b),
        BinaryOp::Div => arithmetic(|a, b| a / b),
        BinaryOp::Mod => arithmetic(|a, b| a % b),
        _ => XPathValue::Boolean(compare(doc, op, left, right)),
    }
}

/// XPath 1.0 comparison
///
/// Node-sets and attribute selections compare existentially: the result is
/// true if any member satisfies the comparison.
fn compare<D: DocumentAccess + ?Sized>(doc: &D, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> bool {
    match (left.member_strings(doc), right.member_strings(doc)) {
        (Some(l), Some(r)) => l.iter().any(|a| r.iter().any(|b| compare_strings(op, a, b))),
        (Some(members), None) => compare_members(doc, op, &members, right, true),
        (None, Some(members)) => compare_members(doc, op, &members, left, false),
        (None, None) => compare_scalars(doc, op, left, right),
    }
}

fn compare_members<D: DocumentAccess + ?Sized>(
    doc: &D,
    op: BinaryOp,
    members: &[String],
    scalar: &XPathValue,
    members_on_left: bool,
) -> bool {
    match scalar {
        XPathValue::Boolean(_) => {
            let set = XPathValue::Boolean(!members.is_empty());
            let (l, r) = ordered(members_on_left, &set, scalar);
            compare_scalars(doc, op, l, r)
        }
        XPathValue::Number(n) => members.iter().any(|m| {
            let (l, r) = ordered(members_on_left, parse_number(m), *n);
            compare_numbers(op, l, r)
        }),
        _ => {
            let s = scalar.to_string_value(doc);
            members.iter().any(|m| {
                let (l, r) = ordered(members_on_left, m.as_str(), s.as_str());
                compare_strings(op, l, r)
            })
        }
    }
}

fn ordered<T>(keep: bool, a: T, b: T) -> (T, T) {
    if keep {
        (a, b)
    } else {
        (b, a)
    }
}

fn compare_scalars<D: DocumentAccess + ?Sized>(doc: &D, op: BinaryOp, left: &XPathValue, right: &XPathValue) -> bool {
    let is = |f: fn(&XPathValue) -> bool| f(left) || f(right);
    match op {
        BinaryOp::Eq | BinaryOp::NotEq if is(|v| matches!(v, XPathValue::Boolean(_))) => {
            (left.to_boolean() == right.to_boolean()) == (op == BinaryOp::Eq)
        }
        BinaryOp::Eq | BinaryOp::NotEq if !is(|v| matches!(v, XPathValue::Number(_))) => {
            compare_strings(op, &left.to_string_value(doc), &right.to_string_value(doc))
        }
        _ => compare_numbers(op, left.to_number(doc), right.to_number(doc)),
    }
}

fn compare_strings(op: BinaryOp, a: &str, b: &str) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        _ => compare_numbers(op, parse_number(a), parse_number(b)),
    }
}

fn compare_numbers(op: BinaryOp, a: f64, b: f64) -> bool {
    match op {
        BinaryOp::Eq => a == b,
        BinaryOp::NotEq => a != b,
        BinaryOp::Lt => a < b,
        BinaryOp::LtEq => a <= b,
        BinaryOp::Gt => a > b,
        BinaryOp::GtEq => a >= b,
        _ => false,
    }
}
