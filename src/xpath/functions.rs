//! XPath 1.0 Functions
//!
//! Node set: position(), last(), count(), name(), local-name()
//!
//! String: string(), concat(), starts-with(), contains(), substring(),
//! substring-before(), substring-after(), string-length(),
//! normalize-space(), translate()
//!
//! Boolean: boolean(), not(), true(), false()
//!
//! Number: number(), sum(), floor(), ceiling(), round()

use super::eval::EvalContext;
use super::value::{parse_number, XPathValue};
use crate::dom::{node_string_value, DocumentAccess, NodeId};

/// Evaluate a function call
pub fn call<D: DocumentAccess + ?Sized>(
    name: &str,
    args: Vec<XPathValue>,
    ctx: &EvalContext<'_, D>,
) -> Result<XPathValue, String> {
    let doc = ctx.doc;
    let (min, max) = arity(name).ok_or_else(|| format!("Unknown function: {}", name))?;
    if args.len() < min || args.len() > max {
        return Err(format!(
            "{}() takes {} argument(s), got {}",
            name,
            if min == max { min.to_string() } else { format!("{}..{}", min, max) },
            args.len()
        ));
    }

    // string() of the argument or, when absent, of the context node
    let string_arg = |i: usize| match args.get(i) {
        Some(value) => value.to_string_value(doc),
        None => node_string_value(doc, ctx.context_node),
    };

    let value = match name {
        "position" => XPathValue::Number(ctx.context_position as f64),
        "last" => XPathValue::Number(ctx.context_size as f64),
        "count" => match &args[0] {
            XPathValue::NodeSet(nodes) => XPathValue::Number(nodes.len() as f64),
            XPathValue::AttrValues(values) => XPathValue::Number(values.len() as f64),
            _ => return Err("count() argument must be a node-set".to_string()),
        },
        "name" => XPathValue::String(node_arg(name, &args, ctx)?.and_then(|id| doc.node_name(id)).unwrap_or("").to_string()),
        "local-name" => XPathValue::String(
            node_arg(name, &args, ctx)?
                .and_then(|id| doc.node_local_name(id))
                .unwrap_or("")
                .to_string(),
        ),

        "string" => XPathValue::String(string_arg(0)),
        "concat" => XPathValue::String(args.iter().map(|a| a.to_string_value(doc)).collect()),
        "starts-with" => XPathValue::Boolean(string_arg(0).starts_with(&string_arg(1))),
        "contains" => XPathValue::Boolean(string_arg(0).contains(&string_arg(1))),
        "substring-before" => {
            let (s, pattern) = (string_arg(0), string_arg(1));
            XPathValue::String(s.find(&pattern).map(|i| s[..i].to_string()).unwrap_or_default())
        }
        "substring-after" => {
            let (s, pattern) = (string_arg(0), string_arg(1));
            XPathValue::String(
                s.find(&pattern)
                    .map(|i| s[i + pattern.len()..].to_string())
                    .unwrap_or_default(),
            )
        }
        "substring" => {
            let s = string_arg(0);
            let start = round(args[1].to_number(doc));
            let end = args.get(2).map_or(f64::INFINITY, |len| start + round(len.to_number(doc)));
            XPathValue::String(
                s.chars()
                    .enumerate()
                    .filter(|&(i, _)| {
                        let pos = (i + 1) as f64;
                        pos >= start && pos < end
                    })
                    .map(|(_, c)| c)
                    .collect(),
            )
        }
        "string-length" => XPathValue::Number(string_arg(0).chars().count() as f64),
        "normalize-space" => XPathValue::String(string_arg(0).split_whitespace().collect::<Vec<_>>().join(" ")),
        "translate" => {
            let (s, from, to) = (string_arg(0), string_arg(1), string_arg(2));
            let to: Vec<char> = to.chars().collect();
            XPathValue::String(
                s.chars()
                    .filter_map(|c| match from.chars().position(|f| f == c) {
                        Some(i) => to.get(i).copied(),
                        None => Some(c),
                    })
                    .collect(),
            )
        }

        "boolean" => XPathValue::Boolean(args[0].to_boolean()),
        "not" => XPathValue::Boolean(!args[0].to_boolean()),
        "true" => XPathValue::Boolean(true),
        "false" => XPathValue::Boolean(false),

        "number" => XPathValue::Number(match args.first() {
            Some(value) => value.to_number(doc),
            None => parse_number(&node_string_value(doc, ctx.context_node)),
        }),
        "sum" => match args[0].member_strings(doc) {
            Some(members) => XPathValue::Number(members.iter().map(|m| parse_number(m)).sum()),
            None => return Err("sum() argument must be a node-set".to_string()),
        },
        "floor" => XPathValue::Number(args[0].to_number(doc).floor()),
        "ceiling" => XPathValue::Number(args[0].to_number(doc).ceil()),
        "round" => XPathValue::Number(round(args[0].to_number(doc))),

        _ => return Err(format!("Unknown function: {}", name)),
    };

    Ok(value)
}

/// (min, max) argument counts of each supported function
fn arity(name: &str) -> Option<(usize, usize)> {
    Some(match name {
        "position" | "last" | "true" | "false" => (0, 0),
        "name" | "local-name" | "string" | "string-length" | "normalize-space" | "number" => (0, 1),
        "count" | "boolean" | "not" | "sum" | "floor" | "ceiling" | "round" => (1, 1),
        "starts-with" | "contains" | "substring-before" | "substring-after" => (2, 2),
        "substring" => (2, 3),
        "translate" => (3, 3),
        "concat" => (2, usize::MAX),
        _ => return None,
    })
}

/// Node named by an optional node-set argument; the context node when absent
fn node_arg<D: DocumentAccess + ?Sized>(
    name: &str,
    args: &[XPathValue],
    ctx: &EvalContext<'_, D>,
) -> Result<Option<NodeId>, String> {
    match args.first() {
        None => Ok(Some(ctx.context_node)),
        Some(XPathValue::NodeSet(nodes)) => Ok(nodes.first().copied()),
        Some(_) => Err(format!("{}() argument must be a node-set", name)),
    }
}

/// XPath round(): halves round towards positive infinity
fn round(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        n
    } else {
        (n + 0.5).floor()
    }
}
