//! Fixture value model
//!
//! Every element name in a [`ResultMap`] holds exactly one [`Value`]
//! shape. Repeated sibling names are folded into a [`Value::Group`] by
//! [`insert_value`].

use indexmap::IndexMap;
use std::borrow::Cow;

/// Reserved key holding an element's attributes
pub const ATTRIBUTES_KEY: &str = "__attributes";

/// Key of the text value inside an attributed scalar
pub const VALUE_KEY: &str = "value";

/// Attribute name to value, in document order
pub type Attributes = IndexMap<String, String>;

/// Element name to value, in document order of first appearance
pub type ResultMap = IndexMap<String, Value>;

/// A transformed fixture value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Text of a leaf element
    Scalar(String),
    /// Text of a leaf element that carries attributes
    Attributed { value: String, attributes: Attributes },
    /// Children of a container element; its attributes sit under
    /// [`ATTRIBUTES_KEY`]
    Map(ResultMap),
    /// Two or more same-named siblings; index `i` is the `i`-th in
    /// document order
    Group(Vec<Value>),
    /// Attribute set stored under [`ATTRIBUTES_KEY`]
    Attributes(Attributes),
}

impl Value {
    /// Text of a scalar or attributed scalar
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Scalar(s) | Value::Attributed { value: s, .. } => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&ResultMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<&[Value]> {
        match self {
            Value::Group(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Attributes attached to this value, if any
    pub fn attributes(&self) -> Option<&Attributes> {
        match self {
            Value::Attributed { attributes, .. } | Value::Attributes(attributes) => Some(attributes),
            Value::Map(map) => match map.get(ATTRIBUTES_KEY) {
                Some(Value::Attributes(attributes)) => Some(attributes),
                _ => None,
            },
            Value::Scalar(_) | Value::Group(_) => None,
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes()?.get(name).map(String::as_str)
    }

    /// Whether the value carries no data: an empty string or an empty
    /// collection
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Scalar(s) => s.is_empty(),
            Value::Attributed { .. } => false,
            Value::Map(map) => map.is_empty(),
            Value::Group(items) => items.is_empty(),
            Value::Attributes(attributes) => attributes.is_empty(),
        }
    }

    /// Entry addressed by one path segment
    ///
    /// Groups are indexed by decimal position. An attributed scalar
    /// exposes [`VALUE_KEY`] and [`ATTRIBUTES_KEY`].
    pub fn child(&self, key: &str) -> Option<Cow<'_, Value>> {
        match self {
            Value::Map(map) => map.get(key).map(Cow::Borrowed),
            Value::Group(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)).map(Cow::Borrowed),
            Value::Attributed { value, attributes } => match key {
                VALUE_KEY => Some(Cow::Owned(Value::Scalar(value.clone()))),
                ATTRIBUTES_KEY => Some(Cow::Owned(Value::Attributes(attributes.clone()))),
                _ => None,
            },
            Value::Attributes(attributes) => attributes.get(key).map(|v| Cow::Owned(Value::Scalar(v.clone()))),
            Value::Scalar(_) => None,
        }
    }

    /// Keys at this level; group indices as decimal strings
    pub fn keys(&self) -> Vec<Cow<'_, str>> {
        match self {
            Value::Map(map) => map.keys().map(|k| Cow::Borrowed(k.as_str())).collect(),
            Value::Group(items) => (0..items.len()).map(|i| Cow::Owned(i.to_string())).collect(),
            Value::Attributed { .. } => vec![Cow::Borrowed(VALUE_KEY), Cow::Borrowed(ATTRIBUTES_KEY)],
            Value::Attributes(attributes) => attributes.keys().map(|k| Cow::Borrowed(k.as_str())).collect(),
            Value::Scalar(_) => Vec::new(),
        }
    }

    /// Values at this level in order, without their keys
    ///
    /// A scalar is its own single value.
    pub fn values(&self) -> Vec<Value> {
        match self {
            Value::Map(map) => map.values().cloned().collect(),
            Value::Group(items) => items.clone(),
            Value::Attributed { value, attributes } => {
                vec![Value::Scalar(value.clone()), Value::Attributes(attributes.clone())]
            }
            Value::Attributes(attributes) => attributes.values().cloned().map(Value::Scalar).collect(),
            Value::Scalar(_) => vec![self.clone()],
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Scalar(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Scalar(s)
    }
}

/// Insert `value` under `name`, folding repeated names into a group
///
/// The first value for a name is stored as is. The second turns the entry
/// into a group holding both, and later values are appended.
pub fn insert_value(map: &mut ResultMap, name: &str, value: Value) {
    match map.get_mut(name) {
        None => {
            map.insert(name.to_string(), value);
        }
        Some(Value::Group(items)) => items.push(value),
        Some(existing) => {
            let first = std::mem::replace(existing, Value::Group(Vec::new()));
            *existing = Value::Group(vec![first, value]);
        }
    }
}
