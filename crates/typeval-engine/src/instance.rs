//! # Typed Value Graph
//!
//! [`Instance`] is what validation produces: the input coerced to the
//! declared types. It differs from a JSON value in three ways that matter
//! to callers:
//!
//! - integers and floats are distinct (`1` validated as `float` is
//!   `Float(1.0)`);
//! - sets are their own variant, already deduplicated;
//! - dict keys are coerced instances, not strings, and records remember
//!   their record identity.

use indexmap::IndexMap;
use serde_json::Value;
use typeval_core::RecordId;

/// A validated value.
#[derive(Debug, Clone, PartialEq)]
pub enum Instance {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Instance>),
    /// Unique elements in first-occurrence order.
    Set(Vec<Instance>),
    /// Key/value pairs in input order with unique keys.
    Dict(Vec<(Instance, Instance)>),
    Record {
        class_type: RecordId,
        fields: IndexMap<String, Instance>,
    },
}

impl Instance {
    /// Plain structural conversion, no coercion. Objects become dicts with
    /// string keys.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Null => Self::None,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Dict(
                map.iter()
                    .map(|(k, v)| (Self::Str(k.clone()), Self::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Variant name, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Float(_) => "float",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Set(_) => "set",
            Self::Dict(_) => "dict",
            Self::Record { .. } => "record",
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Elements of a list or set.
    pub fn as_slice(&self) -> Option<&[Instance]> {
        match self {
            Self::List(items) | Self::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&[(Instance, Instance)]> {
        match self {
            Self::Dict(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Record identity, for records.
    pub fn class_type(&self) -> Option<&RecordId> {
        match self {
            Self::Record { class_type, .. } => Some(class_type),
            _ => None,
        }
    }

    /// A record field by name.
    pub fn field(&self, name: &str) -> Option<&Instance> {
        match self {
            Self::Record { fields, .. } => fields.get(name),
            _ => None,
        }
    }

    /// Length for sized values: characters, elements, or entries.
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::Str(s) => Some(s.chars().count()),
            Self::List(items) | Self::Set(items) => Some(items.len()),
            Self::Dict(pairs) => Some(pairs.len()),
            _ => None,
        }
    }
}
