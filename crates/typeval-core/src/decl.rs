//! # Type Declarations
//!
//! `TypeDecl` is the input to schema compilation. It is a plain tree:
//! record types appear only as [`RecordId`] references, resolved through a
//! [`TypeIntrospector`](crate::introspect::TypeIntrospector). A record may
//! therefore mention itself (or a record that mentions it back) in its own
//! field types without any cyclic ownership.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constraint::Annotation;

/// Stable identity of a record type.
///
/// The identity doubles as the definition name of a recursive container in
/// the compiled schema, so it must be unique per record within one
/// registry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(String);

impl RecordId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RecordId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// A declared type: a bare type, or a bare type with attached metadata.
#[derive(Debug, Clone)]
pub enum TypeDecl {
    Int,
    Float,
    Bool,
    Str,
    /// The null type.
    None,
    /// Any single scalar value, passed through unchanged.
    Any,
    /// One of a fixed, ordered set of values.
    Literal(Vec<Value>),
    /// Sugar for `Union([T, None])`.
    Optional(Box<TypeDecl>),
    /// Ordered union; order is the coercion trial order.
    Union(Vec<TypeDecl>),
    List(Box<TypeDecl>),
    Set(Box<TypeDecl>),
    Dict(Box<TypeDecl>, Box<TypeDecl>),
    /// Reference to a record type by identity.
    Record(RecordId),
    /// A host type the schema vocabulary has no node for (`datetime`,
    /// `Decimal`, ...). Compiling it is an error.
    Foreign(String),
    /// A type with attached metadata.
    Annotated {
        inner: Box<TypeDecl>,
        metadata: Vec<Annotation>,
    },
}

impl TypeDecl {
    pub fn optional(inner: TypeDecl) -> Self {
        Self::Optional(Box::new(inner))
    }

    pub fn union(members: impl IntoIterator<Item = TypeDecl>) -> Self {
        Self::Union(members.into_iter().collect())
    }

    pub fn list(items: TypeDecl) -> Self {
        Self::List(Box::new(items))
    }

    pub fn set(items: TypeDecl) -> Self {
        Self::Set(Box::new(items))
    }

    pub fn dict(keys: TypeDecl, values: TypeDecl) -> Self {
        Self::Dict(Box::new(keys), Box::new(values))
    }

    pub fn record(id: impl Into<RecordId>) -> Self {
        Self::Record(id.into())
    }

    pub fn literal(values: impl IntoIterator<Item = Value>) -> Self {
        Self::Literal(values.into_iter().collect())
    }

    /// Attach metadata. Annotating an already-annotated type nests, and
    /// extraction flattens the layers inner-first.
    pub fn annotated(self, metadata: impl IntoIterator<Item = Annotation>) -> Self {
        Self::Annotated {
            inner: Box::new(self),
            metadata: metadata.into_iter().collect(),
        }
    }

    /// True for the bare null type.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for TypeDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int => f.write_str("int"),
            Self::Float => f.write_str("float"),
            Self::Bool => f.write_str("bool"),
            Self::Str => f.write_str("str"),
            Self::None => f.write_str("None"),
            Self::Any => f.write_str("Any"),
            Self::Literal(values) => {
                f.write_str("Literal[")?;
                write_joined(f, values)?;
                f.write_str("]")
            }
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Union(members) => {
                f.write_str("Union[")?;
                write_joined(f, members)?;
                f.write_str("]")
            }
            Self::List(items) => write!(f, "List[{items}]"),
            Self::Set(items) => write!(f, "Set[{items}]"),
            Self::Dict(k, v) => write!(f, "Dict[{k}, {v}]"),
            Self::Record(id) => write!(f, "{id}"),
            Self::Foreign(name) => f.write_str(name),
            Self::Annotated { inner, .. } => write!(f, "Annotated[{inner}, ...]"),
        }
    }
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// A named, typed field of a record.
#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeDecl,
}

impl FieldDecl {
    pub fn new(name: impl Into<String>, ty: TypeDecl) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraint::Annotation;
    use serde_json::json;

    #[test]
    fn test_display_nested() {
        let ty = TypeDecl::dict(
            TypeDecl::Str,
            TypeDecl::list(TypeDecl::optional(TypeDecl::record("Node"))),
        );
        assert_eq!(ty.to_string(), "Dict[str, List[Optional[Node]]]");
    }

    #[test]
    fn test_display_literal_and_union() {
        let ty = TypeDecl::union([
            TypeDecl::literal([json!("a"), json!(1)]),
            TypeDecl::None,
        ]);
        assert_eq!(ty.to_string(), "Union[Literal[\"a\", 1], None]");
    }

    #[test]
    fn test_annotated_display_hides_metadata() {
        let ty = TypeDecl::Int.annotated([Annotation::ge(0)]);
        assert_eq!(ty.to_string(), "Annotated[int, ...]");
    }

    #[test]
    fn test_record_id_serializes_transparently() {
        let id = RecordId::new("Tree");
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"Tree\"");
    }
}
