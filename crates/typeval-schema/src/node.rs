//! # Compiled Schema Tree
//!
//! `SchemaNode` is the artifact handed from the builder to the execution
//! engine. It serializes to a nested JSON mapping with a string `"type"`
//! discriminator; the key names per node kind (`items`, `keys`, `values`,
//! `fields`, `choices`, `schema`, `class_type`, `name`, `expected`,
//! `min_items`/`max_items`) are the contract between the two.
//!
//! ## Cycles
//!
//! The tree never contains a literal cycle. A record that refers back to
//! itself is emitted once inside a `recursive-container` with a stable
//! `name`, and every back-edge is a `recursive-ref` carrying that name.
//!
//! ```text
//! recursive-container(name = "Tree")
//!   └── model-class(class_type = "Tree")
//!         └── fields.children: list
//!               └── items: recursive-ref(name = "Tree")
//! ```

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use typeval_core::RecordId;

use crate::compile::Constraints;
use crate::options::ExtraFields;

/// One node of a compiled schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SchemaNode {
    Int {
        #[serde(flatten)]
        constraints: Constraints,
    },
    Float {
        #[serde(flatten)]
        constraints: Constraints,
    },
    Bool {
        #[serde(flatten)]
        constraints: Constraints,
    },
    Str {
        #[serde(flatten)]
        constraints: Constraints,
    },
    None {
        #[serde(flatten)]
        constraints: Constraints,
    },
    Any {
        #[serde(flatten)]
        constraints: Constraints,
    },
    Literal {
        expected: Vec<Value>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    Optional {
        schema: Box<SchemaNode>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    Union {
        choices: Vec<SchemaNode>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    List {
        items: Box<SchemaNode>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    Set {
        items: Box<SchemaNode>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    Dict {
        keys: Box<SchemaNode>,
        values: Box<SchemaNode>,
        #[serde(flatten)]
        constraints: Constraints,
    },
    ModelClass {
        class_type: RecordId,
        fields: IndexMap<String, SchemaNode>,
        #[serde(default)]
        extra_behavior: ExtraFields,
        #[serde(flatten)]
        constraints: Constraints,
    },
    RecursiveRef {
        name: String,
    },
    RecursiveContainer {
        name: String,
        schema: Box<SchemaNode>,
    },
}

impl SchemaNode {
    /// The `"type"` discriminator.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int { .. } => "int",
            Self::Float { .. } => "float",
            Self::Bool { .. } => "bool",
            Self::Str { .. } => "str",
            Self::None { .. } => "none",
            Self::Any { .. } => "any",
            Self::Literal { .. } => "literal",
            Self::Optional { .. } => "optional",
            Self::Union { .. } => "union",
            Self::List { .. } => "list",
            Self::Set { .. } => "set",
            Self::Dict { .. } => "dict",
            Self::ModelClass { .. } => "model-class",
            Self::RecursiveRef { .. } => "recursive-ref",
            Self::RecursiveContainer { .. } => "recursive-container",
        }
    }

    /// Constraints carried by this node, if the kind carries any.
    pub fn constraints(&self) -> Option<&Constraints> {
        match self {
            Self::Int { constraints }
            | Self::Float { constraints }
            | Self::Bool { constraints }
            | Self::Str { constraints }
            | Self::None { constraints }
            | Self::Any { constraints }
            | Self::Literal { constraints, .. }
            | Self::Optional { constraints, .. }
            | Self::Union { constraints, .. }
            | Self::List { constraints, .. }
            | Self::Set { constraints, .. }
            | Self::Dict { constraints, .. }
            | Self::ModelClass { constraints, .. } => Some(constraints),
            Self::RecursiveRef { .. } | Self::RecursiveContainer { .. } => None,
        }
    }

    /// Short label for error titles: the record name for records, the
    /// kind otherwise.
    pub fn title(&self) -> String {
        match self {
            Self::ModelClass { class_type, .. } => class_type.to_string(),
            Self::RecursiveContainer { schema, .. } => schema.title(),
            Self::RecursiveRef { name } => name.clone(),
            other => other.kind().to_string(),
        }
    }

    /// Direct children in a stable order.
    pub fn children(&self) -> Vec<&SchemaNode> {
        match self {
            Self::Optional { schema, .. } | Self::RecursiveContainer { schema, .. } => {
                vec![schema.as_ref()]
            }
            Self::Union { choices, .. } => choices.iter().collect(),
            Self::List { items, .. } | Self::Set { items, .. } => vec![items.as_ref()],
            Self::Dict { keys, values, .. } => vec![keys.as_ref(), values.as_ref()],
            Self::ModelClass { fields, .. } => fields.values().collect(),
            _ => Vec::new(),
        }
    }

    /// Direct children, mutably, in the same order as [`children`](Self::children).
    pub fn children_mut(&mut self) -> Vec<&mut SchemaNode> {
        match self {
            Self::Optional { schema, .. } | Self::RecursiveContainer { schema, .. } => {
                vec![schema.as_mut()]
            }
            Self::Union { choices, .. } => choices.iter_mut().collect(),
            Self::List { items, .. } | Self::Set { items, .. } => vec![items.as_mut()],
            Self::Dict { keys, values, .. } => vec![keys.as_mut(), values.as_mut()],
            Self::ModelClass { fields, .. } => fields.values_mut().collect(),
            _ => Vec::new(),
        }
    }

    /// Pre-order traversal of this node and all descendants.
    pub fn walk<'a>(&'a self, visit: &mut dyn FnMut(&'a SchemaNode)) {
        visit(self);
        for child in self.children() {
            child.walk(visit);
        }
    }

    /// Serialize to the exchanged JSON form.
    pub fn to_json(&self) -> Value {
        // A tree of derived Serialize impls over JSON-native leaves cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use typeval_core::Num;

    #[test]
    fn test_leaf_serializes_flat() {
        let node = SchemaNode::Float {
            constraints: Constraints {
                ge: Some(Num::Int(0)),
                lt: Some(Num::Int(100)),
                ..Constraints::default()
            },
        };
        assert_eq!(node.to_json(), json!({"type": "float", "ge": 0, "lt": 100}));
    }

    #[test]
    fn test_kebab_case_discriminators() {
        let node = SchemaNode::RecursiveContainer {
            name: "Tree".into(),
            schema: Box::new(SchemaNode::ModelClass {
                class_type: RecordId::new("Tree"),
                fields: IndexMap::from([(
                    "next".to_string(),
                    SchemaNode::RecursiveRef { name: "Tree".into() },
                )]),
                extra_behavior: ExtraFields::Forbid,
                constraints: Constraints::default(),
            }),
        };
        assert_eq!(
            node.to_json(),
            json!({
                "type": "recursive-container",
                "name": "Tree",
                "schema": {
                    "type": "model-class",
                    "class_type": "Tree",
                    "fields": {"next": {"type": "recursive-ref", "name": "Tree"}},
                    "extra_behavior": "forbid"
                }
            })
        );
        assert_eq!(node.title(), "Tree");
    }

    #[test]
    fn test_deserialize_from_exchanged_form() {
        let node: SchemaNode = serde_json::from_value(json!({
            "type": "list",
            "items": {"type": "int", "gt": 0},
            "min_items": 1,
            "max_items": 10
        }))
        .unwrap();
        match node {
            SchemaNode::List { items, constraints } => {
                assert_eq!(constraints.min_items, Some(1));
                assert_eq!(constraints.max_items, Some(10));
                assert_eq!(items.constraints().unwrap().gt, Some(Num::Int(0)));
            }
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn test_walk_is_pre_order() {
        let node = SchemaNode::Dict {
            keys: Box::new(SchemaNode::Str { constraints: Constraints::default() }),
            values: Box::new(SchemaNode::Optional {
                schema: Box::new(SchemaNode::Int { constraints: Constraints::default() }),
                constraints: Constraints::default(),
            }),
            constraints: Constraints::default(),
        };
        let mut kinds = Vec::new();
        node.walk(&mut |n| kinds.push(n.kind()));
        assert_eq!(kinds, ["dict", "str", "optional", "int"]);
    }
}
