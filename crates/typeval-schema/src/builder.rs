//! # Schema Builder
//!
//! Recursive compilation of a [`TypeDecl`] into a [`SchemaNode`] tree.
//!
//! ## Algorithm
//!
//! For every declared type:
//!
//! 1. Extract the bare type and its markers, compile the markers into the
//!    node's [`Constraints`].
//! 2. Primitive (`int`, `float`, `bool`, `str`, `none`, `any`): emit a leaf.
//! 3. Literal: emit `literal` with the accepted values in order.
//! 4. Union: exactly two members with one bare `None` becomes `optional`
//!    around the other member; anything else becomes `union` with choices
//!    in declaration order.
//! 5. List, set, dict: emit the container with its child schemas; length
//!    keys move to `min_items`/`max_items`.
//! 6. Record: resolved through the [`TypeIntrospector`]. A record already
//!    on the expansion path is a cycle and becomes a `recursive-ref`; a
//!    record that turned out to be the target of such a ref is wrapped in a
//!    `recursive-container` once its fields are built.
//!
//! ## Cycle Tracking
//!
//! Under [`CycleTracking::Shared`] a record stays in `seen` until the
//! build ends, so a record reached from two sibling fields is expanded on
//! the first and referenced from the second. The first expansion finished
//! before the second reference existed, so [`SchemaBuilder::build_root`]
//! runs a linking pass that wraps it in a `recursive-container`
//! afterwards. Under [`CycleTracking::Scoped`] a record leaves `seen` when
//! its own expansion ends.
//!
//! In both modes a record already known to be recursive is always emitted
//! as a reference, so each definition name appears on exactly one
//! container.

use std::collections::BTreeSet;

use indexmap::IndexMap;
use tracing::debug;
use typeval_core::{ConfigError, RecordId, TypeDecl, TypeIntrospector};

use crate::compile::{compile_constraints, Constraints};
use crate::extract::unpack_type;
use crate::node::SchemaNode;
use crate::options::{CompileOptions, CycleTracking};

/// Owns the compilation state of one top-level build.
pub struct SchemaBuilder<'a> {
    introspector: &'a dyn TypeIntrospector,
    options: CompileOptions,
    seen: BTreeSet<RecordId>,
    recursive_containers: BTreeSet<RecordId>,
}

impl<'a> SchemaBuilder<'a> {
    pub fn new(introspector: &'a dyn TypeIntrospector, options: CompileOptions) -> Self {
        Self {
            introspector,
            options,
            seen: BTreeSet::new(),
            recursive_containers: BTreeSet::new(),
        }
    }

    /// Records found to be self- or mutually-referential so far.
    pub fn recursive_containers(&self) -> &BTreeSet<RecordId> {
        &self.recursive_containers
    }

    /// Build a complete schema: compile `tp`, then link every reference
    /// whose target was emitted as a plain `model-class`.
    pub fn build_root(mut self, tp: &TypeDecl) -> Result<SchemaNode, ConfigError> {
        let mut root = self.build(tp)?;
        link_definitions(&mut root);
        Ok(root)
    }

    /// Compile one declared type.
    ///
    /// # Errors
    ///
    /// `ConfigError` for malformed or unknown markers, unknown predicates,
    /// and types with no schema node (foreign types, unregistered records,
    /// empty unions).
    pub fn build(&mut self, tp: &TypeDecl) -> Result<SchemaNode, ConfigError> {
        let (bare, markers) = unpack_type(tp);
        let mut constraints = compile_constraints(markers)?;

        let node = match bare {
            TypeDecl::Int => SchemaNode::Int { constraints },
            TypeDecl::Float => SchemaNode::Float { constraints },
            TypeDecl::Bool => SchemaNode::Bool { constraints },
            TypeDecl::Str => SchemaNode::Str { constraints },
            TypeDecl::None => SchemaNode::None { constraints },
            TypeDecl::Any => SchemaNode::Any { constraints },
            TypeDecl::Literal(values) => SchemaNode::Literal {
                expected: values.clone(),
                constraints,
            },
            TypeDecl::Optional(inner) => SchemaNode::Optional {
                schema: Box::new(self.build(inner)?),
                constraints,
            },
            TypeDecl::Union(members) => self.build_union(members, constraints)?,
            TypeDecl::List(items) => {
                constraints.rename_length_to_items();
                SchemaNode::List {
                    items: Box::new(self.build(items)?),
                    constraints,
                }
            }
            TypeDecl::Set(items) => {
                constraints.rename_length_to_items();
                SchemaNode::Set {
                    items: Box::new(self.build(items)?),
                    constraints,
                }
            }
            TypeDecl::Dict(keys, values) => {
                constraints.rename_length_to_items();
                SchemaNode::Dict {
                    keys: Box::new(self.build(keys)?),
                    values: Box::new(self.build(values)?),
                    constraints,
                }
            }
            TypeDecl::Record(id) => self.build_record(id, constraints)?,
            other @ (TypeDecl::Foreign(_) | TypeDecl::Annotated { .. }) => {
                return Err(ConfigError::UnknownType {
                    description: other.to_string(),
                });
            }
        };
        Ok(node)
    }

    fn build_union(
        &mut self,
        members: &[TypeDecl],
        constraints: Constraints,
    ) -> Result<SchemaNode, ConfigError> {
        match members {
            [] => Err(ConfigError::UnknownType {
                description: "Union[]".to_string(),
            }),
            [TypeDecl::None, other] | [other, TypeDecl::None] if !other.is_none() => {
                Ok(SchemaNode::Optional {
                    schema: Box::new(self.build(other)?),
                    constraints,
                })
            }
            _ => {
                let choices = members
                    .iter()
                    .map(|member| self.build(member))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(SchemaNode::Union {
                    choices,
                    constraints,
                })
            }
        }
    }

    fn build_record(
        &mut self,
        id: &RecordId,
        constraints: Constraints,
    ) -> Result<SchemaNode, ConfigError> {
        let introspector = self.introspector;
        let declared = introspector
            .record_fields(id)
            .ok_or_else(|| ConfigError::UnknownType {
                description: format!("record {id}"),
            })?;

        if self.seen.contains(id) || self.recursive_containers.contains(id) {
            if self.recursive_containers.insert(id.clone()) {
                debug!(record = %id, "recursion detected");
            }
            return Ok(SchemaNode::RecursiveRef {
                name: id.to_string(),
            });
        }

        debug!(record = %id, fields = declared.len(), "expanding record");
        self.seen.insert(id.clone());
        let mut fields = IndexMap::with_capacity(declared.len());
        for field in declared {
            let schema = self.build(&field.ty)?;
            fields.insert(field.name.clone(), schema);
        }
        if self.options.cycle_tracking == CycleTracking::Scoped {
            self.seen.remove(id);
        }

        let model = SchemaNode::ModelClass {
            class_type: id.clone(),
            fields,
            extra_behavior: self.options.extra_fields,
            constraints,
        };
        if self.recursive_containers.contains(id) {
            debug!(record = %id, "emitting recursive container");
            Ok(SchemaNode::RecursiveContainer {
                name: id.to_string(),
                schema: Box::new(model),
            })
        } else {
            Ok(model)
        }
    }
}

/// Compile `tp` with default options.
pub fn build_schema(
    introspector: &dyn TypeIntrospector,
    tp: &TypeDecl,
) -> Result<SchemaNode, ConfigError> {
    build_schema_with(introspector, tp, CompileOptions::default())
}

/// Compile `tp` with explicit options.
pub fn build_schema_with(
    introspector: &dyn TypeIntrospector,
    tp: &TypeDecl,
    options: CompileOptions,
) -> Result<SchemaNode, ConfigError> {
    SchemaBuilder::new(introspector, options).build_root(tp)
}

/// Wrap the first plain `model-class` of every referenced record that has
/// no container yet.
fn link_definitions(root: &mut SchemaNode) {
    let mut refs = BTreeSet::new();
    let mut defined = BTreeSet::new();
    root.walk(&mut |node| match node {
        SchemaNode::RecursiveRef { name } => {
            refs.insert(name.clone());
        }
        SchemaNode::RecursiveContainer { name, .. } => {
            defined.insert(name.clone());
        }
        _ => {}
    });
    let mut pending: BTreeSet<String> = refs.difference(&defined).cloned().collect();
    if !pending.is_empty() {
        wrap_first(root, &mut pending);
    }
}

fn wrap_first(node: &mut SchemaNode, pending: &mut BTreeSet<String>) {
    if pending.is_empty() {
        return;
    }
    let target = match node {
        SchemaNode::ModelClass { class_type, .. } if pending.contains(class_type.as_str()) => {
            Some(class_type.to_string())
        }
        _ => None,
    };
    if let Some(name) = target {
        pending.remove(&name);
        debug!(record = %name, "linking shared definition");
        let placeholder = SchemaNode::RecursiveRef { name: name.clone() };
        let model = std::mem::replace(node, placeholder);
        *node = SchemaNode::RecursiveContainer {
            name,
            schema: Box::new(model),
        };
    }
    for child in node.children_mut() {
        wrap_first(child, pending);
    }
}
