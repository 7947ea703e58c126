//! # Schema Execution Engine
//!
//! Runs a compiled [`SchemaNode`] against a JSON input and produces an
//! [`Instance`] or a [`ValidationError`] listing every violation.
//!
//! ## Construction
//!
//! [`SchemaEngine::new`] checks the tree once:
//!
//! - every `recursive-container` is indexed by name (names are unique);
//! - every `recursive-ref` names an indexed container;
//! - every `pattern` compiles.
//!
//! After that the engine is immutable. Validation takes `&self` and the
//! engine is `Send + Sync`, so one engine serves any number of threads.
//!
//! ## Paths
//!
//! Violations are located with JSON Pointers (`""` is the root,
//! `/inner/0/inner`). Record fields and dict keys are escaped per
//! RFC 6901.

use std::collections::HashMap;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, trace};
use typeval_core::{ConfigError, RecordId, ValidationError, Violation, ViolationKind};
use typeval_schema::{Constraints, ExtraFields, SchemaNode};

use crate::checks::{enforce, PatternCache};
use crate::coerce::{self, type_name, Rejection};
use crate::instance::Instance;

type Outcome = Result<Instance, Vec<Violation>>;

/// A compiled, immutable validator over one schema tree.
#[derive(Debug, Clone)]
pub struct SchemaEngine {
    root: SchemaNode,
    definitions: HashMap<String, SchemaNode>,
    patterns: PatternCache,
    title: String,
}

impl SchemaEngine {
    /// Index definitions and compile patterns.
    ///
    /// # Errors
    ///
    /// `DanglingReference` for a ref with no container,
    /// `DuplicateDefinition` for two containers with one name,
    /// `InvalidPattern` for a pattern that does not compile, and
    /// `UnknownType` for a container that does not wrap a record.
    pub fn new(root: SchemaNode) -> Result<Self, ConfigError> {
        let mut definitions = HashMap::new();
        let mut refs = Vec::new();
        let mut patterns = PatternCache::new();
        let mut failure = None;

        root.walk(&mut |node| {
            if failure.is_some() {
                return;
            }
            match node {
                SchemaNode::RecursiveContainer { name, schema } => {
                    if !matches!(schema.as_ref(), SchemaNode::ModelClass { .. }) {
                        failure = Some(ConfigError::UnknownType {
                            description: format!(
                                "recursive definition '{name}' wrapping {}",
                                schema.kind()
                            ),
                        });
                    } else if definitions
                        .insert(name.clone(), schema.as_ref().clone())
                        .is_some()
                    {
                        failure = Some(ConfigError::DuplicateDefinition { name: name.clone() });
                    }
                }
                SchemaNode::RecursiveRef { name } => refs.push(name.clone()),
                _ => {}
            }
            if let Some(pattern) = node.constraints().and_then(|c| c.pattern.as_ref()) {
                if !patterns.contains_key(pattern) {
                    match Regex::new(pattern) {
                        Ok(regex) => {
                            patterns.insert(pattern.clone(), regex);
                        }
                        Err(e) => {
                            failure = Some(ConfigError::InvalidPattern {
                                pattern: pattern.clone(),
                                reason: e.to_string(),
                            });
                        }
                    }
                }
            }
        });
        if let Some(err) = failure {
            return Err(err);
        }
        if let Some(name) = refs.into_iter().find(|r| !definitions.contains_key(r)) {
            return Err(ConfigError::DanglingReference { name });
        }

        let title = root.title();
        debug!(
            %title,
            definitions = definitions.len(),
            patterns = patterns.len(),
            "schema engine ready"
        );
        Ok(Self {
            root,
            definitions,
            patterns,
            title,
        })
    }

    /// The schema this engine runs.
    pub fn schema(&self) -> &SchemaNode {
        &self.root
    }

    /// Label used as the title of validation errors.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Validate and coerce `input`.
    pub fn validate(&self, input: &Value) -> Result<Instance, ValidationError> {
        self.run(&self.root, input, "")
            .map_err(|violations| ValidationError::new(self.title.clone(), violations))
    }

    fn run(&self, node: &SchemaNode, value: &Value, path: &str) -> Outcome {
        match node {
            SchemaNode::Int { constraints } => self.leaf(coerce::int(value), constraints, path),
            SchemaNode::Float { constraints } => self.leaf(coerce::float(value), constraints, path),
            SchemaNode::Bool { constraints } => {
                self.leaf(coerce::boolean(value), constraints, path)
            }
            SchemaNode::Str { constraints } => self.leaf(coerce::string(value), constraints, path),
            SchemaNode::None { constraints } => self.leaf(coerce::none(value), constraints, path),
            SchemaNode::Any { constraints } => self.leaf(coerce::any(value), constraints, path),
            SchemaNode::Literal {
                expected,
                constraints,
            } => self.leaf(coerce::literal(value, expected), constraints, path),
            SchemaNode::Optional {
                schema,
                constraints,
            } => {
                if value.is_null() {
                    return Ok(Instance::None);
                }
                let inner = self.run(schema, value, path)?;
                self.check(inner, constraints, path)
            }
            SchemaNode::Union {
                choices,
                constraints,
            } => self.run_union(choices, constraints, value, path),
            SchemaNode::List { items, constraints } => {
                let elements = self.run_items(items, value, path, ViolationKind::ListType, "list")?;
                self.check(Instance::List(elements), constraints, path)
            }
            SchemaNode::Set { items, constraints } => {
                let elements = self.run_items(items, value, path, ViolationKind::SetType, "set")?;
                let mut unique: Vec<Instance> = Vec::with_capacity(elements.len());
                for element in elements {
                    if !unique.contains(&element) {
                        unique.push(element);
                    }
                }
                self.check(Instance::Set(unique), constraints, path)
            }
            SchemaNode::Dict {
                keys,
                values,
                constraints,
            } => {
                let pairs = self.run_dict(keys, values, value, path)?;
                self.check(Instance::Dict(pairs), constraints, path)
            }
            SchemaNode::ModelClass {
                class_type,
                fields,
                extra_behavior,
                constraints,
            } => {
                let record = self.run_record(class_type, fields, *extra_behavior, value, path)?;
                self.check(record, constraints, path)
            }
            SchemaNode::RecursiveRef { name } => match self.definitions.get(name) {
                Some(definition) => self.run(definition, value, path),
                None => Err(vec![Violation::new(
                    path,
                    ViolationKind::UnresolvedReference,
                    format!("recursive reference '{name}' has no definition"),
                )]),
            },
            SchemaNode::RecursiveContainer { schema, .. } => self.run(schema, value, path),
        }
    }

    fn leaf(
        &self,
        coerced: Result<Instance, Rejection>,
        constraints: &Constraints,
        path: &str,
    ) -> Outcome {
        let value = coerced.map_err(|r| vec![r.at(path)])?;
        self.check(value, constraints, path)
    }

    fn check(&self, value: Instance, constraints: &Constraints, path: &str) -> Outcome {
        enforce(value, constraints, &self.patterns)
            .map_err(|rejections| rejections.into_iter().map(|r| r.at(path)).collect())
    }

    fn run_union(
        &self,
        choices: &[SchemaNode],
        constraints: &Constraints,
        value: &Value,
        path: &str,
    ) -> Outcome {
        let mut reasons = Vec::with_capacity(choices.len());
        for (index, choice) in choices.iter().enumerate() {
            match self.run(choice, value, path) {
                Ok(matched) => {
                    trace!(path, index, choice = choice.kind(), "union candidate matched");
                    return self.check(matched, constraints, path);
                }
                Err(violations) => {
                    trace!(path, index, choice = choice.kind(), "union candidate rejected");
                    let detail: Vec<&str> = violations.iter().map(|v| v.message.as_str()).collect();
                    reasons.push(format!("{}: {}", choice.title(), detail.join("; ")));
                }
            }
        }
        Err(vec![Violation::new(
            path,
            ViolationKind::UnionNoMatch,
            format!("Input did not match any union member [{}]", reasons.join(" | ")),
        )])
    }

    fn run_items(
        &self,
        items: &SchemaNode,
        value: &Value,
        path: &str,
        kind: ViolationKind,
        label: &str,
    ) -> Result<Vec<Instance>, Vec<Violation>> {
        let Value::Array(elements) = value else {
            return Err(vec![Violation::new(
                path,
                kind,
                format!("Input should be a valid {label}, got {}", type_name(value)),
            )]);
        };
        let mut out = Vec::with_capacity(elements.len());
        let mut violations = Vec::new();
        for (index, element) in elements.iter().enumerate() {
            match self.run(items, element, &pointer(path, &index.to_string())) {
                Ok(instance) => out.push(instance),
                Err(mut errs) => violations.append(&mut errs),
            }
        }
        if violations.is_empty() {
            Ok(out)
        } else {
            Err(violations)
        }
    }

    fn run_dict(
        &self,
        keys: &SchemaNode,
        values: &SchemaNode,
        value: &Value,
        path: &str,
    ) -> Result<Vec<(Instance, Instance)>, Vec<Violation>> {
        let Value::Object(map) = value else {
            return Err(vec![Violation::new(
                path,
                ViolationKind::DictType,
                format!("Input should be a valid dictionary, got {}", type_name(value)),
            )]);
        };
        let mut pairs: Vec<(Instance, Instance)> = Vec::with_capacity(map.len());
        let mut violations = Vec::new();
        for (raw_key, raw_value) in map {
            let at = pointer(path, raw_key);
            let key = self.run_key(keys, raw_key, &at);
            let val = self.run(values, raw_value, &at);
            match (key, val) {
                (Ok(key), Ok(val)) => match pairs.iter_mut().find(|(k, _)| *k == key) {
                    Some(slot) => slot.1 = val,
                    None => pairs.push((key, val)),
                },
                (key, val) => {
                    violations.extend(key.err().into_iter().flatten());
                    violations.extend(val.err().into_iter().flatten());
                }
            }
        }
        if violations.is_empty() {
            Ok(pairs)
        } else {
            Err(violations)
        }
    }

    /// Object keys arrive as strings. A key the key schema rejects as a
    /// string is retried as the JSON scalar it spells (`"1"`, `"null"`),
    /// so literal and `none` key schemas can match.
    fn run_key(&self, keys: &SchemaNode, raw_key: &str, path: &str) -> Outcome {
        let as_string = self.run(keys, &Value::String(raw_key.to_owned()), path);
        if as_string.is_ok() {
            return as_string;
        }
        match serde_json::from_str::<Value>(raw_key) {
            Ok(parsed @ (Value::Null | Value::Bool(_) | Value::Number(_))) => {
                self.run(keys, &parsed, path).or(as_string)
            }
            _ => as_string,
        }
    }

    fn run_record(
        &self,
        class_type: &RecordId,
        fields: &indexmap::IndexMap<String, SchemaNode>,
        extra: ExtraFields,
        value: &Value,
        path: &str,
    ) -> Outcome {
        let Value::Object(map) = value else {
            return Err(vec![Violation::new(
                path,
                ViolationKind::ModelType,
                format!(
                    "Input should be an object for {class_type}, got {}",
                    type_name(value)
                ),
            )]);
        };
        let mut out = indexmap::IndexMap::with_capacity(fields.len());
        let mut violations = Vec::new();
        for (name, schema) in fields {
            let at = pointer(path, name);
            match map.get(name) {
                Some(input) => match self.run(schema, input, &at) {
                    Ok(instance) => {
                        out.insert(name.clone(), instance);
                    }
                    Err(mut errs) => violations.append(&mut errs),
                },
                None if matches!(schema, SchemaNode::Optional { .. }) => {
                    out.insert(name.clone(), Instance::None);
                }
                None => violations.push(Violation::new(
                    at,
                    ViolationKind::Missing,
                    "Field required",
                )),
            }
        }
        if extra == ExtraFields::Forbid {
            violations.extend(extra_keys(map, fields).map(|key| {
                Violation::new(
                    pointer(path, key),
                    ViolationKind::ExtraForbidden,
                    "Extra inputs are not permitted",
                )
            }));
        }
        if violations.is_empty() {
            Ok(Instance::Record {
                class_type: class_type.clone(),
                fields: out,
            })
        } else {
            Err(violations)
        }
    }
}

fn extra_keys<'a>(
    map: &'a Map<String, Value>,
    fields: &'a indexmap::IndexMap<String, SchemaNode>,
) -> impl Iterator<Item = &'a String> + 'a {
    map.keys().filter(move |key| !fields.contains_key(key.as_str()))
}

/// Append one RFC 6901 reference token to a JSON Pointer.
fn pointer(base: &str, token: &str) -> String {
    let escaped = token.replace('~', "~0").replace('/', "~1");
    format!("{base}/{escaped}")
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    proptest! {
        /// Validation does not depend on earlier calls and leaves the schema unchanged.
        #[test]
        fn validation_idempotent(a in -1e6f64..1e6, b in any::<i64>(), s in "[a-z]{0,8}") {
            let schema: SchemaNode = serde_json::from_value(json!({
                "type": "model-class",
                "class_type": "M",
                "fields": {
                    "a": {"type": "float", "ge": 0},
                    "b": {"type": "int"},
                    "s": {"type": "str", "max_length": 4}
                }
            })).unwrap();
            let engine = SchemaEngine::new(schema.clone()).unwrap();
            let input = json!({"a": a, "b": b, "s": s});
            let first = engine.validate(&input);
            let second = engine.validate(&input);
            prop_assert_eq!(first, second);
            prop_assert_eq!(engine.schema(), &schema);
        }
    }
}
