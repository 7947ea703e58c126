//! # Compiled Validators
//!
//! [`build_validator`] compiles a declaration once; the returned
//! [`CompiledValidator`] is immutable and may be shared across threads
//! and called any number of times.
//!
//! Three input forms are accepted. All of them end in the same engine:
//!
//! | Method                | Input                     | Parse failure kind |
//! |-----------------------|---------------------------|--------------------|
//! | `validate_from_value` | `serde_json::Value`       | n/a                |
//! | `validate_from_text`  | JSON text                 | `json_invalid`     |
//! | `validate_from_yaml`  | YAML text                 | `yaml_invalid`     |

use serde_json::Value;
use tracing::warn;
use typeval_core::{
    ConfigError, TypeDecl, TypeIntrospector, ValidationError, Violation, ViolationKind,
};
use typeval_engine::{Instance, SchemaEngine};
use typeval_schema::{build_schema_with, unpack_type, CompileOptions, SchemaNode};

use crate::yaml::parse_yaml;

/// Compile `tp` with default options.
///
/// # Errors
///
/// `ConfigError` when the declaration cannot be compiled.
pub fn build_validator(
    introspector: &dyn TypeIntrospector,
    tp: &TypeDecl,
) -> Result<CompiledValidator, ConfigError> {
    build_validator_with(introspector, tp, CompileOptions::default())
}

/// Compile `tp` with explicit options.
pub fn build_validator_with(
    introspector: &dyn TypeIntrospector,
    tp: &TypeDecl,
    options: CompileOptions,
) -> Result<CompiledValidator, ConfigError> {
    let (bare, _) = unpack_type(tp);
    if !matches!(bare, TypeDecl::Record(_)) {
        warn!(root = %bare, "validator root is not a record type");
    }
    let schema = build_schema_with(introspector, tp, options)?;
    CompiledValidator::from_schema(schema)
}

/// A reusable validator bound to one compiled schema.
#[derive(Debug, Clone)]
pub struct CompiledValidator {
    engine: SchemaEngine,
}

impl CompiledValidator {
    /// Wrap an already compiled schema, e.g. one loaded from its JSON form.
    pub fn from_schema(schema: SchemaNode) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: SchemaEngine::new(schema)?,
        })
    }

    /// Validate an in-memory JSON value.
    pub fn validate_from_value(&self, input: &Value) -> Result<Instance, ValidationError> {
        self.engine.validate(input)
    }

    /// Parse `text` as JSON, then validate.
    pub fn validate_from_text(&self, text: &str) -> Result<Instance, ValidationError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            self.input_error(ViolationKind::JsonInvalid, format!("Invalid JSON: {e}"))
        })?;
        self.validate_from_value(&value)
    }

    /// Parse `text` as YAML, then validate.
    pub fn validate_from_yaml(&self, text: &str) -> Result<Instance, ValidationError> {
        let value = parse_yaml(text)
            .map_err(|e| self.input_error(ViolationKind::YamlInvalid, format!("Invalid YAML: {e}")))?;
        self.validate_from_value(&value)
    }

    /// The compiled schema.
    pub fn schema(&self) -> &SchemaNode {
        self.engine.schema()
    }

    /// The compiled schema in its exchanged JSON form.
    pub fn schema_json(&self) -> Value {
        self.engine.schema().to_json()
    }

    /// Title used on this validator's errors.
    pub fn title(&self) -> &str {
        self.engine.title()
    }

    pub(crate) fn input_error(&self, kind: ViolationKind, message: String) -> ValidationError {
        ValidationError::new(self.engine.title(), vec![Violation::new("", kind, message)])
    }
}
