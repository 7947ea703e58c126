//! # typeval — Type-Driven Validation
//!
//! Declare a record type once, compile it into a schema, and validate
//! JSON or YAML input against it with lax coercion and constraint checks.
//!
//! ```text
//! TypeDecl + TypeIntrospector
//!        │  build_validator
//!        ▼
//! CompiledValidator ── validate_from_value / _text / _yaml ──▶ Instance
//!        │
//!        └── schema_json() ──▶ the compiled schema artifact
//! ```
//!
//! Typed callers implement [`Model`] and use [`Validator<T>`], which
//! deserializes the validated [`Instance`] into `T`.
//!
//! ## Errors
//!
//! - [`ConfigError`]: the declaration cannot be compiled. Raised only by
//!   `build_validator*` and `Validator::new`.
//! - [`ValidationError`]: the input does not conform. Lists every
//!   violation with a JSON Pointer and a stable reason code.
//!
//! ## Logging
//!
//! The workspace logs through `tracing` and installs no subscriber.

pub mod model;
pub mod validator;
pub mod yaml;

pub use model::{from_json_str, Model, Validator};
pub use validator::{build_validator, build_validator_with, CompiledValidator};
pub use yaml::YamlError;

pub use typeval_core::{
    Annotation, ConfigError, Constraint, FieldDecl, Num, Predicate, RecordId, TypeDecl,
    TypeIntrospector, TypeRegistry, TypevalError, ValidationError, Violation, ViolationKind,
};
pub use typeval_engine::Instance;
pub use typeval_schema::{CompileOptions, CycleTracking, ExtraFields, SchemaNode};
