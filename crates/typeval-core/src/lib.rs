//! # typeval-core — Declaration Vocabulary & Error Hierarchy
//!
//! This crate is the leaf of the typeval workspace. It defines the
//! vocabulary every other crate speaks:
//!
//! 1. **Type declarations** (`decl`). `TypeDecl` describes a bare type
//!    (scalars, literals, optionals, unions, lists, sets, dicts, records)
//!    optionally wrapped in an annotation layer carrying raw metadata.
//!
//! 2. **Constraint markers** (`constraint`). `Constraint` is the normalized
//!    marker (bounds, length, multiple-of, regex, predicate); `Annotation`
//!    is the raw metadata item attached to a declaration before
//!    normalization.
//!
//! 3. **Record introspection** (`introspect`). Record types are referenced
//!    by name. The `TypeIntrospector` trait resolves a name to its ordered
//!    field declarations, which is how self- and mutually-referential
//!    records are expressed without cyclic ownership.
//!
//! 4. **Errors** (`error`). `ConfigError` for invalid declarations,
//!    `ValidationError` for non-conforming input.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `typeval-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod constraint;
pub mod decl;
pub mod error;
pub mod introspect;
pub mod num;

// Re-export primary types for ergonomic imports.
pub use constraint::{Annotation, Constraint, Predicate};
pub use decl::{FieldDecl, RecordId, TypeDecl};
pub use error::{
    ConfigError, TypevalError, ValidationError, Violation, ViolationKind, Violations,
};
pub use introspect::{TypeIntrospector, TypeRegistry};
pub use num::Num;
