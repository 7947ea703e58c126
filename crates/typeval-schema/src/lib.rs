//! # typeval-schema — Declaration to Schema Compilation
//!
//! Turns a [`TypeDecl`](typeval_core::TypeDecl) into a [`SchemaNode`] tree
//! that the execution engine can run.
//!
//! ## Pipeline
//!
//! ```text
//! TypeDecl ──unpack_type──▶ (bare type, markers)
//!                               │
//!               compile_constraints ──▶ Constraints
//!                               │
//!              SchemaBuilder::build ──▶ SchemaNode
//! ```
//!
//! - `extract`: peels annotation layers and normalizes raw metadata into
//!   constraint markers.
//! - `compile`: folds markers into a flat constraint record.
//! - `builder`: the recursive builder, with cycle detection through
//!   `recursive-ref`/`recursive-container` nodes.
//! - `node`: the compiled tree and its serialized form.
//! - `options`: compile options.
//!
//! ## Crate Policy
//!
//! - Depends only on `typeval-core` within the workspace.
//! - Compilation is synchronous and single-threaded; builder state is
//!   owned by one [`SchemaBuilder`] and never shared.

pub mod builder;
pub mod compile;
pub mod extract;
pub mod node;
pub mod options;

pub use builder::{build_schema, build_schema_with, SchemaBuilder};
pub use compile::{compile_constraints, Constraints};
pub use extract::{unpack_type, ConstraintIter};
pub use node::SchemaNode;
pub use options::{CompileOptions, CycleTracking, ExtraFields};
