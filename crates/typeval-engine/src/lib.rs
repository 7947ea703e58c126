//! # typeval-engine — Schema Execution
//!
//! Executes a compiled [`SchemaNode`](typeval_schema::SchemaNode) against
//! JSON input.
//!
//! - `engine`: [`SchemaEngine`], construction-time checks and the
//!   recursive validator.
//! - `coerce`: lax leaf coercions.
//! - `checks`: post-coercion constraint checks.
//! - `instance`: the [`Instance`] value graph.
//! - `de`: a `serde::Deserializer` over `Instance`, so typed records can
//!   be built from validated output.
//!
//! ## Crate Policy
//!
//! - A constructed engine is immutable; validation never mutates it.
//! - Failures are collected, never short-circuited within a node: a
//!   record reports every bad field, a list every bad element.

pub mod checks;
pub mod coerce;
pub mod de;
pub mod engine;
pub mod instance;

pub use de::from_instance;
pub use engine::SchemaEngine;
pub use instance::Instance;
