//! # Typed Models
//!
//! A [`Model`] is a Rust type that knows how to declare itself as a
//! record. [`Validator<T>`] compiles that declaration and hands back `T`
//! instead of an [`Instance`](typeval_engine::Instance).
//!
//! ```ignore
//! #[derive(Deserialize)]
//! struct Node {
//!     children: Vec<Option<Node>>,
//! }
//!
//! impl Model for Node {
//!     const NAME: &'static str = "Node";
//!
//!     fn fields(registry: &mut TypeRegistry) -> Vec<FieldDecl> {
//!         let me = Node::declare(registry);
//!         vec![FieldDecl::new("children", TypeDecl::list(TypeDecl::optional(me)))]
//!     }
//! }
//! ```
//!
//! `declare` registers the record at most once, so a model may declare
//! itself (or a model that declares it back) from inside `fields`.

use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde_json::Value;
use typeval_core::{
    ConfigError, FieldDecl, TypeDecl, TypeRegistry, TypevalError, ValidationError, ViolationKind,
};
use typeval_engine::{from_instance, Instance};
use typeval_schema::CompileOptions;

use crate::validator::{build_validator_with, CompiledValidator};

/// A Rust type with a record declaration.
pub trait Model {
    /// Record name. Must be unique among the models of one registry.
    const NAME: &'static str;

    /// Field declarations in order.
    fn fields(registry: &mut TypeRegistry) -> Vec<FieldDecl>;

    /// Register this record (once) and return a reference to it.
    fn declare(registry: &mut TypeRegistry) -> TypeDecl {
        TypeDecl::Record(registry.record(Self::NAME, Self::fields))
    }
}

/// A compiled validator producing `T`.
pub struct Validator<T> {
    compiled: CompiledValidator,
    _model: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for Validator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("compiled", &self.compiled)
            .finish()
    }
}

impl<T: Model + DeserializeOwned> Validator<T> {
    /// Compile `T` with default options.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_options(CompileOptions::default())
    }

    /// Compile `T` with explicit options.
    pub fn with_options(options: CompileOptions) -> Result<Self, ConfigError> {
        let mut registry = TypeRegistry::new();
        let root = T::declare(&mut registry);
        Ok(Self {
            compiled: build_validator_with(&registry, &root, options)?,
            _model: PhantomData,
        })
    }

    pub fn validate_from_value(&self, input: &Value) -> Result<T, ValidationError> {
        self.instantiate(self.compiled.validate_from_value(input)?)
    }

    pub fn validate_from_text(&self, text: &str) -> Result<T, ValidationError> {
        self.instantiate(self.compiled.validate_from_text(text)?)
    }

    pub fn validate_from_yaml(&self, text: &str) -> Result<T, ValidationError> {
        self.instantiate(self.compiled.validate_from_yaml(text)?)
    }

    /// The untyped validator underneath.
    pub fn compiled(&self) -> &CompiledValidator {
        &self.compiled
    }

    fn instantiate(&self, instance: Instance) -> Result<T, ValidationError> {
        from_instance(instance).map_err(|e| {
            self.compiled.input_error(
                ViolationKind::ModelInstantiation,
                format!("cannot instantiate {}: {e}", T::NAME),
            )
        })
    }
}

/// Compile `T` and validate one JSON document.
///
/// For repeated validation build a [`Validator`] once instead.
pub fn from_json_str<T: Model + DeserializeOwned>(text: &str) -> Result<T, TypevalError> {
    Ok(Validator::<T>::new()?.validate_from_text(text)?)
}
