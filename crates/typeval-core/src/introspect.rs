//! # Record Introspection
//!
//! The schema builder never inspects Rust types directly. It asks a
//! [`TypeIntrospector`] for the ordered field declarations of a record
//! identity. [`TypeRegistry`] is the explicit registration implementation:
//! declarations are inserted once, in order, and looked up by name.
//!
//! Forward references are free: a field may name a record that is only
//! registered later, as long as it is registered before compilation.

use indexmap::{IndexMap, IndexSet};

use crate::decl::{FieldDecl, RecordId};

/// Resolves a record identity to its ordered field declarations.
///
/// Implementations must be `Send + Sync` so that a registry can back
/// compilations on several threads.
pub trait TypeIntrospector: Send + Sync {
    /// Fields of `record` in declaration order, or `None` if the record is
    /// unknown.
    fn record_fields(&self, record: &RecordId) -> Option<&[FieldDecl]>;
}

/// Insertion-ordered record registry.
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    records: IndexMap<RecordId, Vec<FieldDecl>>,
    /// Reserved names whose fields are not declared yet.
    pending: IndexSet<RecordId>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` has been declared or reserved.
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(&RecordId::new(name))
    }

    /// Reserve `name` with no fields so that declarations reached while
    /// building its own field list see it as already known. Returns
    /// `false` if the name was already present.
    pub fn reserve(&mut self, name: &str) -> bool {
        let id = RecordId::new(name);
        if self.records.contains_key(&id) {
            return false;
        }
        self.records.insert(id.clone(), Vec::new());
        self.pending.insert(id);
        true
    }

    /// Declare (or complete a reserved) record. A record that is already
    /// declared, even with no fields, is left untouched.
    pub fn define(&mut self, name: &str, fields: Vec<FieldDecl>) -> RecordId {
        let id = RecordId::new(name);
        if self.pending.shift_remove(&id) || !self.records.contains_key(&id) {
            self.records.insert(id.clone(), fields);
        }
        id
    }

    /// Declare `name` once. `fields` runs only on the first call and may
    /// itself declare further records, including `name` again.
    pub fn record<F>(&mut self, name: &str, fields: F) -> RecordId
    where
        F: FnOnce(&mut TypeRegistry) -> Vec<FieldDecl>,
    {
        if !self.reserve(name) {
            return RecordId::new(name);
        }
        let declared = fields(self);
        self.define(name, declared)
    }

    /// Number of registered records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Record identities in registration order.
    pub fn record_ids(&self) -> impl Iterator<Item = &RecordId> {
        self.records.keys()
    }
}

impl TypeIntrospector for TypeRegistry {
    fn record_fields(&self, record: &RecordId) -> Option<&[FieldDecl]> {
        self.records.get(record).map(Vec::as_slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::TypeDecl;

    #[test]
    fn test_define_preserves_field_order() {
        let mut registry = TypeRegistry::new();
        registry.define(
            "Point",
            vec![
                FieldDecl::new("y", TypeDecl::Float),
                FieldDecl::new("x", TypeDecl::Float),
            ],
        );
        let fields = registry.record_fields(&RecordId::new("Point")).unwrap();
        let names: Vec<&str> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["y", "x"]);
    }

    #[test]
    fn test_reserve_then_define() {
        let mut registry = TypeRegistry::new();
        assert!(registry.reserve("Tree"));
        assert!(!registry.reserve("Tree"));
        assert!(registry.contains("Tree"));
        registry.define("Tree", vec![FieldDecl::new("leaf", TypeDecl::Int)]);
        assert_eq!(registry.record_fields(&"Tree".into()).unwrap().len(), 1);
    }

    #[test]
    fn test_redefinition_is_ignored() {
        let mut registry = TypeRegistry::new();
        registry.define("A", vec![FieldDecl::new("a", TypeDecl::Int)]);
        registry.define("A", vec![FieldDecl::new("b", TypeDecl::Str)]);
        let fields = registry.record_fields(&"A".into()).unwrap();
        assert_eq!(fields[0].name, "a");
    }

    #[test]
    fn test_empty_record_is_not_a_reservation() {
        let mut registry = TypeRegistry::new();
        registry.define("Marker", Vec::new());
        registry.define("Marker", vec![FieldDecl::new("late", TypeDecl::Int)]);
        assert!(registry.record_fields(&"Marker".into()).unwrap().is_empty());

        assert!(registry.reserve("Empty"));
        registry.define("Empty", Vec::new());
        registry.define("Empty", vec![FieldDecl::new("late", TypeDecl::Int)]);
        assert!(registry.record_fields(&"Empty".into()).unwrap().is_empty());
    }

    #[test]
    fn test_record_declares_self_reference_once() {
        fn declare(registry: &mut TypeRegistry) -> RecordId {
            registry.record("Node", |r| {
                let me = declare(r);
                vec![FieldDecl::new("next", TypeDecl::optional(TypeDecl::record(me)))]
            })
        }
        let mut registry = TypeRegistry::new();
        let id = declare(&mut registry);
        assert_eq!(id.as_str(), "Node");
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.record_fields(&id).unwrap()[0].name, "next");
    }

    #[test]
    fn test_unknown_record() {
        let registry = TypeRegistry::new();
        assert!(registry.record_fields(&"Missing".into()).is_none());
        assert!(registry.is_empty());
    }
}
