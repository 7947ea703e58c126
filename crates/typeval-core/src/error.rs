//! # Error Types — Structured Error Hierarchy
//!
//! Two disjoint error kinds, both derived with `thiserror`:
//!
//! - [`ConfigError`] is raised only while compiling a declaration into a
//!   schema. The declaration itself is wrong; retrying cannot help.
//! - [`ValidationError`] is raised only while validating a concrete input.
//!   It carries every independent [`Violation`] found in that input, each
//!   with a JSON Pointer to the offending location and a stable
//!   [`ViolationKind`] code.
//!
//! [`TypevalError`] unifies both for callers that do not care which phase
//! failed.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Top-level error type for typeval.
#[derive(Error, Debug)]
pub enum TypevalError {
    /// The declaration could not be compiled.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The input did not conform to the compiled schema.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Error while compiling a type declaration into a schema.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A marker kind the constraint compiler has no rule for.
    #[error("unknown constraint type {kind}")]
    UnknownConstraint {
        /// Marker kind name.
        kind: String,
    },

    /// A predicate outside the known predicate table.
    #[error("unknown predicate {name}")]
    UnknownPredicate {
        /// Predicate function name.
        name: String,
    },

    /// A slice-like length marker with ill-typed bounds.
    #[error("invalid length slice: {reason}")]
    InvalidSlice {
        /// What was wrong with the slice.
        reason: String,
    },

    /// A regex constraint that does not compile.
    #[error("invalid pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The pattern text, including any inline flags.
        pattern: String,
        /// Regex compiler message.
        reason: String,
    },

    /// A bare type that is neither primitive, literal, union, supported
    /// container, nor registered record.
    #[error("unknown type {description}")]
    UnknownType {
        /// Human-readable description of the offending type.
        description: String,
    },

    /// A `recursive-ref` with no matching `recursive-container`.
    #[error("recursive reference '{name}' has no definition")]
    DanglingReference {
        /// Definition name.
        name: String,
    },

    /// Two `recursive-container` nodes sharing one name.
    #[error("recursive definition '{name}' is declared more than once")]
    DuplicateDefinition {
        /// Definition name.
        name: String,
    },
}

/// Stable machine-readable reason code of a [`Violation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    IntType,
    IntParsing,
    FloatType,
    FloatParsing,
    BoolParsing,
    StringType,
    NoneRequired,
    AnyScalar,
    LiteralError,
    UnionNoMatch,
    ListType,
    SetType,
    DictType,
    ModelType,
    Missing,
    ExtraForbidden,
    GreaterThan,
    GreaterThanEqual,
    LessThan,
    LessThanEqual,
    MultipleOf,
    TooShort,
    TooLong,
    PatternMismatch,
    UnresolvedReference,
    JsonInvalid,
    YamlInvalid,
    ModelInstantiation,
}

impl ViolationKind {
    /// The snake_case code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::IntType => "int_type",
            Self::IntParsing => "int_parsing",
            Self::FloatType => "float_type",
            Self::FloatParsing => "float_parsing",
            Self::BoolParsing => "bool_parsing",
            Self::StringType => "string_type",
            Self::NoneRequired => "none_required",
            Self::AnyScalar => "any_scalar",
            Self::LiteralError => "literal_error",
            Self::UnionNoMatch => "union_no_match",
            Self::ListType => "list_type",
            Self::SetType => "set_type",
            Self::DictType => "dict_type",
            Self::ModelType => "model_type",
            Self::Missing => "missing",
            Self::ExtraForbidden => "extra_forbidden",
            Self::GreaterThan => "greater_than",
            Self::GreaterThanEqual => "greater_than_equal",
            Self::LessThan => "less_than",
            Self::LessThanEqual => "less_than_equal",
            Self::MultipleOf => "multiple_of",
            Self::TooShort => "too_short",
            Self::TooLong => "too_long",
            Self::PatternMismatch => "pattern_mismatch",
            Self::UnresolvedReference => "unresolved_reference",
            Self::JsonInvalid => "json_invalid",
            Self::YamlInvalid => "yaml_invalid",
            Self::ModelInstantiation => "model_instantiation",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single validation violation with structured context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    /// JSON Pointer path to the violating value in the input (`""` is the root).
    pub instance_path: String,
    /// Reason code.
    pub kind: ViolationKind,
    /// Human-readable description of the violation.
    pub message: String,
}

impl Violation {
    pub fn new(
        instance_path: impl Into<String>,
        kind: ViolationKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            instance_path: instance_path.into(),
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.instance_path.is_empty() {
            write!(f, "  (root): {} [{}]", self.message, self.kind)
        } else {
            write!(f, "  {}: {} [{}]", self.instance_path, self.message, self.kind)
        }
    }
}

/// Collection of validation violations.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Violations {
    violations: Vec<Violation>,
}

impl Violations {
    /// Returns the number of violations.
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    /// Returns true if there are no violations.
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Consumes self and returns the inner Vec.
    pub fn into_inner(self) -> Vec<Violation> {
        self.violations
    }
}

impl From<Vec<Violation>> for Violations {
    fn from(violations: Vec<Violation>) -> Self {
        Self { violations }
    }
}

impl fmt::Display for Violations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, v) in self.violations.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{v}")?;
        }
        Ok(())
    }
}

/// The input did not conform to the schema.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{count} validation error(s) for {title}:\n{violations}", count = .violations.len())]
pub struct ValidationError {
    /// What was being validated (usually the root record name).
    pub title: String,
    /// Structured list of individual violations.
    pub violations: Violations,
}

impl ValidationError {
    pub fn new(title: impl Into<String>, violations: Vec<Violation>) -> Self {
        Self {
            title: title.into(),
            violations: violations.into(),
        }
    }

    /// Returns a slice of all violations.
    pub fn violations(&self) -> &[Violation] {
        self.violations.violations()
    }

    /// Whether any violation carries `kind`.
    pub fn has_kind(&self, kind: ViolationKind) -> bool {
        self.violations().iter().any(|v| v.kind == kind)
    }

    /// Whether any violation is located at `instance_path`.
    pub fn has_path(&self, instance_path: &str) -> bool {
        self.violations()
            .iter()
            .any(|v| v.instance_path == instance_path)
    }
}
