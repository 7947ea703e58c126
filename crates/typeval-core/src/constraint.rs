//! # Constraint Markers
//!
//! Two layers of constraint vocabulary:
//!
//! - [`Annotation`] is a raw metadata item as written next to a type:
//!   a single marker, an interval, a compiled regex, a slice-like length
//!   marker, or host metadata that validation does not care about.
//! - [`Constraint`] is a normalized single marker. The schema crate turns
//!   annotations into constraints (extraction) and constraints into a flat
//!   constraint record (compilation).
//!
//! `Constraint` deliberately includes marker kinds the compiler does not
//! understand (`Timezone`, `Unit`). They exist so that declarations using
//! them fail loudly at compile time instead of being dropped.

use regex::Regex;
use serde_json::Value;

use crate::num::Num;

/// Python-compatible regex flag bits carried by [`Constraint::Regex`].
pub mod flags {
    /// Case-insensitive matching.
    pub const IGNORECASE: u32 = 2;
    /// `^`/`$` match at line boundaries.
    pub const MULTILINE: u32 = 8;
    /// `.` matches newlines.
    pub const DOTALL: u32 = 16;
    /// Whitespace and comments in the pattern are ignored.
    pub const VERBOSE: u32 = 64;
}

/// A normalized constraint marker.
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Strictly greater than.
    Gt(Num),
    /// Greater than or equal.
    Ge(Num),
    /// Strictly less than.
    Lt(Num),
    /// Less than or equal.
    Le(Num),
    /// Exact multiple of.
    MultipleOf(Num),
    /// Length bounds; `max: None` means unbounded. The compiled
    /// `max_length` is checked as an inclusive upper bound.
    Len { min: usize, max: Option<usize> },
    /// Regular expression the value must contain a match for.
    Regex { pattern: String, flags: u32 },
    /// A predicate function.
    Predicate(Predicate),
    /// Timezone requirement on datetimes. Not compilable.
    Timezone(Option<String>),
    /// Physical unit annotation. Not compilable.
    Unit(String),
}

impl Constraint {
    /// Marker kind name, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Gt(_) => "Gt",
            Self::Ge(_) => "Ge",
            Self::Lt(_) => "Lt",
            Self::Le(_) => "Le",
            Self::MultipleOf(_) => "MultipleOf",
            Self::Len { .. } => "Len",
            Self::Regex { .. } => "Regex",
            Self::Predicate(_) => "Predicate",
            Self::Timezone(_) => "Timezone",
            Self::Unit(_) => "Unit",
        }
    }

    /// Length marker with an optional exclusive upper bound.
    pub fn len(min: usize, max: Option<usize>) -> Self {
        Self::Len { min, max }
    }

    /// Regex marker without flags.
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self::Regex {
            pattern: pattern.into(),
            flags: 0,
        }
    }
}

/// Predicate functions a declaration may attach.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// The string is lowercase.
    IsLower,
    /// Any other predicate, identified by its function name.
    Named(String),
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::IsLower => f.write_str("str.islower"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// A raw metadata item attached to an annotated type.
#[derive(Debug, Clone)]
pub enum Annotation {
    /// A single constraint marker.
    Marker(Constraint),
    /// Interval sugar; each present bound becomes its own marker.
    Interval {
        gt: Option<Num>,
        ge: Option<Num>,
        lt: Option<Num>,
        le: Option<Num>,
    },
    /// A compiled regular expression object.
    Pattern(Regex),
    /// Slice-like length sugar. Bounds are untyped so that ill-formed
    /// declarations (a string start, a float stop) can be reported.
    Slice {
        start: Option<Value>,
        stop: Option<Value>,
    },
    /// Documentation string. Ignored by validation.
    Doc(String),
    /// Arbitrary host metadata. Ignored by validation.
    Opaque(Value),
}

impl Annotation {
    pub fn gt(bound: impl Into<Num>) -> Self {
        Self::Marker(Constraint::Gt(bound.into()))
    }

    pub fn ge(bound: impl Into<Num>) -> Self {
        Self::Marker(Constraint::Ge(bound.into()))
    }

    pub fn lt(bound: impl Into<Num>) -> Self {
        Self::Marker(Constraint::Lt(bound.into()))
    }

    pub fn le(bound: impl Into<Num>) -> Self {
        Self::Marker(Constraint::Le(bound.into()))
    }

    pub fn multiple_of(divisor: impl Into<Num>) -> Self {
        Self::Marker(Constraint::MultipleOf(divisor.into()))
    }

    pub fn len(min: usize, max: Option<usize>) -> Self {
        Self::Marker(Constraint::len(min, max))
    }

    pub fn predicate(predicate: Predicate) -> Self {
        Self::Marker(Constraint::Predicate(predicate))
    }

    /// Slice sugar with integer bounds, e.g. `slice(Some(1), Some(5))`.
    pub fn slice(start: Option<i64>, stop: Option<i64>) -> Self {
        Self::Slice {
            start: start.map(Value::from),
            stop: stop.map(Value::from),
        }
    }

    /// Half-open interval `[lo, hi)`.
    pub fn half_open(lo: impl Into<Num>, hi: impl Into<Num>) -> Self {
        Self::Interval {
            gt: None,
            ge: Some(lo.into()),
            lt: Some(hi.into()),
            le: None,
        }
    }
}

impl From<Constraint> for Annotation {
    fn from(marker: Constraint) -> Self {
        Self::Marker(marker)
    }
}

impl From<Regex> for Annotation {
    fn from(regex: Regex) -> Self {
        Self::Pattern(regex)
    }
}
