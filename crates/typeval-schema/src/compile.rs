//! # Constraint Compiler
//!
//! Folds a stream of normalized markers into one flat [`Constraints`]
//! record. Markers are applied in order and a later marker overwrites an
//! earlier one that compiles to the same key (`Ge(1), Ge(5)` gives
//! `ge = 5`).
//!
//! Unknown marker kinds and predicates outside [`known_predicate`] are
//! rejected with a `ConfigError`; nothing is silently dropped.

use regex::Regex;
use serde::{Deserialize, Serialize};
use typeval_core::constraint::flags;
use typeval_core::{ConfigError, Constraint, Num, Predicate};

/// Flat constraint record attached to every schema node.
///
/// Serialized as a flat map; absent keys are omitted. `min_length` and
/// `max_length` are renamed to `min_items`/`max_items` on container nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<Num>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ge: Option<Num>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<Num>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub le: Option<Num>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<Num>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_lower: Option<bool>,
}

impl Constraints {
    /// True when no key is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overwrite every key set in `other`.
    pub fn merge(&mut self, other: Constraints) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() { self.$field = other.$field; })*
            };
        }
        take!(
            gt, ge, lt, le, multiple_of, min_length, max_length, min_items, max_items, pattern,
            to_lower
        );
    }

    /// Move `min_length`/`max_length` to `min_items`/`max_items`.
    pub fn rename_length_to_items(&mut self) {
        if let Some(min) = self.min_length.take() {
            self.min_items = Some(min);
        }
        if let Some(max) = self.max_length.take() {
            self.max_items = Some(max);
        }
    }
}

/// Compile a marker stream into one record.
///
/// # Errors
///
/// Propagates extraction errors and returns `ConfigError` for unknown
/// marker kinds, unknown predicates, and patterns that do not compile.
pub fn compile_constraints<I>(markers: I) -> Result<Constraints, ConfigError>
where
    I: IntoIterator<Item = Result<Constraint, ConfigError>>,
{
    let mut compiled = Constraints::default();
    for marker in markers {
        compiled.merge(compile_marker(&marker?)?);
    }
    Ok(compiled)
}

/// Compile a single marker.
pub fn compile_marker(marker: &Constraint) -> Result<Constraints, ConfigError> {
    let mut out = Constraints::default();
    match marker {
        Constraint::Gt(v) => out.gt = Some(*v),
        Constraint::Ge(v) => out.ge = Some(*v),
        Constraint::Lt(v) => out.lt = Some(*v),
        Constraint::Le(v) => out.le = Some(*v),
        Constraint::MultipleOf(v) => out.multiple_of = Some(*v),
        Constraint::Len { min, max } => {
            out.min_length = Some(*min);
            out.max_length = *max;
        }
        Constraint::Regex { pattern, flags } => out.pattern = Some(compile_pattern(pattern, *flags)?),
        Constraint::Predicate(predicate) => {
            out = known_predicate(predicate).ok_or_else(|| ConfigError::UnknownPredicate {
                name: predicate.to_string(),
            })?;
        }
        other @ (Constraint::Timezone(_) | Constraint::Unit(_)) => {
            return Err(ConfigError::UnknownConstraint {
                kind: other.kind().to_string(),
            });
        }
    }
    Ok(out)
}

/// Constraint record equivalent to a known predicate.
pub fn known_predicate(predicate: &Predicate) -> Option<Constraints> {
    match predicate {
        Predicate::IsLower => Some(Constraints {
            to_lower: Some(true),
            ..Constraints::default()
        }),
        Predicate::Named(_) => None,
    }
}

/// Fold flag bits into inline flags and check that the pattern compiles.
fn compile_pattern(pattern: &str, bits: u32) -> Result<String, ConfigError> {
    let mut inline = String::new();
    for (bit, letter) in [
        (flags::IGNORECASE, 'i'),
        (flags::MULTILINE, 'm'),
        (flags::DOTALL, 's'),
        (flags::VERBOSE, 'x'),
    ] {
        if bits & bit != 0 {
            inline.push(letter);
        }
    }
    let full = if inline.is_empty() {
        pattern.to_string()
    } else {
        format!("(?{inline}){pattern}")
    };
    Regex::new(&full).map_err(|e| ConfigError::InvalidPattern {
        pattern: full.clone(),
        reason: e.to_string(),
    })?;
    Ok(full)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(markers: Vec<Constraint>) -> Result<Constraints, ConfigError> {
        compile_constraints(markers.into_iter().map(Ok))
    }

    #[test]
    fn test_bounds() {
        let c = compile(vec![
            Constraint::Gt(Num::Int(1)),
            Constraint::Le(Num::Float(9.5)),
            Constraint::MultipleOf(Num::Int(2)),
        ])
        .unwrap();
        assert_eq!(c.gt, Some(Num::Int(1)));
        assert_eq!(c.le, Some(Num::Float(9.5)));
        assert_eq!(c.multiple_of, Some(Num::Int(2)));
        assert_eq!(c.ge, None);
    }

    #[test]
    fn test_later_marker_wins() {
        let c = compile(vec![Constraint::Ge(Num::Int(1)), Constraint::Ge(Num::Int(5))]).unwrap();
        assert_eq!(c.ge, Some(Num::Int(5)));
    }

    #[test]
    fn test_len_without_max() {
        let c = compile(vec![Constraint::len(3, None)]).unwrap();
        assert_eq!(c.min_length, Some(3));
        assert_eq!(c.max_length, None);
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json, serde_json::json!({"min_length": 3}));
    }

    #[test]
    fn test_len_with_max() {
        let c = compile(vec![Constraint::len(1, Some(10))]).unwrap();
        assert_eq!((c.min_length, c.max_length), (Some(1), Some(10)));
    }

    #[test]
    fn test_is_lower_predicate() {
        let c = compile(vec![Constraint::Predicate(Predicate::IsLower)]).unwrap();
        assert_eq!(c.to_lower, Some(true));
    }

    #[test]
    fn test_unknown_predicate_rejected() {
        let err = compile(vec![Constraint::Predicate(Predicate::Named("str.isdigit".into()))])
            .unwrap_err();
        assert_eq!(
            err,
            ConfigError::UnknownPredicate {
                name: "str.isdigit".into()
            }
        );
    }

    #[test]
    fn test_unknown_marker_kind_rejected() {
        let err = compile(vec![Constraint::Timezone(Some("UTC".into()))]).unwrap_err();
        assert_eq!(err.to_string(), "unknown constraint type Timezone");
        let err = compile(vec![Constraint::Unit("m/s".into())]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownConstraint { kind } if kind == "Unit"));
    }

    #[test]
    fn test_regex_flags_become_inline() {
        let c = compile(vec![Constraint::Regex {
            pattern: "^abc$".into(),
            flags: flags::IGNORECASE | flags::MULTILINE,
        }])
        .unwrap();
        assert_eq!(c.pattern.as_deref(), Some("(?im)^abc$"));
    }

    #[test]
    fn test_invalid_regex_rejected() {
        let err = compile(vec![Constraint::regex("(unclosed")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPattern { .. }));
    }

    #[test]
    fn test_extraction_error_propagates() {
        let markers = vec![
            Ok(Constraint::Ge(Num::Int(0))),
            Err(ConfigError::InvalidSlice { reason: "bad".into() }),
        ];
        assert!(compile_constraints(markers).is_err());
    }

    #[test]
    fn test_rename_length_to_items() {
        let mut c = compile(vec![Constraint::len(1, Some(2))]).unwrap();
        c.rename_length_to_items();
        assert_eq!((c.min_length, c.max_length), (None, None));
        assert_eq!((c.min_items, c.max_items), (Some(1), Some(2)));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Whatever sequence of `Ge` markers is declared, the last one wins.
        #[test]
        fn last_ge_wins(values in prop::collection::vec(any::<i64>(), 1..16)) {
            let markers = values.iter().map(|v| Ok(Constraint::Ge(Num::Int(*v))));
            let compiled = compile_constraints(markers).unwrap();
            prop_assert_eq!(compiled.ge, values.last().copied().map(Num::Int));
        }

        /// Compiling is deterministic.
        #[test]
        fn compile_deterministic(min in 0usize..100, span in proptest::option::of(0usize..100)) {
            let marker = Constraint::len(min, span.map(|s| min + s));
            let a = compile_marker(&marker).unwrap();
            let b = compile_marker(&marker).unwrap();
            prop_assert_eq!(a, b);
        }
    }
}
