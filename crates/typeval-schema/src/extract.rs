//! # Constraint Extractor
//!
//! Separates a declared type into its bare type and a lazy stream of
//! normalized [`Constraint`] markers.
//!
//! Normalization rules, applied per raw [`Annotation`]:
//!
//! - a compiled regex becomes `Constraint::Regex`;
//! - a slice becomes `Constraint::Len`; its start must be a non-negative
//!   integer or absent (absent means 0) and its stop likewise;
//! - an interval expands into its present bounds, in `gt, ge, lt, le`
//!   order;
//! - documentation and opaque host metadata are skipped.
//!
//! Nested annotation layers are flattened inner-first, so
//! `Annotated[Annotated[int, Ge(0)], Lt(10)]` yields `Ge(0), Lt(10)`.

use std::collections::VecDeque;

use serde_json::Value;
use typeval_core::{Annotation, ConfigError, Constraint, TypeDecl};

/// Split `tp` into its bare type and its constraint markers.
///
/// A type without an annotation layer is returned unchanged with an empty
/// marker stream.
pub fn unpack_type(tp: &TypeDecl) -> (&TypeDecl, ConstraintIter<'_>) {
    let mut layers = Vec::new();
    let mut bare = tp;
    while let TypeDecl::Annotated { inner, metadata } = bare {
        layers.push(metadata.as_slice());
        bare = &**inner;
    }
    layers.reverse();
    let raw = layers.into_iter().flatten().collect();
    (
        bare,
        ConstraintIter {
            raw,
            pending: VecDeque::new(),
        },
    )
}

/// Lazy iterator over normalized markers.
///
/// Each item is a `Result`: a malformed slice surfaces as
/// `ConfigError::InvalidSlice` at the position it was declared.
#[derive(Debug)]
pub struct ConstraintIter<'a> {
    raw: VecDeque<&'a Annotation>,
    pending: VecDeque<Constraint>,
}

impl Iterator for ConstraintIter<'_> {
    type Item = Result<Constraint, ConfigError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(marker) = self.pending.pop_front() {
                return Some(Ok(marker));
            }
            let annotation = self.raw.pop_front()?;
            match annotation {
                Annotation::Marker(marker) => return Some(Ok(marker.clone())),
                Annotation::Pattern(regex) => {
                    // Inline flags are already part of the pattern text.
                    return Some(Ok(Constraint::regex(regex.as_str())));
                }
                Annotation::Slice { start, stop } => {
                    return Some(slice_to_len(start.as_ref(), stop.as_ref()));
                }
                Annotation::Interval { gt, ge, lt, le } => {
                    self.pending.extend(gt.map(Constraint::Gt));
                    self.pending.extend(ge.map(Constraint::Ge));
                    self.pending.extend(lt.map(Constraint::Lt));
                    self.pending.extend(le.map(Constraint::Le));
                }
                Annotation::Doc(_) | Annotation::Opaque(_) => {}
            }
        }
    }
}

fn slice_to_len(start: Option<&Value>, stop: Option<&Value>) -> Result<Constraint, ConfigError> {
    let min = match start {
        None | Some(Value::Null) => 0,
        Some(v) => as_length(v).ok_or_else(|| ConfigError::InvalidSlice {
            reason: format!("start must be a non-negative integer, got {v}"),
        })?,
    };
    let max = match stop {
        None | Some(Value::Null) => None,
        Some(v) => Some(as_length(v).ok_or_else(|| ConfigError::InvalidSlice {
            reason: format!("stop must be a non-negative integer or None, got {v}"),
        })?),
    };
    Ok(Constraint::Len { min, max })
}

fn as_length(v: &Value) -> Option<usize> {
    v.as_u64().and_then(|n| usize::try_from(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;
    use serde_json::json;
    use typeval_core::Num;

    fn collect(tp: &TypeDecl) -> Result<Vec<Constraint>, ConfigError> {
        unpack_type(tp).1.collect()
    }

    #[test]
    fn test_plain_type_has_no_markers() {
        let tp = TypeDecl::Int;
        let (bare, markers) = unpack_type(&tp);
        assert!(matches!(bare, TypeDecl::Int));
        assert_eq!(markers.count(), 0);
    }

    #[test]
    fn test_markers_in_declaration_order() {
        let tp = TypeDecl::Float.annotated([Annotation::ge(0), Annotation::lt(100)]);
        let (bare, _) = unpack_type(&tp);
        assert!(matches!(bare, TypeDecl::Float));
        assert_eq!(
            collect(&tp).unwrap(),
            vec![Constraint::Ge(Num::Int(0)), Constraint::Lt(Num::Int(100))]
        );
    }

    #[test]
    fn test_interval_expands() {
        let tp = TypeDecl::Int.annotated([Annotation::Interval {
            gt: Some(Num::Int(1)),
            ge: None,
            lt: None,
            le: Some(Num::Int(9)),
        }]);
        assert_eq!(
            collect(&tp).unwrap(),
            vec![Constraint::Gt(Num::Int(1)), Constraint::Le(Num::Int(9))]
        );
    }

    #[test]
    fn test_slice_becomes_len() {
        let tp = TypeDecl::Str.annotated([Annotation::slice(None, Some(5))]);
        assert_eq!(collect(&tp).unwrap(), vec![Constraint::len(0, Some(5))]);

        let tp = TypeDecl::Str.annotated([Annotation::slice(Some(2), None)]);
        assert_eq!(collect(&tp).unwrap(), vec![Constraint::len(2, None)]);
    }

    #[test]
    fn test_slice_with_non_integer_start_fails() {
        let tp = TypeDecl::Str.annotated([Annotation::Slice {
            start: Some(json!("a")),
            stop: None,
        }]);
        let err = collect(&tp).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSlice { .. }));
        assert!(err.to_string().contains("start"));
    }

    #[test]
    fn test_slice_with_negative_start_names_the_range() {
        let tp = TypeDecl::Str.annotated([Annotation::slice(Some(-1), Some(4))]);
        let err = collect(&tp).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidSlice {
                reason: "start must be a non-negative integer, got -1".into()
            }
        );
    }

    #[test]
    fn test_slice_with_float_stop_fails() {
        let tp = TypeDecl::Str.annotated([Annotation::Slice {
            start: None,
            stop: Some(json!(2.5)),
        }]);
        let err = collect(&tp).unwrap_err();
        assert!(err.to_string().contains("stop"));
    }

    #[test]
    fn test_regex_object_becomes_marker() {
        let tp = TypeDecl::Str.annotated([Annotation::Pattern(Regex::new("^a+$").unwrap())]);
        assert_eq!(collect(&tp).unwrap(), vec![Constraint::regex("^a+$")]);
    }

    #[test]
    fn test_host_metadata_is_ignored() {
        let tp = TypeDecl::Int.annotated([
            Annotation::Doc("the answer".into()),
            Annotation::Opaque(json!({"ui": "slider"})),
            Annotation::le(42),
        ]);
        assert_eq!(collect(&tp).unwrap(), vec![Constraint::Le(Num::Int(42))]);
    }

    #[test]
    fn test_nested_layers_flatten_inner_first() {
        let tp = TypeDecl::Int
            .annotated([Annotation::ge(0)])
            .annotated([Annotation::lt(10)]);
        let (bare, _) = unpack_type(&tp);
        assert!(matches!(bare, TypeDecl::Int));
        assert_eq!(
            collect(&tp).unwrap(),
            vec![Constraint::Ge(Num::Int(0)), Constraint::Lt(Num::Int(10))]
        );
    }
}
