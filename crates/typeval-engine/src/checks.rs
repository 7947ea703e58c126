//! # Constraint Checks
//!
//! Applied to a value after it has been coerced. Which keys apply depends
//! on what the value turned out to be, not on the node kind, so the same
//! check runs on a leaf and on an `optional` or `union` node layered over
//! it:
//!
//! - numbers: `gt`, `ge`, `lt`, `le`, `multiple_of`;
//! - strings: `to_lower` (a transform, applied first), then
//!   `min_length`/`max_length` in characters and `pattern` (search);
//! - lists, sets, dicts: `min_items`/`max_items`, falling back to
//!   `min_length`/`max_length`.
//!
//! Length upper bounds are inclusive. Every failing check is reported.

use std::cmp::Ordering;
use std::collections::HashMap;

use regex::Regex;
use typeval_core::{Num, ViolationKind};
use typeval_schema::Constraints;

use crate::coerce::Rejection;
use crate::instance::Instance;

/// Patterns compiled once per engine, keyed by pattern text.
pub type PatternCache = HashMap<String, Regex>;

/// Run every applicable check. Returns the (possibly transformed) value or
/// all failures.
pub fn enforce(
    value: Instance,
    constraints: &Constraints,
    patterns: &PatternCache,
) -> Result<Instance, Vec<Rejection>> {
    if constraints.is_empty() {
        return Ok(value);
    }
    let mut failures = Vec::new();
    let value = match value {
        Instance::Int(i) => {
            check_number(Num::Int(i), constraints, &mut failures);
            Instance::Int(i)
        }
        Instance::Float(f) => {
            check_number(Num::Float(f), constraints, &mut failures);
            Instance::Float(f)
        }
        Instance::Str(s) => {
            let s = if constraints.to_lower == Some(true) {
                s.to_lowercase()
            } else {
                s
            };
            check_length(
                s.chars().count(),
                constraints.min_length,
                constraints.max_length,
                "String",
                "character",
                &mut failures,
            );
            if let Some(pattern) = &constraints.pattern {
                if let Some(regex) = patterns.get(pattern) {
                    if !regex.is_match(&s) {
                        failures.push(Rejection::new(
                            ViolationKind::PatternMismatch,
                            format!("String should match pattern '{pattern}'"),
                        ));
                    }
                }
            }
            Instance::Str(s)
        }
        other @ (Instance::List(_) | Instance::Set(_) | Instance::Dict(_)) => {
            let label = match other {
                Instance::List(_) => "List",
                Instance::Set(_) => "Set",
                _ => "Dictionary",
            };
            check_length(
                other.len().unwrap_or(0),
                constraints.min_items.or(constraints.min_length),
                constraints.max_items.or(constraints.max_length),
                label,
                "item",
                &mut failures,
            );
            other
        }
        other => other,
    };
    if failures.is_empty() {
        Ok(value)
    } else {
        Err(failures)
    }
}

fn check_number(n: Num, c: &Constraints, failures: &mut Vec<Rejection>) {
    let bounds = [
        (c.gt, ViolationKind::GreaterThan, "greater than", &[Ordering::Greater][..]),
        (
            c.ge,
            ViolationKind::GreaterThanEqual,
            "greater than or equal to",
            &[Ordering::Greater, Ordering::Equal][..],
        ),
        (c.lt, ViolationKind::LessThan, "less than", &[Ordering::Less][..]),
        (
            c.le,
            ViolationKind::LessThanEqual,
            "less than or equal to",
            &[Ordering::Less, Ordering::Equal][..],
        ),
    ];
    for (bound, kind, phrase, allowed) in bounds {
        let Some(bound) = bound else { continue };
        let ok = n.compare(bound).map_or(false, |ord| allowed.contains(&ord));
        if !ok {
            failures.push(Rejection::new(
                kind,
                format!("Input should be {phrase} {bound}"),
            ));
        }
    }
    if let Some(divisor) = c.multiple_of {
        if !n.is_multiple_of(divisor) {
            failures.push(Rejection::new(
                ViolationKind::MultipleOf,
                format!("Input should be a multiple of {divisor}"),
            ));
        }
    }
}

fn check_length(
    len: usize,
    min: Option<usize>,
    max: Option<usize>,
    subject: &str,
    unit: &str,
    failures: &mut Vec<Rejection>,
) {
    if let Some(min) = min {
        if len < min {
            failures.push(Rejection::new(
                ViolationKind::TooShort,
                format!("{subject} should have at least {min} {unit}(s), not {len}"),
            ));
        }
    }
    if let Some(max) = max {
        if len > max {
            failures.push(Rejection::new(
                ViolationKind::TooLong,
                format!("{subject} should have at most {max} {unit}(s), not {len}"),
            ));
        }
    }
}
